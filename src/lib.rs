//! A seeded, day-stepped outbreak model for a population placed on a 2D grid
//!
//! A run places a population on a grid, seeds one infection (patient zero) with its eight
//! closest contacts around it, hands out masks and vaccines, and then steps through days. On
//! each day every infectious person tries to infect its Moore neighbors, infections progress
//! toward immunity, and the engine records a [`DailySnapshot`](snapshot::DailySnapshot) with
//! aggregate counts and a frozen copy of the grid.
//!
//! Runs are reproducible: every random draw comes from one generator seeded by the
//! configuration's seed string, so the same configuration always yields the same result.
//!
//! ```rust
//! use grid_outbreak::{run, SimulationConfig};
//!
//! let result = run(&SimulationConfig::default()).unwrap();
//! assert_eq!(result.days.len(), 31);
//! assert_eq!(result.days[0].infected_count, 1);
//! ```
//!
//! The main pieces are:
//! * [`config`]: the JSON configuration, its clamping rules and the last-known-good store
//! * [`simulation`]: the day loop and the run summary
//! * [`transmission`]: one day of infection attempts and disease progression
//! * [`report`]: CSV and JSON output of a finished run
//! * [`runner`]: the `grid-outbreak` command line
pub mod config;
pub mod disease;
pub mod error;
pub mod grid;
pub mod hashing;
pub mod log;
pub mod person;
pub mod population;
pub mod random;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod snapshot;
pub mod transmission;

pub use config::{ConfigStore, RunParameters, SimulationConfig};
pub use disease::{DiseasePreset, DiseaseProfile};
pub use error::OutbreakError;
pub use simulation::{run, RunResult, RunSummary, Simulation};
pub use snapshot::{DailySnapshot, GridSnapshot};
