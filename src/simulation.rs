//! The day loop.
//!
//! A run places the population, hands out interventions, records day 1 and then alternates
//! transmission steps with aggregation until `simulation_length` days are recorded. The
//! [`Simulation`] keeps its population and grid between runs and resets both before each one.

use serde::{Deserialize, Serialize};

use crate::config::{RunParameters, SimulationConfig};
use crate::disease::DiseaseProfile;
use crate::error::OutbreakError;
use crate::grid::Grid;
use crate::log::{debug, info};
use crate::population::Population;
use crate::random::SimRng;
use crate::snapshot::{DailySnapshot, GridSnapshot};
use crate::transmission::{run_transmission_step, DayOutcome};

/// The headline figures of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub peak_prevalence: usize,
    /// First day on which `peak_prevalence` was reached.
    pub peak_prevalence_day: usize,
    pub peak_reproduction: f64,
    /// Last day with positive incidence, if there was one.
    pub last_incidence_day: Option<usize>,
}

impl RunSummary {
    fn observe(&mut self, snapshot: &DailySnapshot) {
        if snapshot.infected_count > self.peak_prevalence {
            self.peak_prevalence = snapshot.infected_count;
            self.peak_prevalence_day = snapshot.day_index;
        }
        if snapshot.reproduction_estimate > self.peak_reproduction {
            self.peak_reproduction = snapshot.reproduction_estimate;
        }
        if snapshot.newly_infected_count > 0 {
            self.last_incidence_day = Some(snapshot.day_index);
        }
    }
}

/// Everything a run produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub population_size: usize,
    pub days: Vec<DailySnapshot>,
    pub summary: RunSummary,
}

impl RunResult {
    /// The snapshot for 1-based `day_index`.
    pub fn day(&self, day_index: usize) -> Option<&DailySnapshot> {
        day_index.checked_sub(1).and_then(|index| self.days.get(index))
    }
}

/// Reusable engine state.
#[derive(Debug, Default)]
pub struct Simulation {
    population: Population,
    grid: Grid,
}

impl Simulation {
    pub fn new() -> Self {
        Simulation::default()
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Runs `config` as given. Use [`SimulationConfig::normalized`] or a
    /// [`ConfigStore`](crate::config::ConfigStore) first to clamp user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration breaks an engine precondition, such as a
    /// population that does not fit on the grid.
    pub fn run(&mut self, config: &SimulationConfig) -> Result<RunResult, OutbreakError> {
        let parameters = RunParameters::try_from(config)?;
        self.run_parameters(&parameters)
    }

    /// Runs already-checked parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if placement or intervention assignment fails.
    pub fn run_parameters(&mut self, parameters: &RunParameters) -> Result<RunResult, OutbreakError> {
        info!(
            "starting run: seed {:?}, {} people on a {}x{} grid for {} days",
            parameters.seed,
            parameters.population_size,
            parameters.grid_height,
            parameters.grid_width,
            parameters.simulation_length
        );
        let disease = parameters.disease;
        let mut rng = SimRng::from_seed_str(&parameters.seed);

        self.population.reset(parameters.population_size);
        self.grid.reset(parameters.grid_height, parameters.grid_width);

        // Patient zero stays uninfected only when the whole population is vaccinated.
        let infect_patient_zero = parameters.vacc_level < parameters.population_size;
        self.grid.place_patient_zero(
            &mut self.population,
            parameters.patient_zero,
            &disease,
            infect_patient_zero,
        )?;
        self.grid.place_rest(&mut self.population, &mut rng)?;
        self.population
            .assign_masks(&mut rng, parameters.mask_level, parameters.mask_protection)?;
        self.population
            .assign_vaccines(&mut rng, parameters.vacc_level, disease.vaccine_efficacy)?;

        let mut days = Vec::with_capacity(parameters.simulation_length.max(1));
        let mut summary = RunSummary::default();

        let first = self.aggregate(1, None, &DayOutcome::default(), &disease);
        summary.observe(&first);
        days.push(first);

        for day_index in 2..=parameters.simulation_length {
            let outcome = run_transmission_step(&mut self.population, &self.grid, &disease, &mut rng);
            let snapshot = self.aggregate(day_index, days.last(), &outcome, &disease);
            summary.observe(&snapshot);
            days.push(snapshot);
        }

        info!(
            "run finished: peak prevalence {} on day {}, peak R {:.3}, last incidence day {:?}",
            summary.peak_prevalence,
            summary.peak_prevalence_day,
            summary.peak_reproduction,
            summary.last_incidence_day
        );
        Ok(RunResult {
            population_size: parameters.population_size,
            days,
            summary,
        })
    }

    fn aggregate(
        &self,
        day_index: usize,
        previous: Option<&DailySnapshot>,
        outcome: &DayOutcome,
        disease: &DiseaseProfile,
    ) -> DailySnapshot {
        let counts = self.population.counts();
        let previous_infected = previous.map_or(counts.infected, |day| day.infected_count);
        let snapshot = DailySnapshot {
            day_index,
            uninfected_count: counts.susceptible,
            infected_count: counts.infected,
            newly_infected_count: counts.infected.saturating_sub(previous_infected),
            immune_count: counts.immune,
            reproduction_estimate: outcome.reproduction_estimate(),
            grid: GridSnapshot::capture(&self.grid, &self.population, disease),
        };
        debug!(
            "day {}: {} uninfected, {} infected (+{}), {} immune, R {:.3} from {} infectors",
            snapshot.day_index,
            snapshot.uninfected_count,
            snapshot.infected_count,
            snapshot.newly_infected_count,
            snapshot.immune_count,
            snapshot.reproduction_estimate,
            outcome.infectors
        );
        snapshot
    }
}

/// Runs `config` on a fresh [`Simulation`].
///
/// # Errors
///
/// See [`Simulation::run`].
pub fn run(config: &SimulationConfig) -> Result<RunResult, OutbreakError> {
    Simulation::new().run(config)
}
