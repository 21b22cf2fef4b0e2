use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `OutbreakError` and maps to other errors to
/// convert to an `OutbreakError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum OutbreakError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// A configuration is missing a field, has a malformed disease object, or
    /// otherwise cannot be used to start a run.
    InvalidConfig(String),
    /// The population does not fit on the grid.
    GridCapacity {
        population: usize,
        capacity: usize,
    },
    /// A distinct selection asked for more individuals than are eligible.
    SelectionExceedsPool {
        requested: usize,
        eligible: usize,
    },
    /// A rejection-sampling loop hit its iteration bound.
    SamplingExhausted {
        attempts: usize,
    },
    ReportError(String),
}

impl From<io::Error> for OutbreakError {
    fn from(error: io::Error) -> Self {
        OutbreakError::IoError(error)
    }
}

impl From<serde_json::Error> for OutbreakError {
    fn from(error: serde_json::Error) -> Self {
        OutbreakError::JsonError(error)
    }
}

impl From<csv::Error> for OutbreakError {
    fn from(error: csv::Error) -> Self {
        OutbreakError::CSVError(error)
    }
}

impl std::error::Error for OutbreakError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutbreakError::IoError(e) => Some(e),
            OutbreakError::JsonError(e) => Some(e),
            OutbreakError::CSVError(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for OutbreakError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutbreakError::IoError(e) => write!(f, "I/O error: {e}"),
            OutbreakError::JsonError(e) => write!(f, "JSON error: {e}"),
            OutbreakError::CSVError(e) => write!(f, "CSV error: {e}"),
            OutbreakError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            OutbreakError::GridCapacity {
                population,
                capacity,
            } => write!(
                f,
                "population of {population} does not fit on a grid with {capacity} cells"
            ),
            OutbreakError::SelectionExceedsPool {
                requested,
                eligible,
            } => write!(
                f,
                "cannot select {requested} distinct individuals from {eligible} eligible"
            ),
            OutbreakError::SamplingExhausted { attempts } => {
                write!(f, "random selection gave up after {attempts} draws")
            }
            OutbreakError::ReportError(msg) => write!(f, "report error: {msg}"),
        }
    }
}
