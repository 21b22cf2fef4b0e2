//! Run configuration.
//!
//! [`SimulationConfig`] is the user-facing form, read from JSON with the field names below.
//! Every field is required. Out-of-range numbers are not errors: [`SimulationConfig::normalized`]
//! clamps them to the nearest valid value. [`RunParameters`] is the checked form the engine
//! consumes, and [`ConfigStore`] keeps the last configuration that passed both steps.
//!
//! ```json
//! {
//!   "simulationLength": 31,
//!   "populationSize": 100,
//!   "gridHeight": 10,
//!   "gridWidth": 10,
//!   "seed": "5x5",
//!   "patientZeroPosition": [7, 5],
//!   "disease": "Measles",
//!   "maskLevel": 0,
//!   "maskProtection": 40,
//!   "vaccLevel": 0
//! }
//! ```
//!
//! `disease` may be a preset name or a full
//! `{"transmissionFactor", "vaccineEfficacy", "daysToSymptoms", "daysToImmune"}` object.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::disease::{DiseasePreset, DiseaseProfile};
use crate::error::OutbreakError;
use crate::log::{debug, warn};

pub const MAX_SIMULATION_LENGTH: i64 = 50;
pub const MIN_POPULATION_SIZE: i64 = 100;
pub const MAX_POPULATION_SIZE: i64 = 400;
pub const MAX_GRID_SIDE: i64 = 20;
pub const MAX_INTERVENTION_LEVEL: i64 = 100;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub simulation_length: i64,
    pub population_size: i64,
    pub grid_height: i64,
    pub grid_width: i64,
    #[serde(deserialize_with = "deserialize_seed")]
    pub seed: String,
    /// `[row, col]`.
    pub patient_zero_position: [i64; 2],
    #[serde(deserialize_with = "deserialize_disease")]
    pub disease: DiseaseProfile,
    pub mask_level: i64,
    pub mask_protection: f64,
    pub vacc_level: i64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            simulation_length: 31,
            population_size: 100,
            grid_height: 10,
            grid_width: 10,
            seed: "5x5".to_string(),
            patient_zero_position: [7, 5],
            disease: DiseasePreset::Measles.profile(),
            mask_level: 0,
            mask_protection: 40.0,
            vacc_level: 0,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeedInput {
    Text(String),
    Number(serde_json::Number),
}

fn deserialize_seed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match SeedInput::deserialize(deserializer)? {
        SeedInput::Text(seed) => seed,
        SeedInput::Number(seed) => seed.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DiseaseInput {
    Preset(String),
    Profile(DiseaseProfile),
}

fn deserialize_disease<'de, D>(deserializer: D) -> Result<DiseaseProfile, D::Error>
where
    D: Deserializer<'de>,
{
    match DiseaseInput::deserialize(deserializer)? {
        DiseaseInput::Preset(name) => DiseasePreset::from_str(&name)
            .map(DiseasePreset::profile)
            .map_err(|_| D::Error::custom(format!("unknown disease preset {name:?}"))),
        DiseaseInput::Profile(profile) => Ok(profile),
    }
}

impl SimulationConfig {
    /// Parses a configuration. Nothing is clamped here.
    ///
    /// # Errors
    ///
    /// Returns [`OutbreakError::InvalidConfig`] if the text is not valid JSON, a field is
    /// missing, the disease object is malformed, or the patient zero position is not a pair.
    pub fn from_json_str(text: &str) -> Result<Self, OutbreakError> {
        serde_json::from_str(text).map_err(|e| OutbreakError::InvalidConfig(e.to_string()))
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn from_json_file(path: &Path) -> Result<Self, OutbreakError> {
        debug!("loading configuration from {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Clamps every field into range. Grid dimensions that cannot hold the population are
    /// replaced with those of `previous`, and patient zero is clamped onto the resulting grid.
    #[must_use]
    pub fn normalized(&self, previous: &SimulationConfig) -> SimulationConfig {
        let population_size = self
            .population_size
            .clamp(MIN_POPULATION_SIZE, MAX_POPULATION_SIZE);
        let grid_height = self.grid_height.clamp(1, MAX_GRID_SIDE);
        let grid_width = self.grid_width.clamp(1, MAX_GRID_SIDE);
        let (grid_height, grid_width) = if grid_height * grid_width >= population_size {
            (grid_height, grid_width)
        } else {
            warn!(
                "a {grid_height}x{grid_width} grid cannot hold {population_size} people; \
                 keeping {}x{}",
                previous.grid_height, previous.grid_width
            );
            (previous.grid_height, previous.grid_width)
        };
        let [row, col] = self.patient_zero_position;

        SimulationConfig {
            simulation_length: self.simulation_length.clamp(0, MAX_SIMULATION_LENGTH),
            population_size,
            grid_height,
            grid_width,
            seed: self.seed.clone(),
            patient_zero_position: [
                row.clamp(0, (grid_height - 1).max(0)),
                col.clamp(0, (grid_width - 1).max(0)),
            ],
            disease: self.disease,
            mask_level: self.mask_level.clamp(0, MAX_INTERVENTION_LEVEL),
            mask_protection: self.mask_protection,
            vacc_level: self.vacc_level.clamp(0, MAX_INTERVENTION_LEVEL),
        }
    }
}

/// Checked, engine-ready parameters for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    pub simulation_length: usize,
    pub population_size: usize,
    pub grid_height: usize,
    pub grid_width: usize,
    pub seed: String,
    pub patient_zero: (usize, usize),
    pub disease: DiseaseProfile,
    pub mask_level: usize,
    pub mask_protection: f64,
    pub vacc_level: usize,
}

fn grid_side(name: &str, value: i64) -> Result<usize, OutbreakError> {
    if !(1..=MAX_GRID_SIDE).contains(&value) {
        return Err(OutbreakError::InvalidConfig(format!(
            "{name} must be between 1 and {MAX_GRID_SIDE}, got {value}"
        )));
    }
    non_negative(name, value)
}

fn non_negative(name: &str, value: i64) -> Result<usize, OutbreakError> {
    usize::try_from(value)
        .map_err(|_| OutbreakError::InvalidConfig(format!("{name} must not be negative, got {value}")))
}

impl TryFrom<&SimulationConfig> for RunParameters {
    type Error = OutbreakError;

    fn try_from(config: &SimulationConfig) -> Result<Self, Self::Error> {
        let parameters = RunParameters {
            simulation_length: non_negative("simulationLength", config.simulation_length)?,
            population_size: non_negative("populationSize", config.population_size)?,
            grid_height: grid_side("gridHeight", config.grid_height)?,
            grid_width: grid_side("gridWidth", config.grid_width)?,
            seed: config.seed.clone(),
            patient_zero: (
                non_negative("patientZeroPosition[0]", config.patient_zero_position[0])?,
                non_negative("patientZeroPosition[1]", config.patient_zero_position[1])?,
            ),
            disease: config.disease,
            mask_level: non_negative("maskLevel", config.mask_level)?,
            mask_protection: config.mask_protection,
            vacc_level: non_negative("vaccLevel", config.vacc_level)?,
        };

        let capacity = parameters.grid_height * parameters.grid_width;
        if parameters.population_size > capacity {
            return Err(OutbreakError::GridCapacity {
                population: parameters.population_size,
                capacity,
            });
        }
        let (row, col) = parameters.patient_zero;
        if row >= parameters.grid_height || col >= parameters.grid_width {
            return Err(OutbreakError::InvalidConfig(format!(
                "patient zero position ({row}, {col}) is outside a {}x{} grid",
                parameters.grid_height, parameters.grid_width
            )));
        }
        for level in [parameters.mask_level, parameters.vacc_level] {
            if level > parameters.population_size {
                return Err(OutbreakError::SelectionExceedsPool {
                    requested: level,
                    eligible: parameters.population_size,
                });
            }
        }
        Ok(parameters)
    }
}

/// Holds the last known good configuration. Invalid input is discarded and the previous
/// configuration stays in effect.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    current: SimulationConfig,
}

impl ConfigStore {
    pub fn new() -> Self {
        ConfigStore::default()
    }

    pub fn current(&self) -> &SimulationConfig {
        &self.current
    }

    /// Normalizes `config` against the current configuration and adopts it if the result
    /// can be run.
    ///
    /// # Errors
    ///
    /// Returns the validation error; the current configuration is unchanged.
    pub fn apply(&mut self, config: &SimulationConfig) -> Result<&SimulationConfig, OutbreakError> {
        let normalized = config.normalized(&self.current);
        match RunParameters::try_from(&normalized) {
            Ok(_) => {
                self.current = normalized;
                Ok(&self.current)
            }
            Err(e) => {
                warn!("rejected configuration, keeping the previous one: {e}");
                Err(e)
            }
        }
    }

    /// Parses `text` and applies it.
    ///
    /// # Errors
    ///
    /// Returns the parse or validation error; the current configuration is unchanged.
    pub fn apply_json(&mut self, text: &str) -> Result<&SimulationConfig, OutbreakError> {
        match SimulationConfig::from_json_str(text) {
            Ok(config) => self.apply(&config),
            Err(e) => {
                warn!("discarding unparseable configuration: {e}");
                Err(e)
            }
        }
    }

    /// Checked parameters for the current configuration.
    ///
    /// # Errors
    ///
    /// Never fails for a configuration that went through [`ConfigStore::apply`].
    pub fn run_parameters(&self) -> Result<RunParameters, OutbreakError> {
        RunParameters::try_from(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL_CONFIG: &str = r#"{
        "days": [],
        "simulationLength": 31,
        "gridHeight": 10,
        "gridWidth": 10,
        "seed": "test-seed",
        "speedLevel": 3,
        "patientZeroPosition": [7, 5],
        "populationSize": 100,
        "disease": {"transmissionFactor": 40, "vaccineEfficacy": 100,
                    "daysToSymptoms": 4, "daysToImmune": 8},
        "maskLevel": 0,
        "maskProtection": 40,
        "vaccLevel": 0
    }"#;

    #[test]
    fn parses_a_full_config() {
        let config = SimulationConfig::from_json_str(FULL_CONFIG).unwrap();
        assert_eq!(config.seed, "test-seed");
        assert_eq!(config.patient_zero_position, [7, 5]);
        assert_eq!(config.disease, DiseasePreset::Measles.profile());
    }

    fn edited(edit: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut value: serde_json::Value = serde_json::from_str(FULL_CONFIG).unwrap();
        edit(&mut value);
        value.to_string()
    }

    #[test]
    fn parses_preset_names_and_numeric_seeds() {
        let text = edited(|value| {
            value["disease"] = "covid".into();
            value["seed"] = 42.into();
        });
        let config = SimulationConfig::from_json_str(&text).unwrap();
        assert_eq!(config.disease, DiseasePreset::Covid.profile());
        assert_eq!(config.seed, "42");
    }

    #[test]
    fn rejects_missing_fields_and_bad_shapes() {
        let missing = edited(|value| {
            value.as_object_mut().unwrap().remove("maskLevel");
        });
        assert!(matches!(
            SimulationConfig::from_json_str(&missing),
            Err(OutbreakError::InvalidConfig(_))
        ));

        let triple = edited(|value| value["patientZeroPosition"] = serde_json::json!([7, 5, 1]));
        assert!(SimulationConfig::from_json_str(&triple).is_err());

        let bad_disease = edited(|value| {
            value["disease"].as_object_mut().unwrap().remove("daysToImmune");
        });
        assert!(SimulationConfig::from_json_str(&bad_disease).is_err());

        let unknown_preset = edited(|value| value["disease"] = "plague".into());
        assert!(SimulationConfig::from_json_str(&unknown_preset).is_err());

        assert!(SimulationConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn normalization_clamps_ranges() {
        let config = SimulationConfig {
            simulation_length: 80,
            population_size: 20,
            grid_height: 40,
            grid_width: -3,
            mask_level: 250,
            vacc_level: -5,
            mask_protection: 150.0,
            ..SimulationConfig::default()
        };
        let normalized = config.normalized(&SimulationConfig::default());
        assert_eq!(normalized.simulation_length, 50);
        assert_eq!(normalized.population_size, 100);
        // 20x1 cannot hold 100 people, so the previous 10x10 grid is kept.
        assert_eq!((normalized.grid_height, normalized.grid_width), (10, 10));
        assert_eq!(normalized.mask_level, 100);
        assert_eq!(normalized.vacc_level, 0);
        assert_eq!(normalized.mask_protection, 150.0);
    }

    #[test]
    fn normalization_clamps_patient_zero_onto_the_grid() {
        let config = SimulationConfig {
            grid_height: 12,
            grid_width: 15,
            patient_zero_position: [30, -2],
            ..SimulationConfig::default()
        };
        let normalized = config.normalized(&SimulationConfig::default());
        assert_eq!(normalized.patient_zero_position, [11, 0]);
    }

    #[test]
    fn run_parameters_enforce_preconditions() {
        let too_small = SimulationConfig {
            grid_height: 9,
            grid_width: 9,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            RunParameters::try_from(&too_small),
            Err(OutbreakError::GridCapacity {
                population: 100,
                capacity: 81
            })
        ));

        let off_grid = SimulationConfig {
            patient_zero_position: [10, 0],
            ..SimulationConfig::default()
        };
        assert!(RunParameters::try_from(&off_grid).is_err());

        for (grid_height, grid_width) in [(i64::MAX, 4), (21, 20), (0, 10), (-3, 10)] {
            let oversized = SimulationConfig {
                grid_height,
                grid_width,
                ..SimulationConfig::default()
            };
            assert!(matches!(
                RunParameters::try_from(&oversized),
                Err(OutbreakError::InvalidConfig(_))
            ));
        }

        let negative = SimulationConfig {
            simulation_length: -1,
            ..SimulationConfig::default()
        };
        assert!(RunParameters::try_from(&negative).is_err());

        let parameters = RunParameters::try_from(&SimulationConfig::default()).unwrap();
        assert_eq!(parameters.patient_zero, (7, 5));
        assert_eq!(parameters.population_size, 100);
    }

    #[test]
    fn store_keeps_last_known_good() {
        let mut store = ConfigStore::new();
        store.apply_json(FULL_CONFIG).unwrap();
        assert_eq!(store.current().seed, "test-seed");

        assert!(store.apply_json("{\"seed\": \"other\"}").is_err());
        assert_eq!(store.current().seed, "test-seed");

        // Population raised past what the kept 10x10 grid can hold.
        let crowded = edited(|value| {
            value["populationSize"] = 150.into();
            value["gridWidth"] = 5.into();
        });
        assert!(store.apply_json(&crowded).is_err());
        assert_eq!(store.current().population_size, 100);

        let bigger = edited(|value| {
            value["populationSize"] = 150.into();
            value["gridWidth"] = 20.into();
        });
        store.apply_json(&bigger).unwrap();
        assert_eq!(store.current().population_size, 150);
        assert_eq!(store.current().grid_width, 20);
        assert!(store.run_parameters().is_ok());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(FULL_CONFIG.as_bytes()).unwrap();
        let config = SimulationConfig::from_json_file(&path).unwrap();
        assert_eq!(config.simulation_length, 31);

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            SimulationConfig::from_json_file(&missing),
            Err(OutbreakError::IoError(_))
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let text = serde_json::to_string(&SimulationConfig::default()).unwrap();
        assert!(text.contains("\"patientZeroPosition\":[7,5]"));
        let parsed = SimulationConfig::from_json_str(&text).unwrap();
        assert_eq!(parsed, SimulationConfig::default());
    }
}
