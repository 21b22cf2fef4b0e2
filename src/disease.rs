//! Disease parameters. A [`DiseaseProfile`] is fixed for the duration of a run.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The static parameter bundle describing a pathogen.
///
/// `transmission_factor` and `vaccine_efficacy` are on a 0-100 probability scale.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseProfile {
    /// Transmission chance given to an individual at the moment they are infected.
    pub transmission_factor: f64,
    /// Protection added to a vaccinated individual.
    pub vaccine_efficacy: f64,
    /// Days infected after which an individual is shown as symptomatic.
    #[serde(deserialize_with = "non_negative_days")]
    pub days_to_symptoms: u32,
    /// Days infected after which an individual becomes immune.
    #[serde(deserialize_with = "non_negative_days")]
    pub days_to_immune: u32,
}

impl DiseaseProfile {
    pub fn new(
        transmission_factor: f64,
        vaccine_efficacy: f64,
        days_to_symptoms: u32,
        days_to_immune: u32,
    ) -> Self {
        DiseaseProfile {
            transmission_factor,
            vaccine_efficacy,
            days_to_symptoms,
            days_to_immune,
        }
    }
}

impl Default for DiseaseProfile {
    fn default() -> Self {
        DiseasePreset::Measles.profile()
    }
}

/// Negative day counts are clamped to zero rather than rejected.
fn non_negative_days<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let days = i64::deserialize(deserializer)?;
    Ok(u32::try_from(days.max(0)).unwrap_or(u32::MAX))
}

/// Named disease profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum DiseasePreset {
    /// The least infectious preset.
    Rubella,
    /// The middle preset.
    Covid,
    /// The most infectious preset, and the default.
    Measles,
}

impl DiseasePreset {
    pub fn profile(self) -> DiseaseProfile {
        match self {
            DiseasePreset::Rubella => DiseaseProfile::new(20.0, 100.0, 2, 12),
            DiseasePreset::Covid => DiseaseProfile::new(30.0, 100.0, 7, 14),
            DiseasePreset::Measles => DiseaseProfile::new(40.0, 100.0, 4, 8),
        }
    }
}

impl From<DiseasePreset> for DiseaseProfile {
    fn from(preset: DiseasePreset) -> Self {
        preset.profile()
    }
}
