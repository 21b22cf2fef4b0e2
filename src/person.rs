use serde::{Deserialize, Serialize};

use crate::disease::DiseaseProfile;

/// Index of a person in the population. Patient zero is always `PersonId(0)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub usize);

pub const PATIENT_ZERO: PersonId = PersonId(0);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfectionStatus {
    Susceptible,
    Infected,
    Immune,
}

/// How a cell is drawn by a presentation layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayCategory {
    Susceptible,
    /// Infected, but not yet for `days_to_symptoms` days.
    Infected,
    Symptomatic,
    Immune,
}

/// Which interventions a person received.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterventionLabel {
    None,
    Mask,
    Vaccine,
    Both,
}

impl InterventionLabel {
    /// Single-letter marker drawn on a person's cell.
    pub fn code(self) -> &'static str {
        match self {
            InterventionLabel::None => "",
            InterventionLabel::Mask => "M",
            InterventionLabel::Vaccine => "V",
            InterventionLabel::Both => "B",
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Per-person mutable state.
///
/// `infected` and `immune` are never both true, and immunity is terminal for a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Person {
    transmission: f64,
    protection: f64,
    mask: bool,
    vaccine: bool,
    infected: bool,
    days_infected: u32,
    immune: bool,
    position: Option<(usize, usize)>,
    secondary_infections: u32,
}

impl Person {
    pub fn new() -> Self {
        Person::default()
    }

    pub fn transmission(&self) -> f64 {
        self.transmission
    }

    pub fn protection(&self) -> f64 {
        self.protection
    }

    pub fn has_mask(&self) -> bool {
        self.mask
    }

    pub fn has_vaccine(&self) -> bool {
        self.vaccine
    }

    pub fn is_infected(&self) -> bool {
        self.infected
    }

    pub fn is_immune(&self) -> bool {
        self.immune
    }

    pub fn is_susceptible(&self) -> bool {
        !self.infected && !self.immune
    }

    pub fn days_infected(&self) -> u32 {
        self.days_infected
    }

    pub fn secondary_infections(&self) -> u32 {
        self.secondary_infections
    }

    /// Grid coordinates as `(row, col)`, or `None` before placement.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.position
    }

    pub fn status(&self) -> InfectionStatus {
        if self.immune {
            InfectionStatus::Immune
        } else if self.infected {
            InfectionStatus::Infected
        } else {
            InfectionStatus::Susceptible
        }
    }

    pub fn display_category(&self, disease: &DiseaseProfile) -> DisplayCategory {
        match self.status() {
            InfectionStatus::Immune => DisplayCategory::Immune,
            InfectionStatus::Infected if self.days_infected >= disease.days_to_symptoms => {
                DisplayCategory::Symptomatic
            }
            InfectionStatus::Infected => DisplayCategory::Infected,
            InfectionStatus::Susceptible => DisplayCategory::Susceptible,
        }
    }

    pub fn intervention_label(&self) -> InterventionLabel {
        match (self.mask, self.vaccine) {
            (true, true) => InterventionLabel::Both,
            (false, true) => InterventionLabel::Vaccine,
            (true, false) => InterventionLabel::Mask,
            (false, false) => InterventionLabel::None,
        }
    }

    pub(crate) fn set_position(&mut self, row: usize, col: usize) {
        self.position = Some((row, col));
    }

    /// Raises protection and lowers transmission by `amount`, both kept within `[0, 100]`.
    pub fn apply_mask(&mut self, amount: f64) {
        self.mask = true;
        self.protection = clamp_percent(self.protection + amount);
        self.transmission = clamp_percent(self.transmission - amount);
    }

    pub fn apply_vaccine(&mut self, efficacy: f64) {
        self.vaccine = true;
        self.protection = clamp_percent(self.protection + efficacy);
    }

    pub fn infect(&mut self, disease: &DiseaseProfile) {
        self.infected = true;
        self.days_infected = 0;
        self.transmission = clamp_percent(disease.transmission_factor);
    }

    /// Advances the infection clock by one day. Returns `true` if the person is still
    /// infectious afterwards, `false` if this is the day they become immune (in which case
    /// the counter is left unchanged).
    pub fn advance_infection(&mut self, disease: &DiseaseProfile) -> bool {
        debug_assert!(self.infected, "advancing the clock of an uninfected person");
        if self.days_infected + 1 >= disease.days_to_immune {
            self.make_immune();
            false
        } else {
            self.days_infected += 1;
            true
        }
    }

    pub fn make_immune(&mut self) {
        self.immune = true;
        self.infected = false;
    }

    pub(crate) fn record_secondary_infection(&mut self) {
        self.secondary_infections += 1;
    }

    /// Returns to the default state: uninfected, unprotected, unplaced.
    pub fn reset(&mut self) {
        *self = Person::default();
    }
}
