//! Immutable per-day records.
//!
//! A snapshot copies the values it needs out of the live population, so later days can keep
//! mutating people without touching history.

use serde::{Deserialize, Serialize};

use crate::disease::DiseaseProfile;
use crate::grid::Grid;
use crate::person::{DisplayCategory, InfectionStatus, InterventionLabel, PersonId};
use crate::population::Population;

/// The state of one occupied cell on one day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub person: PersonId,
    pub row: usize,
    pub col: usize,
    pub status: InfectionStatus,
    pub category: DisplayCategory,
    pub label: InterventionLabel,
    pub days_infected: u32,
}

/// Value copy of the grid, row-major, `None` for empty cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub height: usize,
    pub width: usize,
    pub cells: Vec<Option<CellSnapshot>>,
}

impl GridSnapshot {
    pub fn capture(grid: &Grid, population: &Population, disease: &DiseaseProfile) -> Self {
        let cells = grid
            .cells()
            .map(|((row, col), occupant)| {
                occupant.map(|person_id| {
                    let person = population.get(person_id);
                    CellSnapshot {
                        person: person_id,
                        row,
                        col,
                        status: person.status(),
                        category: person.display_category(disease),
                        label: person.intervention_label(),
                        days_infected: person.days_infected(),
                    }
                })
            })
            .collect();
        GridSnapshot {
            height: grid.height(),
            width: grid.width(),
            cells,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellSnapshot> {
        if row < self.height && col < self.width {
            self.cells[row * self.width + col].as_ref()
        } else {
            None
        }
    }

    pub fn occupied(&self) -> impl Iterator<Item = &CellSnapshot> {
        self.cells.iter().flatten()
    }

    /// Finds the cell of `person_id`, if they were on the grid.
    pub fn find(&self, person_id: PersonId) -> Option<&CellSnapshot> {
        self.occupied().find(|cell| cell.person == person_id)
    }
}

/// Aggregate counts for one day plus the frozen grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    /// 1-based day number.
    pub day_index: usize,
    pub uninfected_count: usize,
    /// Prevalence.
    pub infected_count: usize,
    /// Incidence: growth in prevalence since the previous day, never negative.
    pub newly_infected_count: usize,
    /// Resistant.
    pub immune_count: usize,
    pub reproduction_estimate: f64,
    pub grid: GridSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::DiseasePreset;
    use crate::person::PATIENT_ZERO;
    use crate::random::SimRng;

    #[test]
    fn capture_is_a_value_copy() {
        let disease = DiseasePreset::Measles.profile();
        let mut grid = Grid::new(10, 10);
        let mut population = Population::new(100);
        let mut rng = SimRng::from_seed_str("snapshot");
        grid.place_patient_zero(&mut population, (3, 3), &disease, true)
            .unwrap();
        grid.place_rest(&mut population, &mut rng).unwrap();

        let before = GridSnapshot::capture(&grid, &population, &disease);
        population.get_mut(PATIENT_ZERO).make_immune();
        population.get_mut(PersonId(1)).infect(&disease);
        let after = GridSnapshot::capture(&grid, &population, &disease);

        assert_eq!(before.get(3, 3).unwrap().status, InfectionStatus::Infected);
        assert_eq!(after.get(3, 3).unwrap().status, InfectionStatus::Immune);
        assert_eq!(before.get(2, 2).unwrap().status, InfectionStatus::Susceptible);
        assert_eq!(after.get(2, 2).unwrap().category, DisplayCategory::Infected);
        assert_eq!(before.occupied().count(), 100);
    }

    #[test]
    fn find_and_bounds() {
        let disease = DiseasePreset::Covid.profile();
        let mut grid = Grid::new(4, 4);
        let mut population = Population::new(10);
        grid.place_patient_zero(&mut population, (1, 1), &disease, false)
            .unwrap();
        let snapshot = GridSnapshot::capture(&grid, &population, &disease);
        let cell = snapshot.find(PATIENT_ZERO).unwrap();
        assert_eq!((cell.row, cell.col), (1, 1));
        assert!(snapshot.find(PersonId(9)).is_none());
        assert!(snapshot.get(4, 0).is_none());
        assert_eq!(snapshot.cells.len(), 16);
    }
}
