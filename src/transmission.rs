//! One day of disease transmission.
//!
//! The day starts by advancing the infection clock of every infected person; those who reach
//! `days_to_immune` become immune and sit the day out. Everyone still infectious then tries to
//! infect each susceptible occupant of their Moore neighborhood, in the fixed order given by
//! [`MOORE_NEIGHBORHOOD`](crate::grid::MOORE_NEIGHBORHOOD). Each attempt draws an attack roll
//! and a defense roll from `[0, 100)`; the attempt succeeds when the attack roll is below the
//! infector's transmission and the defense roll is not below the defender's protection.

use serde::Serialize;

use crate::disease::DiseaseProfile;
use crate::grid::Grid;
use crate::log::trace;
use crate::person::PersonId;
use crate::population::Population;
use crate::random::SimRng;

/// Resolution of the attack and defense rolls.
const ROLL_RANGE: usize = 100;

/// What happened during one transmission step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct DayOutcome {
    /// People who acted as infectors.
    pub infectors: usize,
    /// Infections caused during the step.
    pub new_infections: usize,
    /// People who became immune at the start of the step.
    pub newly_immune: usize,
}

impl DayOutcome {
    /// Mean secondary infections per infector; `0.0` when nobody was infectious.
    #[allow(clippy::cast_precision_loss)]
    pub fn reproduction_estimate(&self) -> f64 {
        if self.infectors == 0 {
            0.0
        } else {
            self.new_infections as f64 / self.infectors as f64
        }
    }
}

/// Advances every infected person's clock. Returns the people who remain infectious, in
/// population order, and the number who became immune.
pub fn advance_infections(
    population: &mut Population,
    disease: &DiseaseProfile,
) -> (Vec<PersonId>, usize) {
    let mut infectors = Vec::new();
    let mut newly_immune = 0;
    for person_id in population.person_ids().collect::<Vec<_>>() {
        let person = population.get_mut(person_id);
        if !person.is_infected() {
            continue;
        }
        if person.advance_infection(disease) {
            infectors.push(person_id);
        } else {
            trace!("{person_id:?} became immune");
            newly_immune += 1;
        }
    }
    (infectors, newly_immune)
}

/// Rolls one infection attempt from `infector` against `defender`.
fn attempt_infection(
    population: &Population,
    infector: PersonId,
    defender: PersonId,
    rng: &mut SimRng,
) -> bool {
    #[allow(clippy::cast_precision_loss)]
    let attack_roll = rng.draw_int(ROLL_RANGE) as f64;
    #[allow(clippy::cast_precision_loss)]
    let defense_roll = rng.draw_int(ROLL_RANGE) as f64;
    let attack_succeeds = attack_roll < population.get(infector).transmission();
    let defense_succeeds = defense_roll < population.get(defender).protection();
    attack_succeeds && !defense_succeeds
}

/// Lets each of `infectors` attack its susceptible neighbors. Returns the number of new
/// infections.
pub fn transmit(
    infectors: &[PersonId],
    grid: &Grid,
    population: &mut Population,
    disease: &DiseaseProfile,
    rng: &mut SimRng,
) -> usize {
    let mut new_infections = 0;
    for &infector in infectors {
        let Some((row, col)) = population.get(infector).position() else {
            continue;
        };
        for (r, c) in grid.neighbors(row, col) {
            let Some(defender) = grid.occupant(r, c) else {
                continue;
            };
            if !population.get(defender).is_susceptible() {
                continue;
            }
            if attempt_infection(population, infector, defender, rng) {
                trace!("{infector:?} infected {defender:?} at ({r}, {c})");
                population.get_mut(defender).infect(disease);
                population.get_mut(infector).record_secondary_infection();
                new_infections += 1;
            }
        }
    }
    new_infections
}

/// Runs a full transmission step: clock advance, immunity transitions, then transmission.
pub fn run_transmission_step(
    population: &mut Population,
    grid: &Grid,
    disease: &DiseaseProfile,
    rng: &mut SimRng,
) -> DayOutcome {
    let (infectors, newly_immune) = advance_infections(population, disease);
    let new_infections = transmit(&infectors, grid, population, disease, rng);
    DayOutcome {
        infectors: infectors.len(),
        new_infections,
        newly_immune,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::DiseasePreset;
    use crate::person::PATIENT_ZERO;
    use approx::assert_relative_eq;

    /// A 3x3 block around patient zero on a grid that holds nobody else.
    fn seeded(disease: &DiseaseProfile) -> (Grid, Population) {
        let mut grid = Grid::new(5, 5);
        let mut population = Population::new(9 + 1);
        grid.place_patient_zero(&mut population, (2, 2), disease, true)
            .unwrap();
        // Person 9 lands somewhere on the border, out of patient zero's reach.
        let mut rng = SimRng::from_seed_str("border");
        grid.place_rest(&mut population, &mut rng).unwrap();
        (grid, population)
    }

    #[test]
    fn reproduction_estimate_handles_no_infectors() {
        let outcome = DayOutcome::default();
        assert_relative_eq!(outcome.reproduction_estimate(), 0.0);
        let outcome = DayOutcome {
            infectors: 4,
            new_infections: 3,
            newly_immune: 0,
        };
        assert_relative_eq!(outcome.reproduction_estimate(), 0.75);
    }

    #[test]
    fn certain_transmission_infects_every_neighbor() {
        let mut disease = DiseasePreset::Measles.profile();
        disease.transmission_factor = 100.0;
        let (grid, mut population) = seeded(&disease);
        let mut rng = SimRng::from_seed_str("certain");
        let outcome = run_transmission_step(&mut population, &grid, &disease, &mut rng);
        assert_eq!(outcome.infectors, 1);
        assert_eq!(outcome.new_infections, 8);
        assert_relative_eq!(outcome.reproduction_estimate(), 8.0);
        // All eight directions are attacked, west included.
        for index in 1..=8 {
            let contact = population.get(PersonId(index));
            assert!(contact.is_infected());
            assert_eq!(contact.days_infected(), 0);
        }
        assert_eq!(population.get(PATIENT_ZERO).secondary_infections(), 8);
        assert_eq!(population.get(PATIENT_ZERO).days_infected(), 1);
    }

    #[test]
    fn zero_transmission_never_infects() {
        let mut disease = DiseasePreset::Measles.profile();
        disease.transmission_factor = 0.0;
        let (grid, mut population) = seeded(&disease);
        let mut rng = SimRng::from_seed_str("zero");
        for _ in 0..5 {
            let outcome = run_transmission_step(&mut population, &grid, &disease, &mut rng);
            assert_eq!(outcome.new_infections, 0);
        }
    }

    #[test]
    fn full_protection_blocks_every_attempt() {
        let mut disease = DiseasePreset::Measles.profile();
        disease.transmission_factor = 100.0;
        let (grid, mut population) = seeded(&disease);
        for index in 1..10 {
            population.get_mut(PersonId(index)).apply_mask(100.0);
        }
        let mut rng = SimRng::from_seed_str("masked");
        let outcome = run_transmission_step(&mut population, &grid, &disease, &mut rng);
        assert_eq!(outcome.infectors, 1);
        assert_eq!(outcome.new_infections, 0);
    }

    #[test]
    fn roll_bounds_are_exclusive() {
        let disease = DiseasePreset::Measles.profile();
        let (_, mut population) = seeded(&disease);
        let infector = PATIENT_ZERO;
        let defender = PersonId(1);
        for seed in 0..500 {
            let mut rng = SimRng::from_seed_str(&format!("bounds-{seed}"));

            // Transmission 0 never wins the attack roll.
            population.get_mut(infector).apply_mask(100.0);
            assert_relative_eq!(population.get(infector).transmission(), 0.0);
            assert!(!attempt_infection(&population, infector, defender, &mut rng));

            // Transmission 100 against protection 0 always infects.
            population.get_mut(infector).infect(&disease);
            population.get_mut(infector).apply_mask(-100.0);
            population.get_mut(defender).reset();
            assert_relative_eq!(population.get(infector).transmission(), 100.0);
            assert!(attempt_infection(&population, infector, defender, &mut rng));

            // Protection 100 always defends, even against transmission 100.
            population.get_mut(defender).apply_vaccine(100.0);
            assert!(!attempt_infection(&population, infector, defender, &mut rng));
        }
    }

    #[test]
    fn immune_transition_happens_before_transmission() {
        let mut disease = DiseasePreset::Measles.profile();
        disease.transmission_factor = 100.0;
        disease.days_to_immune = 1;
        let (grid, mut population) = seeded(&disease);
        let mut rng = SimRng::from_seed_str("immune");
        let outcome = run_transmission_step(&mut population, &grid, &disease, &mut rng);
        assert_eq!(outcome.infectors, 0);
        assert_eq!(outcome.newly_immune, 1);
        assert_eq!(outcome.new_infections, 0);
        assert!(population.get(PATIENT_ZERO).is_immune());
    }

    #[test]
    fn newly_infected_do_not_transmit_the_same_day() {
        let mut disease = DiseasePreset::Measles.profile();
        disease.transmission_factor = 100.0;
        let (grid, mut population) = seeded(&disease);
        let mut rng = SimRng::from_seed_str("same-day");
        let (infectors, _) = advance_infections(&mut population, &disease);
        assert_eq!(infectors, vec![PATIENT_ZERO]);
        transmit(&infectors, &grid, &mut population, &disease, &mut rng);
        // Person 9 is out of reach of patient zero, and the contacts did not get a turn.
        assert!(population.get(PersonId(9)).is_susceptible());
    }

    #[test]
    fn only_susceptible_neighbors_are_attacked() {
        let mut disease = DiseasePreset::Measles.profile();
        disease.transmission_factor = 100.0;
        let (grid, mut population) = seeded(&disease);
        population.get_mut(PersonId(1)).infect(&disease);
        population.get_mut(PersonId(1)).make_immune();
        let mut rng = SimRng::from_seed_str("skip-immune");
        let new_infections = transmit(&[PATIENT_ZERO], &grid, &mut population, &disease, &mut rng);
        assert_eq!(new_infections, 7);
        assert!(population.get(PersonId(1)).is_immune());
    }
}
