//! The population and intervention assignment.
//!
//! Interventions are handed out by rejection sampling: draw a uniform index, skip it if it was
//! already chosen (or is not eligible), repeat until enough distinct people are selected. The
//! loop is bounded; asking for more people than are eligible fails up front.

use serde::Serialize;

use crate::error::OutbreakError;
use crate::hashing::HashSet;
use crate::log::{debug, trace};
use crate::person::{InfectionStatus, Person, PersonId, PATIENT_ZERO};
use crate::random::{SimRng, MAX_DRAWS_PER_SLOT};

/// Number of people in each infection state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub susceptible: usize,
    pub infected: usize,
    pub immune: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.immune
    }
}

#[derive(Clone, Debug, Default)]
pub struct Population {
    people: Vec<Person>,
}

impl Population {
    pub fn new(size: usize) -> Self {
        Population {
            people: vec![Person::default(); size],
        }
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn get(&self, person_id: PersonId) -> &Person {
        &self.people[person_id.0]
    }

    pub fn get_mut(&mut self, person_id: PersonId) -> &mut Person {
        &mut self.people[person_id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PersonId, &Person)> {
        self.people
            .iter()
            .enumerate()
            .map(|(index, person)| (PersonId(index), person))
    }

    pub fn person_ids(&self) -> impl Iterator<Item = PersonId> {
        (0..self.people.len()).map(PersonId)
    }

    /// Returns every person to the default state. People are reused when the size is
    /// unchanged.
    pub fn reset(&mut self, size: usize) {
        self.people.iter_mut().for_each(Person::reset);
        self.people.resize_with(size, Person::default);
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for person in &self.people {
            match person.status() {
                InfectionStatus::Susceptible => counts.susceptible += 1,
                InfectionStatus::Infected => counts.infected += 1,
                InfectionStatus::Immune => counts.immune += 1,
            }
        }
        counts
    }

    /// Gives masks to `count` distinct people chosen uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns an error if `count` exceeds the population size.
    pub fn assign_masks(
        &mut self,
        rng: &mut SimRng,
        count: usize,
        mask_protection: f64,
    ) -> Result<Vec<PersonId>, OutbreakError> {
        let selected = select_distinct(rng, self.len(), count, false)?;
        for &person_id in &selected {
            self.get_mut(person_id).apply_mask(mask_protection);
        }
        debug!("assigned {} masks", selected.len());
        Ok(selected)
    }

    /// Vaccinates `count` distinct people chosen uniformly at random. Unless everyone is
    /// being vaccinated, patient zero is not eligible.
    ///
    /// # Errors
    ///
    /// Returns an error if `count` exceeds the number of eligible people.
    pub fn assign_vaccines(
        &mut self,
        rng: &mut SimRng,
        count: usize,
        vaccine_efficacy: f64,
    ) -> Result<Vec<PersonId>, OutbreakError> {
        let exclude_patient_zero = count < self.len();
        let selected = select_distinct(rng, self.len(), count, exclude_patient_zero)?;
        for &person_id in &selected {
            self.get_mut(person_id).apply_vaccine(vaccine_efficacy);
        }
        debug!("assigned {} vaccines", selected.len());
        Ok(selected)
    }
}

/// Selects `count` distinct indexes from `0..pool_size` in draw order.
fn select_distinct(
    rng: &mut SimRng,
    pool_size: usize,
    count: usize,
    exclude_patient_zero: bool,
) -> Result<Vec<PersonId>, OutbreakError> {
    let eligible = if exclude_patient_zero {
        pool_size.saturating_sub(1)
    } else {
        pool_size
    };
    if count > eligible {
        return Err(OutbreakError::SelectionExceedsPool {
            requested: count,
            eligible,
        });
    }

    let max_attempts = MAX_DRAWS_PER_SLOT * pool_size.max(1);
    let mut seen: HashSet<PersonId> = HashSet::default();
    let mut selected = Vec::with_capacity(count);
    let mut attempts = 0;
    while selected.len() < count {
        if attempts == max_attempts {
            return Err(OutbreakError::SamplingExhausted { attempts });
        }
        attempts += 1;
        let candidate = PersonId(rng.draw_int(pool_size));
        if exclude_patient_zero && candidate == PATIENT_ZERO {
            continue;
        }
        if seen.insert(candidate) {
            selected.push(candidate);
        }
    }
    trace!("selected {count} of {pool_size} after {attempts} draws");
    Ok(selected)
}
