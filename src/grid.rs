//! The 2D placement grid.
//!
//! Each cell holds at most one person. Patient zero is placed at a configured coordinate
//! with persons 1 through 8 around it; everyone else is scattered uniformly at random over
//! the empty cells.

use crate::disease::DiseaseProfile;
use crate::error::OutbreakError;
use crate::log::{debug, trace};
use crate::person::{PersonId, PATIENT_ZERO};
use crate::population::Population;
use crate::random::{SimRng, MAX_DRAWS_PER_SLOT};

/// Row/column offsets of the Moore neighborhood in visitation order:
/// NW, N, NE, W, E, SW, S, SE.
pub const MOORE_NEIGHBORHOOD: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Option<PersonId>>,
}

impl Grid {
    pub fn new(height: usize, width: usize) -> Self {
        Grid {
            height,
            width,
            cells: vec![None; height * width],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn capacity(&self) -> usize {
        self.height * self.width
    }

    /// Clears every cell and changes the dimensions.
    pub fn reset(&mut self, height: usize, width: usize) {
        self.height = height;
        self.width = width;
        self.cells.clear();
        self.cells.resize(height * width, None);
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    pub fn occupant(&self, row: usize, col: usize) -> Option<PersonId> {
        if self.in_bounds(row, col) {
            self.cells[row * self.width + col]
        } else {
            None
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Row-major iteration over every cell.
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), Option<PersonId>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, cell)| ((index / self.width, index % self.width), *cell))
    }

    /// The cell at `offset` from `(row, col)`, if it lies on the grid.
    pub fn offset(&self, row: usize, col: usize, offset: (isize, isize)) -> Option<(usize, usize)> {
        let row = row.checked_add_signed(offset.0)?;
        let col = col.checked_add_signed(offset.1)?;
        self.in_bounds(row, col).then_some((row, col))
    }

    /// In-bounds Moore neighbors of `(row, col)` in visitation order.
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        MOORE_NEIGHBORHOOD
            .iter()
            .filter_map(move |&offset| self.offset(row, col, offset))
    }

    fn occupy(&mut self, population: &mut Population, person_id: PersonId, row: usize, col: usize) {
        debug_assert!(self.occupant(row, col).is_none(), "cell ({row}, {col}) is taken");
        self.cells[row * self.width + col] = Some(person_id);
        population.get_mut(person_id).set_position(row, col);
    }

    /// Places patient zero at `position`, infecting them if `infect` is set, and persons 1
    /// through 8 in its Moore neighborhood. Neighbor cells that fall off the grid are left
    /// for [`Grid::place_rest`] to fill with the corresponding person.
    ///
    /// # Errors
    ///
    /// Returns an error if `position` is off the grid or the population is too small to
    /// fill the neighborhood.
    pub fn place_patient_zero(
        &mut self,
        population: &mut Population,
        position: (usize, usize),
        disease: &DiseaseProfile,
        infect: bool,
    ) -> Result<(), OutbreakError> {
        let (row, col) = position;
        if !self.in_bounds(row, col) {
            return Err(OutbreakError::InvalidConfig(format!(
                "patient zero position ({row}, {col}) is outside a {}x{} grid",
                self.height, self.width
            )));
        }
        if population.len() <= MOORE_NEIGHBORHOOD.len() {
            return Err(OutbreakError::InvalidConfig(format!(
                "a population of {} cannot surround patient zero",
                population.len()
            )));
        }

        self.occupy(population, PATIENT_ZERO, row, col);
        if infect {
            population.get_mut(PATIENT_ZERO).infect(disease);
        }

        for (index, &offset) in MOORE_NEIGHBORHOOD.iter().enumerate() {
            let contact = PersonId(index + 1);
            match self.offset(row, col, offset) {
                Some((r, c)) => self.occupy(population, contact, r, c),
                None => trace!("contact {contact:?} falls off the grid; placing at random"),
            }
        }
        debug!("placed patient zero at ({row}, {col})");
        Ok(())
    }

    /// Places every person without a position at a uniformly random empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`OutbreakError::GridCapacity`] if there are more people than cells.
    pub fn place_rest(
        &mut self,
        population: &mut Population,
        rng: &mut SimRng,
    ) -> Result<(), OutbreakError> {
        if population.len() > self.capacity() {
            return Err(OutbreakError::GridCapacity {
                population: population.len(),
                capacity: self.capacity(),
            });
        }

        let max_attempts = MAX_DRAWS_PER_SLOT * self.capacity();
        let mut attempts = 0;
        for person_id in population.person_ids().collect::<Vec<_>>() {
            if population.get(person_id).position().is_some() {
                continue;
            }
            loop {
                if attempts == max_attempts {
                    return Err(OutbreakError::SamplingExhausted { attempts });
                }
                attempts += 1;
                let row = rng.draw_int(self.height);
                let col = rng.draw_int(self.width);
                if self.occupant(row, col).is_none() {
                    self.occupy(population, person_id, row, col);
                    break;
                }
            }
        }
        debug!(
            "placed {} people on a {}x{} grid",
            self.occupied_count(),
            self.height,
            self.width
        );
        Ok(())
    }
}
