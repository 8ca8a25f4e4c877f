use crate::{AgentId, FieldError, RandomSource};
use serde::{Deserialize, Serialize};
use shared::{Location, Sex, Species};
use std::collections::VecDeque;

/// What happens at the edge of the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Cells past the edge simply do not exist
    #[default]
    Bounded,
    /// The grid is a torus: the last row neighbours the first
    Wrapping,
}

/// The field's record of who stands in a cell.
///
/// Species and sex never change after an animal is created, so the field can
/// answer mate-finding and predation queries without going back to the
/// population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub id: AgentId,
    pub species: Species,
    pub sex: Sex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Occupied(Occupant),
    /// Claimed by an animal born this step. Not free, but not yet visible
    /// to neighbours either.
    Reserved(Occupant),
}

/// Rectangular grid holding at most one animal per cell
#[derive(Debug, Clone)]
pub struct Field {
    pub depth: usize,
    pub width: usize,
    boundary: Boundary,
    cells: Vec<Cell>,
}

impl Field {
    /// Create an empty field with `depth` rows and `width` columns
    pub fn new(depth: usize, width: usize, boundary: Boundary) -> Self {
        Field {
            depth,
            width,
            boundary,
            cells: vec![Cell::Empty; depth * width],
        }
    }

    fn index(&self, location: Location) -> Option<usize> {
        if self.is_valid_location(location) {
            Some(location.row * self.width + location.col)
        } else {
            None
        }
    }

    fn bounds_error(&self, location: Location) -> FieldError {
        FieldError::OutOfBounds {
            location,
            depth: self.depth,
            width: self.width,
        }
    }

    /// Check if location is inside the grid
    pub fn is_valid_location(&self, location: Location) -> bool {
        location.row < self.depth && location.col < self.width
    }

    /// The animal standing at `location`. Animals born this step are not reported.
    pub fn get(&self, location: Location) -> Option<Occupant> {
        match self.index(location).map(|i| self.cells[i]) {
            Some(Cell::Occupied(occupant)) => Some(occupant),
            _ => None,
        }
    }

    /// True if the cell exists and nobody occupies or has reserved it
    pub fn is_free(&self, location: Location) -> bool {
        matches!(self.index(location).map(|i| self.cells[i]), Some(Cell::Empty))
    }

    fn write(&mut self, location: Location, cell: Cell) -> Result<(), FieldError> {
        let idx = self.index(location).ok_or_else(|| self.bounds_error(location))?;
        if self.cells[idx] != Cell::Empty {
            return Err(FieldError::Occupied { location });
        }
        self.cells[idx] = cell;
        Ok(())
    }

    /// Register `occupant` at `location`. The cell must have been vacated first.
    pub fn place(&mut self, occupant: Occupant, location: Location) -> Result<(), FieldError> {
        self.write(location, Cell::Occupied(occupant))
    }

    /// Claim `location` for a newborn. The claim keeps the cell out of every
    /// free-location query until the field is rebuilt for the next generation.
    pub fn reserve(&mut self, occupant: Occupant, location: Location) -> Result<(), FieldError> {
        self.write(location, Cell::Reserved(occupant))
    }

    /// Remove whatever is at `location`. Out-of-bounds locations are ignored.
    pub fn clear(&mut self, location: Location) {
        if let Some(idx) = self.index(location) {
            self.cells[idx] = Cell::Empty;
        }
    }

    /// Clear `location` only if it currently holds agent `id`
    pub fn release(&mut self, location: Location, id: AgentId) {
        if let Some(idx) = self.index(location) {
            match self.cells[idx] {
                Cell::Occupied(o) | Cell::Reserved(o) if o.id == id => {
                    self.cells[idx] = Cell::Empty;
                }
                _ => {}
            }
        }
    }

    /// Empty every cell
    pub fn clear_all(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Number of cells that are occupied or reserved
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c != Cell::Empty).count()
    }

    /// The neighbourhood of `location` in scan order, the cell itself excluded
    fn neighbours(&self, location: Location) -> Vec<Location> {
        let mut out = Vec::with_capacity(8);
        if !self.is_valid_location(location) {
            return out;
        }

        let (depth, width) = (self.depth as isize, self.width as isize);
        for dr in -1isize..=1 {
            for dc in -1isize..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let mut row = location.row as isize + dr;
                let mut col = location.col as isize + dc;
                match self.boundary {
                    Boundary::Bounded => {
                        if row < 0 || row >= depth || col < 0 || col >= width {
                            continue;
                        }
                    }
                    Boundary::Wrapping => {
                        row = row.rem_euclid(depth);
                        col = col.rem_euclid(width);
                    }
                }

                let candidate = Location::new(row as usize, col as usize);
                // Tiny wrapping grids fold several offsets onto one cell
                if candidate != location && !out.contains(&candidate) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// Every in-grid neighbour of `location`, shuffled
    pub fn adjacent_locations<R: RandomSource>(&self, location: Location, rng: &mut R) -> Vec<Location> {
        let mut locations = self.neighbours(location);
        rng.shuffle(&mut locations);
        locations
    }

    /// Every free neighbour of `location`, shuffled. Consume from the front
    /// so that repeated births never land on the same cell.
    pub fn free_adjacent_locations<R: RandomSource>(
        &self,
        location: Location,
        rng: &mut R,
    ) -> VecDeque<Location> {
        self.adjacent_locations(location, rng)
            .into_iter()
            .filter(|loc| self.is_free(*loc))
            .collect()
    }

    /// One randomly chosen free neighbour, or `None` when boxed in
    pub fn free_adjacent_location<R: RandomSource>(
        &self,
        location: Location,
        rng: &mut R,
    ) -> Option<Location> {
        self.free_adjacent_locations(location, rng).pop_front()
    }

    /// Live animals in the neighbourhood of `location`
    pub fn adjacent_animals(&self, location: Location) -> Vec<(Location, Occupant)> {
        self.neighbours(location)
            .into_iter()
            .filter_map(|loc| self.get(loc).map(|occupant| (loc, occupant)))
            .collect()
    }
}
