use crate::{Location, Species, SNAPSHOT_VERSION};
use serde::{Deserialize, Serialize};

/// Core -> View: one live animal, as much as a renderer needs to draw it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalView {
    pub species: Species,
    pub location: Location,
}

/// Number of live animals of each species
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub rabbits: usize,
    pub foxes: usize,
    pub zombie_rabbits: usize,
}

impl PopulationCounts {
    pub fn get(&self, species: Species) -> usize {
        match species {
            Species::Rabbit => self.rabbits,
            Species::Fox => self.foxes,
            Species::ZombieRabbit => self.zombie_rabbits,
        }
    }

    pub fn increment(&mut self, species: Species) {
        match species {
            Species::Rabbit => self.rabbits += 1,
            Species::Fox => self.foxes += 1,
            Species::ZombieRabbit => self.zombie_rabbits += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.rabbits + self.foxes + self.zombie_rabbits
    }

    /// A population stays interesting while at least two species are alive.
    pub fn is_viable(&self) -> bool {
        Species::ALL.iter().filter(|s| self.get(**s) > 0).count() > 1
    }
}

impl FromIterator<Species> for PopulationCounts {
    fn from_iter<I: IntoIterator<Item = Species>>(iter: I) -> Self {
        let mut counts = PopulationCounts::default();
        for species in iter {
            counts.increment(species);
        }
        counts
    }
}

/// Core -> View: read-only state of the field after a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Number of generations completed when the snapshot was taken
    pub step: u32,

    /// Field dimensions
    pub depth: usize,
    pub width: usize,

    /// Every live animal, in population order
    pub animals: Vec<AnimalView>,

    /// Live animals per species
    pub counts: PopulationCounts,
}

impl PopulationSnapshot {
    pub fn new(step: u32, depth: usize, width: usize, animals: Vec<AnimalView>) -> Self {
        let counts = animals.iter().map(|a| a.species).collect();
        Self {
            version: SNAPSHOT_VERSION,
            step,
            depth,
            width,
            animals,
            counts,
        }
    }

    /// The species at `location`, if an animal is standing there
    pub fn species_at(&self, location: Location) -> Option<Species> {
        self.animals
            .iter()
            .find(|a| a.location == location)
            .map(|a| a.species)
    }
}
