use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of animal kinds that can live in the field.
///
/// Mate-finding compares species by value, so two animals are "the same kind"
/// exactly when their `Species` tags are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Rabbit,
    Fox,
    /// Infected rabbit. Spawned by infection or contagion, never born from a rabbit.
    ZombieRabbit,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Rabbit, Species::Fox, Species::ZombieRabbit];

    pub fn name(&self) -> &'static str {
        match self {
            Species::Rabbit => "rabbit",
            Species::Fox => "fox",
            Species::ZombieRabbit => "zombie rabbit",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Biological sex, fixed for the life of an animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn opposite(&self) -> Sex {
        match self {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        }
    }
}
