use crate::AgentId;
use shared::Location;
use thiserror::Error;

/// Violations of the field's one-animal-per-cell bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("location {location} is outside the {depth}x{width} field")]
    OutOfBounds {
        location: Location,
        depth: usize,
        width: usize,
    },

    #[error("location {location} is already occupied")]
    Occupied { location: Location },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("field error: {0}")]
    Field(#[from] FieldError),

    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("agent {0} not found")]
    UnknownAgent(AgentId),
}

pub type SimResult<T> = Result<T, SimError>;
