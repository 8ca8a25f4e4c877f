//! Fox and rabbit population engine.
//!
//! A bounded grid ([`Field`]) holds at most one animal per cell. Every step
//! the [`Simulator`] gives each living animal a turn in which it ages, faces
//! its species' hazard, may breed with a neighbouring partner, and moves to a
//! free neighbouring cell or dies of overcrowding. The result of a step is a
//! [`shared::PopulationSnapshot`] for whatever draws the field.

pub mod animal;
pub mod error;
pub mod field;
pub mod fox;
pub mod rabbit;
pub mod random;
pub mod simulator;
pub mod zombie;

pub use animal::{AgentId, Animal, LifeTraits, StepContext};
pub use error::{FieldError, SimError, SimResult};
pub use field::{Boundary, Field, Occupant};
pub use random::{FixedRandom, RandomSource, StdRandom};
pub use simulator::{PopulationSpec, SimConfig, Simulator};

use shared::PopulationSnapshot;

/// Seed a field from `config` and run it for up to `steps` generations
pub fn run_simulation(config: SimConfig, steps: u32, seed: u64) -> SimResult<PopulationSnapshot> {
    let mut sim = Simulator::seed(config, StdRandom::seeded(seed))?;
    sim.simulate(steps)
}
