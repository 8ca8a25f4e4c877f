//! Zombie rabbits live like rabbits but spread their infection: now and then
//! one bites a neighbouring rabbit, which dies and rises as a zombie.

use crate::{Animal, LifeTraits, RandomSource, SimResult, StepContext};
use shared::{Location, Species};

pub const TRAITS: LifeTraits = LifeTraits {
    breeding_age: 8,
    max_age: 30,
    breeding_probability: 0.04,
    max_litter_size: 2,
};

/// Chance per step that a zombie bites a neighbouring rabbit
pub const CONTAGION_PROBABILITY: f64 = 0.15;

pub(crate) fn act<R: RandomSource>(zombie: &mut Animal, ctx: &mut StepContext<'_, R>) -> SimResult<()> {
    zombie.increment_age(ctx.field);
    if !zombie.is_alive() {
        return Ok(());
    }

    if ctx.rng.next_f64() < CONTAGION_PROBABILITY {
        bite(zombie, ctx)?;
    }

    zombie.give_birth(ctx)?;
    zombie.move_or_die(ctx, None)
}

/// Infect one random neighbouring rabbit, if there is one
fn bite<R: RandomSource>(zombie: &Animal, ctx: &mut StepContext<'_, R>) -> SimResult<Option<Location>> {
    let rabbits: Vec<_> = ctx
        .field
        .adjacent_animals(zombie.location())
        .into_iter()
        .filter(|(_, other)| other.species == Species::Rabbit)
        .collect();
    let Some(pick) = ctx.rng.choose_index(rabbits.len()) else {
        return Ok(None);
    };

    let (location, victim) = rabbits[pick];
    ctx.kill(victim.id, location)?;
    let spawned = ctx.spawn_infected(location)?;
    tracing::trace!("zombie {} bit rabbit {} at {}, spawning {}", zombie.id(), victim.id, location, spawned);
    Ok(Some(location))
}
