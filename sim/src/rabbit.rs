//! Rabbits age, breed, wander, and now and then fall ill and rise again as
//! zombie rabbits.

use crate::{Animal, LifeTraits, RandomSource, SimResult, StepContext};

pub const TRAITS: LifeTraits = LifeTraits {
    breeding_age: 5,
    max_age: 40,
    breeding_probability: 0.10,
    max_litter_size: 4,
};

/// The infection draw is uniform over `0..INFECTION_DRAW_RANGE`
pub const INFECTION_DRAW_RANGE: u32 = 10_001;
/// Drawing this value infects the rabbit
pub const INFECTION_SENTINEL: u32 = 1;

pub(crate) fn act<R: RandomSource>(rabbit: &mut Animal, ctx: &mut StepContext<'_, R>) -> SimResult<()> {
    rabbit.increment_age(ctx.field);
    if !rabbit.is_alive() {
        return Ok(());
    }

    if ctx.rng.next_below(INFECTION_DRAW_RANGE) == INFECTION_SENTINEL {
        let location = rabbit.location();
        rabbit.set_dead(ctx.field);
        let zombie = ctx.spawn_infected(location)?;
        tracing::trace!("rabbit {} infected at {}, became {}", rabbit.id(), location, zombie);
        return Ok(());
    }

    rabbit.give_birth(ctx)?;
    rabbit.move_or_die(ctx, None)
}
