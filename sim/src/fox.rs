//! Foxes hunt rabbits in neighbouring cells and starve if they go too long
//! without a meal.

use crate::{Animal, LifeTraits, RandomSource, SimResult, StepContext};
use shared::{Location, Species};

pub const TRAITS: LifeTraits = LifeTraits {
    breeding_age: 15,
    max_age: 150,
    breeding_probability: 0.08,
    max_litter_size: 2,
};

/// Steps a fox can go without eating after a rabbit
pub const RABBIT_FOOD_VALUE: u32 = 9;

pub(crate) fn act<R: RandomSource>(fox: &mut Animal, ctx: &mut StepContext<'_, R>) -> SimResult<()> {
    fox.increment_age(ctx.field);
    if fox.is_alive() {
        increment_hunger(fox, ctx);
    }
    if !fox.is_alive() {
        return Ok(());
    }

    fox.give_birth(ctx)?;
    let meal = find_food(fox, ctx)?;
    fox.move_or_die(ctx, meal)
}

fn increment_hunger<R: RandomSource>(fox: &mut Animal, ctx: &mut StepContext<'_, R>) {
    fox.food_level = fox.food_level.saturating_sub(1);
    if fox.food_level == 0 {
        tracing::trace!("fox {} starved at {}", fox.id(), fox.location());
        fox.set_dead(ctx.field);
    }
}

/// Eat the first live rabbit found next to the fox. Returns the cell it
/// stood on, which is now empty.
fn find_food<R: RandomSource>(fox: &mut Animal, ctx: &mut StepContext<'_, R>) -> SimResult<Option<Location>> {
    for location in ctx.field.adjacent_locations(fox.location(), ctx.rng) {
        let Some(prey) = ctx.field.get(location) else {
            continue;
        };
        if prey.species == Species::Rabbit {
            ctx.kill(prey.id, location)?;
            fox.food_level = RABBIT_FOOD_VALUE;
            tracing::trace!("fox {} ate rabbit {} at {}", fox.id(), prey.id, location);
            return Ok(Some(location));
        }
    }
    Ok(None)
}
