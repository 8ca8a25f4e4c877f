use crate::{fox, rabbit, zombie, Field, Occupant, RandomSource, SimError, SimResult};
use shared::{AnimalView, Location, Sex, Species};
use std::fmt;

/// Index of an animal in the simulator's population.
///
/// Ids are reassigned when the population is compacted at the end of every
/// step, so they are only meaningful within a single generation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct AgentId(pub u32);

impl AgentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentId({})", self.0)
    }
}

/// Age and breeding parameters of a species
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifeTraits {
    /// Age at which an animal can start to breed
    pub breeding_age: u32,
    /// An animal dies once its age exceeds this
    pub max_age: u32,
    /// Chance per step of producing a litter, once of breeding age
    pub breeding_probability: f64,
    pub max_litter_size: u32,
}

impl LifeTraits {
    pub fn of(species: Species) -> &'static LifeTraits {
        match species {
            Species::Rabbit => &rabbit::TRAITS,
            Species::Fox => &fox::TRAITS,
            Species::ZombieRabbit => &zombie::TRAITS,
        }
    }
}

/// An animal in the field.
///
/// The state every species shares lives here; what a species does with its
/// turn lives in the `rabbit`, `fox` and `zombie` modules.
#[derive(Debug, Clone)]
pub struct Animal {
    pub(crate) id: AgentId,
    pub(crate) species: Species,
    pub(crate) sex: Sex,
    pub(crate) age: u32,
    pub(crate) alive: bool,
    pub(crate) location: Location,
    /// Steps left before starvation. Only foxes go hungry.
    pub(crate) food_level: u32,
}

impl Animal {
    /// Create an animal with a random sex, either newborn or with a random age.
    pub fn new<R: RandomSource>(
        id: AgentId,
        species: Species,
        random_age: bool,
        location: Location,
        rng: &mut R,
    ) -> Self {
        let sex = if rng.next_below(2) == 0 {
            Sex::Male
        } else {
            Sex::Female
        };
        let age = if random_age {
            rng.next_below(LifeTraits::of(species).max_age)
        } else {
            0
        };
        let food_level = match species {
            Species::Fox if random_age => rng.next_below(fox::RABBIT_FOOD_VALUE),
            Species::Fox => fox::RABBIT_FOOD_VALUE,
            _ => 0,
        };

        Self {
            id,
            species,
            sex,
            age,
            alive: true,
            location,
            food_level,
        }
    }

    /// Create an animal with fully specified state. Foxes start well fed.
    pub fn with_state(id: AgentId, species: Species, sex: Sex, age: u32, location: Location) -> Self {
        Self {
            id,
            species,
            sex,
            age,
            alive: true,
            location,
            food_level: match species {
                Species::Fox => fox::RABBIT_FOOD_VALUE,
                _ => 0,
            },
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn food_level(&self) -> u32 {
        self.food_level
    }

    pub fn traits(&self) -> &'static LifeTraits {
        LifeTraits::of(self.species)
    }

    /// How the field records this animal
    pub fn occupant(&self) -> Occupant {
        Occupant {
            id: self.id,
            species: self.species,
            sex: self.sex,
        }
    }

    pub fn view(&self) -> AnimalView {
        AnimalView {
            species: self.species,
            location: self.location,
        }
    }

    /// Take one turn. Dead animals do nothing.
    pub fn act<R: RandomSource>(&mut self, ctx: &mut StepContext<'_, R>) -> SimResult<()> {
        if !self.alive {
            return Ok(());
        }
        match self.species {
            Species::Rabbit => rabbit::act(self, ctx),
            Species::Fox => fox::act(self, ctx),
            Species::ZombieRabbit => zombie::act(self, ctx),
        }
    }

    /// Grow one step older, dying past the species' maximum age
    pub(crate) fn increment_age(&mut self, field: &mut Field) {
        self.age = self.age.saturating_add(1);
        if self.age > self.traits().max_age {
            tracing::trace!("{} {} died of old age at {}", self.species, self.id, self.location);
            self.set_dead(field);
        }
    }

    /// Die and give up the cell
    pub(crate) fn set_dead(&mut self, field: &mut Field) {
        self.alive = false;
        field.release(self.location, self.id);
    }

    /// Record a death whose cell has already been cleared by someone else
    pub(crate) fn mark_dead(&mut self) {
        self.alive = false;
    }

    /// Move to `to`, keeping the field in step
    pub(crate) fn relocate(&mut self, field: &mut Field, to: Location) -> SimResult<()> {
        field.release(self.location, self.id);
        field.place(self.occupant(), to)?;
        self.location = to;
        Ok(())
    }

    pub fn can_breed(&self) -> bool {
        self.age >= self.traits().breeding_age
    }

    /// Number of young this animal would produce this step, ignoring whether
    /// it has a partner. Consumes random draws only once of breeding age.
    pub fn breed<R: RandomSource>(&self, rng: &mut R) -> u32 {
        let traits = self.traits();
        if self.can_breed() && rng.next_f64() <= traits.breeding_probability {
            rng.next_below(traits.max_litter_size) + 1
        } else {
            0
        }
    }

    /// True if a live neighbour is of the same species and the opposite sex
    pub fn mate(&self, field: &Field) -> bool {
        field
            .adjacent_animals(self.location)
            .iter()
            .any(|(_, other)| other.species == self.species && other.sex == self.sex.opposite())
    }

    /// Produce young into free neighbouring cells. Returns the number born.
    ///
    /// The litter size is drawn before looking for a partner, and a missing
    /// partner discards it.
    pub(crate) fn give_birth<R: RandomSource>(&self, ctx: &mut StepContext<'_, R>) -> SimResult<u32> {
        let mut free = ctx.field.free_adjacent_locations(self.location, ctx.rng);
        let births = self.breed(ctx.rng);
        if births == 0 || !self.mate(ctx.field) {
            return Ok(0);
        }

        let mut born = 0;
        while born < births {
            let Some(location) = free.pop_front() else {
                break;
            };
            ctx.spawn_newborn(self.species, location)?;
            born += 1;
        }
        Ok(born)
    }

    /// Move to `preferred` if given, otherwise to a random free neighbour.
    /// With nowhere to go the animal dies of overcrowding.
    pub(crate) fn move_or_die<R: RandomSource>(
        &mut self,
        ctx: &mut StepContext<'_, R>,
        preferred: Option<Location>,
    ) -> SimResult<()> {
        let target = match preferred {
            Some(location) => Some(location),
            None => ctx.field.free_adjacent_location(self.location, ctx.rng),
        };
        match target {
            Some(location) => self.relocate(ctx.field, location),
            None => {
                tracing::trace!("{} {} died of overcrowding at {}", self.species, self.id, self.location);
                self.set_dead(ctx.field);
                Ok(())
            }
        }
    }
}

/// Everything an animal may touch during its turn.
///
/// Animals created during the step are buffered here rather than joining the
/// population straight away, so they cannot act until the next step.
pub struct StepContext<'a, R> {
    pub(crate) field: &'a mut Field,
    pub(crate) rng: &'a mut R,
    first_spawn_id: u32,
    spawned: Vec<Animal>,
    casualties: Vec<AgentId>,
}

impl<'a, R: RandomSource> StepContext<'a, R> {
    /// `first_spawn_id` must be the current population size so that spawned
    /// ids never collide with existing ones.
    pub fn new(field: &'a mut Field, rng: &'a mut R, first_spawn_id: u32) -> Self {
        Self {
            field,
            rng,
            first_spawn_id,
            spawned: Vec::new(),
            casualties: Vec::new(),
        }
    }

    fn next_id(&self) -> AgentId {
        AgentId(self.first_spawn_id + self.spawned.len() as u32)
    }

    /// Create a newborn on a reserved cell
    pub(crate) fn spawn_newborn(&mut self, species: Species, location: Location) -> SimResult<AgentId> {
        let id = self.next_id();
        let young = Animal::new(id, species, false, location, self.rng);
        self.field.reserve(young.occupant(), location)?;
        self.spawned.push(young);
        Ok(id)
    }

    /// Put a freshly infected zombie rabbit, with a random age, on a vacated cell
    pub(crate) fn spawn_infected(&mut self, location: Location) -> SimResult<AgentId> {
        let id = self.next_id();
        let zombie = Animal::new(id, Species::ZombieRabbit, true, location, self.rng);
        self.field.place(zombie.occupant(), location)?;
        self.spawned.push(zombie);
        Ok(id)
    }

    /// Kill another animal standing at `location`
    pub(crate) fn kill(&mut self, id: AgentId, location: Location) -> SimResult<()> {
        self.field.release(location, id);
        if id.0 < self.first_spawn_id {
            self.casualties.push(id);
            return Ok(());
        }
        let index = (id.0 - self.first_spawn_id) as usize;
        match self.spawned.get_mut(index) {
            Some(animal) => {
                animal.mark_dead();
                Ok(())
            }
            None => Err(SimError::UnknownAgent(id)),
        }
    }

    /// Animals created so far this step
    pub fn spawned(&self) -> &[Animal] {
        &self.spawned
    }

    /// Members of the existing population killed since the last call
    pub fn take_casualties(&mut self) -> Vec<AgentId> {
        std::mem::take(&mut self.casualties)
    }

    pub fn into_spawned(self) -> Vec<Animal> {
        self.spawned
    }
}
