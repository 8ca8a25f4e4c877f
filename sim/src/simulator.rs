use crate::{AgentId, Animal, Boundary, Field, RandomSource, SimError, SimResult, StdRandom, StepContext};
use serde::{Deserialize, Serialize};
use shared::{Location, PopulationCounts, PopulationSnapshot, Sex, Species};

/// Chance that a given cell starts out holding each species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationSpec {
    pub fox_probability: f64,
    pub rabbit_probability: f64,
    pub zombie_probability: f64,
}

impl Default for PopulationSpec {
    fn default() -> Self {
        Self {
            fox_probability: 0.02,
            rabbit_probability: 0.08,
            zombie_probability: 0.0,
        }
    }
}

impl PopulationSpec {
    /// Map a uniform draw in `[0, 1)` to the species seeded in a cell
    fn pick(&self, draw: f64) -> Option<Species> {
        let mut threshold = 0.0;
        for (species, probability) in [
            (Species::Fox, self.fox_probability),
            (Species::Rabbit, self.rabbit_probability),
            (Species::ZombieRabbit, self.zombie_probability),
        ] {
            threshold += probability;
            if draw < threshold {
                return Some(species);
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub depth: usize,
    pub width: usize,
    pub boundary: Boundary,
    pub population: PopulationSpec,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            depth: 80,
            width: 120,
            boundary: Boundary::Bounded,
            population: PopulationSpec::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.depth == 0 || self.width == 0 {
            return Err(SimError::Config(format!(
                "field dimensions must be positive, got {}x{}",
                self.depth, self.width
            )));
        }
        // Every cell must be addressable by an agent id
        let cells = self.depth.checked_mul(self.width).filter(|&n| n <= u32::MAX as usize);
        if cells.is_none() {
            return Err(SimError::Config(format!(
                "field of {}x{} cells is too large",
                self.depth, self.width
            )));
        }

        let spec = &self.population;
        let probabilities = [
            ("fox_probability", spec.fox_probability),
            ("rabbit_probability", spec.rabbit_probability),
            ("zombie_probability", spec.zombie_probability),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::Config(format!("{name} must be within [0, 1], got {p}")));
            }
        }
        let total: f64 = probabilities.iter().map(|(_, p)| p).sum();
        if total > 1.0 {
            return Err(SimError::Config(format!(
                "seeding probabilities sum to {total}, which exceeds 1"
            )));
        }
        Ok(())
    }
}

/// Owns the field and the population and advances them one generation at a time.
///
/// Each step runs every live animal in population order against the live
/// field, so an animal sees the moves and deaths of those who went before it.
/// Animals created during the step join at the end, after which the field is
/// rebuilt from the survivors.
pub struct Simulator<R: RandomSource = StdRandom> {
    pub config: SimConfig,
    field: Field,
    animals: Vec<Animal>,
    step: u32,
    rng: R,
}

impl<R: RandomSource> Simulator<R> {
    /// Create a simulator with an empty field
    pub fn empty(config: SimConfig, rng: R) -> SimResult<Self> {
        config.validate()?;
        let field = Field::new(config.depth, config.width, config.boundary);
        Ok(Self {
            config,
            field,
            animals: Vec::new(),
            step: 0,
            rng,
        })
    }

    /// Create a simulator and populate its field from `config.population`
    pub fn seed(config: SimConfig, rng: R) -> SimResult<Self> {
        let mut sim = Self::empty(config, rng)?;
        sim.populate()?;
        Ok(sim)
    }

    /// Scatter animals of random age over the field, one draw per cell
    fn populate(&mut self) -> SimResult<()> {
        for row in 0..self.field.depth {
            for col in 0..self.field.width {
                let draw = self.rng.next_f64();
                let Some(species) = self.config.population.pick(draw) else {
                    continue;
                };
                let id = AgentId(self.animals.len() as u32);
                let location = Location::new(row, col);
                let animal = Animal::new(id, species, true, location, &mut self.rng);
                self.field.place(animal.occupant(), location)?;
                self.animals.push(animal);
            }
        }

        let counts = self.counts();
        tracing::info!(
            "Seeded {}x{} field: {} rabbits, {} foxes, {} zombie rabbits",
            self.field.depth,
            self.field.width,
            counts.rabbits,
            counts.foxes,
            counts.zombie_rabbits
        );
        Ok(())
    }

    /// Put an animal with the given state on a free cell
    pub fn spawn(&mut self, species: Species, sex: Sex, age: u32, location: Location) -> SimResult<AgentId> {
        let id = AgentId(self.animals.len() as u32);
        let animal = Animal::with_state(id, species, sex, age, location);
        self.field.place(animal.occupant(), location)?;
        self.animals.push(animal);
        Ok(id)
    }

    /// Advance the simulation by one generation
    pub fn step(&mut self) -> SimResult<PopulationSnapshot> {
        let population = self.animals.len();
        let mut ctx = StepContext::new(&mut self.field, &mut self.rng, population as u32);

        for index in 0..population {
            self.animals[index].act(&mut ctx)?;
            for victim in ctx.take_casualties() {
                self.animals
                    .get_mut(victim.index())
                    .ok_or(SimError::UnknownAgent(victim))?
                    .mark_dead();
            }
        }

        let spawned = ctx.into_spawned();
        let born = spawned.len();
        self.animals.retain(|a| a.is_alive());
        self.animals.extend(spawned.into_iter().filter(|a| a.is_alive()));
        self.rebuild_field()?;
        self.step += 1;

        let counts = self.counts();
        tracing::debug!(
            "Step {}: {} rabbits, {} foxes, {} zombie rabbits ({} spawned)",
            self.step,
            counts.rabbits,
            counts.foxes,
            counts.zombie_rabbits,
            born
        );

        Ok(self.snapshot())
    }

    /// Renumber the population and place everyone back on a cleared field
    fn rebuild_field(&mut self) -> SimResult<()> {
        self.field.clear_all();
        for (index, animal) in self.animals.iter_mut().enumerate() {
            animal.id = AgentId(index as u32);
            self.field.place(animal.occupant(), animal.location())?;
        }
        Ok(())
    }

    /// Run up to `steps` generations, stopping early once fewer than two
    /// species remain
    pub fn simulate(&mut self, steps: u32) -> SimResult<PopulationSnapshot> {
        for _ in 0..steps {
            if !self.counts().is_viable() {
                tracing::info!("Population no longer viable after {} steps", self.step);
                break;
            }
            self.step()?;
        }
        Ok(self.snapshot())
    }

    /// Start over: empty the field and seed it afresh
    pub fn reset(&mut self) -> SimResult<()> {
        self.step = 0;
        self.animals.clear();
        self.field.clear_all();
        tracing::info!("Simulation reset");
        self.populate()
    }

    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot::new(
            self.step,
            self.field.depth,
            self.field.width,
            self.animals.iter().filter(|a| a.is_alive()).map(Animal::view).collect(),
        )
    }

    pub fn counts(&self) -> PopulationCounts {
        self.animals
            .iter()
            .filter(|a| a.is_alive())
            .map(Animal::species)
            .collect()
    }

    /// Number of generations completed
    pub fn step_count(&self) -> u32 {
        self.step
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The live population, in the order it acts
    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rabbit, FixedRandom};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn small(depth: usize, width: usize) -> SimConfig {
        SimConfig {
            depth,
            width,
            ..Default::default()
        }
    }

    #[test]
    fn test_seeded_simulator_creation() {
        let sim = Simulator::seed(SimConfig::default(), StdRandom::seeded(42)).unwrap();

        assert_eq!(sim.step_count(), 0);
        assert_eq!(sim.field().depth, 80);
        assert_eq!(sim.field().width, 120);
        assert!(sim.counts().rabbits > 0);
        assert!(sim.counts().foxes > 0);
        assert_eq!(sim.counts().zombie_rabbits, 0);
        assert_eq!(sim.field().occupied_count(), sim.animals().len());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Simulator::empty(small(0, 5), StdRandom::seeded(1));
        assert!(matches!(result, Err(SimError::Config(_))));

        let mut config = small(5, 5);
        config.population.rabbit_probability = 1.5;
        assert!(config.validate().is_err());

        config.population = PopulationSpec {
            fox_probability: 0.6,
            rabbit_probability: 0.6,
            zombie_probability: 0.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_field_rejected() {
        let result = Simulator::empty(small(usize::MAX, 2), StdRandom::seeded(1));
        assert!(matches!(result, Err(SimError::Config(_))));

        let result = Simulator::empty(small(1 << 20, 1 << 20), StdRandom::seeded(1));
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn test_spawn_at_extreme_age_dies_on_step() {
        let mut sim = Simulator::empty(small(2, 2), FixedRandom::new(0.9, 0)).unwrap();
        sim.spawn(Species::Rabbit, Sex::Male, u32::MAX, Location::new(0, 0)).unwrap();

        let snapshot = sim.step().unwrap();

        assert_eq!(snapshot.counts.total(), 0);
        assert!(sim.field().is_free(Location::new(0, 0)));
    }

    #[test]
    fn test_pick_uses_cumulative_thresholds() {
        let spec = PopulationSpec {
            fox_probability: 0.1,
            rabbit_probability: 0.2,
            zombie_probability: 0.3,
        };
        assert_eq!(spec.pick(0.05), Some(Species::Fox));
        assert_eq!(spec.pick(0.25), Some(Species::Rabbit));
        assert_eq!(spec.pick(0.55), Some(Species::ZombieRabbit));
        assert_eq!(spec.pick(0.65), None);
    }

    #[test]
    fn test_spawn_rejects_occupied_cell() {
        let mut sim = Simulator::empty(small(3, 3), StdRandom::seeded(1)).unwrap();
        sim.spawn(Species::Rabbit, Sex::Male, 1, Location::new(0, 0)).unwrap();
        let result = sim.spawn(Species::Fox, Sex::Male, 1, Location::new(0, 0));
        assert!(matches!(result, Err(SimError::Field(_))));
        assert_eq!(sim.animals().len(), 1);
    }

    #[test]
    fn test_breeding_pair_scenario() {
        let mut sim = Simulator::empty(small(3, 3), FixedRandom::new(0.0, 0)).unwrap();
        let father = Location::new(1, 1);
        let mother = Location::new(1, 2);
        sim.spawn(Species::Rabbit, Sex::Male, 10, father).unwrap();
        sim.spawn(Species::Rabbit, Sex::Female, 10, mother).unwrap();

        let snapshot = sim.step().unwrap();

        let parents = &sim.animals()[..2];
        assert!(parents.iter().all(|p| p.is_alive() && p.age() == 11));
        assert_eq!(parents[0].sex(), Sex::Male);
        assert_eq!(parents[1].sex(), Sex::Female);

        let young = &sim.animals()[2..];
        assert!(!young.is_empty() && young.len() <= 2 * rabbit::TRAITS.max_litter_size as usize);
        assert!(young.iter().all(|y| y.age() == 0));
        assert!(young
            .iter()
            .all(|y| y.location().is_adjacent(&father) || y.location().is_adjacent(&mother)));

        let cells: HashSet<_> = sim.animals().iter().map(|a| a.location()).collect();
        assert_eq!(cells.len(), sim.animals().len());
        assert_eq!(snapshot.counts.rabbits, sim.animals().len());
    }

    #[test]
    fn test_old_rabbit_dies() {
        let mut sim = Simulator::empty(small(1, 1), StdRandom::seeded(5)).unwrap();
        sim.spawn(Species::Rabbit, Sex::Female, 41, Location::new(0, 0)).unwrap();

        let snapshot = sim.step().unwrap();
        assert!(snapshot.animals.is_empty());
        assert_eq!(sim.field().occupied_count(), 0);
    }

    #[test]
    fn test_full_field_overcrowding() {
        let mut sim = Simulator::empty(small(2, 2), FixedRandom::new(0.9, 0)).unwrap();
        for row in 0..2 {
            for col in 0..2 {
                sim.spawn(Species::Rabbit, Sex::Male, 1, Location::new(row, col)).unwrap();
            }
        }

        let snapshot = sim.step().unwrap();

        // The first rabbit had nowhere to go; the others then had its cell
        assert_eq!(snapshot.species_at(Location::new(0, 0)), Some(Species::Rabbit));
        assert_eq!(snapshot.counts.rabbits, 3);
    }

    #[test]
    fn test_infection_scenario() {
        let mut sim = Simulator::empty(small(3, 3), FixedRandom::new(0.9, rabbit::INFECTION_SENTINEL)).unwrap();
        let home = Location::new(1, 1);
        sim.spawn(Species::Rabbit, Sex::Male, 10, home).unwrap();

        let snapshot = sim.step().unwrap();

        assert_eq!(snapshot.counts.rabbits, 0);
        assert_eq!(snapshot.counts.zombie_rabbits, 1);
        assert_eq!(snapshot.species_at(home), Some(Species::ZombieRabbit));
        assert_eq!(sim.field().get(home).map(|o| o.species), Some(Species::ZombieRabbit));
    }

    #[test]
    fn test_eaten_rabbit_does_not_act() {
        let mut sim = Simulator::empty(small(1, 3), FixedRandom::new(0.9, 0)).unwrap();
        sim.spawn(Species::Fox, Sex::Male, 20, Location::new(0, 0)).unwrap();
        sim.spawn(Species::Rabbit, Sex::Male, 3, Location::new(0, 1)).unwrap();

        let snapshot = sim.step().unwrap();

        assert_eq!(snapshot.counts.rabbits, 0);
        assert_eq!(snapshot.counts.foxes, 1);
        assert_eq!(snapshot.species_at(Location::new(0, 1)), Some(Species::Fox));
    }

    #[test]
    fn test_newborns_wait_a_step() {
        let mut sim = Simulator::empty(small(3, 3), FixedRandom::new(0.0, 0)).unwrap();
        sim.spawn(Species::Rabbit, Sex::Male, 10, Location::new(0, 0)).unwrap();
        sim.spawn(Species::Rabbit, Sex::Female, 10, Location::new(0, 1)).unwrap();

        sim.step().unwrap();

        // Parents acted; their young did not
        let (parents, young) = sim.animals().split_at(2);
        assert!(parents.iter().all(|a| a.age() == 11));
        assert!(!young.is_empty());
        assert!(young.iter().all(|a| a.age() == 0));
    }

    #[test]
    fn test_simulate_stops_when_not_viable() {
        let mut sim = Simulator::empty(small(5, 5), StdRandom::seeded(3)).unwrap();
        sim.spawn(Species::Rabbit, Sex::Male, 1, Location::new(2, 2)).unwrap();

        let snapshot = sim.simulate(10).unwrap();
        assert_eq!(snapshot.step, 0);
    }

    #[test]
    fn test_reset_reseeds() {
        let mut sim = Simulator::seed(small(20, 20), StdRandom::seeded(8)).unwrap();
        sim.simulate(5).unwrap();
        sim.reset().unwrap();

        assert_eq!(sim.step_count(), 0);
        assert_eq!(sim.field().occupied_count(), sim.animals().len());
        assert!(sim.animals().iter().all(|a| a.is_alive()));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = SimConfig {
            depth: 30,
            width: 30,
            population: PopulationSpec {
                zombie_probability: 0.01,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut a = Simulator::seed(config.clone(), StdRandom::seeded(99)).unwrap();
        let mut b = Simulator::seed(config, StdRandom::seeded(99)).unwrap();

        for _ in 0..20 {
            assert_eq!(a.step().unwrap(), b.step().unwrap());
        }
    }

    #[test]
    fn test_wrapping_field_runs() {
        let config = SimConfig {
            depth: 10,
            width: 10,
            boundary: Boundary::Wrapping,
            ..Default::default()
        };
        let mut sim = Simulator::seed(config, StdRandom::seeded(12)).unwrap();
        for _ in 0..10 {
            sim.step().unwrap();
        }
        assert_eq!(sim.step_count(), 10);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn one_animal_per_cell(seed in any::<u64>(), depth in 1usize..15, width in 1usize..15, zombies in 0.0f64..0.1) {
            let config = SimConfig {
                depth,
                width,
                boundary: Boundary::Bounded,
                population: PopulationSpec {
                    fox_probability: 0.05,
                    rabbit_probability: 0.3,
                    zombie_probability: zombies,
                },
            };
            let mut sim = Simulator::seed(config, StdRandom::seeded(seed)).unwrap();

            for _ in 0..15 {
                let snapshot = sim.step().unwrap();
                let cells: HashSet<_> = snapshot.animals.iter().map(|a| a.location).collect();
                prop_assert_eq!(cells.len(), snapshot.animals.len());
                prop_assert_eq!(sim.field().occupied_count(), snapshot.animals.len());

                for animal in sim.animals() {
                    prop_assert!(animal.is_alive());
                    prop_assert!(animal.age() <= animal.traits().max_age);
                    prop_assert_eq!(sim.field().get(animal.location()).map(|o| o.id), Some(animal.id()));
                }
            }
        }
    }
}
