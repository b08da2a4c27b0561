//! Day-cycle engine.
//!
//! One call to [`Simulation::tick`] runs the five phases of a day in a fixed
//! order: cull, move, eat, reproduce, grow. Each phase sees the effects of the
//! ones before it. Afterwards a [`Statistic`] is recorded for the day.

use crate::map::WorldMap;
use crate::organism::{Animal, Plant};
use crate::statistics::{Statistic, StatisticsAggregator, Summary};
use eco_core::{Result, SimulationConfig, UniformSource};
use eco_genetics::{Genotype, Mutator};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument, trace};

pub struct Simulation<R = ChaCha8Rng> {
    map: WorldMap,
    config: SimulationConfig,
    mutator: Mutator,
    rng: R,
    day: u64,
    stats: StatisticsAggregator,
}

impl Simulation<ChaCha8Rng> {
    /// Seed a ChaCha source from the configuration and populate the world
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_source(config, rng)
    }
}

impl<R: UniformSource> Simulation<R> {
    /// Populate a fresh world using an injected random source.
    ///
    /// Each founder draws its cell from the free cells first, then its
    /// genotype gene by gene.
    pub fn with_source(config: SimulationConfig, mut rng: R) -> Result<Self> {
        config.validate()?;
        let mut map = WorldMap::from_config(&config.world)?;

        for _ in 0..config.world.initial_animals {
            let free = map.free_positions();
            let Some(&position) = rng.choose(&free) else {
                break;
            };
            let genotype = Genotype::random(&mut rng);
            let id = map.allocate_id();
            map.add_animal(Animal::new(id, position, config.energy.start_energy, genotype, 1));
        }

        info!(
            width = config.world.width,
            height = config.world.height,
            animals = map.animal_count(),
            seed = config.seed,
            "World populated"
        );

        Self::from_parts(config, map, rng)
    }

    /// Run on a world that was already populated by the caller
    pub fn from_parts(config: SimulationConfig, map: WorldMap, rng: R) -> Result<Self> {
        config.validate()?;
        let mutator = Mutator::from_config(&config.genetics);
        Ok(Self {
            map,
            config,
            mutator,
            rng,
            day: 1,
            stats: StatisticsAggregator::new(),
        })
    }

    /// Day about to be simulated, starting at 1
    pub fn current_day(&self) -> u64 {
        self.day
    }

    /// Read-only view of the world
    pub fn map(&self) -> &WorldMap {
        &self.map
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn statistics(&self) -> &[Statistic] {
        self.stats.statistics()
    }

    /// Ages of every animal culled so far
    pub fn lifetimes(&self) -> &[u64] {
        self.stats.lifetimes()
    }

    pub fn summary(&self) -> Option<Summary> {
        self.stats.summary(self.day)
    }

    /// Fixed-format report; empty before the first day
    pub fn export_summary(&self) -> String {
        self.summary().map(|s| s.to_string()).unwrap_or_default()
    }

    /// Run `num_days` days from the configuration
    #[instrument(skip(self), fields(num_days = self.config.num_days))]
    pub fn run(&mut self) -> Option<Summary> {
        info!("Starting simulation for {} days", self.config.num_days);

        for _ in 0..self.config.num_days {
            let (day, animals, plants) = {
                let statistic = self.tick();
                (statistic.day, statistic.animals, statistic.plants)
            };

            if day % 100 == 0 {
                info!(
                    "Day {}/{}: {} animals alive, {} plants",
                    day, self.config.num_days, animals, plants
                );
            }
        }

        let summary = self.summary();
        if let Some(summary) = &summary {
            info!(
                event = "run_summary",
                total_days = summary.total_days,
                average_animals = summary.average_animals,
                average_plants = summary.average_plants,
                average_lifetime = summary.average_lifetime,
                average_energy = summary.average_energy,
                average_children = summary.average_children,
                "Simulation complete"
            );
        }
        summary
    }

    /// Advance one day and record its statistic
    pub fn tick(&mut self) -> &Statistic {
        self.cull();
        self.move_animals();
        self.eat();
        self.reproduce();
        self.grow_plants();

        let day = self.day;
        self.day += 1;
        let statistic = self.stats.record_day(day, &self.map);

        debug!(
            event = "day_complete",
            day = statistic.day,
            animals = statistic.animals,
            plants = statistic.plants,
            average_lifetime = statistic.average_lifetime,
            average_energy = statistic.average_energy,
            average_children = statistic.average_children,
            "Day statistics"
        );
        statistic
    }

    /// Remove every animal without energy, logging its age as a lifetime
    fn cull(&mut self) {
        let dead: Vec<_> = self
            .map
            .animals()
            .filter(|animal| !animal.is_alive())
            .map(|animal| animal.id())
            .collect();

        for id in dead {
            if let Some(animal) = self.map.remove_animal(id) {
                self.stats.record_death(animal.age());
                trace!(
                    event = "animal_death",
                    animal_id = %id,
                    age = animal.age(),
                    children = animal.children(),
                    day = self.day,
                    "Animal culled"
                );
            }
        }
    }

    /// Charge the move cost, then turn, step and age every survivor.
    /// Animals that run out of energy here stay put until tomorrow's cull.
    fn move_animals(&mut self) {
        let move_cost = self.config.energy.move_cost;

        for id in self.map.animal_ids() {
            let Some(animal) = self.map.animal_mut(id) else {
                continue;
            };
            if !animal.consume_energy(move_cost) {
                continue;
            }
            let heading = animal.turn();
            let from = animal.position();

            let target = self.map.wrap(from.step(heading));
            self.map.move_animal(id, target);
            if let Some(animal) = self.map.animal_mut(id) {
                animal.tick();
            }
        }
    }

    /// Each plant goes to the run of living animals tied for the highest
    /// energy on its cell, split evenly with integer division.
    fn eat(&mut self) {
        let plant_energy = self.config.energy.plant_energy;

        for pos in self.map.plant_positions() {
            let ranked = self.map.ranked_at(pos);
            let contenders: Vec<&Animal> = ranked.iter().filter_map(|id| self.map.animal(*id)).collect();
            let Some(top) = contenders.first() else {
                continue;
            };
            if !top.is_alive() {
                continue;
            }

            let top_energy = top.energy();
            let winners: Vec<_> = contenders
                .iter()
                .take_while(|animal| animal.is_alive() && animal.energy() == top_energy)
                .map(|animal| animal.id())
                .collect();

            let share = plant_energy / winners.len() as i32;
            for id in &winners {
                if let Some(animal) = self.map.animal_mut(*id) {
                    animal.add_energy(share);
                }
            }
            self.map.remove_plant(pos);

            trace!(
                event = "plant_eaten",
                x = pos.x,
                y = pos.y,
                eaters = winners.len(),
                share = share,
                "Plant eaten"
            );
        }
    }

    /// At most one birth per cell occupied when the phase starts. Newborns
    /// never take part in a reproduction on their birth day.
    fn reproduce(&mut self) {
        let cost = self.config.energy.reproduction_cost();
        let birth_day = self.day;

        for pos in self.map.occupied_positions() {
            let Some(child_position) = self.map.place_for_child(pos) else {
                continue;
            };
            let ranked = self.map.ranked_at(pos);
            let [first, second, ..] = *ranked.as_slice() else {
                continue;
            };

            let child_id = self.map.allocate_id();
            let Some((a, b)) = self.map.animal_pair_mut(first, second) else {
                continue;
            };
            let Some(child) = a.reproduce(b, child_id, child_position, birth_day, cost, &self.mutator, &mut self.rng) else {
                continue;
            };

            trace!(
                event = "animal_born",
                child_id = %child_id,
                first_parent = %first,
                second_parent = %second,
                energy = child.energy(),
                x = child_position.x,
                y = child_position.y,
                day = birth_day,
                "Animal born"
            );
            self.map.add_animal(child);
        }
    }

    /// One plant on a random free barren cell, then one on a random free
    /// fertile cell, each only if such a cell exists.
    fn grow_plants(&mut self) {
        let barren = self.map.free_barren_positions();
        if let Some(&pos) = self.rng.choose(&barren) {
            self.map.add_plant(Plant::new(pos));
        }

        let fertile = self.map.free_fertile_positions();
        if let Some(&pos) = self.rng.choose(&fertile) {
            self.map.add_plant(Plant::new(pos));
        }
    }
}
