//! Animals and plants.

use eco_core::{Direction, Position, UniformSource};
use eco_genetics::{Genotype, Mutator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an animal within one world.
///
/// Ids are allocated in increasing order, so they double as the fixed
/// tie-break when animals with equal energy compete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnimalId(pub u64);

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    position: Position,
}

impl Plant {
    pub fn new(position: Position) -> Self {
        Self { position }
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// An animal in the simulation.
///
/// The position is only changed through [`crate::WorldMap`] so that the
/// map's cell index always agrees with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    id: AnimalId,
    position: Position,
    heading: Direction,
    energy: i32,
    age: u64,
    genotype: Genotype,
    gene_cursor: usize,
    children: u32,
    birth_day: u64,
    parents: Option<(AnimalId, AnimalId)>,
}

impl Animal {
    /// A founder animal, facing north with its cursor on the first gene
    pub fn new(id: AnimalId, position: Position, energy: i32, genotype: Genotype, birth_day: u64) -> Self {
        Self {
            id,
            position,
            heading: Direction::North,
            energy: energy.max(0),
            age: 0,
            genotype,
            gene_cursor: 0,
            children: 0,
            birth_day,
            parents: None,
        }
    }

    pub fn id(&self) -> AnimalId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn energy(&self) -> i32 {
        self.energy
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    pub fn gene_cursor(&self) -> usize {
        self.gene_cursor
    }

    pub fn children(&self) -> u32 {
        self.children
    }

    pub fn birth_day(&self) -> u64 {
        self.birth_day
    }

    pub fn parents(&self) -> Option<(AnimalId, AnimalId)> {
        self.parents
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }

    /// Gain `amount`, capped at `i32::MAX`
    pub fn add_energy(&mut self, amount: i32) {
        self.energy = self.energy.saturating_add(amount);
    }

    /// Pay `amount`, bottoming out at zero. Returns whether the animal survived.
    pub fn consume_energy(&mut self, amount: i32) -> bool {
        self.energy = (self.energy - amount).max(0);
        self.is_alive()
    }

    /// Turn by the gene under the cursor and advance the cursor.
    /// Returns the new heading, which is the direction of this move.
    pub fn turn(&mut self) -> Direction {
        let gene = self.genotype.gene_at(self.gene_cursor);
        self.heading = gene.apply(self.heading);
        self.gene_cursor = (self.gene_cursor + 1) % Genotype::LENGTH;
        self.heading
    }

    pub fn tick(&mut self) {
        self.age += 1;
    }

    /// Whether this animal may pay `cost` into a child
    pub fn can_reproduce(&self, cost: i32) -> bool {
        self.is_alive() && self.energy > cost
    }

    /// Breed with `other`, each parent paying `cost` into the child.
    ///
    /// `self` is the first parent for crossover. Returns `None` without
    /// touching either parent if one of them cannot afford the cost.
    #[allow(clippy::too_many_arguments)]
    pub fn reproduce<R: UniformSource>(
        &mut self,
        other: &mut Animal,
        child_id: AnimalId,
        child_position: Position,
        birth_day: u64,
        cost: i32,
        mutator: &Mutator,
        rng: &mut R,
    ) -> Option<Animal> {
        if !self.can_reproduce(cost) || !other.can_reproduce(cost) {
            return None;
        }

        let genotype = mutator.breed(&self.genotype, self.energy, &other.genotype, other.energy, rng);

        self.energy -= cost;
        other.energy -= cost;
        self.children += 1;
        other.children += 1;

        let mut child = Animal::new(child_id, child_position, 2 * cost, genotype, birth_day);
        child.parents = Some((self.id, other.id));
        Some(child)
    }
}
