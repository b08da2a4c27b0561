//! Spatial index over the grid.
//!
//! The map owns every animal and plant. Animals are stored by id and indexed
//! by cell; plants are stored by cell, at most one per cell. All iteration is
//! ordered (ids ascending, cells by `(x, y)`), which keeps a seeded run
//! reproducible.

use crate::organism::{Animal, AnimalId, Plant};
use eco_core::{Direction, Error, Position, Result, WorldConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Half-open rectangle `[origin, origin + size)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub origin: Position,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn contains(&self, pos: Position) -> bool {
        (self.origin.x..self.origin.x + self.width).contains(&pos.x)
            && (self.origin.y..self.origin.y + self.height).contains(&pos.y)
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Rectangle covering `ratio` of a `width` x `height` grid, centered.
    ///
    /// Each side is scaled by `sqrt(ratio)` and rounded, so the covered share
    /// is as close to `ratio` as whole cells allow.
    fn centered(width: i32, height: i32, ratio: f64) -> Self {
        let scale = ratio.sqrt();
        let inner_width = ((width as f64 * scale).round() as i32).clamp(0, width);
        let inner_height = ((height as f64 * scale).round() as i32).clamp(0, height);
        Self {
            origin: Position::new((width - inner_width) / 2, (height - inner_height) / 2),
            width: inner_width,
            height: inner_height,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorldMap {
    width: i32,
    height: i32,
    fertile: Region,
    animals: BTreeMap<AnimalId, Animal>,
    cells: BTreeMap<Position, Vec<AnimalId>>,
    plants: BTreeMap<Position, Plant>,
    next_id: u64,
}

impl WorldMap {
    pub fn new(width: i32, height: i32, fertile_ratio: f64) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::Validation(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if !(0.0..=1.0).contains(&fertile_ratio) {
            return Err(Error::Validation(format!(
                "fertile ratio must lie in [0, 1], got {}",
                fertile_ratio
            )));
        }

        Ok(Self {
            width,
            height,
            fertile: Region::centered(width, height, fertile_ratio),
            animals: BTreeMap::new(),
            cells: BTreeMap::new(),
            plants: BTreeMap::new(),
            next_id: 0,
        })
    }

    pub fn from_config(config: &WorldConfig) -> Result<Self> {
        Self::new(config.width, config.height, config.fertile_ratio)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn fertile_region(&self) -> Region {
        self.fertile
    }

    pub fn is_fertile(&self, pos: Position) -> bool {
        self.fertile.contains(pos)
    }

    /// Boundary policy: the grid is a torus
    pub fn wrap(&self, pos: Position) -> Position {
        pos.wrap(self.width, self.height)
    }

    /// Reserve the next animal id
    pub fn allocate_id(&mut self) -> AnimalId {
        let id = AnimalId(self.next_id);
        self.next_id += 1;
        id
    }

    // ---- registration ----

    /// Register an animal at its own position.
    ///
    /// Out-of-bounds positions and reused ids are invariant violations: they
    /// assert in debug builds and are ignored otherwise.
    pub fn add_animal(&mut self, animal: Animal) {
        let id = animal.id();
        let pos = animal.position();
        debug_assert!(pos.is_within(self.width, self.height), "animal {} placed off-grid at {}", id, pos);
        debug_assert!(!self.animals.contains_key(&id), "animal {} registered twice", id);
        if !pos.is_within(self.width, self.height) || self.animals.contains_key(&id) {
            return;
        }

        self.next_id = self.next_id.max(id.0 + 1);
        self.cells.entry(pos).or_default().push(id);
        self.animals.insert(id, animal);
    }

    /// Unregister an animal. Absent ids are ignored.
    pub fn remove_animal(&mut self, id: AnimalId) -> Option<Animal> {
        let animal = self.animals.remove(&id)?;
        self.detach(id, animal.position());
        Some(animal)
    }

    /// Register a plant. A cell that already holds a plant keeps it.
    pub fn add_plant(&mut self, plant: Plant) {
        let pos = plant.position();
        debug_assert!(pos.is_within(self.width, self.height), "plant placed off-grid at {}", pos);
        debug_assert!(!self.plants.contains_key(&pos), "second plant at {}", pos);
        if pos.is_within(self.width, self.height) {
            self.plants.entry(pos).or_insert(plant);
        }
    }

    /// Unregister the plant at `pos`, if any
    pub fn remove_plant(&mut self, pos: Position) -> Option<Plant> {
        self.plants.remove(&pos)
    }

    /// Relocate an animal, keeping the cell index in step
    pub fn move_animal(&mut self, id: AnimalId, target: Position) {
        debug_assert!(target.is_within(self.width, self.height), "move off-grid to {}", target);
        if !target.is_within(self.width, self.height) {
            return;
        }
        let Some(animal) = self.animals.get_mut(&id) else {
            return;
        };
        let from = animal.position();
        if from == target {
            return;
        }
        animal.set_position(target);
        self.detach(id, from);
        self.cells.entry(target).or_default().push(id);
    }

    fn detach(&mut self, id: AnimalId, pos: Position) {
        if let Some(ids) = self.cells.get_mut(&pos) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.cells.remove(&pos);
            }
        }
    }

    // ---- lookups ----

    pub fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.animals.get(&id)
    }

    pub fn animal_mut(&mut self, id: AnimalId) -> Option<&mut Animal> {
        self.animals.get_mut(&id)
    }

    /// Two distinct animals borrowed mutably at once, in the order asked for
    pub fn animal_pair_mut(&mut self, a: AnimalId, b: AnimalId) -> Option<(&mut Animal, &mut Animal)> {
        if a == b {
            return None;
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let mut range = self.animals.range_mut(low..=high);
        let (&low_key, low_animal) = range.next()?;
        let (&high_key, high_animal) = range.next_back()?;
        if low_key != low || high_key != high {
            return None;
        }
        if a < b {
            Some((low_animal, high_animal))
        } else {
            Some((high_animal, low_animal))
        }
    }

    /// All animals, in id order
    pub fn animals(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.animals.values()
    }

    pub fn living_animals(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.animals.values().filter(|animal| animal.is_alive())
    }

    pub fn animal_ids(&self) -> Vec<AnimalId> {
        self.animals.keys().copied().collect()
    }

    pub fn animal_count(&self) -> usize {
        self.animals.len()
    }

    /// Animals on a cell, in arrival order
    pub fn animals_at(&self, pos: Position) -> Vec<&Animal> {
        self.cells
            .get(&pos)
            .map(|ids| ids.iter().filter_map(|id| self.animals.get(id)).collect())
            .unwrap_or_default()
    }

    /// Animals on a cell ranked by energy, highest first, ties by ascending id
    pub fn ranked_at(&self, pos: Position) -> Vec<AnimalId> {
        let mut ranked: Vec<(i32, AnimalId)> = self
            .animals_at(pos)
            .into_iter()
            .map(|animal| (animal.energy(), animal.id()))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked.into_iter().map(|(_, id)| id).collect()
    }

    pub fn plant_at(&self, pos: Position) -> Option<&Plant> {
        self.plants.get(&pos)
    }

    pub fn plants(&self) -> impl Iterator<Item = &Plant> + '_ {
        self.plants.values()
    }

    pub fn plant_positions(&self) -> Vec<Position> {
        self.plants.keys().copied().collect()
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    pub fn has_animals_at(&self, pos: Position) -> bool {
        self.cells.contains_key(&pos)
    }

    /// No animal and no plant on the cell
    pub fn is_free(&self, pos: Position) -> bool {
        !self.has_animals_at(pos) && !self.plants.contains_key(&pos)
    }

    /// Distinct cells holding at least one animal, dead or alive
    pub fn occupied_positions(&self) -> Vec<Position> {
        self.cells.keys().copied().collect()
    }

    // ---- free cells ----

    /// Every cell of the grid, row by row
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    pub fn free_positions(&self) -> Vec<Position> {
        self.positions().filter(|pos| self.is_free(*pos)).collect()
    }

    pub fn free_fertile_positions(&self) -> Vec<Position> {
        self.positions()
            .filter(|pos| self.is_fertile(*pos) && self.is_free(*pos))
            .collect()
    }

    pub fn free_barren_positions(&self) -> Vec<Position> {
        self.positions()
            .filter(|pos| !self.is_fertile(*pos) && self.is_free(*pos))
            .collect()
    }

    /// Cell for a newborn of parents standing on `parent`.
    ///
    /// Candidates are the eight neighbours clockwise from north, then the
    /// parent cell. The first completely free candidate wins, then the first
    /// one without animals. `None` when every candidate holds animals.
    pub fn place_for_child(&self, parent: Position) -> Option<Position> {
        let mut candidates: Vec<Position> = Vec::with_capacity(Direction::COUNT + 1);
        for direction in Direction::all() {
            let pos = self.wrap(parent.step(direction));
            if pos != parent && !candidates.contains(&pos) {
                candidates.push(pos);
            }
        }
        candidates.push(self.wrap(parent));

        candidates
            .iter()
            .copied()
            .find(|pos| self.is_free(*pos))
            .or_else(|| candidates.iter().copied().find(|pos| !self.has_animals_at(*pos)))
    }
}
