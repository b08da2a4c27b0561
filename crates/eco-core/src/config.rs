//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of genes carried by every genotype
pub const GENOTYPE_LENGTH: usize = 32;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid
    pub height: i32,
    /// Share of the total area covered by the fertile region (0.0 to 1.0)
    pub fertile_ratio: f64,
    /// Number of animals placed on day one
    pub initial_animals: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 30,
            fertile_ratio: 0.25,
            initial_animals: 20,
        }
    }
}

impl WorldConfig {
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Energy and cost configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// Starting energy for founder animals
    pub start_energy: i32,
    /// Energy cost of one move
    pub move_cost: i32,
    /// Energy provided by one plant
    pub plant_energy: i32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            start_energy: 40,
            move_cost: 1,
            plant_energy: 20,
        }
    }
}

impl EnergyConfig {
    /// Energy each parent pays into a child. Parents must hold strictly more than this.
    pub fn reproduction_cost(&self) -> i32 {
        self.start_energy / 2
    }
}

/// Inheritance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticsConfig {
    /// Distinct genes replaced in every newborn genotype
    pub mutation_count: usize,
}

impl Default for GeneticsConfig {
    fn default() -> Self {
        Self { mutation_count: 1 }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of days `Simulation::run` advances
    pub num_days: u64,
    /// Random seed for reproducibility
    pub seed: u64,
    pub world: WorldConfig,
    pub energy: EnergyConfig,
    pub genetics: GeneticsConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_days: 500,
            seed: 0,
            world: WorldConfig::default(),
            energy: EnergyConfig::default(),
            genetics: GeneticsConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        if world.width <= 0 || world.height <= 0 {
            return Err(Error::Validation(format!(
                "grid dimensions must be positive, got {}x{}",
                world.width, world.height
            )));
        }
        if !(0.0..=1.0).contains(&world.fertile_ratio) {
            return Err(Error::Validation(format!(
                "fertile ratio must lie in [0, 1], got {}",
                world.fertile_ratio
            )));
        }
        if world.initial_animals as i64 > world.area() {
            return Err(Error::Validation(format!(
                "{} initial animals do not fit on a {}x{} grid",
                world.initial_animals, world.width, world.height
            )));
        }

        let energy = &self.energy;
        if energy.start_energy <= 0 {
            return Err(Error::Validation(format!(
                "start energy must be positive, got {}",
                energy.start_energy
            )));
        }
        if energy.move_cost < 0 {
            return Err(Error::Validation(format!(
                "move cost must not be negative, got {}",
                energy.move_cost
            )));
        }
        if energy.plant_energy < 0 {
            return Err(Error::Validation(format!(
                "plant energy must not be negative, got {}",
                energy.plant_energy
            )));
        }

        if self.genetics.mutation_count > GENOTYPE_LENGTH {
            return Err(Error::Validation(format!(
                "mutation count {} exceeds genotype length {}",
                self.genetics.mutation_count, GENOTYPE_LENGTH
            )));
        }

        Ok(())
    }
}
