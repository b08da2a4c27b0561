//! World simulation engine.
//!
//! This module implements the grid world where animals graze, breed and die,
//! one five-phase day at a time.

pub mod map;
pub mod organism;
pub mod simulation;
pub mod statistics;

pub use map::{Region, WorldMap};
pub use organism::{Animal, AnimalId, Plant};
pub use simulation::Simulation;
pub use statistics::{Statistic, StatisticsAggregator, Summary};
