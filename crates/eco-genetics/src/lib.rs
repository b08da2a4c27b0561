//! Movement genotypes for ecosim animals.
//!
//! A genotype is a fixed-length sequence of relative turns. Animals read it
//! one gene per move, so the sequence is their whole behaviour. It is:
//! - Immutable: offspring get a fresh value, parents are never edited
//! - Hashable: identical gene sequences group together in statistics
//! - Recombinable: crossover weighted by parental energy, then point mutation

pub mod genotype;
pub mod mutation;

pub use genotype::{crossover, Gene, Genotype};
pub use mutation::Mutator;
