//! Injected uniform random source.
//!
//! The engine only ever needs uniform integers below a bound, so that is the
//! whole interface. Seeded ChaCha generators implement it for real runs and
//! [`SequenceSource`] replays a recorded stream of draws.

use rand::rngs::StdRng;
use rand::Rng;
use rand_chacha::{ChaCha12Rng, ChaCha20Rng, ChaCha8Rng};

pub trait UniformSource {
    /// Uniform integer in `[0, bound)`. `bound` is never zero.
    fn next_index(&mut self, bound: usize) -> usize;

    /// Uniformly pick one element, `None` for an empty slice
    fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            items.get(self.next_index(items.len()))
        }
    }
}

impl<S: UniformSource> UniformSource for &mut S {
    fn next_index(&mut self, bound: usize) -> usize {
        (**self).next_index(bound)
    }
}

macro_rules! impl_uniform_for_rng {
    ($($rng:ty),*) => {
        $(
            impl UniformSource for $rng {
                fn next_index(&mut self, bound: usize) -> usize {
                    self.gen_range(0..bound)
                }
            }
        )*
    };
}

impl_uniform_for_rng!(ChaCha8Rng, ChaCha12Rng, ChaCha20Rng, StdRng);

/// Replays a fixed list of draws, each reduced modulo the requested bound.
///
/// Restarts from the beginning once exhausted; an empty list always yields 0.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    draws: Vec<usize>,
    cursor: usize,
}

impl SequenceSource {
    pub fn new(draws: Vec<usize>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// Number of draws consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for SequenceSource {
    fn next_index(&mut self, bound: usize) -> usize {
        if self.draws.is_empty() {
            return 0;
        }
        let draw = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        draw % bound
    }
}
