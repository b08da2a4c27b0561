//! Point mutation applied to every newborn genotype.

use crate::genotype::{crossover, Gene, Genotype};
use eco_core::{GeneticsConfig, UniformSource, GENOTYPE_LENGTH};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Mutator {
    mutation_count: usize,
}

impl Mutator {
    /// `mutation_count` is capped at the genotype length
    pub fn new(mutation_count: usize) -> Self {
        Self {
            mutation_count: mutation_count.min(GENOTYPE_LENGTH),
        }
    }

    pub fn from_config(config: &GeneticsConfig) -> Self {
        Self::new(config.mutation_count)
    }

    pub fn mutation_count(&self) -> usize {
        self.mutation_count
    }

    /// Replace `mutation_count` distinct genes with freshly drawn ones.
    ///
    /// Indices come from a partial Fisher-Yates shuffle, so each index is
    /// picked at most once. For every pick the source is asked for the index
    /// first and the new gene second.
    pub fn mutate<R: UniformSource>(&self, genotype: &Genotype, rng: &mut R) -> Genotype {
        let mut indices: Vec<usize> = (0..GENOTYPE_LENGTH).collect();
        let mut replacements = Vec::with_capacity(self.mutation_count);

        for k in 0..self.mutation_count {
            let pick = k + rng.next_index(GENOTYPE_LENGTH - k);
            indices.swap(k, pick);
            replacements.push((indices[k], Gene::random(rng)));
        }

        trace!(mutated = ?replacements, "Genotype mutated");
        genotype.with_replaced(&replacements)
    }

    /// Crossover followed by mutation
    pub fn breed<R: UniformSource>(
        &self,
        first: &Genotype,
        first_energy: i32,
        second: &Genotype,
        second_energy: i32,
        rng: &mut R,
    ) -> Genotype {
        let child = crossover(first, first_energy, second, second_energy);
        self.mutate(&child, rng)
    }
}

impl Default for Mutator {
    fn default() -> Self {
        Self::from_config(&GeneticsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::SequenceSource;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn differing(a: &Genotype, b: &Genotype) -> usize {
        a.genes().iter().zip(b.genes()).filter(|(x, y)| x != y).count()
    }

    #[test]
    fn test_zero_mutations_is_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let genotype = Genotype::random(&mut rng);
        let mutator = Mutator::new(0);
        assert_eq!(mutator.mutate(&genotype, &mut rng), genotype);
    }

    #[test]
    fn test_scripted_mutation_hits_chosen_index() {
        let genotype = Genotype::uniform(Gene::new(0).unwrap());
        // index draw 5 (of 32), gene draw 7
        let mut source = SequenceSource::new(vec![5, 7]);
        let mutated = Mutator::new(1).mutate(&genotype, &mut source);
        assert_eq!(mutated.genes()[5], Gene::new(7).unwrap());
        assert_eq!(differing(&genotype, &mutated), 1);
        assert_eq!(source.consumed(), 2);
    }

    #[test]
    fn test_indices_drawn_without_replacement() {
        let genotype = Genotype::uniform(Gene::new(0).unwrap());
        // both index draws are 0: the second must still pick a new index
        let mut source = SequenceSource::new(vec![0, 3, 0, 4]);
        let mutated = Mutator::new(2).mutate(&genotype, &mut source);
        assert_eq!(mutated.genes()[0], Gene::new(3).unwrap());
        assert_eq!(mutated.genes()[1], Gene::new(4).unwrap());
        assert_eq!(differing(&genotype, &mutated), 2);
    }

    #[test]
    fn test_count_is_capped() {
        assert_eq!(Mutator::new(100).mutation_count(), GENOTYPE_LENGTH);
    }

    #[test]
    fn test_breed_is_deterministic_for_a_seed() {
        let mut setup = ChaCha8Rng::seed_from_u64(3);
        let a = Genotype::random(&mut setup);
        let b = Genotype::random(&mut setup);
        let mutator = Mutator::new(2);

        let mut r1 = ChaCha8Rng::seed_from_u64(99);
        let mut r2 = ChaCha8Rng::seed_from_u64(99);
        assert_eq!(
            mutator.breed(&a, 20, &b, 15, &mut r1),
            mutator.breed(&a, 20, &b, 15, &mut r2)
        );
    }

    proptest! {
        #[test]
        fn mutation_changes_at_most_count_genes(seed in any::<u64>(), count in 0usize..=GENOTYPE_LENGTH) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let genotype = Genotype::random(&mut rng);
            let mutated = Mutator::new(count).mutate(&genotype, &mut rng);
            prop_assert_eq!(mutated.genes().len(), GENOTYPE_LENGTH);
            prop_assert!(differing(&genotype, &mutated) <= count);
            prop_assert!(mutated.genes().iter().all(|g| g.turn() < Gene::VARIANTS));
        }
    }
}
