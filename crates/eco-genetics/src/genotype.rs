//! Gene and genotype values.

use eco_core::{Direction, Error, Result, UniformSource, GENOTYPE_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One relative turn, in eighths of a full circle clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Gene(u8);

impl Gene {
    /// Number of distinct gene values
    pub const VARIANTS: usize = Direction::COUNT;

    pub fn new(turn: u8) -> Result<Self> {
        if (turn as usize) < Self::VARIANTS {
            Ok(Self(turn))
        } else {
            Err(Error::Validation(format!(
                "gene value {} outside 0..{}",
                turn,
                Self::VARIANTS
            )))
        }
    }

    pub fn random<R: UniformSource>(rng: &mut R) -> Self {
        Self(rng.next_index(Self::VARIANTS) as u8)
    }

    pub fn turn(&self) -> usize {
        self.0 as usize
    }

    /// Heading after applying this turn to `heading`
    pub fn apply(&self, heading: Direction) -> Direction {
        heading.turn(self.turn())
    }
}

impl TryFrom<u8> for Gene {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Gene::new(value)
    }
}

impl From<Gene> for u8 {
    fn from(gene: Gene) -> u8 {
        gene.0
    }
}

/// Fixed-length gene sequence. Equal sequences are the same genotype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genotype {
    genes: [Gene; GENOTYPE_LENGTH],
}

impl Genotype {
    pub const LENGTH: usize = GENOTYPE_LENGTH;

    pub fn from_genes(genes: [Gene; GENOTYPE_LENGTH]) -> Self {
        Self { genes }
    }

    /// Build from raw turn values, rejecting wrong lengths and out-of-range genes
    pub fn from_turns(turns: &[u8]) -> Result<Self> {
        if turns.len() != GENOTYPE_LENGTH {
            return Err(Error::Validation(format!(
                "genotype needs {} genes, got {}",
                GENOTYPE_LENGTH,
                turns.len()
            )));
        }
        let mut genes = [Gene(0); GENOTYPE_LENGTH];
        for (slot, &turn) in genes.iter_mut().zip(turns) {
            *slot = Gene::new(turn)?;
        }
        Ok(Self { genes })
    }

    /// Every gene set to the same turn
    pub fn uniform(gene: Gene) -> Self {
        Self {
            genes: [gene; GENOTYPE_LENGTH],
        }
    }

    pub fn random<R: UniformSource>(rng: &mut R) -> Self {
        Self {
            genes: std::array::from_fn(|_| Gene::random(rng)),
        }
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Gene under a read cursor; the cursor wraps modulo the length
    pub fn gene_at(&self, cursor: usize) -> Gene {
        self.genes[cursor % GENOTYPE_LENGTH]
    }

    pub(crate) fn with_replaced(&self, replacements: &[(usize, Gene)]) -> Self {
        let mut genes = self.genes;
        for &(index, gene) in replacements {
            genes[index] = gene;
        }
        Self { genes }
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gene in &self.genes {
            write!(f, "{}", gene.0)?;
        }
        Ok(())
    }
}

/// Recombine two parent genotypes.
///
/// The cut index is `LENGTH * first_energy / (first_energy + second_energy)`.
/// The child takes `first`'s genes before the cut and `second`'s genes from
/// the cut on, so each parent contributes a contiguous block proportional to
/// its share of the pair's energy. Negative energies count as zero; a pair
/// with no energy at all is cut in the middle.
pub fn crossover(
    first: &Genotype,
    first_energy: i32,
    second: &Genotype,
    second_energy: i32,
) -> Genotype {
    let a = first_energy.max(0) as i64;
    let b = second_energy.max(0) as i64;
    let cut = if a + b == 0 {
        GENOTYPE_LENGTH / 2
    } else {
        (GENOTYPE_LENGTH as i64 * a / (a + b)) as usize
    };

    let mut genes = second.genes;
    genes[..cut].copy_from_slice(&first.genes[..cut]);
    Genotype { genes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gene(turn: u8) -> Gene {
        Gene::new(turn).unwrap()
    }

    #[test]
    fn test_gene_range() {
        assert!(Gene::new(0).is_ok());
        assert!(Gene::new(7).is_ok());
        assert!(Gene::new(8).is_err());
    }

    #[test]
    fn test_gene_apply_turns_clockwise() {
        assert_eq!(gene(0).apply(Direction::North), Direction::North);
        assert_eq!(gene(2).apply(Direction::North), Direction::East);
        assert_eq!(gene(4).apply(Direction::East), Direction::West);
    }

    #[test]
    fn test_from_turns_validates() {
        assert!(Genotype::from_turns(&[0; 31]).is_err());
        assert!(Genotype::from_turns(&[9; 32]).is_err());
        let genotype = Genotype::from_turns(&[3; 32]).unwrap();
        assert_eq!(genotype, Genotype::uniform(gene(3)));
    }

    #[test]
    fn test_display_is_gene_digits() {
        let mut turns = [0u8; 32];
        turns[0] = 7;
        turns[31] = 5;
        let genotype = Genotype::from_turns(&turns).unwrap();
        assert_eq!(genotype.to_string(), "70000000000000000000000000000005");
    }

    #[test]
    fn test_gene_at_wraps() {
        let mut turns = [0u8; 32];
        turns[1] = 6;
        let genotype = Genotype::from_turns(&turns).unwrap();
        assert_eq!(genotype.gene_at(33), gene(6));
    }

    #[test]
    fn test_crossover_cut_follows_energy_share() {
        let zeros = Genotype::uniform(gene(0));
        let ones = Genotype::uniform(gene(1));

        // 3/4 of the energy: the first 24 genes come from the first parent
        let child = crossover(&zeros, 30, &ones, 10);
        assert!(child.genes()[..24].iter().all(|g| *g == gene(0)));
        assert!(child.genes()[24..].iter().all(|g| *g == gene(1)));

        // equal energy splits in the middle
        let child = crossover(&zeros, 10, &ones, 10);
        assert_eq!(child.genes().iter().filter(|g| **g == gene(0)).count(), 16);
        assert_eq!(child.genes()[15], gene(0));
        assert_eq!(child.genes()[16], gene(1));
    }

    #[test]
    fn test_crossover_degenerate_energies() {
        let zeros = Genotype::uniform(gene(0));
        let ones = Genotype::uniform(gene(1));
        assert_eq!(crossover(&zeros, 0, &ones, 10), ones);
        assert_eq!(crossover(&zeros, 10, &ones, 0), zeros);
        let child = crossover(&zeros, 0, &ones, 0);
        assert_eq!(child.genes()[15], gene(0));
        assert_eq!(child.genes()[16], gene(1));
    }

    #[test]
    fn test_serde_rejects_bad_gene() {
        let genotype = Genotype::uniform(gene(2));
        let json = serde_json::to_string(&genotype).unwrap();
        let parsed: Genotype = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, genotype);

        let bad = json.replacen('2', "9", 1);
        assert!(serde_json::from_str::<Genotype>(&bad).is_err());
    }

    fn arb_genotype() -> impl Strategy<Value = Genotype> {
        prop::collection::vec(0u8..8, GENOTYPE_LENGTH)
            .prop_map(|turns| Genotype::from_turns(&turns).unwrap())
    }

    proptest! {
        #[test]
        fn crossover_keeps_length_and_gene_range(
            first in arb_genotype(),
            second in arb_genotype(),
            e1 in 0i32..10_000,
            e2 in 0i32..10_000,
        ) {
            let child = crossover(&first, e1, &second, e2);
            prop_assert_eq!(child.genes().len(), GENOTYPE_LENGTH);
            prop_assert!(child.genes().iter().all(|g| g.turn() < Gene::VARIANTS));
        }

        #[test]
        fn crossover_is_prefix_plus_suffix(
            first in arb_genotype(),
            second in arb_genotype(),
            e1 in 1i32..10_000,
            e2 in 1i32..10_000,
        ) {
            let child = crossover(&first, e1, &second, e2);
            let cut = (GENOTYPE_LENGTH as i64 * e1 as i64 / (e1 as i64 + e2 as i64)) as usize;
            prop_assert_eq!(&child.genes()[..cut], &first.genes()[..cut]);
            prop_assert_eq!(&child.genes()[cut..], &second.genes()[cut..]);
        }

        #[test]
        fn stronger_parent_contributes_larger_block(
            weak in 1i32..5_000,
            extra in 0i32..5_000,
        ) {
            let strong_genes = Genotype::uniform(Gene(0));
            let weak_genes = Genotype::uniform(Gene(1));
            let child = crossover(&strong_genes, weak + extra, &weak_genes, weak);
            let from_strong = child.genes().iter().filter(|g| **g == Gene(0)).count();
            prop_assert!(from_strong >= GENOTYPE_LENGTH - from_strong);
        }
    }
}
