//! Per-day statistics and the end-of-run summary.

use crate::map::WorldMap;
use eco_genetics::Genotype;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Snapshot of the world at the end of one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    /// Day this snapshot closes, starting at 1
    pub day: u64,
    /// Living animals
    pub animals: usize,
    pub plants: usize,
    /// Most common genotype among living animals
    pub dominant_genotype: Option<Genotype>,
    /// Mean age at death over every cull so far
    pub average_lifetime: i64,
    /// Mean energy of living animals
    pub average_energy: i64,
    /// Mean children count of living animals
    pub average_children: i64,
}

/// Aggregate over all recorded days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Day counter of the engine when the summary was taken
    pub total_days: u64,
    pub average_animals: i64,
    pub average_plants: i64,
    pub average_lifetime: i64,
    pub average_energy: i64,
    pub average_children: i64,
    /// Dominant genotype of the last recorded day
    pub dominant_genotype: Option<Genotype>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total days: {}", self.total_days)?;
        writeln!(f, "Average animals: {}", self.average_animals)?;
        writeln!(f, "Average plants: {}", self.average_plants)?;
        writeln!(f, "Average lifetime: {}", self.average_lifetime)?;
        writeln!(f, "Average energy: {}", self.average_energy)?;
        writeln!(f, "Average children: {}", self.average_children)?;
        match &self.dominant_genotype {
            Some(genotype) => writeln!(f, "Final dominant genome: {}", genotype),
            None => writeln!(f, "Final dominant genome: none"),
        }
    }
}

/// Mean rounded half up, 0 for an empty set
pub fn rounded_mean(sum: i64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    let count = count as i64;
    (2 * sum + count).div_euclid(2 * count)
}

#[derive(Debug, Clone, Default)]
pub struct StatisticsAggregator {
    statistics: Vec<Statistic>,
    lifetimes: Vec<u64>,
}

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the age of a culled animal
    pub fn record_death(&mut self, age: u64) {
        self.lifetimes.push(age);
    }

    pub fn lifetimes(&self) -> &[u64] {
        &self.lifetimes
    }

    pub fn statistics(&self) -> &[Statistic] {
        &self.statistics
    }

    pub fn last(&self) -> Option<&Statistic> {
        self.statistics.last()
    }

    pub fn average_lifetime(&self) -> i64 {
        let total: u64 = self.lifetimes.iter().sum();
        rounded_mean(total as i64, self.lifetimes.len())
    }

    /// Build the snapshot for `day` from the map and append it
    pub fn record_day(&mut self, day: u64, map: &WorldMap) -> &Statistic {
        let statistic = self.snapshot(day, map);
        self.statistics.push(statistic);
        &self.statistics[self.statistics.len() - 1]
    }

    pub fn snapshot(&self, day: u64, map: &WorldMap) -> Statistic {
        let living: Vec<_> = map.living_animals().collect();
        let energy: i64 = living.iter().map(|a| a.energy() as i64).sum();
        let children: i64 = living.iter().map(|a| a.children() as i64).sum();

        Statistic {
            day,
            animals: living.len(),
            plants: map.plant_count(),
            dominant_genotype: dominant_genotype(living.iter().map(|a| a.genotype())),
            average_lifetime: self.average_lifetime(),
            average_energy: rounded_mean(energy, living.len()),
            average_children: rounded_mean(children, living.len()),
        }
    }

    /// `None` until at least one day has been recorded. `day_counter` is
    /// reported as the total day count.
    pub fn summary(&self, day_counter: u64) -> Option<Summary> {
        let last = self.statistics.last()?;
        let days = self.statistics.len();
        let mean = |field: fn(&Statistic) -> i64| {
            rounded_mean(self.statistics.iter().map(field).sum(), days)
        };

        Some(Summary {
            total_days: day_counter,
            average_animals: mean(|s| s.animals as i64),
            average_plants: mean(|s| s.plants as i64),
            average_lifetime: mean(|s| s.average_lifetime),
            average_energy: mean(|s| s.average_energy),
            average_children: mean(|s| s.average_children),
            dominant_genotype: last.dominant_genotype.clone(),
        })
    }
}

/// Most frequent genotype; among equally frequent ones the first seen wins
pub fn dominant_genotype<'a>(genotypes: impl Iterator<Item = &'a Genotype> + Clone) -> Option<Genotype> {
    let mut counts: HashMap<&Genotype, usize> = HashMap::new();
    for genotype in genotypes.clone() {
        *counts.entry(genotype).or_insert(0) += 1;
    }
    let best = counts.values().copied().max()?;
    genotypes
        .into_iter()
        .find(|genotype| counts.get(genotype) == Some(&best))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organism::{Animal, AnimalId};
    use eco_core::Position;
    use eco_genetics::Gene;

    fn genotype(turn: u8) -> Genotype {
        Genotype::uniform(Gene::new(turn).unwrap())
    }

    fn statistic(day: u64, animals: usize, plants: usize, lifetime: i64, energy: i64, children: i64) -> Statistic {
        Statistic {
            day,
            animals,
            plants,
            dominant_genotype: Some(genotype(day as u8 % 8)),
            average_lifetime: lifetime,
            average_energy: energy,
            average_children: children,
        }
    }

    #[test]
    fn test_rounded_mean() {
        assert_eq!(rounded_mean(0, 0), 0);
        assert_eq!(rounded_mean(7, 2), 4);
        assert_eq!(rounded_mean(5, 3), 2);
        assert_eq!(rounded_mean(10, 4), 3);
        assert_eq!(rounded_mean(9, 4), 2);
    }

    #[test]
    fn test_dominant_genotype_counts_and_ties() {
        let a = genotype(1);
        let b = genotype(2);
        let c = genotype(3);

        let list = [a.clone(), b.clone(), b.clone(), c.clone()];
        assert_eq!(dominant_genotype(list.iter()), Some(b.clone()));

        let tie = [c.clone(), a.clone(), a.clone(), c.clone()];
        assert_eq!(dominant_genotype(tie.iter()), Some(c));

        let empty: [Genotype; 0] = [];
        assert_eq!(dominant_genotype(empty.iter()), None);
    }

    #[test]
    fn test_snapshot_of_empty_world_is_zeroed() {
        let map = WorldMap::new(3, 3, 0.5).unwrap();
        let stats = StatisticsAggregator::new();
        let snapshot = stats.snapshot(1, &map);
        assert_eq!(snapshot.animals, 0);
        assert_eq!(snapshot.average_energy, 0);
        assert_eq!(snapshot.average_children, 0);
        assert_eq!(snapshot.average_lifetime, 0);
        assert!(snapshot.dominant_genotype.is_none());
    }

    #[test]
    fn test_snapshot_ignores_dead_animals() {
        let mut map = WorldMap::new(3, 3, 0.5).unwrap();
        map.add_animal(Animal::new(AnimalId(0), Position::new(0, 0), 10, genotype(1), 1));
        map.add_animal(Animal::new(AnimalId(1), Position::new(1, 0), 5, genotype(2), 1));
        map.add_animal(Animal::new(AnimalId(2), Position::new(2, 0), 0, genotype(3), 1));

        let mut stats = StatisticsAggregator::new();
        stats.record_death(4);
        stats.record_death(5);
        let snapshot = stats.record_day(1, &map).clone();

        assert_eq!(snapshot.animals, 2);
        assert_eq!(snapshot.average_energy, 8);
        assert_eq!(snapshot.average_lifetime, 5);
        assert_eq!(snapshot.dominant_genotype, Some(genotype(1)));
        assert_eq!(stats.statistics().len(), 1);
    }

    #[test]
    fn test_summary_averages_days() {
        let mut stats = StatisticsAggregator::new();
        assert!(stats.summary(1).is_none());

        stats.statistics.push(statistic(1, 10, 4, 0, 20, 0));
        stats.statistics.push(statistic(2, 13, 5, 3, 25, 1));

        let summary = stats.summary(3).unwrap();
        assert_eq!(summary.total_days, 3);
        assert_eq!(summary.average_animals, 12);
        assert_eq!(summary.average_plants, 5);
        assert_eq!(summary.average_lifetime, 2);
        assert_eq!(summary.average_energy, 23);
        assert_eq!(summary.average_children, 1);
        assert_eq!(summary.dominant_genotype, Some(genotype(2)));
    }

    #[test]
    fn test_summary_report_format() {
        let summary = Summary {
            total_days: 3,
            average_animals: 4,
            average_plants: 5,
            average_lifetime: 6,
            average_energy: 7,
            average_children: 8,
            dominant_genotype: None,
        };
        assert_eq!(
            summary.to_string(),
            "Total days: 3\nAverage animals: 4\nAverage plants: 5\nAverage lifetime: 6\n\
             Average energy: 7\nAverage children: 8\nFinal dominant genome: none\n"
        );
    }

    #[test]
    fn test_statistic_json_round_trip() {
        let original = statistic(4, 7, 3, 12, 30, 2);
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"animals\":7"));
        let decoded: Statistic = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, original);

        let mut stats = StatisticsAggregator::new();
        stats.statistics.push(original);
        let summary = stats.summary(5).unwrap();
        let decoded: Summary = serde_json::from_str(&serde_json::to_string(&summary).unwrap()).unwrap();
        assert_eq!(decoded, summary);
    }
}
