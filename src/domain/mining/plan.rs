//! Level assignment, candidate selection and per-level execution.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::domain::entities::{HighUtilityItemset, Transaction};
use crate::domain::mining::preprocess::{
    generalize, leaf_items, leaf_profiles, transaction_weighted_utilization, TransactionProfile,
};
use crate::domain::mining::search::{search, SearchContext};
use crate::domain::mining::threshold::LevelThresholds;
use crate::domain::mining::utility_list::build_utility_lists;
use crate::domain::taxonomy::Taxonomy;

/// A node together with its TWU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub name: &'a str,
    pub twu: u64,
}

/// Candidates of one taxonomy level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelPlan<'a> {
    pub level: usize,
    pub threshold: u64,
    /// Retained nodes in the fixed search order (ascending TWU, then name)
    pub candidates: Vec<Candidate<'a>>,
    /// Nodes whose TWU is below the level threshold, by name
    pub pruned: Vec<Candidate<'a>>,
}

impl<'a> LevelPlan<'a> {
    pub fn order(&self) -> Vec<&'a str> {
        self.candidates.iter().map(|c| c.name).collect()
    }
}

/// Everything needed to run the search, computed once per mining call.
#[derive(Debug, Clone)]
pub struct MiningPlan<'a> {
    thresholds: LevelThresholds,
    profiles: Vec<TransactionProfile<'a>>,
    levels: Vec<LevelPlan<'a>>,
    unreachable: Vec<&'a str>,
}

impl<'a> MiningPlan<'a> {
    /// Plan over leaf items only; every candidate sits at level 0.
    #[instrument(level = "debug", skip(transactions))]
    pub fn basic(transactions: &'a [Transaction], min_util: u64) -> Self {
        let profiles = leaf_profiles(transactions);
        let twu = transaction_weighted_utilization(&profiles);
        let levels: BTreeMap<&'a str, usize> = twu.keys().map(|&n| (n, 0)).collect();
        Self::assemble(LevelThresholds::flat(min_util), profiles, &twu, &levels, Vec::new())
    }

    /// Plan over leaf items and their generalized ancestors, one search per level.
    #[instrument(level = "debug", skip(transactions, taxonomy))]
    pub fn generalized(
        transactions: &'a [Transaction],
        taxonomy: &'a Taxonomy,
        thresholds: LevelThresholds,
    ) -> Self {
        let profiles = leaf_profiles(transactions);
        let leaves: BTreeSet<&'a str> = leaf_items(&profiles);
        let profiles = generalize(profiles, taxonomy, &leaves);
        let twu = transaction_weighted_utilization(&profiles);

        let levels: BTreeMap<&'a str, usize> = twu
            .keys()
            .filter_map(|&node| taxonomy.level(node, &leaves).map(|level| (node, level)))
            .collect();
        // taxonomy nodes never reached from an occurring leaf item
        let unreachable: Vec<&'a str> = taxonomy
            .nodes()
            .into_iter()
            .filter(|node| !levels.contains_key(node))
            .collect();
        if !unreachable.is_empty() {
            debug!("Excluding nodes without reachable leaf: {:?}", unreachable);
        }

        Self::assemble(thresholds, profiles, &twu, &levels, unreachable)
    }

    fn assemble(
        thresholds: LevelThresholds,
        profiles: Vec<TransactionProfile<'a>>,
        twu: &BTreeMap<&'a str, u64>,
        levels: &BTreeMap<&'a str, usize>,
        unreachable: Vec<&'a str>,
    ) -> Self {
        let mut by_level: BTreeMap<usize, LevelPlan<'a>> = BTreeMap::new();
        for (&name, &level) in levels {
            let threshold = thresholds.for_level(level);
            let plan = by_level.entry(level).or_insert_with(|| LevelPlan {
                level,
                threshold,
                candidates: Vec::new(),
                pruned: Vec::new(),
            });
            let candidate = Candidate {
                name,
                twu: twu.get(name).copied().unwrap_or(0),
            };
            if candidate.twu >= threshold {
                plan.candidates.push(candidate);
            } else {
                plan.pruned.push(candidate);
            }
        }

        let mut levels: Vec<LevelPlan<'a>> = by_level.into_values().collect();
        for plan in &mut levels {
            // names are iterated sorted, so a stable sort keeps name order among equal TWU
            plan.candidates.sort_by_key(|c| c.twu);
            debug!(
                level = plan.level,
                threshold = plan.threshold,
                retained = plan.candidates.len(),
                pruned = plan.pruned.len(),
                "level planned"
            );
        }

        Self {
            thresholds,
            profiles,
            levels,
            unreachable,
        }
    }

    pub fn thresholds(&self) -> LevelThresholds {
        self.thresholds
    }

    pub fn levels(&self) -> &[LevelPlan<'a>] {
        &self.levels
    }

    pub fn level(&self, level: usize) -> Option<&LevelPlan<'a>> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// Nodes dropped because no leaf item is reachable below them.
    pub fn unreachable(&self) -> &[&'a str] {
        &self.unreachable
    }

    pub fn transaction_count(&self) -> usize {
        self.profiles.len()
    }

    /// Run the search of a single level.
    #[instrument(level = "debug", skip(self, plan), fields(level = plan.level))]
    pub fn mine_level(&self, plan: &LevelPlan<'a>) -> Vec<HighUtilityItemset> {
        let order = plan.order();
        let lists: Vec<_> = build_utility_lists(&order, &self.profiles)
            .into_iter()
            .filter(|l| !l.is_empty())
            .collect();
        let found = search(
            SearchContext {
                level: plan.level,
                threshold: plan.threshold,
            },
            &lists,
        );
        debug!("level {}: {} itemsets", plan.level, found.len());
        found
    }

    /// Run every level, in level order. With `parallel`, levels run on the rayon pool;
    /// the concatenated output is identical either way.
    pub fn execute(&self, parallel: bool) -> Vec<HighUtilityItemset> {
        let per_level: Vec<Vec<HighUtilityItemset>> = if parallel {
            self.levels.par_iter().map(|l| self.mine_level(l)).collect()
        } else {
            self.levels.iter().map(|l| self.mine_level(l)).collect()
        };
        let found: Vec<HighUtilityItemset> = per_level.into_iter().flatten().collect();
        info!(
            "Mined {} itemsets over {} levels from {} transactions",
            found.len(),
            self.levels.len(),
            self.profiles.len()
        );
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Item, TransactionItem};

    fn grocery() -> Vec<Transaction> {
        let t = |tid, entries: &[(&str, u64, u64)]| {
            Transaction::new(
                tid,
                entries
                    .iter()
                    .map(|(n, p, q)| TransactionItem::new(Item::new(*n, *p), *q))
                    .collect(),
            )
        };
        vec![
            t(1, &[("Coke", 5, 2), ("Bread", 1, 2), ("Steak", 10, 1)]),
            t(2, &[("Water", 1, 3), ("Pasta", 2, 2), ("Steak", 10, 1)]),
            t(3, &[("Water", 1, 2), ("Bread", 1, 2)]),
            t(4, &[("Coke", 5, 1), ("Bread", 1, 2)]),
        ]
    }

    #[test]
    fn given_grocery_when_planning_basic_then_orders_by_twu_and_drops_pasta() {
        let txs = grocery();
        let plan = MiningPlan::basic(&txs, 20);

        assert_eq!(plan.levels().len(), 1);
        let level0 = &plan.levels()[0];
        assert_eq!(level0.order(), vec!["Water", "Coke", "Bread", "Steak"]);
        assert_eq!(
            level0.pruned,
            vec![Candidate {
                name: "Pasta",
                twu: 17
            }]
        );
    }

    #[test]
    fn given_equal_twu_when_planning_then_ties_broken_by_name() {
        let txs = grocery();
        let mut taxonomy = Taxonomy::new();
        for (child, parent) in [
            ("Coke", "Beverage"),
            ("Water", "Beverage"),
            ("Bread", "Food"),
            ("Pasta", "Food"),
            ("Steak", "Food"),
        ] {
            taxonomy.add_relation(child, parent).unwrap();
        }

        let plan = MiningPlan::generalized(&txs, &taxonomy, LevelThresholds::new(20, 0.5));

        let level1 = plan.level(1).expect("level 1 planned");
        assert_eq!(level1.threshold, 30);
        assert_eq!(level1.order(), vec!["Beverage", "Food"]);
        assert_eq!(plan.level(0).map(|l| l.threshold), Some(20));
    }

    #[test]
    fn given_category_above_unsold_items_when_planning_then_not_a_candidate() {
        let txs = grocery();
        let mut taxonomy = Taxonomy::new();
        taxonomy.add_relation("Caviar", "Luxury").unwrap();
        taxonomy.add_relation("Steak", "Food").unwrap();

        let plan = MiningPlan::generalized(&txs, &taxonomy, LevelThresholds::new(20, 0.5));

        // Luxury never occurs in a transaction, so it has no TWU entry at all
        assert!(plan
            .levels()
            .iter()
            .flat_map(|l| l.candidates.iter().chain(l.pruned.iter()))
            .all(|c| c.name != "Luxury"));
        assert_eq!(plan.unreachable(), &["Caviar", "Luxury"]);
    }

    #[test]
    fn given_plan_when_executing_in_parallel_then_matches_sequential() {
        let txs = grocery();
        let mut taxonomy = Taxonomy::new();
        taxonomy.add_relation("Coke", "Beverage").unwrap();
        taxonomy.add_relation("Water", "Beverage").unwrap();
        taxonomy.add_relation("Bread", "Food").unwrap();
        taxonomy.add_relation("Steak", "Food").unwrap();
        taxonomy.add_relation("Beverage", "Grocery").unwrap();
        taxonomy.add_relation("Food", "Grocery").unwrap();

        let plan = MiningPlan::generalized(&txs, &taxonomy, LevelThresholds::new(10, 0.5));

        assert_eq!(plan.execute(true), plan.execute(false));
        assert_eq!(plan.transaction_count(), 4);
    }
}
