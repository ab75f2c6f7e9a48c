//! Public mining entry points.

use tracing::instrument;

use crate::domain::entities::{HighUtilityItemset, Transaction};
use crate::domain::mining::plan::MiningPlan;
use crate::domain::mining::threshold::{clamp_alpha, LevelThresholds};
use crate::domain::taxonomy::Taxonomy;

/// Mine high-utility itemsets over leaf items, ignoring any taxonomy.
///
/// Results are returned in discovery order (DFS pre-order of the TWU order).
#[instrument(level = "debug", skip(transactions))]
pub fn mine_basic(transactions: &[Transaction], min_util: u64) -> Vec<HighUtilityItemset> {
    if transactions.is_empty() {
        return Vec::new();
    }
    MiningPlan::basic(transactions, min_util).execute(false)
}

/// Mine generalized high-utility itemsets, one level of the taxonomy at a time.
///
/// Results are sorted by level ascending, then utility descending.
pub fn mine_generalized(
    transactions: &[Transaction],
    taxonomy: &Taxonomy,
    min_util: u64,
    alpha_step: f64,
) -> Vec<HighUtilityItemset> {
    GeneralizedMiner::new(taxonomy)
        .with_alpha_step(alpha_step)
        .mine(transactions, min_util)
}

/// Taxonomy-aware miner with level-scaled thresholds.
#[derive(Debug, Clone, Copy)]
pub struct GeneralizedMiner<'t> {
    taxonomy: &'t Taxonomy,
    alpha_step: f64,
    parallel: bool,
}

impl<'t> GeneralizedMiner<'t> {
    pub const DEFAULT_ALPHA_STEP: f64 = LevelThresholds::DEFAULT_ALPHA_STEP;

    pub fn new(taxonomy: &'t Taxonomy) -> Self {
        Self {
            taxonomy,
            alpha_step: Self::DEFAULT_ALPHA_STEP,
            parallel: false,
        }
    }

    /// Negative or NaN values are clamped to 0.
    pub fn with_alpha_step(mut self, alpha_step: f64) -> Self {
        self.alpha_step = clamp_alpha(alpha_step);
        self
    }

    /// Mine independent levels concurrently.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn alpha_step(&self) -> f64 {
        self.alpha_step
    }

    pub fn thresholds(&self, min_util: u64) -> LevelThresholds {
        LevelThresholds::new(min_util, self.alpha_step)
    }

    /// Compute levels, TWU and per-level candidates without searching.
    pub fn plan<'a>(&self, transactions: &'a [Transaction], min_util: u64) -> MiningPlan<'a>
    where
        't: 'a,
    {
        MiningPlan::generalized(transactions, self.taxonomy, self.thresholds(min_util))
    }

    #[instrument(level = "debug", skip(self, transactions), fields(alpha_step = self.alpha_step))]
    pub fn mine(&self, transactions: &[Transaction], min_util: u64) -> Vec<HighUtilityItemset> {
        if transactions.is_empty() {
            return Vec::new();
        }
        let mut found = self.plan(transactions, min_util).execute(self.parallel);
        sort_by_level_then_utility(&mut found);
        found
    }
}

/// Level ascending, utility descending; stable, so discovery order breaks ties.
pub fn sort_by_level_then_utility(itemsets: &mut [HighUtilityItemset]) {
    itemsets.sort_by(|a, b| a.level.cmp(&b.level).then(b.utility.cmp(&a.utility)));
}
