//! Mining service
//!
//! Resolves mining parameters from settings and runs the basic or generalized miner.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, instrument};

use crate::config::Settings;
use crate::domain::mining::{mine_basic, GeneralizedMiner};
use crate::domain::{Dataset, HighUtilityItemset};

/// Which miner to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MiningMode {
    /// Leaf items only
    Basic,
    /// Leaf items and taxonomy categories, level by level
    Generalized,
}

/// Effective parameters of one mining run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MiningParams {
    pub min_util: u64,
    pub alpha_step: f64,
    pub parallel: bool,
}

/// Outcome of one mining run.
#[derive(Debug, Clone, Serialize)]
pub struct MiningReport {
    pub mode: MiningMode,
    pub params: MiningParams,
    pub transactions: usize,
    pub itemsets: Vec<HighUtilityItemset>,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// A taxonomy node as seen by the level planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub name: String,
    pub twu: u64,
    pub retained: bool,
}

/// Candidates of one level with their threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSummary {
    pub level: usize,
    pub threshold: u64,
    /// Retained nodes in search order, then pruned nodes by name
    pub nodes: Vec<NodeSummary>,
}

/// Service running the miners with configured defaults.
pub struct MiningService {
    settings: Arc<Settings>,
}

impl MiningService {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Fill unspecified parameters from settings.
    pub fn params(
        &self,
        min_util: Option<u64>,
        alpha_step: Option<f64>,
        parallel: Option<bool>,
    ) -> MiningParams {
        MiningParams {
            min_util: min_util.unwrap_or(self.settings.min_util),
            alpha_step: alpha_step.unwrap_or(self.settings.alpha_step).max(0.0),
            parallel: parallel.unwrap_or(self.settings.parallel),
        }
    }

    #[instrument(level = "debug", skip(self, dataset))]
    pub fn mine(&self, dataset: &Dataset, mode: MiningMode, params: MiningParams) -> MiningReport {
        let started = Instant::now();
        let itemsets = match mode {
            MiningMode::Basic => mine_basic(&dataset.transactions, params.min_util),
            MiningMode::Generalized => GeneralizedMiner::new(&dataset.taxonomy)
                .with_alpha_step(params.alpha_step)
                .with_parallel(params.parallel)
                .mine(&dataset.transactions, params.min_util),
        };
        let elapsed = started.elapsed();
        info!(
            "{:?} mining: {} itemsets in {:?}",
            mode,
            itemsets.len(),
            elapsed
        );

        MiningReport {
            mode,
            params,
            transactions: dataset.transactions.len(),
            itemsets,
            elapsed,
        }
    }

    /// Per-level thresholds and candidate nodes of the generalized miner.
    pub fn level_summary(&self, dataset: &Dataset, params: MiningParams) -> Vec<LevelSummary> {
        let miner = GeneralizedMiner::new(&dataset.taxonomy).with_alpha_step(params.alpha_step);
        let plan = miner.plan(&dataset.transactions, params.min_util);

        plan.levels()
            .iter()
            .map(|level| LevelSummary {
                level: level.level,
                threshold: level.threshold,
                nodes: level
                    .candidates
                    .iter()
                    .map(|c| (c, true))
                    .chain(level.pruned.iter().map(|c| (c, false)))
                    .map(|(c, retained)| NodeSummary {
                        name: c.name.to_string(),
                        twu: c.twu,
                        retained,
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DatasetBuilder;

    fn dataset() -> Dataset {
        let mut b = DatasetBuilder::new();
        b.profit("A", 4).unwrap().profit("B", 1).unwrap();
        b.transaction(1, [("A", 1), ("B", 2)]).unwrap();
        b.transaction(2, [("B", 3)]).unwrap();
        b.relation("A", "X").unwrap().relation("B", "X").unwrap();
        b.build()
    }

    fn service() -> MiningService {
        MiningService::new(Arc::new(Settings::default()))
    }

    #[test]
    fn given_no_overrides_when_resolving_params_then_uses_settings() {
        let params = service().params(None, None, None);
        let defaults = Settings::default();
        assert_eq!(params.min_util, defaults.min_util);
        assert_eq!(params.alpha_step, defaults.alpha_step);
        assert_eq!(params.parallel, defaults.parallel);
    }

    #[test]
    fn given_negative_alpha_override_when_resolving_params_then_clamped() {
        let params = service().params(Some(3), Some(-1.0), Some(true));
        assert_eq!(params.min_util, 3);
        assert_eq!(params.alpha_step, 0.0);
        assert!(params.parallel);
    }

    #[test]
    fn given_dataset_when_mining_generalized_then_reports_levels() {
        let svc = service();
        let params = svc.params(Some(4), Some(0.5), Some(false));

        let report = svc.mine(&dataset(), MiningMode::Generalized, params);

        // level 0: A=4, B=5 ; level 1 (thr 6): X=9
        let found: Vec<(Vec<String>, u64, usize)> = report
            .itemsets
            .iter()
            .map(|h| (h.items.clone(), h.utility, h.level))
            .collect();
        assert_eq!(
            found,
            vec![
                (vec!["A".to_string(), "B".to_string()], 6, 0),
                (vec!["B".to_string()], 5, 0),
                (vec!["A".to_string()], 4, 0),
                (vec!["X".to_string()], 9, 1),
            ]
        );
        assert_eq!(report.transactions, 2);
    }

    #[test]
    fn given_dataset_when_summarizing_levels_then_lists_retained_and_pruned() {
        let svc = service();
        let params = svc.params(Some(7), Some(0.5), None);

        let summary = svc.level_summary(&dataset(), params);

        assert_eq!(summary.len(), 2);
        // TWU: A=6, B=9 ; threshold 7 keeps only B at level 0
        assert_eq!(summary[0].threshold, 7);
        assert_eq!(
            summary[0].nodes,
            vec![
                NodeSummary { name: "B".into(), twu: 9, retained: true },
                NodeSummary { name: "A".into(), twu: 6, retained: false },
            ]
        );
        // level 1 threshold ceil(1.5 * 7) = 11 > TWU(X) = 9
        assert_eq!(summary[1].threshold, 11);
        assert!(!summary[1].nodes[0].retained);
    }
}
