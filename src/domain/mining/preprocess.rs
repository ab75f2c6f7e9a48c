//! Transaction utility (TU) and transaction-weighted utilization (TWU).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, instrument, warn};

use crate::domain::entities::{Tid, Transaction};
use crate::domain::taxonomy::Taxonomy;

/// Per-transaction utilities of every node present in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionProfile<'a> {
    pub tid: Tid,
    /// Transaction utility: sum of the leaf item utilities
    pub tu: u64,
    /// Utility of each present node; a present node may carry utility 0
    pub node_utilities: BTreeMap<&'a str, u64>,
}

/// Aggregate leaf utilities per transaction, ordered by ascending tid.
///
/// Repeated entries of one item are summed. Transactions sharing a tid are merged.
#[instrument(level = "debug", skip(transactions), fields(count = transactions.len()))]
pub fn leaf_profiles(transactions: &[Transaction]) -> Vec<TransactionProfile<'_>> {
    let mut by_tid: BTreeMap<Tid, BTreeMap<&str, u64>> = BTreeMap::new();
    let mut seen = 0usize;
    for t in transactions {
        let entry = by_tid.entry(t.tid()).or_default();
        seen += 1;
        for ti in t.items() {
            let slot = entry.entry(ti.name()).or_insert(0);
            *slot = slot.saturating_add(ti.utility());
        }
    }
    if by_tid.len() < seen {
        warn!(
            "Merged {} transactions with duplicate tids",
            seen - by_tid.len()
        );
    }

    by_tid
        .into_iter()
        .map(|(tid, node_utilities)| TransactionProfile {
            tid,
            tu: node_utilities
                .values()
                .fold(0u64, |acc, &u| acc.saturating_add(u)),
            node_utilities,
        })
        .collect()
}

/// Names occurring directly in at least one transaction.
pub fn leaf_items<'a>(profiles: &[TransactionProfile<'a>]) -> BTreeSet<&'a str> {
    profiles
        .iter()
        .flat_map(|p| p.node_utilities.keys().copied())
        .collect()
}

/// Extend leaf profiles with the generalized ancestors of each present leaf.
///
/// A category's utility is the sum over all leaf items below it. Leaf items that are also
/// categories keep only their own direct utility.
#[instrument(level = "debug", skip_all)]
pub fn generalize<'a>(
    profiles: Vec<TransactionProfile<'a>>,
    taxonomy: &'a Taxonomy,
    leaf_items: &BTreeSet<&'a str>,
) -> Vec<TransactionProfile<'a>> {
    let mut ancestor_cache: HashMap<&'a str, Vec<&'a str>> = HashMap::new();

    profiles
        .into_iter()
        .map(|mut profile| {
            let leaves: Vec<(&'a str, u64)> = profile
                .node_utilities
                .iter()
                .map(|(&name, &u)| (name, u))
                .collect();
            for (leaf, utility) in leaves {
                let ancestors = ancestor_cache
                    .entry(leaf)
                    .or_insert_with(|| taxonomy.ancestors(leaf));
                for &ancestor in ancestors.iter() {
                    if leaf_items.contains(ancestor) {
                        continue;
                    }
                    let slot = profile.node_utilities.entry(ancestor).or_insert(0);
                    *slot = slot.saturating_add(utility);
                }
            }
            profile
        })
        .collect()
}

/// TWU of every node: sum of TU over the transactions in which the node is present.
#[instrument(level = "debug", skip_all)]
pub fn transaction_weighted_utilization<'a>(
    profiles: &[TransactionProfile<'a>],
) -> BTreeMap<&'a str, u64> {
    let mut twu: BTreeMap<&'a str, u64> = BTreeMap::new();
    for profile in profiles {
        for &node in profile.node_utilities.keys() {
            let slot = twu.entry(node).or_insert(0);
            *slot = slot.saturating_add(profile.tu);
        }
    }
    debug!("TWU computed for {} nodes", twu.len());
    twu
}
