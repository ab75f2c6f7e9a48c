//! Dataset builder: assembles transactions, profits and taxonomy from raw input.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::entities::{Dataset, Item, Tid, Transaction, TransactionItem};
use crate::domain::error::DomainError;
use crate::domain::taxonomy::Taxonomy;

/// Result type for dataset construction.
pub type BuildResult<T> = Result<T, DomainError>;

/// Collects raw input and produces a [`Dataset`].
///
/// Raw numbers may be negative; they are clamped to 0. Items without a declared profit
/// contribute 0 utility.
pub struct DatasetBuilder {
    profits: BTreeMap<String, u64>,
    raw_transactions: Vec<(Tid, Vec<(String, i64)>)>,
    taxonomy: Taxonomy,
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self {
            profits: BTreeMap::new(),
            raw_transactions: Vec::new(),
            taxonomy: Taxonomy::new(),
        }
    }

    pub fn profit(&mut self, name: &str, profit: i64) -> BuildResult<&mut Self> {
        if name.is_empty() {
            return Err(DomainError::EmptyName { context: "profit table" });
        }
        self.profits
            .insert(name.to_string(), clamp("profit", name, profit));
        Ok(self)
    }

    pub fn transaction<N: Into<String>>(
        &mut self,
        tid: Tid,
        entries: impl IntoIterator<Item = (N, i64)>,
    ) -> BuildResult<&mut Self> {
        let entries: Vec<(String, i64)> = entries
            .into_iter()
            .map(|(name, quantity)| (name.into(), quantity))
            .collect();
        if entries.iter().any(|(name, _)| name.is_empty()) {
            return Err(DomainError::EmptyName { context: "transaction" });
        }
        self.raw_transactions.push((tid, entries));
        Ok(self)
    }

    pub fn relation(&mut self, child: &str, parent: &str) -> BuildResult<&mut Self> {
        self.taxonomy.add_relation(child, parent)?;
        Ok(self)
    }

    /// Resolve item profits and produce the dataset.
    pub fn build(self) -> Dataset {
        let Self {
            profits,
            raw_transactions,
            taxonomy,
        } = self;

        let mut unpriced = Vec::new();
        let transactions = raw_transactions
            .into_iter()
            .map(|(tid, entries)| {
                let items = entries
                    .into_iter()
                    .map(|(name, quantity)| {
                        let quantity = clamp("quantity", &name, quantity);
                        let profit = match profits.get(&name) {
                            Some(&p) => p,
                            None => {
                                unpriced.push(name.clone());
                                0
                            }
                        };
                        TransactionItem::new(Item::new(name, profit), quantity)
                    })
                    .collect();
                Transaction::new(tid, items)
            })
            .collect::<Vec<_>>();

        if !unpriced.is_empty() {
            unpriced.sort();
            unpriced.dedup();
            warn!("Items without profit (counted as 0): {}", unpriced.join(", "));
        }
        debug!(
            "Built dataset: {} transactions, {} priced items, {} taxonomy nodes",
            transactions.len(),
            profits.len(),
            taxonomy.len()
        );

        Dataset {
            transactions,
            profits,
            taxonomy,
        }
    }
}

fn clamp(what: &str, name: &str, value: i64) -> u64 {
    if value < 0 {
        warn!("Negative {} {} for {}, using 0", what, value, name);
        0
    } else {
        value as u64
    }
}
