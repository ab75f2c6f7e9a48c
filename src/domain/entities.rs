//! Domain entities: items, transactions and mined itemsets

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::domain::taxonomy::Taxonomy;

/// Transaction identifier.
pub type Tid = u64;

/// A sellable item with its unit profit (external utility).
///
/// Identity is the name: two items with the same name are equal regardless of profit.
#[derive(Debug, Clone)]
pub struct Item {
    name: String,
    profit: u64,
}

impl Item {
    pub fn new(name: impl Into<String>, profit: u64) -> Self {
        Self {
            name: name.into(),
            profit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profit(&self) -> u64 {
        self.profit
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An item purchased in some quantity (internal utility).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionItem {
    item: Item,
    quantity: u64,
}

impl TransactionItem {
    pub fn new(item: Item, quantity: u64) -> Self {
        Self { item, quantity }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn name(&self) -> &str {
        self.item.name()
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Utility of this entry: `profit * quantity`.
    pub fn utility(&self) -> u64 {
        self.item.profit().saturating_mul(self.quantity)
    }
}

/// A single transaction: an id plus the items bought.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    tid: Tid,
    items: Vec<TransactionItem>,
}

impl Transaction {
    pub fn new(tid: Tid, items: Vec<TransactionItem>) -> Self {
        Self { tid, items }
    }

    pub fn tid(&self) -> Tid {
        self.tid
    }

    pub fn items(&self) -> &[TransactionItem] {
        &self.items
    }

    /// Transaction utility: sum of the utilities of all entries.
    pub fn utility(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, ti| acc.saturating_add(ti.utility()))
    }
}

/// A complete mining input: transactions, unit profits and the item taxonomy.
#[derive(Debug, Default)]
pub struct Dataset {
    pub transactions: Vec<Transaction>,
    /// Unit profit per item name as declared in the input
    pub profits: BTreeMap<String, u64>,
    pub taxonomy: Taxonomy,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// An accepted (generalized) high-utility itemset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HighUtilityItemset {
    /// Member names in the miner's fixed candidate order
    pub items: Vec<String>,
    /// Aggregated utility across all supporting transactions
    pub utility: u64,
    /// Taxonomy level shared by all members
    pub level: usize,
    /// Minimum utility the itemset had to reach at its level
    pub threshold: u64,
}
