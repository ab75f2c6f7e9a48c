//! ghuim: generalized high-utility itemset mining
//!
//! Finds itemsets whose total utility (quantity × unit profit, summed over the
//! supporting transactions) reaches a minimum threshold. With a taxonomy the
//! miner also reports itemsets of categories, one abstraction level at a time,
//! with a threshold that grows with the level.
//!
//! Layers:
//! - `domain`: entities, taxonomy and the utility-list miner (no I/O)
//! - `application`: dataset loading and mining services
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing, dispatch and output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    mine_basic, mine_generalized, Dataset, DatasetBuilder, GeneralizedMiner, HighUtilityItemset,
    Item, Taxonomy, Transaction, TransactionItem,
};
