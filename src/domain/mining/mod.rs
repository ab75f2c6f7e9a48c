//! Utility-list based high-utility itemset mining (leaf and generalized).
//!
//! Pipeline: leaf profiles (TU) -> optional generalization over the taxonomy -> TWU ->
//! per-level candidate plan -> utility lists -> depth-first search.

pub mod miner;
pub mod plan;
pub mod preprocess;
pub mod search;
pub mod threshold;
pub mod utility_list;

pub use miner::{mine_basic, mine_generalized, sort_by_level_then_utility, GeneralizedMiner};
pub use plan::{Candidate, LevelPlan, MiningPlan};
pub use threshold::LevelThresholds;
pub use utility_list::{UtilityList, UtilityListElement};
