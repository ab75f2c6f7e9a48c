//! Domain layer: entities, taxonomy and the mining engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entities;
pub mod error;
pub mod mining;
pub mod taxonomy;

pub use builder::DatasetBuilder;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use mining::{mine_basic, mine_generalized, GeneralizedMiner, LevelThresholds, MiningPlan};
pub use taxonomy::{Taxonomy, TaxonomyNode};
