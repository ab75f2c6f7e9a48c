//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves concrete structs.

mod dataset;
mod mining;

pub use dataset::DatasetService;
pub use mining::{LevelSummary, MiningMode, MiningParams, MiningReport, MiningService, NodeSummary};
