//! Dataset loading service
//!
//! Reads TOML dataset files:
//!
//! ```toml
//! [profits]
//! Coke = 5
//! Bread = 1
//!
//! [[transactions]]
//! tid = 1
//! items = { Coke = 2, Bread = 2 }
//!
//! [taxonomy]
//! Coke = "Beverage"
//! Bread = "Food"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Dataset, DatasetBuilder, Tid};
use crate::infrastructure::traits::FileSystem;

/// Raw dataset file layout.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct RawDataset {
    profits: BTreeMap<String, i64>,
    transactions: Vec<RawTransaction>,
    /// child -> parent
    taxonomy: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTransaction {
    tid: Tid,
    #[serde(default)]
    items: BTreeMap<String, i64>,
}

/// Service for loading mining inputs from disk.
pub struct DatasetService {
    fs: Arc<dyn FileSystem>,
}

impl DatasetService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load and validate a dataset file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Dataset> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::DatasetNotFound(path.to_path_buf()));
        }
        if !self.fs.is_file(path) {
            return Err(ApplicationError::InvalidDataset {
                path: path.to_path_buf(),
                message: "not a regular file".into(),
            });
        }
        let content = self.fs.read_to_string(path).with_dataset_context(path)?;
        let dataset = Self::parse(&content, path)?;
        debug!(
            "Loaded {}: {} transactions",
            path.display(),
            dataset.transactions.len()
        );
        Ok(dataset)
    }

    /// Parse dataset content; `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> ApplicationResult<Dataset> {
        let raw: RawDataset =
            toml::from_str(content).map_err(|e| ApplicationError::InvalidDataset {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut builder = DatasetBuilder::new();
        for (name, profit) in &raw.profits {
            builder.profit(name, *profit)?;
        }
        for (child, parent) in &raw.taxonomy {
            builder
                .relation(child, parent)
                .map_err(|e| ApplicationError::InvalidDataset {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
        }
        for t in raw.transactions {
            builder.transaction(t.tid, t.items)?;
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_valid_content_when_parsing_then_builds_dataset() {
        let content = r#"
[profits]
Coke = 5
Bread = 1

[[transactions]]
tid = 1
items = { Coke = 2, Bread = 2 }

[[transactions]]
tid = 2
items = { Bread = 3 }

[taxonomy]
Coke = "Beverage"
Bread = "Food"
"#;
        let dataset = DatasetService::parse(content, &PathBuf::from("inline.toml")).unwrap();

        assert_eq!(dataset.transactions.len(), 2);
        assert_eq!(dataset.transactions[0].utility(), 12);
        assert_eq!(dataset.taxonomy.parent("Coke"), Some("Beverage"));
    }

    #[test]
    fn given_unknown_field_when_parsing_then_invalid_dataset() {
        let content = "[[transactions]]\ntid = 1\nitemz = { A = 1 }\n";
        let result = DatasetService::parse(content, &PathBuf::from("bad.toml"));
        assert!(matches!(result, Err(ApplicationError::InvalidDataset { .. })));
    }

    #[test]
    fn given_empty_content_when_parsing_then_empty_dataset() {
        let dataset = DatasetService::parse("", &PathBuf::from("empty.toml")).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.taxonomy.is_empty());
    }
}
