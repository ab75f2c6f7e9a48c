//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/ghuim/ghuim.toml`
//! 3. Local config: `<dataset_dir>/.ghuim.toml` (next to the dataset file)
//! 4. Environment variables: `GHUIM_*` prefix
//!
//! CLI flags are applied on top by the command layer.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::mining::threshold::clamp_alpha;
use crate::domain::mining::LevelThresholds;

/// Name of the global config file inside the XDG config directory.
pub const GLOBAL_CONFIG_FILE: &str = "ghuim.toml";
/// Name of the local config file next to a dataset.
pub const LOCAL_CONFIG_FILE: &str = ".ghuim.toml";

/// How mining results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `{A, B} -> Utility = N` line per itemset
    #[default]
    Text,
    /// TOML document with parameters and `[[itemsets]]`
    Toml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Toml => write!(f, "toml"),
        }
    }
}

/// Raw settings for intermediate parsing.
///
/// Every field is optional so a config layer only overrides what it names.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub min_util: Option<u64>,
    pub alpha_step: Option<f64>,
    pub parallel: Option<bool>,
    pub format: Option<OutputFormat>,
    pub dataset: Option<PathBuf>,
}

/// Unified configuration for ghuim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base minimum utility (level-0 threshold)
    pub min_util: u64,
    /// Per-level threshold increment
    pub alpha_step: f64,
    /// Mine taxonomy levels concurrently
    pub parallel: bool,
    /// Output format for mining results
    pub format: OutputFormat,
    /// Dataset used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_util: 0,
            alpha_step: LevelThresholds::DEFAULT_ALPHA_STEP,
            parallel: false,
            format: OutputFormat::Text,
            dataset: None,
        }
    }
}

/// Get the XDG config directory for ghuim.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ghuim").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(GLOBAL_CONFIG_FILE))
}

/// Get the path to the local config file in a dataset directory.
pub fn local_config_path(dataset_dir: &Path) -> PathBuf {
    dataset_dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input untouched.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(raw.as_ref()) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            debug!("Cannot expand {}: {}", raw, e);
            path.to_path_buf()
        }
    }
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(dataset) = self.dataset.as_deref() {
            self.dataset = Some(expand_path(dataset));
        }
    }

    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            min_util: overlay.min_util.unwrap_or(self.min_util),
            alpha_step: overlay
                .alpha_step
                .map(clamp_alpha)
                .unwrap_or(self.alpha_step),
            parallel: overlay.parallel.unwrap_or(self.parallel),
            format: overlay.format.unwrap_or(self.format),
            dataset: overlay.dataset.clone().or_else(|| self.dataset.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `dataset_dir` - Optional directory holding the dataset (and a `.ghuim.toml`)
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/ghuim/ghuim.toml`
    /// 3. Local config: `<dataset_dir>/.ghuim.toml`
    /// 4. Environment variables: `GHUIM_*` prefix
    pub fn load(dataset_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("Loading global config {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = dataset_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("Loading local config {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply GHUIM_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("GHUIM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        let config = builder.build().map_err(config_err)?;

        let raw = RawSettings {
            min_util: read_env(&config, "min_util")?,
            alpha_step: read_env(&config, "alpha_step")?,
            parallel: read_env(&config, "parallel")?,
            format: read_env(&config, "format")?,
            dataset: read_env(&config, "dataset")?,
        };

        Ok(settings.merge_with(&raw))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# ghuim configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/ghuim/ghuim.toml   (your baseline)
#   Local:  <dataset_dir>/.ghuim.toml    (per-dataset overrides)
#   Env:    GHUIM_* environment variables (explicit overrides)
#   CLI:    --min-util, --alpha-step, --parallel, --format

# Base minimum utility; level L uses ceil((1 + alpha_step * L) * min_util)
# min_util = 0

# Threshold increment per taxonomy level (negative values are treated as 0)
# alpha_step = 0.5

# Mine taxonomy levels concurrently
# parallel = false

# Output format: "text" or "toml"
# format = "text"

# Dataset used when none is given on the command line (~ and $VAR are expanded)
# dataset = "~/data/grocery.toml"
"#
        .to_string()
    }
}

/// Read one key from the environment layer; absent keys are `None`.
fn read_env<T: serde::de::DeserializeOwned>(
    config: &Config,
    key: &str,
) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_match_miner_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.min_util, 0);
        assert_eq!(settings.alpha_step, 0.5);
        assert!(!settings.parallel);
        assert_eq!(settings.format, OutputFormat::Text);
        assert!(settings.dataset.is_none());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_named_fields_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            min_util: Some(20),
            format: Some(OutputFormat::Toml),
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.min_util, 20);
        assert_eq!(merged.format, OutputFormat::Toml);
        assert_eq!(merged.alpha_step, base.alpha_step);
        assert_eq!(merged.parallel, base.parallel);
    }

    #[test]
    fn given_negative_alpha_in_overlay_when_merging_then_clamped_to_zero() {
        let overlay = RawSettings {
            alpha_step: Some(-1.5),
            ..Default::default()
        };

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.alpha_step, 0.0);
    }

    #[test]
    fn given_tilde_in_dataset_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            dataset: Some(PathBuf::from("~/data/grocery.toml")),
            ..Default::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let dataset = settings.dataset.expect("dataset kept");
        let dataset = dataset.to_string_lossy();
        assert!(dataset.starts_with(&home), "not expanded: {}", dataset);
        assert!(!dataset.contains('~'));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_empty_config() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.min_util.is_none());
        assert!(raw.dataset.is_none());
    }

    #[test]
    fn given_settings_when_to_toml_then_contains_fields() {
        let toml = Settings::default().to_toml().expect("serialize");
        assert!(toml.contains("min_util = 0"));
        assert!(toml.contains("alpha_step = 0.5"));
        assert!(toml.contains("format = \"text\""));
        assert!(!toml.contains("dataset"));
    }
}
