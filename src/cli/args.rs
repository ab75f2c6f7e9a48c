//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Generalized high-utility itemset mining over transaction databases with item taxonomies
#[derive(Parser, Debug)]
#[command(name = "ghuim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Print author and version
    #[arg(long)]
    pub info: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mine leaf items and taxonomy categories, level by level
    Mine {
        #[command(flatten)]
        opts: MineArgs,

        /// Threshold increment per taxonomy level
        #[arg(short, long, allow_negative_numbers = true)]
        alpha_step: Option<f64>,

        /// Mine taxonomy levels concurrently
        #[arg(short, long)]
        parallel: bool,
    },

    /// Mine leaf items only, ignoring the taxonomy
    Basic {
        #[command(flatten)]
        opts: MineArgs,
    },

    /// Inspect the dataset taxonomy
    Taxonomy {
        #[command(subcommand)]
        command: TaxonomyCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by the mining commands
#[derive(Args, Debug)]
pub struct MineArgs {
    /// Dataset file (TOML); defaults to `dataset` from config
    #[arg(value_hint = ValueHint::FilePath)]
    pub dataset: Option<PathBuf>,

    /// Base minimum utility
    #[arg(short, long)]
    pub min_util: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Subcommand, Debug)]
pub enum TaxonomyCommands {
    /// Show the taxonomy forest
    Tree {
        /// Dataset file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        dataset: Option<PathBuf>,
    },

    /// Show levels, thresholds and candidate nodes
    Levels {
        /// Dataset file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        dataset: Option<PathBuf>,

        /// Base minimum utility
        #[arg(short, long)]
        min_util: Option<u64>,

        /// Threshold increment per taxonomy level
        #[arg(short, long, allow_negative_numbers = true)]
        alpha_step: Option<f64>,
    },

    /// Show the ancestor chain of a node
    Ancestors {
        /// Item or category name
        node: String,

        /// Dataset file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        dataset: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show {
        /// Directory whose local config is merged (default: cwd)
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
