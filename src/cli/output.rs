//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use itertools::Itertools;
use serde::{Serialize, Serializer};

use crate::application::services::{LevelSummary, MiningMode, MiningReport};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::HighUtilityItemset;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Render one itemset as `{A, B} -> Utility = N (level=L[, thr=T])`.
pub fn format_itemset(itemset: &HighUtilityItemset, with_threshold: bool) -> String {
    let members = itemset.items.iter().join(", ");
    if with_threshold {
        format!(
            "{{{}}} -> Utility = {} (level={}, thr={})",
            members, itemset.utility, itemset.level, itemset.threshold
        )
    } else {
        format!(
            "{{{}}} -> Utility = {} (level={})",
            members, itemset.utility, itemset.level
        )
    }
}

/// Text rendering of a report, one line per itemset.
pub fn report_lines(report: &MiningReport) -> Vec<String> {
    let with_threshold = report.mode == MiningMode::Generalized;
    report
        .itemsets
        .iter()
        .map(|itemset| format_itemset(itemset, with_threshold))
        .collect()
}

/// Flat view of a report; TOML needs scalars before the `[[itemsets]]` tables.
#[derive(Serialize)]
struct ReportDocument<'a> {
    mode: MiningMode,
    #[serde(serialize_with = "toml_u64")]
    min_util: u64,
    alpha_step: f64,
    parallel: bool,
    transactions: usize,
    itemsets: Vec<ItemsetRow<'a>>,
}

#[derive(Serialize)]
struct ItemsetRow<'a> {
    items: &'a [String],
    #[serde(serialize_with = "toml_u64")]
    utility: u64,
    level: usize,
    #[serde(serialize_with = "toml_u64")]
    threshold: u64,
}

impl<'a> From<&'a HighUtilityItemset> for ItemsetRow<'a> {
    fn from(itemset: &'a HighUtilityItemset) -> Self {
        Self {
            items: &itemset.items,
            utility: itemset.utility,
            level: itemset.level,
            threshold: itemset.threshold,
        }
    }
}

/// TOML integers are signed 64-bit; larger values are written as decimal strings.
fn toml_u64<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    match i64::try_from(*value) {
        Ok(v) => serializer.serialize_i64(v),
        Err(_) => serializer.serialize_str(&value.to_string()),
    }
}

/// TOML rendering of a report.
pub fn report_toml(report: &MiningReport) -> ApplicationResult<String> {
    let doc = ReportDocument {
        mode: report.mode,
        min_util: report.params.min_util,
        alpha_step: report.params.alpha_step,
        parallel: report.params.parallel,
        transactions: report.transactions,
        itemsets: report.itemsets.iter().map(ItemsetRow::from).collect(),
    };
    toml::to_string_pretty(&doc).map_err(|e| ApplicationError::OperationFailed {
        context: "serialize report".into(),
        source: Box::new(e),
    })
}

/// Text rendering of the level plan: one header per level, one line per node.
pub fn level_lines(levels: &[LevelSummary]) -> Vec<String> {
    levels
        .iter()
        .flat_map(|level| {
            let head = format!("level {} (thr={})", level.level, level.threshold);
            let nodes = level.nodes.iter().map(|node| {
                let mark = if node.retained { "+" } else { "-" };
                format!("  {} {} (twu={})", mark, node.name, node.twu)
            });
            std::iter::once(head).chain(nodes)
        })
        .collect()
}
