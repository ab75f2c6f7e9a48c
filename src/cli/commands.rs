//! Command dispatch: resolves settings, loads datasets and renders results.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{MiningMode, MiningParams};
use crate::cli::args::{Cli, Commands, ConfigCommands, MineArgs, TaxonomyCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, OutputFormat, Settings};
use crate::domain::Dataset;
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Mine {
            opts,
            alpha_step,
            parallel,
        }) => cmd_mine(opts, MiningMode::Generalized, *alpha_step, *parallel),
        Some(Commands::Basic { opts }) => cmd_mine(opts, MiningMode::Basic, None, false),
        Some(Commands::Taxonomy { command }) => match command {
            TaxonomyCommands::Tree { dataset } => cmd_taxonomy_tree(dataset.as_deref()),
            TaxonomyCommands::Levels {
                dataset,
                min_util,
                alpha_step,
            } => cmd_taxonomy_levels(dataset.as_deref(), *min_util, *alpha_step),
            TaxonomyCommands::Ancestors { node, dataset } => {
                cmd_taxonomy_ancestors(node, dataset.as_deref())
            }
        },
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show { dir } => cmd_config_show(dir.as_deref()),
            ConfigCommands::Init { global, force } => cmd_config_init(*global, *force),
            ConfigCommands::Path => cmd_config_path(),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

/// Settings, services and the loaded dataset for one invocation.
struct Session {
    container: ServiceContainer,
    path: PathBuf,
    dataset: Dataset,
}

/// Resolve the dataset path (argument, then config) and load it.
///
/// The local `.ghuim.toml` is looked up next to the dataset file.
fn open_session(dataset: Option<&Path>) -> CliResult<Session> {
    let path = match dataset {
        Some(path) => path.to_path_buf(),
        None => Settings::load(Some(&current_dir()?))?
            .dataset
            .ok_or_else(|| {
                CliError::Usage(
                    "no dataset given (pass a path or set `dataset` in the config)".into(),
                )
            })?,
    };
    let dataset_dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => dir.to_path_buf(),
        None => current_dir()?,
    };
    debug!("dataset={} config_dir={}", path.display(), dataset_dir.display());

    let settings = Settings::load(Some(&dataset_dir))?;
    let container = ServiceContainer::new(settings);
    let dataset = container.datasets.load(&path)?;

    Ok(Session {
        container,
        path,
        dataset,
    })
}

fn current_dir() -> CliResult<PathBuf> {
    std::env::current_dir().map_err(|e| InfraError::io("resolve current directory", e).into())
}

#[instrument(level = "debug", skip(opts))]
fn cmd_mine(
    opts: &MineArgs,
    mode: MiningMode,
    alpha_step: Option<f64>,
    parallel: bool,
) -> CliResult<()> {
    let session = open_session(opts.dataset.as_deref())?;
    let mining = &session.container.mining;
    let params: MiningParams = mining.params(opts.min_util, alpha_step, parallel.then_some(true));
    let format = opts.format.unwrap_or(session.container.settings.format);

    if session.dataset.is_empty() {
        output::warning(&format!(
            "{} contains no transactions",
            session.path.display()
        ));
    }
    let report = mining.mine(&session.dataset, mode, params);

    match format {
        OutputFormat::Text => {
            for line in output::report_lines(&report) {
                output::info(&line);
            }
        }
        OutputFormat::Toml => output::info(&output::report_toml(&report)?),
    }
    Ok(())
}

fn cmd_taxonomy_tree(dataset: Option<&Path>) -> CliResult<()> {
    let session = open_session(dataset)?;
    let taxonomy = &session.dataset.taxonomy;
    if taxonomy.is_empty() {
        output::warning(&format!("{} has no taxonomy", session.path.display()));
        return Ok(());
    }
    for tree in taxonomy.to_forest() {
        output::info(&tree);
    }
    Ok(())
}

fn cmd_taxonomy_levels(
    dataset: Option<&Path>,
    min_util: Option<u64>,
    alpha_step: Option<f64>,
) -> CliResult<()> {
    let session = open_session(dataset)?;
    let mining = &session.container.mining;
    let params = mining.params(min_util, alpha_step, None);
    for line in output::level_lines(&mining.level_summary(&session.dataset, params)) {
        output::info(&line);
    }
    Ok(())
}

fn cmd_taxonomy_ancestors(node: &str, dataset: Option<&Path>) -> CliResult<()> {
    let session = open_session(dataset)?;
    let taxonomy = &session.dataset.taxonomy;
    if !taxonomy.contains(node) {
        return Err(CliError::InvalidArgs(format!(
            "'{}' is not part of the taxonomy",
            node
        )));
    }
    let chain: Vec<&str> = std::iter::once(node)
        .chain(taxonomy.ancestors(node))
        .collect();
    output::info(&chain.join(" -> "));
    Ok(())
}

fn cmd_config_show(dir: Option<&Path>) -> CliResult<()> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => current_dir()?,
    };
    let settings = Settings::load(Some(&dir))?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_init(global: bool, force: bool) -> CliResult<()> {
    let path = if global {
        global_config_path()
            .ok_or_else(|| CliError::Usage("cannot determine global config directory".into()))?
    } else {
        local_config_path(&current_dir()?)
    };

    let container = ServiceContainer::new(Settings::default());
    if container.fs.exists(&path) && !force {
        return Err(CliError::Usage(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    container
        .fs
        .ensure_parent(&path)
        .map_err(|e| InfraError::io(format!("create directory for {}", path.display()), e))?;
    container
        .fs
        .write(&path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;

    output::action("Created", &path.display());
    Ok(())
}

fn cmd_config_path() -> CliResult<()> {
    let global = global_config_path();
    let local = local_config_path(&current_dir()?);

    output::header("Config files");
    match global {
        Some(path) => output::detail(&format!(
            "global: {}{}",
            path.display(),
            if path.exists() { "" } else { " (missing)" }
        )),
        None => output::detail("global: (unavailable)"),
    }
    output::detail(&format!(
        "local:  {}{}",
        local.display(),
        if local.exists() { "" } else { " (missing)" }
    ));
    Ok(())
}
