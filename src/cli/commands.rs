use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::{collect_stream, Comparator, Outcome, Strategy};
use crate::cli::args::{Cli, Commands, ConfigCommands, ShowFormat, TreeOpts};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{render, size_of, Link, TreeBuilder, TreeSource};
use crate::exitcode;

/// Runs the parsed command and returns the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see 'treewalk --help'".to_string(),
        ));
    };

    match command {
        Commands::Walk {
            tree,
            opts,
            capacity,
        } => {
            let settings = Settings::load(cli.config.as_deref())?;
            _walk(&settings, tree, opts, *capacity, cli.verbose)
        }
        Commands::Show { tree, opts, format } => {
            let settings = Settings::load(cli.config.as_deref())?;
            _show(&settings, tree, opts, *format)
        }
        Commands::Same {
            left,
            right,
            opts,
            strategy,
            capacity,
        } => {
            let settings = Settings::load(cli.config.as_deref())?;
            _same(&settings, left, right, opts, *strategy, *capacity, cli.verbose)
        }
        Commands::Config { command } => _config(cli, command),
        Commands::Completion { shell } => _completion(*shell),
    }
}

fn tree_builder(settings: &Settings, opts: &TreeOpts) -> TreeBuilder {
    TreeBuilder::new(
        opts.size.unwrap_or(settings.tree.size),
        opts.seed.or(settings.tree.seed),
    )
}

#[instrument(skip(settings))]
fn _walk(
    settings: &Settings,
    source: &TreeSource,
    opts: &TreeOpts,
    capacity: Option<usize>,
    verbose: bool,
) -> CliResult<i32> {
    let tree = tree_builder(settings, opts).build(source)?;
    let capacity = capacity.unwrap_or(settings.compare.channel_capacity);
    let values = collect_stream(tree.as_deref(), capacity)?;
    debug!("walked {} values", values.len());

    let line: Vec<String> = values.iter().map(i64::to_string).collect();
    output::info(&line.join(" "));
    if verbose {
        output::action("tree", &render(tree.as_deref()));
        output::action("values", &values.len());
    }
    Ok(exitcode::OK)
}

#[instrument(skip(settings))]
fn _show(
    settings: &Settings,
    source: &TreeSource,
    opts: &TreeOpts,
    format: ShowFormat,
) -> CliResult<i32> {
    let tree = tree_builder(settings, opts).build(source)?;
    match (format, tree.as_deref()) {
        (ShowFormat::Tree, Some(tree)) => output::info(&tree.to_diagram()),
        _ => output::info(&render(tree.as_deref())),
    }
    Ok(exitcode::OK)
}

#[instrument(skip(settings))]
fn _same(
    settings: &Settings,
    left: &TreeSource,
    right: &TreeSource,
    opts: &TreeOpts,
    strategy: Option<Strategy>,
    capacity: Option<usize>,
    verbose: bool,
) -> CliResult<i32> {
    let mut builder = tree_builder(settings, opts);
    let left_tree = builder.build(left)?;
    let right_tree = builder.build(right)?;

    let comparator = Comparator::new(
        strategy.unwrap_or(settings.compare.strategy),
        capacity.unwrap_or(settings.compare.channel_capacity),
    );
    if comparator.strategy() == Strategy::EarlyExit
        && size_of(left_tree.as_deref()) != size_of(right_tree.as_deref())
    {
        output::warning("early-exit is meant for trees of equal size");
    }

    let outcome = comparator.compare(left_tree.as_deref(), right_tree.as_deref())?;
    output::verdict(outcome.same);
    if verbose {
        report(&comparator, &left_tree, &right_tree, &outcome);
    }

    Ok(if outcome.same {
        exitcode::OK
    } else {
        exitcode::DIFFERENT
    })
}

fn report(comparator: &Comparator, left: &Link, right: &Link, outcome: &Outcome) {
    output::action("left", &render(left.as_deref()));
    output::action("right", &render(right.as_deref()));
    output::action(
        "strategy",
        &format!(
            "{} (capacity {})",
            comparator.strategy(),
            comparator.capacity()
        ),
    );
    output::action("pairs", &outcome.pairs);
    match &outcome.first_mismatch {
        Some(mismatch) => output::failure(&mismatch),
        None => output::success_detail(&"all values match"),
    }
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<i32> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config files (lowest to highest precedence)");
            match global_config_path() {
                Some(path) => output::detail(&format!(
                    "global: {} ({})",
                    path.display(),
                    presence(path.exists())
                )),
                None => output::detail(&"global: <no config directory>"),
            }
            let local = match &cli.config {
                Some(path) => path.clone(),
                None => local_config_path(&std::env::current_dir().map_err(|e| {
                    CliError::Usage(format!("cannot determine working directory: {}", e))
                })?),
            };
            output::detail(&format!(
                "local:  {} ({})",
                local.display(),
                presence(local.exists())
            ));
            output::detail(&"env:    TREEWALK_COMPARE__STRATEGY, TREEWALK_TREE__SEED, ...");
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(exitcode::OK)
}

fn presence(exists: bool) -> &'static str {
    if exists {
        "found"
    } else {
        "not found"
    }
}

fn _completion(shell: Shell) -> CliResult<i32> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(exitcode::OK)
}
