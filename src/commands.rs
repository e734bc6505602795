//! Command implementations for schemadiff CLI

use crate::cli::{Commands, OutputFormat};
use crate::config::{Config, Overrides};
use crate::error::{Result, SchemadiffError};
use crate::output::{JsonReporter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::schema::{check_table_sets, SchemaReconciler, SchemaSource};
use crate::source::DuckDbSource;
use crate::sql::load_env_file;
use std::path::{Path, PathBuf};

/// Catalog aliases the two sides are attached under
const LEFT_ALIAS: &str = "left_side";
const RIGHT_ALIAS: &str = "right_side";

/// How a successful command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    /// Differences were found and the caller asked to fail on them
    MismatchesFound,
}

impl CommandOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            CommandOutcome::Success => 0,
            CommandOutcome::MismatchesFound => 2,
        }
    }
}

/// Execute a command
pub fn execute_command(command: Commands, config_path: &Path) -> Result<CommandOutcome> {
    match command {
        Commands::Init { force } => init_command(config_path, force),
        Commands::Compare {
            count_only,
            ignore_columns,
            mismatch_limit,
            sort_column,
            format,
            output,
            fail_on_mismatch,
            no_progress,
        } => compare_command(
            config_path,
            CompareArgs {
                count_only,
                overrides: Overrides {
                    ignore_columns,
                    mismatch_limit,
                    sort_column,
                },
                format: &format,
                output,
                fail_on_mismatch,
                no_progress,
            },
        ),
        Commands::Tables => tables_command(config_path),
    }
}

/// Write a template configuration file
fn init_command(config_path: &Path, force: bool) -> Result<CommandOutcome> {
    Config::template().save(config_path, force)?;
    println!("Created configuration file: {}", config_path.display());
    println!("Edit both sides, then run: schemadiff compare");
    Ok(CommandOutcome::Success)
}

struct CompareArgs<'a> {
    count_only: bool,
    overrides: Overrides,
    format: &'a str,
    output: Option<PathBuf>,
    fail_on_mismatch: bool,
    no_progress: bool,
}

fn load_config(config_path: &Path) -> Result<Config> {
    load_env_file()?;
    Config::load(config_path)
}

fn connect_sides(config: &Config) -> Result<(DuckDbSource, DuckDbSource)> {
    let left = DuckDbSource::connect(&config.left, LEFT_ALIAS)?;
    let right = DuckDbSource::connect(&config.right, RIGHT_ALIAS)?;
    Ok((left, right))
}

/// Compare both sides table by table
fn compare_command(config_path: &Path, args: CompareArgs<'_>) -> Result<CommandOutcome> {
    let format = OutputFormat::parse(args.format).map_err(SchemadiffError::invalid_input)?;
    if args.output.is_some() && format != OutputFormat::Json {
        return Err(SchemadiffError::invalid_input("--output requires --format json"));
    }

    let mut config = load_config(config_path)?;
    config.apply_overrides(args.overrides)?;

    let (left, right) = connect_sides(&config)?;

    let progress = if args.no_progress || format == OutputFormat::Json {
        ProgressReporter::new_minimal()
    } else {
        ProgressReporter::new_for_compare()
    };
    let reconciler = SchemaReconciler::new(config.run_options(args.count_only)).with_progress(progress);

    let summary = match format {
        OutputFormat::Pretty => {
            let mut printer = PrettyPrinter::stdout();
            reconciler.run(&left, &right, &mut printer)?
        }
        OutputFormat::Json => {
            let mut reporter = JsonReporter::new(args.output);
            reconciler.run(&left, &right, &mut reporter)?
        }
    };

    if args.fail_on_mismatch && summary.has_differences() {
        Ok(CommandOutcome::MismatchesFound)
    } else {
        Ok(CommandOutcome::Success)
    }
}

/// List both sides' tables and check that the sets agree
fn tables_command(config_path: &Path) -> Result<CommandOutcome> {
    let config = load_config(config_path)?;
    let (left, right) = connect_sides(&config)?;

    let left_tables = left.list_tables()?;
    let right_tables = right.list_tables()?;

    for (source, tables) in [(&left, &left_tables), (&right, &right_tables)] {
        println!("{} ({} tables):", source.label(), tables.len());
        for (i, table) in tables.iter().enumerate() {
            let prefix = if i == tables.len() - 1 { "└─" } else { "├─" };
            println!("{} {}", prefix, table);
        }
    }

    check_table_sets(&left_tables, &right_tables)?;
    println!("Tables match.");
    Ok(CommandOutcome::Success)
}
