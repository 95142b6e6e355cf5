//! Emergy command-line tool.
//!
//! Imports LCI matrices from CSV, text or workbook files, validates them and
//! computes transformity-weighted emergy per process.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use emergy::calculator::EmergyResult;
use emergy::matrix::{LciMatrix, MatrixManager};
use emergy::Config;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Emergy accounting for LCI process matrices
#[derive(Parser, Debug)]
#[command(name = "emergy")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Run in verbose mode (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that a file is a valid LCI matrix
    Validate {
        /// Matrix file (.csv, .txt, .tsv, .xlsx, .xls)
        file: PathBuf,
    },
    /// Print shape and per-column statistics
    Summary {
        /// Matrix file
        file: PathBuf,
    },
    /// Compute emergy for one matrix
    Calculate {
        /// Matrix file
        file: PathBuf,
        /// Transformity override, repeatable
        #[arg(short, long = "factor", value_name = "NAME=VALUE", value_parser = parse_factor)]
        factors: Vec<(String, f64)>,
        /// Write results to .csv, .xlsx or .xls
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Compute emergy for an input matrix and a process matrix
    Network {
        /// Input matrix file
        input: PathBuf,
        /// Process matrix file
        process: PathBuf,
        /// Transformity override, repeatable
        #[arg(short, long = "factor", value_name = "NAME=VALUE", value_parser = parse_factor)]
        factors: Vec<(String, f64)>,
    },
    /// Re-export a matrix in another format
    Convert {
        /// Matrix file
        file: PathBuf,
        /// Destination; format follows the extension
        output: PathBuf,
    },
}

const INPUT_MATRIX: &str = "input";
const PROCESS_MATRIX: &str = "process";

fn parse_factor(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing resource name in '{raw}'"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid transformity '{}': {e}", value.trim()))?;
    Ok((name.to_string(), value))
}

fn init_tracing(verbose: bool, config: &Config) {
    let fallback = if verbose { "debug" } else { config.logging.filter.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn matrix_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "matrix".to_string())
}

fn import(manager: &mut MatrixManager, path: &Path, name: &str) -> Result<()> {
    manager
        .import_file(path, name)
        .with_context(|| format!("Failed to import {}", path.display()))
}

fn registered<'a>(manager: &'a MatrixManager, name: &str) -> Result<&'a LciMatrix> {
    manager.get_matrix(Some(name)).with_context(|| format!("Matrix {name} was not registered"))
}

fn print_result(label: &str, result: &EmergyResult) {
    println!("{label}");
    for (process, emergy) in result.process_emergy().iter() {
        println!("  {process:<30} {emergy:>16.6e}");
    }
    println!("  {:<30} {:>16.6e}", "Total", result.total_emergy());
}

fn run(args: Args, config: &Config) -> Result<()> {
    let mut manager = config.matrix_manager();

    match args.command {
        Command::Validate { file } => {
            let table = emergy::io::read_table(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let issues = manager.validation_issues(&table);
            if !issues.is_empty() {
                for issue in &issues {
                    println!("  - {issue}");
                }
                bail!("{} is not a valid LCI matrix ({} issues)", file.display(), issues.len());
            }
            println!("{} is a valid LCI matrix", file.display());
        }
        Command::Summary { file } => {
            let name = matrix_name(&file);
            import(&mut manager, &file, &name)?;
            let summary = manager
                .get_summary(Some(&name))
                .with_context(|| format!("No summary for {name}"))?;
            println!(
                "{name}: {} rows, {} columns, {} numeric",
                summary.total_rows, summary.total_columns, summary.numeric_columns
            );
            for (column, stats) in &summary.column_stats {
                let std_dev = stats.std_dev.map_or_else(|| "-".to_string(), |s| format!("{s:.6}"));
                println!(
                    "  {column:<24} mean={:.6} std={std_dev} min={:.6} max={:.6}",
                    stats.mean, stats.min, stats.max
                );
            }
        }
        Command::Calculate { file, factors, output } => {
            let name = matrix_name(&file);
            import(&mut manager, &file, &name)?;
            let matrix = registered(&manager, &name)?;
            let mut calculator = config.calculator(factors);
            let result = calculator.calculate_emergy(matrix)?;
            print_result(&name, &result);
            if let Some(output) = output {
                calculator
                    .export_results(&result, &output)
                    .with_context(|| format!("Failed to export to {}", output.display()))?;
                info!(path = %output.display(), "Results written");
            }
        }
        Command::Network { input, process, factors } => {
            import(&mut manager, &input, INPUT_MATRIX)?;
            import(&mut manager, &process, PROCESS_MATRIX)?;
            let input_matrix = registered(&manager, INPUT_MATRIX)?;
            let process_matrix = registered(&manager, PROCESS_MATRIX)?;
            let mut calculator = config.calculator(factors);
            let (input_result, process_result) =
                calculator.calculate_network_emergy(input_matrix, process_matrix)?;
            print_result(&format!("{} (input)", input.display()), &input_result);
            print_result(&format!("{} (process)", process.display()), &process_result);
        }
        Command::Convert { file, output } => {
            let name = matrix_name(&file);
            import(&mut manager, &file, &name)?;
            manager
                .export_matrix(&name, &output)
                .with_context(|| format!("Failed to export to {}", output.display()))?;
            println!("{} -> {}", file.display(), output.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    init_tracing(args.verbose, &config);

    run(args, &config)
}
