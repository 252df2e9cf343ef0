mod case;
mod error;

use case::CaseSetup;
use clap::{Parser, Subcommand};
use error::{CliError, CliResult};
use pf_assembly::{central_difference_jacobian, compare_jacobians};
use pf_core::timing::{self, assembly_timing};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "PorousFlow CLI - black-oil residual assembly tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a case file and build its grid
    Validate {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Assemble the residual of one time step
    Residual {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Print the residual as JSON
        #[arg(long)]
        json: bool,
        /// Report assembly timings
        #[arg(long)]
        timing: bool,
    },
    /// Compare the assembled Jacobian with central finite differences
    CheckJacobian {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Relative finite-difference step
        #[arg(long, default_value_t = 1e-7)]
        eps: f64,
        /// Largest accepted column-scaled error
        #[arg(long, default_value_t = 1e-6)]
        tol: f64,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Residual {
            case_path,
            json,
            timing,
        } => cmd_residual(&case_path, json, timing),
        Commands::CheckJacobian { case_path, eps, tol } => {
            cmd_check_jacobian(&case_path, eps, tol)
        }
    }
}

fn load(case_path: &Path) -> CliResult<CaseSetup> {
    let case = case::load_yaml(case_path)?;
    tracing::info!(name = %case.name, cells = case.cells.len(), "case loaded");
    case.build()
}

fn cmd_validate(case_path: &Path) -> CliResult<()> {
    println!("Validating case: {}", case_path.display());
    let setup = load(case_path)?;
    let grid = setup.linearizer.grid();
    println!("✓ Case is valid");
    println!(
        "  {} cells, {} connections, {} equations per cell",
        grid.num_cells(),
        grid.connections().len(),
        setup.linearizer.num_eq()
    );
    println!(
        "  Modules: {}",
        format_list(&setup.linearizer.local_residual().modules().enabled())
    );
    Ok(())
}

#[derive(Serialize)]
struct CellResidual<'a> {
    cell: &'a str,
    residual: &'a [f64],
}

fn cmd_residual(case_path: &Path, json: bool, report_timing: bool) -> CliResult<()> {
    if report_timing {
        timing::enable_timing();
        assembly_timing::reset_all();
    }
    let setup = load(case_path)?;
    let residual = setup
        .linearizer
        .residual(&setup.current, &setup.previous, setup.dt)?;
    let num_eq = setup.linearizer.num_eq();

    let rows: Vec<CellResidual<'_>> = setup
        .cell_names
        .iter()
        .zip(residual.as_slice().chunks(num_eq))
        .map(|(name, block)| CellResidual {
            cell: name,
            residual: block,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("Residual ({} equations per cell):", num_eq);
        for row in &rows {
            let values: Vec<String> = row.residual.iter().map(|v| format!("{v:>12.4e}")).collect();
            println!("  {:<16} {}", row.cell, values.join(" "));
        }
        println!("  max |R| = {:.4e}", residual.amax());
    }

    assembly_timing::print_summary();
    Ok(())
}

fn cmd_check_jacobian(case_path: &Path, eps: f64, tol: f64) -> CliResult<()> {
    let setup = load(case_path)?;
    let lin = &setup.linearizer;
    let analytic = lin.linearize(&setup.current, &setup.previous, setup.dt)?;
    let numeric = central_difference_jacobian(
        &setup.current,
        |x| lin.residual(x, &setup.previous, setup.dt),
        eps,
    )?;
    let worst = compare_jacobians(&analytic.jacobian, &numeric)?;

    if worst.relative_error > tol {
        tracing::warn!(
            row = worst.row,
            col = worst.col,
            relative_error = worst.relative_error,
            "analytic and finite-difference Jacobians disagree"
        );
        return Err(CliError::JacobianMismatch {
            row: worst.row,
            col: worst.col,
            relative_error: worst.relative_error,
            tolerance: tol,
        });
    }

    println!(
        "✓ Jacobian matches finite differences ({}x{}, worst relative error {:.3e})",
        analytic.jacobian.nrows(),
        analytic.jacobian.ncols(),
        worst.relative_error
    );
    Ok(())
}

fn format_list(items: &[&str]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
