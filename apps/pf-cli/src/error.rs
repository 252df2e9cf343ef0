//! Error type of the command-line driver.

use pf_assembly::AssemblyError;
use pf_fluids::FluidError;
use std::path::PathBuf;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read case file: {path}")]
    CaseFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid case: {0}")]
    Case(String),

    #[error("Unsupported case version {found} (latest is {latest})")]
    Version { found: u32, latest: u32 },

    #[error("Jacobian check failed: entry ({row}, {col}) off by {relative_error:.3e} (tolerance {tolerance:.1e})")]
    JacobianMismatch {
        row: usize,
        col: usize,
        relative_error: f64,
        tolerance: f64,
    },

    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
