//! Error types for grid construction and global assembly.

use pf_core::{DofId, FaceId, PfError};
use pf_fluids::FluidError;
use pf_residual::ResidualError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    /// A connection refers to a cell that doesn't exist.
    #[error("Connection {face} refers to non-existent cell {cell}")]
    InvalidCellRef { face: FaceId, cell: DofId },

    #[error("Connection {face} connects cell {cell} to itself")]
    SelfConnection { face: FaceId, cell: DofId },

    #[error("Non-physical {what} on {entity} {index}")]
    NonPhysical {
        what: &'static str,
        entity: &'static str,
        index: usize,
    },

    /// Connection in a cell's adjacency list that doesn't touch the cell.
    #[error("Connection {face} in cell {cell}'s adjacency list but doesn't touch that cell")]
    InconsistentAdjacency { face: FaceId, cell: DofId },

    #[error("Expected {expected} values for {what}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Residual error: {0}")]
    Residual(#[from] ResidualError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Index error: {0}")]
    Index(#[from] PfError),
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;

impl From<AssemblyError> for PfError {
    fn from(e: AssemblyError) -> Self {
        match e {
            AssemblyError::Residual(inner) => inner.into(),
            AssemblyError::Fluid(inner) => inner.into(),
            AssemblyError::Index(inner) => inner,
            AssemblyError::DimensionMismatch {
                what,
                expected,
                actual,
            } => PfError::IndexOob {
                what,
                index: actual,
                len: expected,
            },
            other => PfError::Invariant {
                what: other.to_string(),
            },
        }
    }
}
