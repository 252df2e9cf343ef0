//! Error types for residual evaluation.

use pf_core::error::PfError;
use pf_fluids::{Component, FluidError};
use thiserror::Error;

/// Errors raised while evaluating storage, flux or source terms.
///
/// All of them indicate a configuration or programming mistake; none is
/// recoverable by retrying the same call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResidualError {
    #[error("Component {component} has no equation slot in this layout")]
    InactiveComponent { component: Component },

    #[error("Module {module} is enabled but its quantities are missing")]
    MissingQuantities { module: &'static str },

    #[error("Equation layout needs {num_eq} slots but only {capacity} derivative slots exist")]
    Layout { num_eq: usize, capacity: usize },

    #[error("Unknown {what} {index}")]
    UnknownEntity { what: &'static str, index: usize },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),
}

pub type ResidualResult<T> = Result<T, ResidualError>;

impl From<ResidualError> for PfError {
    fn from(e: ResidualError) -> Self {
        match e {
            ResidualError::Fluid(inner) => inner.into(),
            ResidualError::UnknownEntity { what, index } => PfError::IndexOob {
                what,
                index,
                len: 0,
            },
            other => PfError::Invariant {
                what: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ResidualError::MissingQuantities { module: "polymer" };
        assert!(err.to_string().contains("polymer"));

        let err = ResidualError::InactiveComponent {
            component: Component::Gas,
        };
        assert!(err.to_string().contains("gas"));
    }

    #[test]
    fn error_conversion() {
        let pf: PfError = ResidualError::Layout {
            num_eq: 4,
            capacity: 3,
        }
        .into();
        assert!(matches!(pf, PfError::Invariant { .. }));

        let pf: PfError = ResidualError::Fluid(FluidError::PvtRegionOob {
            region: 1,
            count: 1,
        })
        .into();
        assert!(matches!(pf, PfError::IndexOob { .. }));
    }
}
