//! Fluid description errors.

use crate::phase::Phase;
use pf_core::PfError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors raised while describing or querying the fluid system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, porosity outside [0, 1], etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A per-phase query targeted a phase that is disabled for this run.
    #[error("Phase {phase} is not active")]
    InactivePhase { phase: Phase },

    /// PVT region index beyond the configured regions.
    #[error("PVT region {region} out of range ({count} regions)")]
    PvtRegionOob { region: usize, count: usize },

    /// Operation not supported by the provider.
    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },
}

impl From<FluidError> for PfError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::PvtRegionOob { region, count } => PfError::IndexOob {
                what: "pvt region",
                index: region,
                len: count,
            },
            FluidError::InvalidArg { what } | FluidError::NotSupported { what } => {
                PfError::InvalidArg {
                    what: what.to_string(),
                }
            }
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
        let err = FluidError::InactivePhase { phase: Phase::Gas };
        assert!(err.to_string().contains("gas"));

        let err = FluidError::PvtRegionOob {
            region: 3,
            count: 1,
        };
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn error_to_pf_error() {
        let pf: PfError = FluidError::PvtRegionOob {
            region: 2,
            count: 1,
        }
        .into();
        assert!(matches!(pf, PfError::IndexOob { index: 2, .. }));

        let pf: PfError = FluidError::NonPhysical { what: "density" }.into();
        assert!(matches!(pf, PfError::Invariant { .. }));
    }
}
