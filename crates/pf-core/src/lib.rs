//! pf-core: stable foundation for porousflow.
//!
//! Contains:
//! - eval (forward-mode dual numbers with derivative decay)
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact IDs for dofs and faces)
//! - timing (opt-in assembly timers)
//! - error (shared error types)

pub mod error;
pub mod eval;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PfError, PfResult};
pub use eval::Evaluation;
pub use ids::*;
pub use numeric::*;
pub use units::*;
