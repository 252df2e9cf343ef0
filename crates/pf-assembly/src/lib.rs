//! pf-assembly: global linearization of the black-oil residual.
//!
//! - `Grid` / `GridBuilder`: two-point flux connectivity with boundary connections
//! - `SimplePvt`: reference fluid-state provider (linear compressibility, Corey)
//! - `GridProblem`: [`pf_residual::Problem`] backed by a grid
//! - `Linearizer`: parallel residual and Jacobian assembly, one focus cell per pass
//! - `jacobian`: central finite differences for derivative checks

pub mod builder;
pub mod error;
pub mod grid;
pub mod jacobian;
pub mod linearizer;
pub mod problem;
pub mod pvt;
mod validate;

pub use builder::GridBuilder;
pub use error::{AssemblyError, AssemblyResult};
pub use grid::{Cell, Connection, ConnectionKind, ConnectionProps, Grid};
pub use jacobian::{JacobianMismatch, central_difference_jacobian, compare_jacobians};
pub use linearizer::{Linearization, Linearizer};
pub use problem::GridProblem;
pub use pvt::{PhasePvt, PrimaryVariables, SimplePvt};
