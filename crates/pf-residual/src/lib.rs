//! pf-residual: local residual of the black-oil model.
//!
//! Per control volume and face this crate computes:
//! - storage: surface volumes (or masses) of water, oil and gas, with gas
//!   dissolved in oil and oil/water vaporized in gas
//! - flux: upwinded Darcy fluxes under gravity and threshold pressure
//! - source: problem callback plus module reactions
//!
//! Optional physics (solvent, extended black-oil, polymer, energy, foam,
//! brine, MICP, diffusion) plug in through [`PhysicsModule`] and own
//! their equation slots in [`EquationLayout`].
//!
//! Derivatives are tracked only with respect to the focus dof of the
//! [`ElementContext`]; all other dofs enter as plain values.

pub mod config;
pub mod context;
pub mod conversion;
pub mod error;
pub mod flux;
pub mod layout;
pub mod modules;
pub mod problem;
pub mod residual;
mod storage;
pub mod upwind;
pub mod vector;

pub use config::{MicpParams, ModuleSwitches, PolymerParams, ResidualConfig};
pub use context::{
    BoundaryFace, ElementContext, Face, FaceGeometry, Side, StencilContext, StencilDof,
};
pub use error::{ResidualError, ResidualResult};
pub use flux::{FluxContext, PhaseFlux, PhaseFluxes};
pub use layout::{EquationLayout, MicpSlots};
pub use modules::{ModuleChain, PhysicsModule};
pub use problem::Problem;
pub use residual::BlackOilLocalResidual;
pub use upwind::{PotentialGeometry, Upwind};
pub use vector::EqVector;
