//! pf-fluids: black-oil fluid description for porousflow.
//!
//! Provides:
//! - Phase and component enumerations with canonical numbering
//! - `FluidSystem`: active phases, dissolution/vaporization switches and
//!   reference densities per PVT region
//! - `FluidState`: immutable per-(dof, time level) snapshot of phase properties
//! - `IntensiveQuantities`: a fluid state plus optional per-module sub-quantities
//!
//! PVT correlations themselves live outside this crate; anything that can fill
//! a `FluidState` is a valid provider.
//!
//! # Example
//!
//! ```
//! use pf_fluids::{FluidSystem, Phase};
//!
//! let fs = FluidSystem::builder()
//!     .phases(&[Phase::Oil, Phase::Gas])
//!     .dissolved_gas(true)
//!     .reference_densities(&[[1000.0, 800.0, 1.2]])
//!     .build()
//!     .unwrap();
//!
//! assert!(fs.phase_is_active(Phase::Gas));
//! assert!(!fs.phase_is_active(Phase::Water));
//! assert_eq!(fs.reference_density(Phase::Oil, 0).unwrap(), 800.0);
//! ```

pub mod error;
pub mod phase;
pub mod quantities;
pub mod state;
pub mod system;

// Re-exports for ergonomics
pub use error::{FluidError, FluidResult};
pub use phase::{Component, NUM_PHASES, Phase};
pub use quantities::{
    BrineQuantities, DiffusionQuantities, EnergyQuantities, ExtboQuantities, FoamQuantities,
    IntensiveQuantities, IntensiveQuantitiesBuilder, MicpQuantities, PolymerQuantities,
    SolventQuantities,
};
pub use state::FluidState;
pub use system::{FluidSystem, FluidSystemBuilder};
