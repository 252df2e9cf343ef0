//! Optional physics extensions.
//!
//! Every module is present in the chain and called in a fixed order; a
//! disabled module is a no-op. Modules read the shared quantities and add to
//! the equation slots they own. Diffusion owns no slot and adds to the
//! conservation slots instead.

mod brine;
mod diffusion;
mod energy;
mod extbo;
mod foam;
mod micp;
mod polymer;
mod solvent;

pub use brine::BrineModule;
pub use diffusion::DiffusionModule;
pub use energy::EnergyModule;
pub use extbo::ExtboModule;
pub use foam::FoamModule;
pub use micp::MicpModule;
pub use polymer::PolymerModule;
pub use solvent::SolventModule;

use crate::config::ResidualConfig;
use crate::error::{ResidualError, ResidualResult};
use crate::flux::FluxContext;
use crate::layout::EquationLayout;
use crate::vector::EqVector;
use pf_fluids::{FluidSystem, IntensiveQuantities};
use std::fmt;

/// Additive contribution of one physics extension.
///
/// Implementations must only write to slots they own and must be pure
/// functions of their inputs; assembly calls them concurrently.
pub trait PhysicsModule<const N: usize>: Send + Sync + fmt::Debug {
    /// Module name for logging and error messages.
    fn name(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    /// Add accumulation per bulk volume.
    fn add_storage(
        &self,
        out: &mut EqVector<N>,
        quantities: &IntensiveQuantities<N>,
    ) -> ResidualResult<()>;

    /// Add flux per face area, positive out of the interior.
    fn add_flux(&self, out: &mut EqVector<N>, ctx: &FluxContext<'_, N>) -> ResidualResult<()>;

    /// Add source rate per bulk volume.
    ///
    /// Default: no source.
    fn add_source(
        &self,
        _out: &mut EqVector<N>,
        _quantities: &IntensiveQuantities<N>,
    ) -> ResidualResult<()> {
        Ok(())
    }
}

/// Fail with [`ResidualError::MissingQuantities`] if a module's sub-object is
/// absent.
pub(crate) fn require<'q, T>(quantities: Option<&'q T>, module: &'static str) -> ResidualResult<&'q T> {
    quantities.ok_or(ResidualError::MissingQuantities { module })
}

/// The modules of one residual, in evaluation order.
#[derive(Debug)]
pub struct ModuleChain<const N: usize> {
    modules: Vec<Box<dyn PhysicsModule<N>>>,
}

impl<const N: usize> ModuleChain<N> {
    /// Built-in modules in the fixed order solvent, extended black-oil,
    /// polymer, energy, foam, brine, MICP, diffusion.
    pub fn new(layout: &EquationLayout, fluid_system: &FluidSystem, config: &ResidualConfig) -> Self {
        let modules: Vec<Box<dyn PhysicsModule<N>>> = vec![
            Box::new(SolventModule::new(layout.solvent(), fluid_system, config)),
            Box::new(ExtboModule::new(layout.zfraction())),
            Box::new(PolymerModule::new(layout.polymer(), config)),
            Box::new(EnergyModule::new(layout.energy(), fluid_system, config)),
            Box::new(FoamModule::new(layout.foam())),
            Box::new(BrineModule::new(layout.brine())),
            Box::new(MicpModule::new(layout.micp(), config)),
            Box::new(DiffusionModule::new(layout, fluid_system, config)),
        ];
        Self { modules }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Box<dyn PhysicsModule<N>>> {
        self.modules.iter()
    }

    /// Names of the enabled modules, in order.
    pub fn enabled(&self) -> Vec<&'static str> {
        self.iter().filter(|m| m.is_enabled()).map(|m| m.name()).collect()
    }

    pub fn add_storage(
        &self,
        out: &mut EqVector<N>,
        quantities: &IntensiveQuantities<N>,
    ) -> ResidualResult<()> {
        for module in self.iter() {
            module.add_storage(out, quantities)?;
        }
        Ok(())
    }

    pub fn add_flux(&self, out: &mut EqVector<N>, ctx: &FluxContext<'_, N>) -> ResidualResult<()> {
        for module in self.iter() {
            module.add_flux(out, ctx)?;
        }
        Ok(())
    }

    pub fn add_source(
        &self,
        out: &mut EqVector<N>,
        quantities: &IntensiveQuantities<N>,
    ) -> ResidualResult<()> {
        for module in self.iter() {
            module.add_source(out, quantities)?;
        }
        Ok(())
    }
}
