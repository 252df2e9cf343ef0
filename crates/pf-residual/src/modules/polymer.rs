//! Polymer dissolved in water, with rock adsorption.

use super::{PhysicsModule, require};
use crate::config::ResidualConfig;
use crate::error::ResidualResult;
use crate::flux::FluxContext;
use crate::vector::EqVector;
use pf_core::Real;
use pf_fluids::{IntensiveQuantities, Phase};

#[derive(Debug, Clone)]
pub struct PolymerModule {
    slot: Option<usize>,
    rock_density: Real,
}

impl PolymerModule {
    pub fn new(slot: Option<usize>, config: &ResidualConfig) -> Self {
        Self {
            slot,
            rock_density: config.polymer.rock_density,
        }
    }
}

impl<const N: usize> PhysicsModule<N> for PolymerModule {
    fn name(&self) -> &'static str {
        "polymer"
    }

    fn is_enabled(&self) -> bool {
        self.slot.is_some()
    }

    fn add_storage(
        &self,
        out: &mut EqVector<N>,
        quantities: &IntensiveQuantities<N>,
    ) -> ResidualResult<()> {
        let Some(slot) = self.slot else {
            return Ok(());
        };
        let poly = require(quantities.polymer(), "polymer")?;
        let fs = quantities.fluid_state();
        let dissolved = quantities.porosity()
            * fs.saturation(Phase::Water)
            * fs.inv_b(Phase::Water)
            * poly.concentration;
        let adsorbed =
            poly.adsorption * (self.rock_density * (1.0 - quantities.reference_porosity()));
        out[slot] += dissolved + adsorbed;
        Ok(())
    }

    fn add_flux(&self, out: &mut EqVector<N>, ctx: &FluxContext<'_, N>) -> ResidualResult<()> {
        let Some(slot) = self.slot else {
            return Ok(());
        };
        let Some((side, q)) = ctx.upstream(Phase::Water) else {
            return Ok(());
        };
        let poly = require(q.polymer(), "polymer")?;
        let inv_b = ctx.keep(side, q.fluid_state().inv_b(Phase::Water));
        let concentration = ctx.keep(side, poly.concentration);
        let multiplier = ctx.keep(side, poly.viscosity_multiplier);
        out[slot] += concentration * inv_b * ctx.phases().darcy(Phase::Water) / multiplier;
        Ok(())
    }
}
