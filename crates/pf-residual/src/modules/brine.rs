//! Dissolved salt with precipitation.

use super::{PhysicsModule, require};
use crate::error::ResidualResult;
use crate::flux::FluxContext;
use crate::vector::EqVector;
use pf_fluids::{IntensiveQuantities, Phase};

#[derive(Debug, Clone)]
pub struct BrineModule {
    slot: Option<usize>,
}

impl BrineModule {
    pub fn new(slot: Option<usize>) -> Self {
        Self { slot }
    }
}

impl<const N: usize> PhysicsModule<N> for BrineModule {
    fn name(&self) -> &'static str {
        "brine"
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
        let brine = require(quantities.brine(), "brine")?;
        let fs = quantities.fluid_state();
        let dissolved = quantities.porosity()
            * fs.saturation(Phase::Water)
            * fs.inv_b(Phase::Water)
            * brine.salt_concentration;
        let precipitated =
            brine.salt_saturation * (quantities.reference_porosity() * brine.salt_density);
        out[slot] += dissolved + precipitated;
        Ok(())
    }

    fn add_flux(&self, out: &mut EqVector<N>, ctx: &FluxContext<'_, N>) -> ResidualResult<()> {
        let Some(slot) = self.slot else {
            return Ok(());
        };
        let Some((side, q)) = ctx.upstream(Phase::Water) else {
            return Ok(());
        };
        let brine = require(q.brine(), "brine")?;
        let inv_b = ctx.keep(side, q.fluid_state().inv_b(Phase::Water));
        out[slot] += ctx.keep(side, brine.salt_concentration) * inv_b * ctx.phases().darcy(Phase::Water);
        Ok(())
    }
}
