//! Foam surfactant transported with the gas phase.

use super::{PhysicsModule, require};
use crate::error::ResidualResult;
use crate::flux::FluxContext;
use crate::vector::EqVector;
use pf_fluids::{IntensiveQuantities, Phase};

#[derive(Debug, Clone)]
pub struct FoamModule {
    slot: Option<usize>,
}

impl FoamModule {
    pub fn new(slot: Option<usize>) -> Self {
        Self { slot }
    }
}

impl<const N: usize> PhysicsModule<N> for FoamModule {
    fn name(&self) -> &'static str {
        "foam"
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
        let foam = require(quantities.foam(), "foam")?;
        out[slot] += quantities.porosity()
            * quantities.fluid_state().saturation(Phase::Gas)
            * foam.concentration;
        Ok(())
    }

    fn add_flux(&self, out: &mut EqVector<N>, ctx: &FluxContext<'_, N>) -> ResidualResult<()> {
        let Some(slot) = self.slot else {
            return Ok(());
        };
        let Some((side, q)) = ctx.upstream(Phase::Gas) else {
            return Ok(());
        };
        let foam = require(q.foam(), "foam")?;
        out[slot] += ctx.keep(side, foam.concentration) * ctx.phases().darcy(Phase::Gas);
        Ok(())
    }
}
