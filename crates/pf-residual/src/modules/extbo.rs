//! Extended black-oil pseudo-component carried by oil and gas.

use super::{PhysicsModule, require};
use crate::error::ResidualResult;
use crate::flux::FluxContext;
use crate::vector::EqVector;
use pf_fluids::{IntensiveQuantities, Phase};

#[derive(Debug, Clone)]
pub struct ExtboModule {
    slot: Option<usize>,
}

impl ExtboModule {
    pub fn new(slot: Option<usize>) -> Self {
        Self { slot }
    }
}

impl<const N: usize> PhysicsModule<N> for ExtboModule {
    fn name(&self) -> &'static str {
        "extbo"
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
        let z = require(quantities.extbo(), "extbo")?;
        let fs = quantities.fluid_state();
        let oil = z.oil_fraction * fs.saturation(Phase::Oil) * fs.inv_b(Phase::Oil);
        let gas = z.gas_fraction * fs.saturation(Phase::Gas) * fs.inv_b(Phase::Gas);
        out[slot] += quantities.porosity() * (oil + gas);
        Ok(())
    }

    fn add_flux(&self, out: &mut EqVector<N>, ctx: &FluxContext<'_, N>) -> ResidualResult<()> {
        let Some(slot) = self.slot else {
            return Ok(());
        };
        for phase in [Phase::Oil, Phase::Gas] {
            let Some((side, q)) = ctx.upstream(phase) else {
                continue;
            };
            let z = require(q.extbo(), "extbo")?;
            let fraction = match phase {
                Phase::Gas => z.gas_fraction,
                _ => z.oil_fraction,
            };
            let inv_b = q.fluid_state().inv_b(phase);
            out[slot] += ctx.keep(side, fraction) * ctx.keep(side, inv_b) * ctx.phases().darcy(phase);
        }
        Ok(())
    }
}
