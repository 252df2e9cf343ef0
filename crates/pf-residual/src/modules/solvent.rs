//! Solvent gas as a fourth, gas-like pseudo-component.
//!
//! Solvent flows under the gas pressure, or the oil pressure when gas is not
//! an active phase, with its own density, mobility and the rock-compaction
//! multiplier of its upstream side.

use super::{PhysicsModule, require};
use crate::config::ResidualConfig;
use crate::context::Side;
use crate::error::ResidualResult;
use crate::flux::FluxContext;
use crate::upwind::potential_difference;
use crate::vector::EqVector;
use pf_fluids::{FluidSystem, IntensiveQuantities, Phase};

#[derive(Debug, Clone)]
pub struct SolventModule {
    slot: Option<usize>,
    conserve_surface_volume: bool,
    pressure_phase: Phase,
}

impl SolventModule {
    pub fn new(slot: Option<usize>, fluid_system: &FluidSystem, config: &ResidualConfig) -> Self {
        let pressure_phase = [Phase::Gas, Phase::Oil]
            .into_iter()
            .find(|p| fluid_system.phase_is_active(*p))
            .unwrap_or(Phase::Water);
        Self {
            slot,
            conserve_surface_volume: config.conserve_surface_volume,
            pressure_phase,
        }
    }

    /// Phase whose pressure drives the solvent.
    pub fn pressure_phase(&self) -> Phase {
        self.pressure_phase
    }
}

impl<const N: usize> PhysicsModule<N> for SolventModule {
    fn name(&self) -> &'static str {
        "solvent"
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
        let s = require(quantities.solvent(), "solvent")?;
        let mut stored = quantities.porosity() * s.saturation * s.inv_b;
        if !self.conserve_surface_volume {
            stored *= s.reference_density;
        }
        out[slot] += stored;
        Ok(())
    }

    fn add_flux(&self, out: &mut EqVector<N>, ctx: &FluxContext<'_, N>) -> ResidualResult<()> {
        let Some(slot) = self.slot else {
            return Ok(());
        };
        let s_in = require(ctx.quantities(Side::Interior).solvent(), "solvent")?;
        let s_ex = require(ctx.quantities(Side::Exterior).solvent(), "solvent")?;

        let pressure = |side: Side| {
            let p = ctx.quantities(side).fluid_state().pressure(self.pressure_phase);
            ctx.keep(side, p)
        };
        let up = potential_difference(
            pressure(Side::Interior),
            pressure(Side::Exterior),
            ctx.keep(Side::Interior, s_in.density),
            ctx.keep(Side::Exterior, s_ex.density),
            &ctx.geometry,
        );
        if up.is_stagnant() {
            return Ok(());
        }

        let side = up.upstream;
        let s_up = match side {
            Side::Interior => s_in,
            Side::Exterior => s_ex,
        };
        let darcy = up.potential
            * ctx.keep(side, s_up.mobility)
            * ctx.trans_multiplier(side)
            * (ctx.transmissibility / ctx.area);
        let mut flux = ctx.keep(side, s_up.inv_b) * darcy;
        if !self.conserve_surface_volume {
            flux *= s_up.reference_density;
        }
        out[slot] += flux;
        Ok(())
    }
}
