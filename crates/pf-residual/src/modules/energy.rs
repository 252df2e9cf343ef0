//! Energy conservation: convective and conductive heat transport.
//!
//! The rock term is weighted by `1 - φ_ref`: compaction changes the pore
//! volume, not the amount of rock in the cell.

use super::{PhysicsModule, require};
use crate::config::ResidualConfig;
use crate::context::Side;
use crate::error::ResidualResult;
use crate::flux::FluxContext;
use crate::vector::EqVector;
use pf_core::{Evaluation, Real};
use pf_fluids::{FluidSystem, IntensiveQuantities, Phase};

/// Every term is multiplied by `scaling` to keep the energy equation in the
/// same range as the mass equations.
#[derive(Debug, Clone)]
pub struct EnergyModule {
    slot: Option<usize>,
    phases: Vec<Phase>,
    scaling: Real,
}

impl EnergyModule {
    pub fn new(slot: Option<usize>, fluid_system: &FluidSystem, config: &ResidualConfig) -> Self {
        Self {
            slot,
            phases: fluid_system.active_phases().collect(),
            scaling: config.energy_scaling_factor,
        }
    }
}

impl<const N: usize> PhysicsModule<N> for EnergyModule {
    fn name(&self) -> &'static str {
        "energy"
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
        let energy = require(quantities.energy(), "energy")?;
        let fs = quantities.fluid_state();
        let phi = quantities.porosity();
        let mut stored = energy.rock_internal_energy * (1.0 - quantities.reference_porosity());
        for &phase in &self.phases {
            stored += phi
                * fs.saturation(phase)
                * fs.density(phase)
                * energy.internal_energy[phase.index()];
        }
        out[slot] += stored * self.scaling;
        Ok(())
    }

    fn add_flux(&self, out: &mut EqVector<N>, ctx: &FluxContext<'_, N>) -> ResidualResult<()> {
        let Some(slot) = self.slot else {
            return Ok(());
        };

        let mut heat = Evaluation::<N>::zero();
        for &phase in &self.phases {
            let Some((side, q)) = ctx.upstream(phase) else {
                continue;
            };
            let energy = require(q.energy(), "energy")?;
            let rho = ctx.keep(side, q.fluid_state().density(phase));
            let h = ctx.keep(side, energy.enthalpy[phase.index()]);
            heat += rho * h * ctx.phases().darcy(phase);
        }

        if ctx.thermal_transmissibility != 0.0 {
            let e_in = require(ctx.quantities(Side::Interior).energy(), "energy")?;
            let e_ex = require(ctx.quantities(Side::Exterior).energy(), "energy")?;
            let lambda = (ctx.keep(Side::Interior, e_in.thermal_conductivity)
                + ctx.keep(Side::Exterior, e_ex.thermal_conductivity))
                * 0.5;
            let dt = ctx.keep(Side::Interior, e_in.temperature)
                - ctx.keep(Side::Exterior, e_ex.temperature);
            heat += lambda * dt * (ctx.thermal_transmissibility / ctx.area);
        }

        out[slot] += heat * self.scaling;
        Ok(())
    }
}
