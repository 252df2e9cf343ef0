//! Molecular diffusion of dissolved components.

use super::{PhysicsModule, require};
use crate::config::ResidualConfig;
use crate::context::Side;
use crate::conversion::adapt_mass_conservation;
use crate::error::ResidualResult;
use crate::flux::FluxContext;
use crate::layout::EquationLayout;
use crate::vector::EqVector;
use pf_core::Evaluation;
use pf_fluids::{Component, FluidState, FluidSystem, IntensiveQuantities, Phase};

type Ratio<const N: usize> = fn(&FluidState<N>) -> Evaluation<N>;

/// Diffuses gas dissolved in oil, oil vaporized in gas and water vaporized in
/// gas down their ratio gradients. Writes to the conservation slots and
/// converts with the interior dof's PVT region.
#[derive(Debug, Clone)]
pub struct DiffusionModule {
    enabled: bool,
    layout: EquationLayout,
    fluid_system: FluidSystem,
    config: ResidualConfig,
}

impl DiffusionModule {
    pub fn new(layout: &EquationLayout, fluid_system: &FluidSystem, config: &ResidualConfig) -> Self {
        Self {
            enabled: config.modules.diffusion,
            layout: layout.clone(),
            fluid_system: fluid_system.clone(),
            config: config.clone(),
        }
    }

    /// (carrier phase, diffusing component, ratio accessor)
    fn pairs<const N: usize>(&self) -> Vec<(Phase, Component, Ratio<N>)> {
        let fs = &self.fluid_system;
        let mut pairs: Vec<(Phase, Component, Ratio<N>)> = Vec::new();
        if fs.enable_dissolved_gas() {
            pairs.push((Phase::Oil, Component::Gas, FluidState::rs));
        }
        if fs.enable_vaporized_oil() {
            pairs.push((Phase::Gas, Component::Oil, FluidState::rv));
        }
        if fs.enable_vaporized_water() {
            pairs.push((Phase::Gas, Component::Water, FluidState::rvw));
        }
        pairs
    }
}

impl<const N: usize> PhysicsModule<N> for DiffusionModule {
    fn name(&self) -> &'static str {
        "diffusion"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn add_storage(
        &self,
        _out: &mut EqVector<N>,
        _quantities: &IntensiveQuantities<N>,
    ) -> ResidualResult<()> {
        Ok(())
    }

    fn add_flux(&self, out: &mut EqVector<N>, ctx: &FluxContext<'_, N>) -> ResidualResult<()> {
        if !self.enabled || ctx.diffusivity == 0.0 {
            return Ok(());
        }
        let q_in = ctx.quantities(Side::Interior);
        let q_ex = ctx.quantities(Side::Exterior);
        let d_in = require(q_in.diffusion(), "diffusion")?;
        let d_ex = require(q_ex.diffusion(), "diffusion")?;
        let (fs_in, fs_ex) = (q_in.fluid_state(), q_ex.fluid_state());
        let keep_in = |v: Evaluation<N>| ctx.keep(Side::Interior, v);
        let keep_ex = |v: Evaluation<N>| ctx.keep(Side::Exterior, v);

        let porosity = (keep_in(q_in.porosity()) + keep_ex(q_ex.porosity())) * 0.5;
        let mut contribution = EqVector::sized(out.len());
        for (phase, comp, ratio) in self.pairs::<N>() {
            let i = phase.index();
            let coefficient = (keep_in(d_in.coefficient[i]) + keep_ex(d_ex.coefficient[i])) * 0.5;
            let carrier = (keep_in(fs_in.saturation(phase) * fs_in.inv_b(phase))
                + keep_ex(fs_ex.saturation(phase) * fs_ex.inv_b(phase)))
                * 0.5;
            let gradient = keep_in(ratio(fs_in)) - keep_ex(ratio(fs_ex));
            let slot = self.layout.active_component_index(comp)?;
            contribution[slot] += coefficient
                * porosity
                * carrier
                * gradient
                * (ctx.diffusivity / ctx.area);
        }
        adapt_mass_conservation(
            &mut contribution,
            &self.layout,
            &self.fluid_system,
            &self.config,
            q_in.pvt_region(),
        )?;
        *out += &contribution;
        Ok(())
    }
}
