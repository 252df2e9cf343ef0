//! Black-oil accumulation of one control volume.

use crate::error::ResidualResult;
use crate::layout::EquationLayout;
use crate::vector::EqVector;
use pf_core::Evaluation;
use pf_fluids::{Component, FluidSystem, IntensiveQuantities, Phase};

/// Surface volumes per bulk volume, one entry per conservation slot.
///
/// Pseudo slots of disabled phases are registered as unknowns at time level 0
/// so the linear system stays regular.
pub(crate) fn accumulate_phases<const N: usize>(
    out: &mut EqVector<N>,
    quantities: &IntensiveQuantities<N>,
    layout: &EquationLayout,
    fluid_system: &FluidSystem,
    time_level: usize,
) -> ResidualResult<()> {
    for comp in Component::ALL.into_iter().filter(|c| layout.is_pseudo(*c)) {
        let slot = layout.active_component_index(comp)?;
        out[slot] = if time_level == 0 {
            Evaluation::variable(0.0, slot)
        } else {
            Evaluation::zero()
        };
    }

    let fs = quantities.fluid_state();
    let porosity = quantities.porosity();
    for phase in fluid_system.active_phases() {
        let surface_volume = fs.saturation(phase) * fs.inv_b(phase) * porosity;
        let own = layout.active_component_index(phase.solvent_component())?;
        out[own] += surface_volume;

        match phase {
            Phase::Oil if fluid_system.enable_dissolved_gas() => {
                let gas = layout.active_component_index(Component::Gas)?;
                out[gas] += fs.rs() * surface_volume;
            }
            Phase::Gas => {
                if fluid_system.enable_vaporized_oil() {
                    let oil = layout.active_component_index(Component::Oil)?;
                    out[oil] += fs.rv() * surface_volume;
                }
                if fluid_system.enable_vaporized_water() {
                    let water = layout.active_component_index(Component::Water)?;
                    out[water] += fs.rvw() * surface_volume;
                }
            }
            _ => {}
        }
    }
    Ok(())
}
