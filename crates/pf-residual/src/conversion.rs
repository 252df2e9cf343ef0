//! Surface-volume to mass conversion of the conservation slots.

use crate::config::ResidualConfig;
use crate::error::ResidualResult;
use crate::layout::EquationLayout;
use crate::vector::EqVector;
use pf_fluids::{Component, FluidSystem};

/// Multiply each active component's slot by its reference density in
/// `pvt_region` when masses are conserved. Module slots and pseudo slots are
/// left alone.
///
/// This is the only place reference densities enter the conservation
/// equations.
pub fn adapt_mass_conservation<const N: usize>(
    values: &mut EqVector<N>,
    layout: &EquationLayout,
    fluid_system: &FluidSystem,
    config: &ResidualConfig,
    pvt_region: usize,
) -> ResidualResult<()> {
    if config.conserve_surface_volume {
        return Ok(());
    }
    for comp in Component::ALL {
        if !fluid_system.component_is_active(comp) {
            continue;
        }
        let slot = layout.active_component_index(comp)?;
        let rho = fluid_system.reference_density(comp.phase(), pvt_region)?;
        values[slot] *= rho;
    }
    Ok(())
}
