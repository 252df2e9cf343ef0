//! Per-phase Darcy fluxes across one face.

use crate::config::ResidualConfig;
use crate::context::Side;
use crate::conversion::adapt_mass_conservation;
use crate::error::ResidualResult;
use crate::layout::EquationLayout;
use crate::problem::Problem;
use crate::upwind::{PotentialGeometry, phase_upwind};
use crate::vector::EqVector;
use pf_core::{DofId, Evaluation, FaceId, Real};
use pf_fluids::{Component, FluidSystem, IntensiveQuantities, NUM_PHASES, Phase};
use std::fmt;

/// Result of the upwind step for one phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseFlux<const N: usize> {
    pub upstream: Side,
    /// Threshold-clamped potential [Pa].
    pub potential: Evaluation<N>,
    /// Reservoir-volume flux per face area, positive out of the interior [m/s].
    pub darcy: Evaluation<N>,
}

impl<const N: usize> PhaseFlux<N> {
    #[inline]
    pub fn is_stagnant(&self) -> bool {
        self.potential.value() == 0.0
    }
}

/// Phase fluxes of one face, `None` for inactive phases.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhaseFluxes<const N: usize> {
    fluxes: [Option<PhaseFlux<N>>; NUM_PHASES],
}

impl<const N: usize> PhaseFluxes<N> {
    pub fn get(&self, phase: Phase) -> Option<&PhaseFlux<N>> {
        self.fluxes[phase.index()].as_ref()
    }

    /// Darcy flux of `phase`, zero when inactive or stagnant.
    pub fn darcy(&self, phase: Phase) -> Evaluation<N> {
        self.get(phase).map_or(Evaluation::zero(), |f| f.darcy)
    }

    fn set(&mut self, phase: Phase, flux: PhaseFlux<N>) {
        self.fluxes[phase.index()] = Some(flux);
    }
}

/// Everything a flux contribution may read about one face.
///
/// Quantities are passed as stored by the context; use
/// [`FluxContext::keep`] to discard derivatives of sides that are not the
/// focus.
#[derive(Clone)]
pub struct FluxContext<'a, const N: usize> {
    pub face: FaceId,
    pub is_boundary: bool,
    /// Face area [m²].
    pub area: Real,
    /// Transmissibility [m³].
    pub transmissibility: Real,
    pub geometry: PotentialGeometry,
    /// Geometric factor of heat conduction [m].
    pub thermal_transmissibility: Real,
    /// Geometric factor of molecular diffusion [m].
    pub diffusivity: Real,
    pub(crate) interior: &'a IntensiveQuantities<N>,
    pub(crate) exterior: &'a IntensiveQuantities<N>,
    pub(crate) interior_dof: DofId,
    pub(crate) exterior_dof: DofId,
    pub(crate) focus: Option<Side>,
    pub(crate) phases: PhaseFluxes<N>,
    pub(crate) problem: &'a dyn Problem<N>,
}

impl<const N: usize> fmt::Debug for FluxContext<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluxContext")
            .field("face", &self.face)
            .field("is_boundary", &self.is_boundary)
            .field("area", &self.area)
            .field("transmissibility", &self.transmissibility)
            .field("focus", &self.focus)
            .field("phases", &self.phases)
            .finish_non_exhaustive()
    }
}

impl<'a, const N: usize> FluxContext<'a, N> {
    pub fn quantities(&self, side: Side) -> &'a IntensiveQuantities<N> {
        match side {
            Side::Interior => self.interior,
            Side::Exterior => self.exterior,
        }
    }

    /// Global dof of `side`; a boundary face maps both sides to the interior.
    pub fn dof(&self, side: Side) -> DofId {
        match side {
            Side::Interior => self.interior_dof,
            Side::Exterior => self.exterior_dof,
        }
    }

    pub fn focus(&self) -> Option<Side> {
        self.focus
    }

    /// `value` with derivatives only if `side` is the focus.
    #[inline]
    pub fn keep(&self, side: Side, value: Evaluation<N>) -> Evaluation<N> {
        value.decay_unless(self.focus == Some(side))
    }

    /// Rock-compaction transmissibility multiplier evaluated on `side`.
    pub fn trans_multiplier(&self, side: Side) -> Evaluation<N> {
        let multiplier = self
            .problem
            .rock_comp_trans_multiplier(self.quantities(side), self.dof(side));
        self.keep(side, multiplier)
    }

    pub fn phases(&self) -> &PhaseFluxes<N> {
        &self.phases
    }

    /// Upstream quantities of an active, flowing phase.
    pub fn upstream(&self, phase: Phase) -> Option<(Side, &'a IntensiveQuantities<N>)> {
        self.phases
            .get(phase)
            .filter(|f| !f.is_stagnant())
            .map(|f| (f.upstream, self.quantities(f.upstream)))
    }
}

/// Upwind every active phase, distribute its surface flux into `out` and
/// record the phase fluxes in `ctx`.
pub(crate) fn evaluate_phase_fluxes<const N: usize>(
    out: &mut EqVector<N>,
    ctx: &mut FluxContext<'_, N>,
    layout: &EquationLayout,
    fluid_system: &FluidSystem,
    config: &ResidualConfig,
) -> ResidualResult<()> {
    let trans_per_area = ctx.transmissibility / ctx.area;
    for phase in fluid_system.active_phases() {
        let up = phase_upwind(
            phase,
            ctx.interior.fluid_state(),
            ctx.exterior.fluid_state(),
            &ctx.geometry,
            ctx.focus,
        );
        if up.is_stagnant() {
            ctx.phases.set(
                phase,
                PhaseFlux {
                    upstream: up.upstream,
                    potential: Evaluation::zero(),
                    darcy: Evaluation::zero(),
                },
            );
            continue;
        }

        let side = up.upstream;
        let upstream = ctx.quantities(side);
        let fs = upstream.fluid_state();
        let mobility = ctx.keep(side, fs.mobility(phase));
        let multiplier = ctx.trans_multiplier(side);
        let darcy = up.potential * mobility * multiplier * trans_per_area;

        let surface_flux = ctx.keep(side, fs.inv_b(phase)) * darcy;
        let mut contribution = EqVector::sized(out.len());
        contribution[layout.active_component_index(phase.solvent_component())?] += surface_flux;
        match phase {
            Phase::Oil if fluid_system.enable_dissolved_gas() => {
                let gas = layout.active_component_index(Component::Gas)?;
                contribution[gas] += ctx.keep(side, fs.rs()) * surface_flux;
            }
            Phase::Gas => {
                if fluid_system.enable_vaporized_oil() {
                    let oil = layout.active_component_index(Component::Oil)?;
                    contribution[oil] += ctx.keep(side, fs.rv()) * surface_flux;
                }
                if fluid_system.enable_vaporized_water() {
                    let water = layout.active_component_index(Component::Water)?;
                    contribution[water] += ctx.keep(side, fs.rvw()) * surface_flux;
                }
            }
            _ => {}
        }
        adapt_mass_conservation(
            &mut contribution,
            layout,
            fluid_system,
            config,
            upstream.pvt_region(),
        )?;
        *out += &contribution;

        ctx.phases.set(
            phase,
            PhaseFlux {
                upstream: side,
                potential: up.potential,
                darcy,
            },
        );
    }
    Ok(())
}
