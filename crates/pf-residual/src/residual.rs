//! Local residual of the black-oil model: storage, flux and source terms.

use crate::config::ResidualConfig;
use crate::context::{BoundaryFace, ElementContext, Face, FaceGeometry, Side};
use crate::conversion::adapt_mass_conservation;
use crate::error::{ResidualError, ResidualResult};
use crate::flux::{FluxContext, PhaseFluxes, evaluate_phase_fluxes};
use crate::layout::EquationLayout;
use crate::modules::ModuleChain;
use crate::problem::Problem;
use crate::storage::accumulate_phases;
use crate::upwind::PotentialGeometry;
use crate::vector::EqVector;
use pf_core::{DofId, FaceId, Real, finite_positive};
use pf_fluids::{FluidSystem, IntensiveQuantities};
use std::borrow::Cow;

/// Evaluates storage, flux and source terms of one dof or face.
///
/// Every `compute_*` call overwrites `out` and touches nothing else, so one
/// residual can be shared by any number of threads.
///
/// Storage is per bulk volume, flux per face area (positive out of the
/// interior) and source per bulk volume; the linearizer multiplies by volumes,
/// areas and the time step.
#[derive(Debug)]
pub struct BlackOilLocalResidual<P, const N: usize> {
    fluid_system: FluidSystem,
    config: ResidualConfig,
    layout: EquationLayout,
    modules: ModuleChain<N>,
    problem: P,
}

/// Both sides of a face as seen by the flux evaluator.
struct FaceSides<'a, const N: usize> {
    id: FaceId,
    is_boundary: bool,
    geometry: FaceGeometry,
    transmissibility: Real,
    depth_difference: Real,
    interior: &'a IntensiveQuantities<N>,
    exterior: &'a IntensiveQuantities<N>,
    interior_dof: DofId,
    exterior_dof: DofId,
    focus: Option<Side>,
}

impl<P, const N: usize> BlackOilLocalResidual<P, N>
where
    P: Problem<N>,
{
    pub fn new(fluid_system: FluidSystem, config: ResidualConfig, problem: P) -> ResidualResult<Self> {
        if !finite_positive(config.energy_scaling_factor) {
            return Err(ResidualError::InvalidArg {
                what: "energy scaling factor must be positive and finite",
            });
        }
        let layout = EquationLayout::new(&fluid_system, &config);
        layout.check_capacity(N)?;
        let modules = ModuleChain::new(&layout, &fluid_system, &config);

        tracing::debug!(
            num_eq = layout.num_eq(),
            num_conti = layout.num_conti(),
            conserve_surface_volume = config.conserve_surface_volume,
            modules = ?modules.enabled(),
            "black-oil residual configured"
        );

        Ok(Self {
            fluid_system,
            config,
            layout,
            modules,
            problem,
        })
    }

    pub fn layout(&self) -> &EquationLayout {
        &self.layout
    }

    pub fn config(&self) -> &ResidualConfig {
        &self.config
    }

    pub fn fluid_system(&self) -> &FluidSystem {
        &self.fluid_system
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn modules(&self) -> &ModuleChain<N> {
        &self.modules
    }

    /// Zero vector sized for this layout.
    pub fn new_vector(&self) -> EqVector<N> {
        EqVector::sized(self.layout.num_eq())
    }

    /// Accumulated conserved quantities per bulk volume.
    ///
    /// Time levels other than 0 carry no derivatives.
    pub fn compute_storage(
        &self,
        out: &mut EqVector<N>,
        quantities: &IntensiveQuantities<N>,
        time_level: usize,
    ) -> ResidualResult<()> {
        *out = self.new_vector();
        let quantities = if time_level == 0 {
            Cow::Borrowed(quantities)
        } else {
            Cow::Owned(quantities.decayed())
        };

        accumulate_phases(out, &quantities, &self.layout, &self.fluid_system, time_level)?;
        adapt_mass_conservation(
            out,
            &self.layout,
            &self.fluid_system,
            &self.config,
            quantities.pvt_region(),
        )?;
        self.modules.add_storage(out, &quantities)
    }

    /// Flux across an interior face, per face area.
    pub fn compute_flux<C>(
        &self,
        out: &mut EqVector<N>,
        context: &C,
        face: &Face,
        time_level: usize,
    ) -> ResidualResult<()>
    where
        C: ElementContext<N>,
    {
        let interior_dof = context.global_index(face.interior)?;
        let exterior_dof = context.global_index(face.exterior)?;
        let focus = self.focus_side(context, face.interior, Some(face.exterior), time_level);
        let sides = FaceSides {
            id: face.id,
            is_boundary: false,
            geometry: face.geometry,
            transmissibility: self.problem.transmissibility(face.id),
            depth_difference: self.problem.dof_center_depth(interior_dof)
                - self.problem.dof_center_depth(exterior_dof),
            interior: context.intensive_quantities(face.interior, time_level)?,
            exterior: context.intensive_quantities(face.exterior, time_level)?,
            interior_dof,
            exterior_dof,
            focus,
        };
        self.compute_face_flux(out, sides)
    }

    /// Flux across a boundary face towards its prescribed exterior state.
    ///
    /// The boundary side is never the focus.
    pub fn compute_boundary_flux<C>(
        &self,
        out: &mut EqVector<N>,
        context: &C,
        face: &BoundaryFace,
        time_level: usize,
    ) -> ResidualResult<()>
    where
        C: ElementContext<N>,
    {
        let interior_dof = context.global_index(face.interior)?;
        let focus = self.focus_side(context, face.interior, None, time_level);
        let sides = FaceSides {
            id: face.id,
            is_boundary: true,
            geometry: face.geometry,
            transmissibility: self.problem.boundary_transmissibility(face.id),
            depth_difference: self.problem.dof_center_depth(interior_dof) - face.depth,
            interior: context.intensive_quantities(face.interior, time_level)?,
            exterior: context.boundary_quantities(face)?,
            interior_dof,
            exterior_dof: interior_dof,
            focus,
        };
        self.compute_face_flux(out, sides)
    }

    /// Source rate per bulk volume of stencil dof `dof`.
    pub fn compute_source<C>(
        &self,
        out: &mut EqVector<N>,
        context: &C,
        dof: usize,
        time_level: usize,
    ) -> ResidualResult<()>
    where
        C: ElementContext<N>,
    {
        *out = self.new_vector();
        let global = context.global_index(dof)?;
        let quantities = context.intensive_quantities(dof, time_level)?;

        self.problem.source(out, global, quantities, time_level)?;
        self.modules.add_source(out, quantities)?;
        if let Some(slot) = self.layout.energy() {
            out[slot] *= self.config.energy_scaling_factor;
        }
        Ok(())
    }

    fn focus_side<C>(&self, context: &C, interior: usize, exterior: Option<usize>, time_level: usize) -> Option<Side>
    where
        C: ElementContext<N>,
    {
        if time_level != 0 {
            return None;
        }
        let focus = context.focus_dof();
        if focus == interior {
            Some(Side::Interior)
        } else if Some(focus) == exterior {
            Some(Side::Exterior)
        } else {
            None
        }
    }

    fn compute_face_flux(&self, out: &mut EqVector<N>, sides: FaceSides<'_, N>) -> ResidualResult<()> {
        *out = self.new_vector();
        let area = sides.geometry.area;
        if !finite_positive(area) {
            return Err(ResidualError::InvalidArg {
                what: "face area must be positive and finite",
            });
        }

        let gravity = self.problem.gravity()[2];
        let mut ctx = FluxContext {
            face: sides.id,
            is_boundary: sides.is_boundary,
            area,
            transmissibility: sides.transmissibility,
            geometry: PotentialGeometry {
                depth_difference: sides.depth_difference,
                gravity,
                threshold_pressure: self.problem.threshold_pressure(sides.id),
            },
            thermal_transmissibility: self.problem.thermal_transmissibility(sides.id),
            diffusivity: self.problem.diffusivity(sides.id),
            interior: sides.interior,
            exterior: sides.exterior,
            interior_dof: sides.interior_dof,
            exterior_dof: sides.exterior_dof,
            focus: sides.focus,
            phases: PhaseFluxes::default(),
            problem: &self.problem,
        };

        evaluate_phase_fluxes(
            out,
            &mut ctx,
            &self.layout,
            &self.fluid_system,
            &self.config,
        )?;
        self.modules.add_flux(out, &ctx)?;

        tracing::trace!(face = %sides.id, boundary = sides.is_boundary, "face flux evaluated");
        Ok(())
    }
}
