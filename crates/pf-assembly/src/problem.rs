//! Problem callbacks backed by a [`Grid`].

use crate::error::{AssemblyError, AssemblyResult};
use crate::grid::{Connection, ConnectionProps, Grid};
use pf_core::units::constants::G0_MPS2;
use pf_core::{DofId, Evaluation, FaceId, Real};
use pf_fluids::IntensiveQuantities;
use pf_residual::{EqVector, Problem, ResidualResult};

/// Grid geometry plus sources, boundary states and rock compaction.
#[derive(Debug, Clone)]
pub struct GridProblem {
    grid: Grid,
    gravity: Real,
    /// Exponent of `φ/φ_ref` in the transmissibility multiplier; 0 disables it.
    compaction_exponent: Real,
    /// Source rate per bulk volume for each cell; empty when the cell has none.
    sources: Vec<Vec<Real>>,
    /// Primary variables of the exterior state, per connection id.
    boundary_states: Vec<Option<Vec<Real>>>,
}

impl GridProblem {
    /// Problem on `grid` with standard gravity and no sources.
    pub fn new(grid: Grid) -> Self {
        let cells = grid.num_cells();
        let faces = grid.connections().len();
        Self {
            grid,
            gravity: G0_MPS2,
            compaction_exponent: 0.0,
            sources: vec![Vec::new(); cells],
            boundary_states: vec![None; faces],
        }
    }

    pub fn with_gravity(mut self, gravity: Real) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_compaction_exponent(mut self, exponent: Real) -> Self {
        self.compaction_exponent = exponent;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Set the source rates of `cell`, one per equation slot.
    pub fn set_source(&mut self, cell: DofId, rates: Vec<Real>) -> AssemblyResult<()> {
        if rates.iter().any(|r| !r.is_finite()) {
            return Err(AssemblyError::NonPhysical {
                what: "source rate",
                entity: "cell",
                index: cell.as_usize(),
            });
        }
        let slot = self
            .sources
            .get_mut(cell.as_usize())
            .ok_or(AssemblyError::NonPhysical {
                what: "source target",
                entity: "cell",
                index: cell.as_usize(),
            })?;
        *slot = rates;
        Ok(())
    }

    /// Prescribe the exterior primary variables of boundary connection `face`.
    pub fn set_boundary_state(&mut self, face: FaceId, values: Vec<Real>) -> AssemblyResult<()> {
        let is_boundary = self.grid.connection(face).is_some_and(Connection::is_boundary);
        if !is_boundary {
            return Err(AssemblyError::NonPhysical {
                what: "boundary state target",
                entity: "connection",
                index: face.as_usize(),
            });
        }
        self.boundary_states[face.as_usize()] = Some(values);
        Ok(())
    }

    pub fn boundary_state(&self, face: FaceId) -> Option<&[Real]> {
        self.boundary_states
            .get(face.as_usize())
            .and_then(|v| v.as_deref())
    }

    pub fn source_rates(&self, cell: DofId) -> &[Real] {
        self.sources
            .get(cell.as_usize())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn sources(&self) -> impl Iterator<Item = (DofId, &[Real])> + '_ {
        self.grid
            .cells()
            .iter()
            .map(|c| (c.id, self.source_rates(c.id)))
            .filter(|(_, rates)| !rates.is_empty())
    }

    /// Properties of `face`; an unknown id is logged and reads as zeros.
    fn props(&self, face: FaceId) -> Option<&ConnectionProps> {
        let props = self.grid.connection(face).map(|c| &c.props);
        if props.is_none() {
            tracing::warn!(
                face = %face,
                connections = self.grid.connections().len(),
                "lookup on unknown connection"
            );
        }
        props
    }
}

impl<const N: usize> Problem<N> for GridProblem {
    fn gravity(&self) -> [Real; 3] {
        [0.0, 0.0, self.gravity]
    }

    fn transmissibility(&self, face: FaceId) -> Real {
        self.props(face).map_or(0.0, |p| p.transmissibility)
    }

    fn boundary_transmissibility(&self, face: FaceId) -> Real {
        self.props(face).map_or(0.0, |p| p.transmissibility)
    }

    fn threshold_pressure(&self, face: FaceId) -> Real {
        self.props(face).map_or(0.0, |p| p.threshold_pressure)
    }

    fn dof_center_depth(&self, dof: DofId) -> Real {
        match self.grid.cell(dof) {
            Some(cell) => cell.depth,
            None => {
                tracing::warn!(cell = %dof, cells = self.grid.num_cells(), "depth of unknown cell");
                0.0
            }
        }
    }

    fn rock_comp_trans_multiplier(
        &self,
        quantities: &IntensiveQuantities<N>,
        _dof: DofId,
    ) -> Evaluation<N> {
        let phi_ref = quantities.reference_porosity();
        if self.compaction_exponent == 0.0 || phi_ref <= 0.0 {
            return Evaluation::constant(1.0);
        }
        (quantities.porosity() / phi_ref).powf(self.compaction_exponent)
    }

    fn thermal_transmissibility(&self, face: FaceId) -> Real {
        self.props(face).map_or(0.0, |p| p.thermal_transmissibility)
    }

    fn diffusivity(&self, face: FaceId) -> Real {
        self.props(face).map_or(0.0, |p| p.diffusivity)
    }

    fn source(
        &self,
        out: &mut EqVector<N>,
        dof: DofId,
        _quantities: &IntensiveQuantities<N>,
        _time_level: usize,
    ) -> ResidualResult<()> {
        for (slot, rate) in self.source_rates(dof).iter().enumerate().take(out.len()) {
            out[slot] += *rate;
        }
        Ok(())
    }
}
