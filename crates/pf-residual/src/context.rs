//! Element context: the stencil of dofs an assembly call may look at.

use crate::error::{ResidualError, ResidualResult};
use pf_core::{DofId, FaceId, Real};
use pf_fluids::IntensiveQuantities;

/// Which side of a face a quantity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Interior,
    Exterior,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Interior => Side::Exterior,
            Side::Exterior => Side::Interior,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeometry {
    /// Face area [m²].
    pub area: Real,
    /// Unit normal pointing from the interior to the exterior dof.
    pub normal: [Real; 3],
}

/// Face between two dofs of the stencil.
///
/// `interior` and `exterior` are stencil-local dof indices; `id` is the global
/// face identity the problem keys its transmissibilities on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub id: FaceId,
    pub interior: usize,
    pub exterior: usize,
    pub geometry: FaceGeometry,
}

impl Face {
    /// The same face seen from the exterior dof.
    pub fn reversed(&self) -> Self {
        let [x, y, z] = self.geometry.normal;
        Self {
            id: self.id,
            interior: self.exterior,
            exterior: self.interior,
            geometry: FaceGeometry {
                area: self.geometry.area,
                normal: [-x, -y, -z],
            },
        }
    }
}

/// Face on the domain boundary with a prescribed exterior state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryFace {
    pub id: FaceId,
    pub interior: usize,
    pub geometry: FaceGeometry,
    /// Depth of the face center [m].
    pub depth: Real,
}

/// Read access to the dofs of one assembly stencil.
pub trait ElementContext<const N: usize> {
    fn num_dofs(&self) -> usize;

    /// Stencil-local index of the dof whose primary variables are seeded.
    fn focus_dof(&self) -> usize;

    fn global_index(&self, dof: usize) -> ResidualResult<DofId>;

    fn intensive_quantities(
        &self,
        dof: usize,
        time_level: usize,
    ) -> ResidualResult<&IntensiveQuantities<N>>;

    /// Control-volume size [m³].
    fn dof_volume(&self, dof: usize) -> ResidualResult<Real>;

    fn boundary_quantities(&self, face: &BoundaryFace) -> ResidualResult<&IntensiveQuantities<N>>;
}

/// One dof of a [`StencilContext`].
#[derive(Debug, Clone)]
pub struct StencilDof<const N: usize> {
    pub global: DofId,
    pub volume: Real,
    /// Quantities per time level; index 0 is the current iterate.
    pub quantities: Vec<IntensiveQuantities<N>>,
}

/// Owned [`ElementContext`] built from explicit per-dof data.
#[derive(Debug, Clone, Default)]
pub struct StencilContext<const N: usize> {
    dofs: Vec<StencilDof<N>>,
    boundary: Vec<(FaceId, IntensiveQuantities<N>)>,
    focus: usize,
}

impl<const N: usize> StencilContext<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dof and return its stencil-local index.
    pub fn push_dof(
        &mut self,
        global: DofId,
        volume: Real,
        quantities: Vec<IntensiveQuantities<N>>,
    ) -> usize {
        self.dofs.push(StencilDof {
            global,
            volume,
            quantities,
        });
        self.dofs.len() - 1
    }

    pub fn push_boundary(&mut self, face: FaceId, quantities: IntensiveQuantities<N>) {
        self.boundary.push((face, quantities));
    }

    pub fn set_focus(&mut self, dof: usize) -> ResidualResult<()> {
        if dof >= self.dofs.len() {
            return Err(ResidualError::UnknownEntity { what: "dof", index: dof });
        }
        self.focus = dof;
        Ok(())
    }

    fn dof(&self, dof: usize) -> ResidualResult<&StencilDof<N>> {
        self.dofs
            .get(dof)
            .ok_or(ResidualError::UnknownEntity { what: "dof", index: dof })
    }
}

impl<const N: usize> ElementContext<N> for StencilContext<N> {
    fn num_dofs(&self) -> usize {
        self.dofs.len()
    }

    fn focus_dof(&self) -> usize {
        self.focus
    }

    fn global_index(&self, dof: usize) -> ResidualResult<DofId> {
        Ok(self.dof(dof)?.global)
    }

    fn intensive_quantities(
        &self,
        dof: usize,
        time_level: usize,
    ) -> ResidualResult<&IntensiveQuantities<N>> {
        self.dof(dof)?
            .quantities
            .get(time_level)
            .ok_or(ResidualError::UnknownEntity {
                what: "time level",
                index: time_level,
            })
    }

    fn dof_volume(&self, dof: usize) -> ResidualResult<Real> {
        Ok(self.dof(dof)?.volume)
    }

    fn boundary_quantities(&self, face: &BoundaryFace) -> ResidualResult<&IntensiveQuantities<N>> {
        self.boundary
            .iter()
            .find(|(id, _)| *id == face.id)
            .map(|(_, q)| q)
            .ok_or(ResidualError::UnknownEntity {
                what: "boundary face",
                index: face.id.as_usize(),
            })
    }
}
