//! Problem callbacks consumed by the residual.

use crate::error::ResidualResult;
use crate::vector::EqVector;
use pf_core::{DofId, Evaluation, FaceId, Real};
use pf_fluids::IntensiveQuantities;

/// Geometry, rock and source information the residual asks for.
///
/// Implementations must be pure lookups: assembly calls them concurrently.
pub trait Problem<const N: usize>: Send + Sync {
    /// Gravity vector [m/s²]; the last component acts along increasing depth.
    fn gravity(&self) -> [Real; 3];

    /// Transmissibility of an interior face [m³].
    fn transmissibility(&self, face: FaceId) -> Real;

    /// Transmissibility between a boundary face and its interior dof [m³].
    fn boundary_transmissibility(&self, face: FaceId) -> Real;

    /// Minimum potential difference for flow across `face` [Pa].
    fn threshold_pressure(&self, _face: FaceId) -> Real {
        0.0
    }

    /// Depth of the dof center [m], positive downwards.
    fn dof_center_depth(&self, dof: DofId) -> Real;

    /// Rock-compaction multiplier on the transmissibility, evaluated with the
    /// upstream dof's quantities.
    fn rock_comp_trans_multiplier(
        &self,
        _quantities: &IntensiveQuantities<N>,
        _dof: DofId,
    ) -> Evaluation<N> {
        Evaluation::constant(1.0)
    }

    /// Geometric factor of conductive heat transfer across `face` [m].
    fn thermal_transmissibility(&self, _face: FaceId) -> Real {
        0.0
    }

    /// Geometric factor of molecular diffusion across `face` [m].
    fn diffusivity(&self, _face: FaceId) -> Real {
        0.0
    }

    /// Add the source rate per unit bulk volume of `dof` to `out`.
    fn source(
        &self,
        _out: &mut EqVector<N>,
        _dof: DofId,
        _quantities: &IntensiveQuantities<N>,
        _time_level: usize,
    ) -> ResidualResult<()> {
        Ok(())
    }
}

impl<T, const N: usize> Problem<N> for &T
where
    T: Problem<N> + ?Sized,
{
    fn gravity(&self) -> [Real; 3] {
        (**self).gravity()
    }

    fn transmissibility(&self, face: FaceId) -> Real {
        (**self).transmissibility(face)
    }

    fn boundary_transmissibility(&self, face: FaceId) -> Real {
        (**self).boundary_transmissibility(face)
    }

    fn threshold_pressure(&self, face: FaceId) -> Real {
        (**self).threshold_pressure(face)
    }

    fn dof_center_depth(&self, dof: DofId) -> Real {
        (**self).dof_center_depth(dof)
    }

    fn rock_comp_trans_multiplier(
        &self,
        quantities: &IntensiveQuantities<N>,
        dof: DofId,
    ) -> Evaluation<N> {
        (**self).rock_comp_trans_multiplier(quantities, dof)
    }

    fn thermal_transmissibility(&self, face: FaceId) -> Real {
        (**self).thermal_transmissibility(face)
    }

    fn diffusivity(&self, face: FaceId) -> Real {
        (**self).diffusivity(face)
    }

    fn source(
        &self,
        out: &mut EqVector<N>,
        dof: DofId,
        quantities: &IntensiveQuantities<N>,
        time_level: usize,
    ) -> ResidualResult<()> {
        (**self).source(out, dof, quantities, time_level)
    }
}
