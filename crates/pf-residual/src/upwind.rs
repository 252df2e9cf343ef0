//! Upwind selection from the gravity-corrected, threshold-clamped potential.

use crate::context::Side;
use pf_core::{Evaluation, Real};
use pf_fluids::{FluidState, Phase};

/// Face data entering the potential difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotentialGeometry {
    /// `depth(interior) - depth(exterior)` [m].
    pub depth_difference: Real,
    /// Gravity along increasing depth [m/s²].
    pub gravity: Real,
    /// Threshold pressure of the face [Pa]; zero disables the clamp.
    pub threshold_pressure: Real,
}

/// Signed potential and the side that donates the phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Upwind<const N: usize> {
    pub upstream: Side,
    /// Positive when flow leaves the interior [Pa].
    pub potential: Evaluation<N>,
}

impl<const N: usize> Upwind<N> {
    /// Exactly zero potential: no flow across the face for this phase.
    #[inline]
    pub fn is_stagnant(&self) -> bool {
        self.potential.value() == 0.0
    }
}

/// Potential from explicit pressures and densities of both sides.
///
/// Callers are responsible for decaying the non-focus side beforehand. The
/// hydrostatic term uses the mean of both densities so that swapping sides
/// negates the potential exactly. Ties go to the interior.
pub fn potential_difference<const N: usize>(
    pressure_in: Evaluation<N>,
    pressure_ex: Evaluation<N>,
    density_in: Evaluation<N>,
    density_ex: Evaluation<N>,
    geometry: &PotentialGeometry,
) -> Upwind<N> {
    let mut potential = pressure_in - pressure_ex;
    if geometry.gravity != 0.0 && geometry.depth_difference != 0.0 {
        let rho_avg = (density_in + density_ex) * 0.5;
        potential -= rho_avg * (geometry.gravity * geometry.depth_difference);
    }

    let threshold = geometry.threshold_pressure;
    if threshold > 0.0 {
        let value = potential.value();
        if value.abs() <= threshold {
            potential = Evaluation::zero();
        } else {
            potential -= threshold.copysign(value);
        }
    }

    let upstream = if potential.value() >= 0.0 {
        Side::Interior
    } else {
        Side::Exterior
    };
    Upwind {
        upstream,
        potential,
    }
}

/// Per-phase upwind decision with derivatives kept only on the `focus` side.
pub fn phase_upwind<const N: usize>(
    phase: Phase,
    interior: &FluidState<N>,
    exterior: &FluidState<N>,
    geometry: &PotentialGeometry,
    focus: Option<Side>,
) -> Upwind<N> {
    let keep_in = focus == Some(Side::Interior);
    let keep_ex = focus == Some(Side::Exterior);
    potential_difference(
        interior.pressure(phase).decay_unless(keep_in),
        exterior.pressure(phase).decay_unless(keep_ex),
        interior.density(phase).decay_unless(keep_in),
        exterior.density(phase).decay_unless(keep_ex),
        geometry,
    )
}
