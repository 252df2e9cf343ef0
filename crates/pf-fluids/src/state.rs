//! Per-(dof, time level) fluid state snapshot.

use crate::phase::{NUM_PHASES, Phase};
use pf_core::Evaluation;

/// Phase properties of one control volume at one time level.
///
/// Filled by a fluid-state provider, then only read. Derivative slots refer to
/// the primary variables of the dof the snapshot belongs to; snapshots of
/// non-focus dofs are usually all-constant.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidState<const N: usize> {
    pressure: [Evaluation<N>; NUM_PHASES],
    saturation: [Evaluation<N>; NUM_PHASES],
    density: [Evaluation<N>; NUM_PHASES],
    molar_density: [Evaluation<N>; NUM_PHASES],
    viscosity: [Evaluation<N>; NUM_PHASES],
    mobility: [Evaluation<N>; NUM_PHASES],
    inv_b: [Evaluation<N>; NUM_PHASES],
    rs: Evaluation<N>,
    rv: Evaluation<N>,
    rvw: Evaluation<N>,
    pvt_region: usize,
}

macro_rules! phase_property {
    ($get:ident, $set:ident, $field:ident, $doc:literal) => {
        #[doc = $doc]
        #[inline]
        pub fn $get(&self, phase: Phase) -> Evaluation<N> {
            self.$field[phase.index()]
        }

        #[inline]
        pub fn $set(&mut self, phase: Phase, value: Evaluation<N>) -> &mut Self {
            self.$field[phase.index()] = value;
            self
        }
    };
}

impl<const N: usize> FluidState<N> {
    /// All-zero state in PVT region `pvt_region`.
    pub fn new(pvt_region: usize) -> Self {
        let zero = [Evaluation::zero(); NUM_PHASES];
        Self {
            pressure: zero,
            saturation: zero,
            density: zero,
            molar_density: zero,
            viscosity: zero,
            mobility: zero,
            inv_b: zero,
            rs: Evaluation::zero(),
            rv: Evaluation::zero(),
            rvw: Evaluation::zero(),
            pvt_region,
        }
    }

    phase_property!(pressure, set_pressure, pressure, "Phase pressure [Pa].");
    phase_property!(saturation, set_saturation, saturation, "Phase saturation [-].");
    phase_property!(density, set_density, density, "Phase mass density [kg/m³].");
    phase_property!(
        molar_density,
        set_molar_density,
        molar_density,
        "Phase molar density [mol/m³]."
    );
    phase_property!(viscosity, set_viscosity, viscosity, "Phase viscosity [Pa·s].");
    phase_property!(
        mobility,
        set_mobility,
        mobility,
        "Phase mobility kr/μ [1/(Pa·s)]."
    );
    phase_property!(
        inv_b,
        set_inv_b,
        inv_b,
        "Inverse formation-volume factor [surface m³ / reservoir m³]."
    );

    /// Dissolved gas-oil ratio.
    #[inline]
    pub fn rs(&self) -> Evaluation<N> {
        self.rs
    }

    /// Vaporized oil-gas ratio.
    #[inline]
    pub fn rv(&self) -> Evaluation<N> {
        self.rv
    }

    /// Vaporized water-gas ratio.
    #[inline]
    pub fn rvw(&self) -> Evaluation<N> {
        self.rvw
    }

    pub fn set_rs(&mut self, value: Evaluation<N>) -> &mut Self {
        self.rs = value;
        self
    }

    pub fn set_rv(&mut self, value: Evaluation<N>) -> &mut Self {
        self.rv = value;
        self
    }

    pub fn set_rvw(&mut self, value: Evaluation<N>) -> &mut Self {
        self.rvw = value;
        self
    }

    #[inline]
    pub fn pvt_region(&self) -> usize {
        self.pvt_region
    }

    /// Copy of this state with every derivative discarded.
    pub fn decayed(&self) -> Self {
        let decay = |arr: &[Evaluation<N>; NUM_PHASES]| arr.map(Evaluation::decay);
        Self {
            pressure: decay(&self.pressure),
            saturation: decay(&self.saturation),
            density: decay(&self.density),
            molar_density: decay(&self.molar_density),
            viscosity: decay(&self.viscosity),
            mobility: decay(&self.mobility),
            inv_b: decay(&self.inv_b),
            rs: self.rs.decay(),
            rv: self.rv.decay(),
            rvw: self.rvw.decay(),
            pvt_region: self.pvt_region,
        }
    }
}
