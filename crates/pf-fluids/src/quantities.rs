//! Intensive quantities: a fluid state plus optional per-module data.
//!
//! Each physics extension reads only its own sub-object. A sub-object is
//! attached by the provider when the matching module is enabled; modules treat
//! a missing sub-object as a configuration error.

use crate::error::{FluidError, FluidResult};
use crate::phase::NUM_PHASES;
use crate::state::FluidState;
use pf_core::{Evaluation, Real};

/// Solvent gas (a fourth, gas-like pseudo-component).
#[derive(Debug, Clone, PartialEq)]
pub struct SolventQuantities<const N: usize> {
    pub saturation: Evaluation<N>,
    pub inv_b: Evaluation<N>,
    pub density: Evaluation<N>,
    pub mobility: Evaluation<N>,
    /// Surface density of the solvent [kg/m³].
    pub reference_density: Real,
}

/// Extended black-oil pseudo-component distributed over oil and gas.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtboQuantities<const N: usize> {
    /// Surface-volume fraction of the pseudo-component in the oil phase.
    pub oil_fraction: Evaluation<N>,
    /// Surface-volume fraction of the pseudo-component in the gas phase.
    pub gas_fraction: Evaluation<N>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolymerQuantities<const N: usize> {
    /// Polymer concentration in water [kg/surface m³].
    pub concentration: Evaluation<N>,
    /// Adsorbed polymer per unit rock mass [kg/kg].
    pub adsorption: Evaluation<N>,
    /// Effective water viscosity over plain water viscosity.
    pub viscosity_multiplier: Evaluation<N>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnergyQuantities<const N: usize> {
    pub temperature: Evaluation<N>,
    /// Specific internal energy per phase [J/kg].
    pub internal_energy: [Evaluation<N>; NUM_PHASES],
    /// Specific enthalpy per phase [J/kg].
    pub enthalpy: [Evaluation<N>; NUM_PHASES],
    /// Internal energy of the rock per bulk volume of rock [J/m³].
    pub rock_internal_energy: Evaluation<N>,
    /// Bulk thermal conductivity [W/(m·K)].
    pub thermal_conductivity: Evaluation<N>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoamQuantities<const N: usize> {
    /// Foam surfactant concentration carried by the gas phase.
    pub concentration: Evaluation<N>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrineQuantities<const N: usize> {
    /// Dissolved salt concentration [kg/surface m³ of water].
    pub salt_concentration: Evaluation<N>,
    /// Volume fraction of pore space filled by precipitated salt.
    pub salt_saturation: Evaluation<N>,
    /// Density of solid salt [kg/m³].
    pub salt_density: Real,
}

/// Microbially induced calcite precipitation species.
#[derive(Debug, Clone, PartialEq)]
pub struct MicpQuantities<const N: usize> {
    pub microbial_concentration: Evaluation<N>,
    pub oxygen_concentration: Evaluation<N>,
    pub urea_concentration: Evaluation<N>,
    /// Biofilm volume fraction [-].
    pub biofilm_fraction: Evaluation<N>,
    /// Calcite volume fraction [-].
    pub calcite_fraction: Evaluation<N>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionQuantities<const N: usize> {
    /// Molecular diffusion coefficient per phase [m²/s].
    pub coefficient: [Evaluation<N>; NUM_PHASES],
}

/// Everything the residual needs to know about one dof at one time level.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensiveQuantities<const N: usize> {
    fluid_state: FluidState<N>,
    porosity: Evaluation<N>,
    reference_porosity: Real,
    solvent: Option<SolventQuantities<N>>,
    extbo: Option<ExtboQuantities<N>>,
    polymer: Option<PolymerQuantities<N>>,
    energy: Option<EnergyQuantities<N>>,
    foam: Option<FoamQuantities<N>>,
    brine: Option<BrineQuantities<N>>,
    micp: Option<MicpQuantities<N>>,
    diffusion: Option<DiffusionQuantities<N>>,
}

impl<const N: usize> IntensiveQuantities<N> {
    pub fn builder(fluid_state: FluidState<N>, porosity: Evaluation<N>) -> IntensiveQuantitiesBuilder<N> {
        IntensiveQuantitiesBuilder {
            quantities: IntensiveQuantities {
                reference_porosity: porosity.value(),
                fluid_state,
                porosity,
                solvent: None,
                extbo: None,
                polymer: None,
                energy: None,
                foam: None,
                brine: None,
                micp: None,
                diffusion: None,
            },
        }
    }

    #[inline]
    pub fn fluid_state(&self) -> &FluidState<N> {
        &self.fluid_state
    }

    #[inline]
    pub fn porosity(&self) -> Evaluation<N> {
        self.porosity
    }

    /// Porosity at reference pressure (rock volume bookkeeping).
    #[inline]
    pub fn reference_porosity(&self) -> Real {
        self.reference_porosity
    }

    #[inline]
    pub fn pvt_region(&self) -> usize {
        self.fluid_state.pvt_region()
    }

    pub fn solvent(&self) -> Option<&SolventQuantities<N>> {
        self.solvent.as_ref()
    }

    pub fn extbo(&self) -> Option<&ExtboQuantities<N>> {
        self.extbo.as_ref()
    }

    pub fn polymer(&self) -> Option<&PolymerQuantities<N>> {
        self.polymer.as_ref()
    }

    pub fn energy(&self) -> Option<&EnergyQuantities<N>> {
        self.energy.as_ref()
    }

    pub fn foam(&self) -> Option<&FoamQuantities<N>> {
        self.foam.as_ref()
    }

    pub fn brine(&self) -> Option<&BrineQuantities<N>> {
        self.brine.as_ref()
    }

    pub fn micp(&self) -> Option<&MicpQuantities<N>> {
        self.micp.as_ref()
    }

    pub fn diffusion(&self) -> Option<&DiffusionQuantities<N>> {
        self.diffusion.as_ref()
    }

    /// Copy with every derivative discarded, sub-objects included.
    pub fn decayed(&self) -> Self {
        let d = Evaluation::decay;
        Self {
            fluid_state: self.fluid_state.decayed(),
            porosity: self.porosity.decay(),
            reference_porosity: self.reference_porosity,
            solvent: self.solvent.as_ref().map(|s| SolventQuantities {
                saturation: d(s.saturation),
                inv_b: d(s.inv_b),
                density: d(s.density),
                mobility: d(s.mobility),
                reference_density: s.reference_density,
            }),
            extbo: self.extbo.as_ref().map(|e| ExtboQuantities {
                oil_fraction: d(e.oil_fraction),
                gas_fraction: d(e.gas_fraction),
            }),
            polymer: self.polymer.as_ref().map(|p| PolymerQuantities {
                concentration: d(p.concentration),
                adsorption: d(p.adsorption),
                viscosity_multiplier: d(p.viscosity_multiplier),
            }),
            energy: self.energy.as_ref().map(|e| EnergyQuantities {
                temperature: d(e.temperature),
                internal_energy: e.internal_energy.map(d),
                enthalpy: e.enthalpy.map(d),
                rock_internal_energy: d(e.rock_internal_energy),
                thermal_conductivity: d(e.thermal_conductivity),
            }),
            foam: self.foam.as_ref().map(|f| FoamQuantities {
                concentration: d(f.concentration),
            }),
            brine: self.brine.as_ref().map(|b| BrineQuantities {
                salt_concentration: d(b.salt_concentration),
                salt_saturation: d(b.salt_saturation),
                salt_density: b.salt_density,
            }),
            micp: self.micp.as_ref().map(|m| MicpQuantities {
                microbial_concentration: d(m.microbial_concentration),
                oxygen_concentration: d(m.oxygen_concentration),
                urea_concentration: d(m.urea_concentration),
                biofilm_fraction: d(m.biofilm_fraction),
                calcite_fraction: d(m.calcite_fraction),
            }),
            diffusion: self.diffusion.as_ref().map(|x| DiffusionQuantities {
                coefficient: x.coefficient.map(d),
            }),
        }
    }
}

/// Assembles an [`IntensiveQuantities`] from a fluid state and the module
/// sub-objects a run needs.
#[derive(Debug, Clone)]
pub struct IntensiveQuantitiesBuilder<const N: usize> {
    quantities: IntensiveQuantities<N>,
}

impl<const N: usize> IntensiveQuantitiesBuilder<N> {
    pub fn reference_porosity(mut self, value: Real) -> Self {
        self.quantities.reference_porosity = value;
        self
    }

    pub fn solvent(mut self, q: SolventQuantities<N>) -> Self {
        self.quantities.solvent = Some(q);
        self
    }

    pub fn extbo(mut self, q: ExtboQuantities<N>) -> Self {
        self.quantities.extbo = Some(q);
        self
    }

    pub fn polymer(mut self, q: PolymerQuantities<N>) -> Self {
        self.quantities.polymer = Some(q);
        self
    }

    pub fn energy(mut self, q: EnergyQuantities<N>) -> Self {
        self.quantities.energy = Some(q);
        self
    }

    pub fn foam(mut self, q: FoamQuantities<N>) -> Self {
        self.quantities.foam = Some(q);
        self
    }

    pub fn brine(mut self, q: BrineQuantities<N>) -> Self {
        self.quantities.brine = Some(q);
        self
    }

    pub fn micp(mut self, q: MicpQuantities<N>) -> Self {
        self.quantities.micp = Some(q);
        self
    }

    pub fn diffusion(mut self, q: DiffusionQuantities<N>) -> Self {
        self.quantities.diffusion = Some(q);
        self
    }

    /// Validate porosity and finish.
    pub fn build(self) -> FluidResult<IntensiveQuantities<N>> {
        let phi = self.quantities.porosity.value();
        if !phi.is_finite() || !(0.0..=1.0).contains(&phi) {
            return Err(FluidError::NonPhysical {
                what: "porosity must lie in [0, 1]",
            });
        }
        let phi_ref = self.quantities.reference_porosity;
        if !phi_ref.is_finite() || !(0.0..=1.0).contains(&phi_ref) {
            return Err(FluidError::NonPhysical {
                what: "reference porosity must lie in [0, 1]",
            });
        }
        Ok(self.quantities)
    }
}
