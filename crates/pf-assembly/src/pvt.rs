//! Reference fluid-state provider.
//!
//! Linear-compressibility black-oil correlations: `1/B` and porosity vary
//! linearly with pressure, Rs/Rv/Rvw are proportional to pressure, relative
//! permeability follows Corey curves and all phases share one pressure.
//! Module sub-quantities are filled from their own primary variables.

use crate::error::{AssemblyError, AssemblyResult};
use pf_core::{Evaluation, Real, finite_positive};
use pf_fluids::{
    BrineQuantities, DiffusionQuantities, EnergyQuantities, ExtboQuantities, FluidState,
    FluidSystem, FoamQuantities, IntensiveQuantities, MicpQuantities, NUM_PHASES, Phase,
    PolymerQuantities, SolventQuantities,
};
use pf_residual::EquationLayout;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhasePvt {
    /// Formation-volume factor at the reference pressure [reservoir m³ / surface m³].
    pub formation_volume_factor: Real,
    /// Relative change of `1/B` per unit pressure [1/Pa].
    pub compressibility: Real,
    /// Viscosity [Pa·s].
    pub viscosity: Real,
    pub corey_exponent: Real,
    pub residual_saturation: Real,
    /// Specific heat capacity [J/(kg·K)].
    pub heat_capacity: Real,
    /// Molecular diffusion coefficient [m²/s].
    pub diffusion_coefficient: Real,
}

impl Default for PhasePvt {
    fn default() -> Self {
        Self {
            formation_volume_factor: 1.0,
            compressibility: 1.0e-9,
            viscosity: 1.0e-3,
            corey_exponent: 2.0,
            residual_saturation: 0.0,
            heat_capacity: 4.0e3,
            diffusion_coefficient: 0.0,
        }
    }
}

impl PhasePvt {
    fn gas() -> Self {
        Self {
            formation_volume_factor: 0.01,
            compressibility: 5.0e-8,
            viscosity: 2.0e-5,
            heat_capacity: 2.2e3,
            ..Self::default()
        }
    }

    fn oil() -> Self {
        Self {
            formation_volume_factor: 1.2,
            viscosity: 2.0e-3,
            heat_capacity: 2.0e3,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimplePvt {
    /// Pressure at which `formation_volume_factor` and `porosity` hold [Pa].
    pub reference_pressure: Real,
    pub water: PhasePvt,
    pub oil: PhasePvt,
    pub gas: PhasePvt,
    /// Dissolved gas-oil ratio per unit pressure [1/Pa].
    pub rs_slope: Real,
    /// Vaporized oil-gas ratio per unit pressure [1/Pa].
    pub rv_slope: Real,
    /// Vaporized water-gas ratio per unit pressure [1/Pa].
    pub rvw_slope: Real,
    pub porosity: Real,
    /// Relative change of porosity per unit pressure [1/Pa].
    pub rock_compressibility: Real,
    /// Volumetric heat capacity of the rock [J/(m³·K)].
    pub rock_heat_capacity: Real,
    /// Bulk thermal conductivity [W/(m·K)].
    pub thermal_conductivity: Real,
    pub solvent: PhasePvt,
    /// Surface density of the solvent [kg/m³].
    pub solvent_reference_density: Real,
    /// Water viscosity increase per unit polymer concentration.
    pub polymer_viscosity_factor: Real,
    /// Adsorbed polymer per unit rock mass and unit concentration.
    pub polymer_adsorption: Real,
    /// Density of solid salt [kg/m³].
    pub salt_density: Real,
}

impl Default for SimplePvt {
    fn default() -> Self {
        Self {
            reference_pressure: 1.0e7,
            water: PhasePvt::default(),
            oil: PhasePvt::oil(),
            gas: PhasePvt::gas(),
            rs_slope: 0.0,
            rv_slope: 0.0,
            rvw_slope: 0.0,
            porosity: 0.25,
            rock_compressibility: 0.0,
            rock_heat_capacity: 2.0e6,
            thermal_conductivity: 2.0,
            solvent: PhasePvt::gas(),
            solvent_reference_density: 1.5,
            polymer_viscosity_factor: 0.0,
            polymer_adsorption: 0.0,
            salt_density: 2165.0,
        }
    }
}

/// Where each primary variable of a dof lives.
///
/// Pressure takes the first non-pseudo conservation slot, the saturations
/// of all active phases but the closing one take the remaining ones. Oil is
/// the closing phase when active, otherwise the last active phase. Module
/// slots carry their own primary variable (temperature, concentrations, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryVariables {
    layout: EquationLayout,
    pressure: usize,
    saturations: Vec<(Phase, usize)>,
    closing: Phase,
}

impl PrimaryVariables {
    pub fn new(layout: &EquationLayout, fluid_system: &FluidSystem) -> AssemblyResult<Self> {
        let active: Vec<Phase> = fluid_system.active_phases().collect();
        let closing = if fluid_system.phase_is_active(Phase::Oil) {
            Phase::Oil
        } else {
            *active.last().ok_or(AssemblyError::Numeric {
                what: "fluid system without active phases".to_string(),
            })?
        };

        let mut slots = active
            .iter()
            .map(|p| layout.active_component_index(p.solvent_component()))
            .collect::<Result<Vec<_>, _>>()?;
        slots.sort_unstable();
        let mut slots = slots.into_iter();
        let pressure = slots.next().ok_or(AssemblyError::Numeric {
            what: "no conservation slot for pressure".to_string(),
        })?;
        let saturations = active
            .iter()
            .copied()
            .filter(|&p| p != closing)
            .zip(slots)
            .collect();

        Ok(Self {
            layout: layout.clone(),
            pressure,
            saturations,
            closing,
        })
    }

    pub fn pressure_slot(&self) -> usize {
        self.pressure
    }

    pub fn saturation_slot(&self, phase: Phase) -> Option<usize> {
        self.saturations
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, slot)| *slot)
    }

    /// The phase whose saturation closes the sum to one.
    pub fn closing_phase(&self) -> Phase {
        self.closing
    }

    pub fn num_variables(&self) -> usize {
        self.layout.num_eq()
    }

    pub fn layout(&self) -> &EquationLayout {
        &self.layout
    }
}

impl SimplePvt {
    pub fn phase(&self, phase: Phase) -> &PhasePvt {
        match phase {
            Phase::Water => &self.water,
            Phase::Oil => &self.oil,
            Phase::Gas => &self.gas,
        }
    }

    /// Reject parameters no physical fluid could have.
    pub fn validate(&self) -> AssemblyResult<()> {
        let bad = |what: &str| {
            Err(AssemblyError::Numeric {
                what: format!("invalid PVT parameter: {what}"),
            })
        };
        for (name, p) in [
            ("water", &self.water),
            ("oil", &self.oil),
            ("gas", &self.gas),
            ("solvent", &self.solvent),
        ] {
            if !finite_positive(p.formation_volume_factor) {
                return bad(&format!("{name} formation volume factor"));
            }
            if !finite_positive(p.viscosity) {
                return bad(&format!("{name} viscosity"));
            }
            if !(0.0..1.0).contains(&p.residual_saturation) {
                return bad(&format!("{name} residual saturation"));
            }
            if !(p.corey_exponent.is_finite() && p.corey_exponent >= 1.0) {
                return bad(&format!("{name} Corey exponent"));
            }
        }
        if !(0.0..=1.0).contains(&self.porosity) {
            return bad("porosity");
        }
        if !self.reference_pressure.is_finite() {
            return bad("reference pressure");
        }
        Ok(())
    }

    /// Build the quantities of one dof from its primary variables.
    ///
    /// With `seed` every primary variable `k` carries a unit derivative in
    /// slot `k`; otherwise the result is all-constant.
    pub fn quantities<const N: usize>(
        &self,
        vars: &PrimaryVariables,
        fluid_system: &FluidSystem,
        values: &[Real],
        pvt_region: usize,
        seed: bool,
    ) -> AssemblyResult<IntensiveQuantities<N>> {
        if values.len() != vars.num_variables() {
            return Err(AssemblyError::DimensionMismatch {
                what: "primary variables",
                expected: vars.num_variables(),
                actual: values.len(),
            });
        }
        let var = |slot: usize| {
            if seed {
                Evaluation::<N>::variable(values[slot], slot)
            } else {
                Evaluation::constant(values[slot])
            }
        };
        let layout = vars.layout();

        let p = var(vars.pressure);
        let dp = p - self.reference_pressure;
        let solvent_saturation = layout.solvent().map(var);

        let mut saturation = [Evaluation::<N>::zero(); NUM_PHASES];
        let mut closing = Evaluation::<N>::constant(1.0);
        for &(phase, slot) in &vars.saturations {
            let s = var(slot);
            saturation[phase.index()] = s;
            closing -= s;
        }
        if let Some(ss) = solvent_saturation {
            closing -= ss;
        }
        saturation[vars.closing.index()] = closing;

        let zero = Evaluation::<N>::zero();
        let rs = if fluid_system.enable_dissolved_gas() {
            p * self.rs_slope
        } else {
            zero
        };
        let rv = if fluid_system.enable_vaporized_oil() {
            p * self.rv_slope
        } else {
            zero
        };
        let rvw = if fluid_system.enable_vaporized_water() {
            p * self.rvw_slope
        } else {
            zero
        };

        let rho_w = fluid_system.reference_density(Phase::Water, pvt_region)?;
        let rho_o = fluid_system.reference_density(Phase::Oil, pvt_region)?;
        let rho_g = fluid_system.reference_density(Phase::Gas, pvt_region)?;
        let mut fs = FluidState::<N>::new(pvt_region);
        let mut density = [zero; NUM_PHASES];
        for phase in fluid_system.active_phases() {
            let params = self.phase(phase);
            let s = saturation[phase.index()];
            let inv_b = (1.0 + dp * params.compressibility) / params.formation_volume_factor;
            let surface_density = match phase {
                Phase::Water => Evaluation::constant(rho_w),
                Phase::Oil => rs * rho_g + rho_o,
                Phase::Gas => rv * rho_o + rvw * rho_w + rho_g,
            };
            let rho = inv_b * surface_density;
            density[phase.index()] = rho;
            fs.set_pressure(phase, p)
                .set_saturation(phase, s)
                .set_inv_b(phase, inv_b)
                .set_density(phase, rho)
                .set_viscosity(phase, Evaluation::constant(params.viscosity))
                .set_mobility(phase, corey(s, params) / params.viscosity);
        }
        fs.set_rs(rs).set_rv(rv).set_rvw(rvw);

        let porosity = (1.0 + dp * self.rock_compressibility) * self.porosity;
        let mut builder =
            IntensiveQuantities::builder(fs, porosity).reference_porosity(self.porosity);

        if let Some(ss) = solvent_saturation {
            let params = &self.solvent;
            let inv_b = (1.0 + dp * params.compressibility) / params.formation_volume_factor;
            builder = builder.solvent(SolventQuantities {
                saturation: ss,
                inv_b,
                density: inv_b * self.solvent_reference_density,
                mobility: corey(ss, params) / params.viscosity,
                reference_density: self.solvent_reference_density,
            });
        }
        if let Some(slot) = layout.zfraction() {
            let z = var(slot);
            builder = builder.extbo(ExtboQuantities {
                oil_fraction: z,
                gas_fraction: z,
            });
        }
        if let Some(slot) = layout.polymer() {
            let c = var(slot);
            builder = builder.polymer(PolymerQuantities {
                concentration: c,
                adsorption: c * self.polymer_adsorption,
                viscosity_multiplier: c * self.polymer_viscosity_factor + 1.0,
            });
        }
        if let Some(slot) = layout.energy() {
            let t = var(slot);
            let internal_energy = Phase::ALL.map(|ph| t * self.phase(ph).heat_capacity);
            let enthalpy = Phase::ALL.map(|ph| {
                let u = internal_energy[ph.index()];
                let rho = density[ph.index()];
                if rho.value() > 0.0 { u + p / rho } else { u }
            });
            builder = builder.energy(EnergyQuantities {
                temperature: t,
                internal_energy,
                enthalpy,
                rock_internal_energy: t * self.rock_heat_capacity,
                thermal_conductivity: Evaluation::constant(self.thermal_conductivity),
            });
        }
        if let Some(slot) = layout.foam() {
            builder = builder.foam(FoamQuantities {
                concentration: var(slot),
            });
        }
        if let Some(slot) = layout.brine() {
            builder = builder.brine(BrineQuantities {
                salt_concentration: var(slot),
                salt_saturation: zero,
                salt_density: self.salt_density,
            });
        }
        if let Some(slots) = layout.micp() {
            builder = builder.micp(MicpQuantities {
                microbial_concentration: var(slots.microbes),
                oxygen_concentration: var(slots.oxygen),
                urea_concentration: var(slots.urea),
                biofilm_fraction: var(slots.biofilm),
                calcite_fraction: var(slots.calcite),
            });
        }
        builder = builder.diffusion(DiffusionQuantities {
            coefficient: Phase::ALL
                .map(|ph| Evaluation::constant(self.phase(ph).diffusion_coefficient)),
        });

        Ok(builder.build()?)
    }
}

/// Corey relative permeability, flat outside the mobile saturation range.
fn corey<const N: usize>(s: Evaluation<N>, params: &PhasePvt) -> Evaluation<N> {
    let sr = params.residual_saturation;
    let s_eff = (s - sr) / (1.0 - sr);
    if s_eff.value() <= 0.0 {
        Evaluation::zero()
    } else if s_eff.value() >= 1.0 {
        Evaluation::constant(1.0)
    } else {
        s_eff.powf(params.corey_exponent)
    }
}
