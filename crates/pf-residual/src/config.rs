//! Runtime configuration of the residual.
//!
//! Replaces compile-time capability selection: which modules run, how the
//! conservation equations are numbered, and whether masses or surface volumes
//! are conserved.

use pf_core::Real;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResidualConfig {
    /// Conserve surface volumes (true) or masses (false).
    pub conserve_surface_volume: bool,
    /// Keep one conservation slot per canonical component even when a phase
    /// is disabled; the disabled slot then carries a trivial equation.
    pub three_phase_indices: bool,
    pub modules: ModuleSwitches,
    /// Multiplier applied to every energy-equation term.
    pub energy_scaling_factor: Real,
    pub polymer: PolymerParams,
    pub micp: MicpParams,
}

impl Default for ResidualConfig {
    fn default() -> Self {
        Self {
            conserve_surface_volume: true,
            three_phase_indices: false,
            modules: ModuleSwitches::default(),
            energy_scaling_factor: 1.0,
            polymer: PolymerParams::default(),
            micp: MicpParams::default(),
        }
    }
}

/// Independent on/off switches for the physics extensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleSwitches {
    pub solvent: bool,
    pub extbo: bool,
    pub polymer: bool,
    pub energy: bool,
    pub foam: bool,
    pub brine: bool,
    pub micp: bool,
    pub diffusion: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolymerParams {
    /// Rock grain density used for adsorbed mass [kg/m³].
    pub rock_density: Real,
}

impl Default for PolymerParams {
    fn default() -> Self {
        Self {
            rock_density: 2650.0,
        }
    }
}

/// Reaction constants of the microbial-precipitation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MicpParams {
    /// Maximum specific growth rate [1/s].
    pub max_growth_rate: Real,
    /// Monod half-saturation constant for oxygen [kg/m³].
    pub oxygen_half_saturation: Real,
    /// Oxygen consumed per unit biomass grown [-].
    pub oxygen_yield: Real,
    /// First-order decay rate of biomass [1/s].
    pub decay_rate: Real,
    /// Attachment rate of suspended microbes to biofilm [1/s].
    pub attachment_rate: Real,
    /// Detachment rate of biofilm [1/s].
    pub detachment_rate: Real,
    /// Urea hydrolysis rate per unit biofilm mass [1/s].
    pub urease_rate: Real,
    /// Monod half-saturation constant for urea [kg/m³].
    pub urea_half_saturation: Real,
    /// Calcite produced per unit urea hydrolysed [kg/kg].
    pub calcite_yield: Real,
    /// Biofilm density [kg/m³].
    pub biofilm_density: Real,
    /// Calcite density [kg/m³].
    pub calcite_density: Real,
}

impl Default for MicpParams {
    fn default() -> Self {
        Self {
            max_growth_rate: 4.17e-5,
            oxygen_half_saturation: 2.0e-5,
            oxygen_yield: 0.5,
            decay_rate: 3.18e-7,
            attachment_rate: 8.51e-7,
            detachment_rate: 2.6e-10,
            urease_rate: 706.6e-6,
            urea_half_saturation: 21.3,
            calcite_yield: 1.67,
            biofilm_density: 6.9,
            calcite_density: 2710.0,
        }
    }
}
