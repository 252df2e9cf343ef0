//! Black-oil fluid system descriptor.

use crate::error::{FluidError, FluidResult};
use crate::phase::{Component, NUM_PHASES, Phase};
use pf_core::Real;

/// Which phases take part in the run, which inter-phase transfers are modelled,
/// and the surface densities of the pseudo-components per PVT region.
///
/// Immutable once built; shared read-only by every assembly call.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidSystem {
    active: [bool; NUM_PHASES],
    dissolved_gas: bool,
    vaporized_oil: bool,
    vaporized_water: bool,
    /// `reference_densities[region][phase.index()]` in kg/m³.
    reference_densities: Vec<[Real; NUM_PHASES]>,
}

impl FluidSystem {
    pub fn builder() -> FluidSystemBuilder {
        FluidSystemBuilder::default()
    }

    #[inline]
    pub fn phase_is_active(&self, phase: Phase) -> bool {
        self.active[phase.index()]
    }

    #[inline]
    pub fn component_is_active(&self, comp: Component) -> bool {
        self.phase_is_active(comp.phase())
    }

    /// Active phases in canonical order.
    pub fn active_phases(&self) -> impl Iterator<Item = Phase> + '_ {
        Phase::ALL.into_iter().filter(|p| self.phase_is_active(*p))
    }

    pub fn num_active_phases(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    #[inline]
    pub fn enable_dissolved_gas(&self) -> bool {
        self.dissolved_gas
    }

    #[inline]
    pub fn enable_vaporized_oil(&self) -> bool {
        self.vaporized_oil
    }

    #[inline]
    pub fn enable_vaporized_water(&self) -> bool {
        self.vaporized_water
    }

    pub fn num_regions(&self) -> usize {
        self.reference_densities.len()
    }

    /// Surface density of `phase` in PVT region `region`.
    pub fn reference_density(&self, phase: Phase, region: usize) -> FluidResult<Real> {
        self.reference_densities
            .get(region)
            .map(|row| row[phase.index()])
            .ok_or(FluidError::PvtRegionOob {
                region,
                count: self.reference_densities.len(),
            })
    }

    /// Fail with [`FluidError::InactivePhase`] unless `phase` is active.
    pub fn require_active(&self, phase: Phase) -> FluidResult<()> {
        if self.phase_is_active(phase) {
            Ok(())
        } else {
            Err(FluidError::InactivePhase { phase })
        }
    }
}

/// Builder for [`FluidSystem`] with consistency checks on `build()`.
#[derive(Debug, Clone, Default)]
pub struct FluidSystemBuilder {
    active: [bool; NUM_PHASES],
    dissolved_gas: bool,
    vaporized_oil: bool,
    vaporized_water: bool,
    reference_densities: Vec<[Real; NUM_PHASES]>,
}

impl FluidSystemBuilder {
    /// Enable exactly the listed phases.
    pub fn phases(mut self, phases: &[Phase]) -> Self {
        self.active = [false; NUM_PHASES];
        for phase in phases {
            self.active[phase.index()] = true;
        }
        self
    }

    pub fn dissolved_gas(mut self, on: bool) -> Self {
        self.dissolved_gas = on;
        self
    }

    pub fn vaporized_oil(mut self, on: bool) -> Self {
        self.vaporized_oil = on;
        self
    }

    pub fn vaporized_water(mut self, on: bool) -> Self {
        self.vaporized_water = on;
        self
    }

    /// One `[water, oil, gas]` row per PVT region.
    pub fn reference_densities(mut self, rows: &[[Real; NUM_PHASES]]) -> Self {
        self.reference_densities = rows.to_vec();
        self
    }

    pub fn build(self) -> FluidResult<FluidSystem> {
        if !self.active.iter().any(|a| *a) {
            return Err(FluidError::InvalidArg {
                what: "at least one phase must be active",
            });
        }
        let oil = self.active[Phase::Oil.index()];
        let gas = self.active[Phase::Gas.index()];
        let water = self.active[Phase::Water.index()];
        if self.dissolved_gas && !(oil && gas) {
            return Err(FluidError::InvalidArg {
                what: "dissolved gas requires active oil and gas phases",
            });
        }
        if self.vaporized_oil && !(oil && gas) {
            return Err(FluidError::InvalidArg {
                what: "vaporized oil requires active oil and gas phases",
            });
        }
        if self.vaporized_water && !(water && gas) {
            return Err(FluidError::InvalidArg {
                what: "vaporized water requires active water and gas phases",
            });
        }
        if self.reference_densities.is_empty() {
            return Err(FluidError::InvalidArg {
                what: "at least one PVT region is required",
            });
        }
        for row in &self.reference_densities {
            if row.iter().any(|rho| !rho.is_finite() || *rho <= 0.0) {
                return Err(FluidError::NonPhysical {
                    what: "reference density must be positive and finite",
                });
            }
        }

        tracing::debug!(
            active = ?self.active,
            dissolved_gas = self.dissolved_gas,
            vaporized_oil = self.vaporized_oil,
            vaporized_water = self.vaporized_water,
            regions = self.reference_densities.len(),
            "fluid system configured"
        );

        Ok(FluidSystem {
            active: self.active,
            dissolved_gas: self.dissolved_gas,
            vaporized_oil: self.vaporized_oil,
            vaporized_water: self.vaporized_water,
            reference_densities: self.reference_densities,
        })
    }
}
