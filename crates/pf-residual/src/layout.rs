//! Equation numbering.
//!
//! Conservation equations come first (one per active component, or one per
//! canonical component under the three-phase convention), followed by the
//! slots owned by enabled modules in a fixed order.

use crate::config::ResidualConfig;
use crate::error::{ResidualError, ResidualResult};
use pf_fluids::{Component, FluidSystem, NUM_PHASES};

/// Slots owned by the microbial-precipitation module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicpSlots {
    pub microbes: usize,
    pub oxygen: usize,
    pub urea: usize,
    pub biofilm: usize,
    pub calcite: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquationLayout {
    conti: [Option<usize>; NUM_PHASES],
    pseudo: [bool; NUM_PHASES],
    num_conti: usize,
    solvent: Option<usize>,
    zfraction: Option<usize>,
    polymer: Option<usize>,
    energy: Option<usize>,
    foam: Option<usize>,
    brine: Option<usize>,
    micp: Option<MicpSlots>,
    num_eq: usize,
}

impl EquationLayout {
    pub fn new(fluid_system: &FluidSystem, config: &ResidualConfig) -> Self {
        let mut conti = [None; NUM_PHASES];
        let mut pseudo = [false; NUM_PHASES];
        let mut next = 0;
        for comp in Component::ALL {
            let active = fluid_system.component_is_active(comp);
            if active || config.three_phase_indices {
                conti[comp.canonical_index()] = Some(next);
                pseudo[comp.canonical_index()] = !active;
                next += 1;
            }
        }
        let num_conti = next;

        let mut take = |on: bool| {
            on.then(|| {
                let slot = next;
                next += 1;
                slot
            })
        };
        let m = config.modules;
        let solvent = take(m.solvent);
        let zfraction = take(m.extbo);
        let polymer = take(m.polymer);
        let energy = take(m.energy);
        let foam = take(m.foam);
        let brine = take(m.brine);
        let micp = if m.micp {
            let base = next;
            next += 5;
            Some(MicpSlots {
                microbes: base,
                oxygen: base + 1,
                urea: base + 2,
                biofilm: base + 3,
                calcite: base + 4,
            })
        } else {
            None
        };

        Self {
            conti,
            pseudo,
            num_conti,
            solvent,
            zfraction,
            polymer,
            energy,
            foam,
            brine,
            micp,
            num_eq: next,
        }
    }

    /// Fail unless the layout fits into `capacity` derivative slots.
    pub fn check_capacity(&self, capacity: usize) -> ResidualResult<()> {
        if self.num_eq > capacity {
            return Err(ResidualError::Layout {
                num_eq: self.num_eq,
                capacity,
            });
        }
        Ok(())
    }

    /// Total number of equations (and primary variables per dof).
    pub fn num_eq(&self) -> usize {
        self.num_eq
    }

    /// Number of conservation equations, pseudo slots included.
    pub fn num_conti(&self) -> usize {
        self.num_conti
    }

    /// Slot of the conservation equation for `component`.
    pub fn active_component_index(&self, component: Component) -> ResidualResult<usize> {
        self.conti[component.canonical_index()]
            .ok_or(ResidualError::InactiveComponent { component })
    }

    pub fn conti_slot(&self, component: Component) -> Option<usize> {
        self.conti[component.canonical_index()]
    }

    /// Whether `component`'s slot only carries the trivial pseudo equation.
    pub fn is_pseudo(&self, component: Component) -> bool {
        self.pseudo[component.canonical_index()]
    }

    pub fn solvent(&self) -> Option<usize> {
        self.solvent
    }

    pub fn zfraction(&self) -> Option<usize> {
        self.zfraction
    }

    pub fn polymer(&self) -> Option<usize> {
        self.polymer
    }

    pub fn energy(&self) -> Option<usize> {
        self.energy
    }

    pub fn foam(&self) -> Option<usize> {
        self.foam
    }

    pub fn brine(&self) -> Option<usize> {
        self.brine
    }

    pub fn micp(&self) -> Option<MicpSlots> {
        self.micp
    }
}
