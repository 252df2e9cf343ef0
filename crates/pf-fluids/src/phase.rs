//! Phase and component enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of black-oil phases (and pseudo-components).
pub const NUM_PHASES: usize = 3;

/// Fluid phase. Canonical numbering: water = 0, oil = 1, gas = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Water,
    Oil,
    Gas,
}

impl Phase {
    /// All phases in canonical order.
    pub const ALL: [Phase; NUM_PHASES] = [Phase::Water, Phase::Oil, Phase::Gas];

    pub const fn index(self) -> usize {
        match self {
            Phase::Water => 0,
            Phase::Oil => 1,
            Phase::Gas => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The pseudo-component that makes up the bulk of this phase.
    pub const fn solvent_component(self) -> Component {
        match self {
            Phase::Water => Component::Water,
            Phase::Oil => Component::Oil,
            Phase::Gas => Component::Gas,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Phase::Water => "water",
            Phase::Oil => "oil",
            Phase::Gas => "gas",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Black-oil pseudo-component. Canonical numbering matches [`Phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Water,
    Oil,
    Gas,
}

impl Component {
    pub const ALL: [Component; NUM_PHASES] = [Component::Water, Component::Oil, Component::Gas];

    pub const fn canonical_index(self) -> usize {
        match self {
            Component::Water => 0,
            Component::Oil => 1,
            Component::Gas => 2,
        }
    }

    /// The phase whose solvent component this is.
    pub const fn phase(self) -> Phase {
        match self {
            Component::Water => Phase::Water,
            Component::Oil => Phase::Oil,
            Component::Gas => Phase::Gas,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phase().name())
    }
}
