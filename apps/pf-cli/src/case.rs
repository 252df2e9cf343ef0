//! YAML case files: fluid, grid, primary variables and time step.
//!
//! Pressures are given in `pressure_unit` (bar unless stated); every other
//! primary variable is taken as is.

use crate::error::{CliError, CliResult};
use nalgebra::DVector;
use pf_assembly::{
    ConnectionProps, GridBuilder, GridProblem, Linearizer, PrimaryVariables, SimplePvt,
};
use pf_core::units::constants::G0_MPS2;
use pf_core::units::{Pressure, bar, days, pa};
use pf_core::{DofId, Real};
use pf_fluids::{FluidSystem, NUM_PHASES, Phase};
use pf_residual::{EquationLayout, ResidualConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const LATEST_VERSION: u32 = 1;

/// Derivative capacity of the driver; bounds the equations per cell.
pub const MAX_EQ: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Case {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub pressure_unit: PressureUnit,
    pub fluid: FluidDef,
    #[serde(default)]
    pub residual: ResidualConfig,
    #[serde(default)]
    pub pvt: SimplePvt,
    /// Gravitational acceleration along increasing depth [m/s²].
    #[serde(default = "default_gravity")]
    pub gravity: Real,
    #[serde(default)]
    pub compaction_exponent: Real,
    pub time_step_days: Real,
    pub cells: Vec<CellDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
    #[serde(default)]
    pub boundaries: Vec<BoundaryDef>,
}

fn default_gravity() -> Real {
    G0_MPS2
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PressureUnit {
    #[default]
    Bar,
    Pascal,
}

impl PressureUnit {
    fn quantity(self, value: Real) -> Pressure {
        match self {
            PressureUnit::Bar => bar(value),
            PressureUnit::Pascal => pa(value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FluidDef {
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub dissolved_gas: bool,
    #[serde(default)]
    pub vaporized_oil: bool,
    #[serde(default)]
    pub vaporized_water: bool,
    /// Surface densities `[water, oil, gas]` per PVT region [kg/m³].
    pub reference_densities: Vec<[Real; NUM_PHASES]>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CellDef {
    pub name: String,
    /// Bulk volume [m³].
    pub volume: Real,
    /// Depth of the cell center [m].
    pub depth: Real,
    #[serde(default)]
    pub pvt_region: usize,
    /// Primary variables at the current iterate.
    pub state: Vec<Real>,
    /// Primary variables at the previous time level; defaults to `state`.
    #[serde(default)]
    pub previous: Option<Vec<Real>>,
    /// Source rate per bulk volume, one per equation.
    #[serde(default)]
    pub source: Option<Vec<Real>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConnectionDef {
    pub cells: [String; 2],
    #[serde(default)]
    pub props: ConnectionProps,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BoundaryDef {
    pub cell: String,
    pub depth: Real,
    /// Exterior primary variables.
    pub state: Vec<Real>,
    #[serde(default)]
    pub props: ConnectionProps,
}

/// A case turned into a ready-to-run linearization.
#[derive(Debug)]
pub struct CaseSetup {
    pub linearizer: Linearizer<MAX_EQ>,
    pub current: DVector<Real>,
    pub previous: DVector<Real>,
    /// Time step [s].
    pub dt: Real,
    pub cell_names: Vec<String>,
}

pub fn load_yaml(path: &Path) -> CliResult<Case> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::CaseFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_yaml(&content)
}

pub fn parse_yaml(content: &str) -> CliResult<Case> {
    let case: Case = serde_yaml::from_str(content)?;
    if case.version != LATEST_VERSION {
        return Err(CliError::Version {
            found: case.version,
            latest: LATEST_VERSION,
        });
    }
    Ok(case)
}

impl Case {
    pub fn fluid_system(&self) -> CliResult<FluidSystem> {
        Ok(FluidSystem::builder()
            .phases(&self.fluid.phases)
            .dissolved_gas(self.fluid.dissolved_gas)
            .vaporized_oil(self.fluid.vaporized_oil)
            .vaporized_water(self.fluid.vaporized_water)
            .reference_densities(&self.fluid.reference_densities)
            .build()?)
    }

    pub fn build(&self) -> CliResult<CaseSetup> {
        if !(self.time_step_days.is_finite() && self.time_step_days > 0.0) {
            return Err(CliError::Case("time step must be positive".to_string()));
        }
        let fluid_system = self.fluid_system()?;
        let layout = EquationLayout::new(&fluid_system, &self.residual);
        let vars = PrimaryVariables::new(&layout, &fluid_system)?;
        let num_eq = vars.num_variables();
        let to_si = |values: &[Real], what: &str| -> CliResult<Vec<Real>> {
            if values.len() != num_eq {
                return Err(CliError::Case(format!(
                    "{what} has {} values, expected {num_eq}",
                    values.len()
                )));
            }
            let mut out = values.to_vec();
            let slot = vars.pressure_slot();
            out[slot] = self.pressure_unit.quantity(values[slot]).value;
            Ok(out)
        };

        let mut builder = GridBuilder::new();
        let mut ids: HashMap<&str, DofId> = HashMap::new();
        for cell in &self.cells {
            let id = builder.add_cell(cell.name.as_str(), cell.volume, cell.depth);
            builder.set_pvt_region(id, cell.pvt_region);
            if ids.insert(cell.name.as_str(), id).is_some() {
                return Err(CliError::Case(format!("duplicate cell name '{}'", cell.name)));
            }
        }
        let lookup = |name: &str| {
            ids.get(name)
                .copied()
                .ok_or_else(|| CliError::Case(format!("unknown cell '{name}'")))
        };

        for conn in &self.connections {
            builder.add_connection(lookup(&conn.cells[0])?, lookup(&conn.cells[1])?, conn.props);
        }
        let mut boundary_states = Vec::new();
        for boundary in &self.boundaries {
            let face = builder.add_boundary(lookup(&boundary.cell)?, boundary.depth, boundary.props);
            let what = format!("boundary at '{}'", boundary.cell);
            boundary_states.push((face, to_si(&boundary.state, &what)?));
        }

        let mut problem = GridProblem::new(builder.build()?)
            .with_gravity(self.gravity)
            .with_compaction_exponent(self.compaction_exponent);
        for (face, state) in boundary_states {
            problem.set_boundary_state(face, state)?;
        }

        let mut current = Vec::with_capacity(self.cells.len() * num_eq);
        let mut previous = Vec::with_capacity(self.cells.len() * num_eq);
        for cell in &self.cells {
            let id = lookup(&cell.name)?;
            current.extend(to_si(&cell.state, &cell.name)?);
            let old = cell.previous.as_deref().unwrap_or(&cell.state);
            previous.extend(to_si(old, &cell.name)?);
            if let Some(rates) = &cell.source {
                problem.set_source(id, rates.clone())?;
            }
        }

        let linearizer =
            Linearizer::new(fluid_system, self.residual.clone(), problem, self.pvt)?;

        Ok(CaseSetup {
            linearizer,
            current: DVector::from_vec(current),
            previous: DVector::from_vec(previous),
            dt: days(self.time_step_days).value,
            cell_names: self.cells.iter().map(|c| c.name.clone()).collect(),
        })
    }
}
