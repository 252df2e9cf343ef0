//! Global residual and Jacobian assembly.
//!
//! For every cell `i`
//!
//! ```text
//! R_i = V_i (S_i(t) - S_i(t - dt)) / dt + Σ_f area_f F_f - V_i q_i
//! ```
//!
//! Columns are assembled one focus cell at a time: the pass for cell `j`
//! seeds only `j`'s primary variables, evaluates `R_j` together with
//! `∂R_j/∂x_j` and, through the fluxes of `j`'s connections seen from the
//! other side, `∂R_n/∂x_j` for every neighbour `n`. Passes run in parallel
//! and their blocks are scattered serially afterwards.

use crate::error::{AssemblyError, AssemblyResult};
use crate::grid::{ConnectionKind, Grid};
use crate::problem::GridProblem;
use crate::pvt::{PrimaryVariables, SimplePvt};
use nalgebra::{DMatrix, DVector};
use pf_core::timing::{Timer, assembly_timing};
use pf_core::{FaceId, Real, finite_positive};
use pf_fluids::{FluidSystem, IntensiveQuantities};
use pf_residual::{
    BlackOilLocalResidual, BoundaryFace, EqVector, Face, FaceGeometry, ResidualConfig,
    StencilContext,
};
use rayon::prelude::*;

/// Residual and Jacobian of the whole grid.
///
/// Unknown `k` of cell `i` sits at `i * num_eq + k`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linearization {
    pub residual: DVector<Real>,
    pub jacobian: DMatrix<Real>,
}

/// Derivative rows produced by one focus-cell pass.
struct ColumnBlock<const N: usize> {
    focus: usize,
    /// `(row cell, ∂R_row/∂x_focus)`; the focus row also carries `R_focus`.
    rows: Vec<(usize, EqVector<N>)>,
}

/// Quantities that stay constant during one linearization.
struct Frozen<const N: usize> {
    current: Vec<IntensiveQuantities<N>>,
    previous: Vec<IntensiveQuantities<N>>,
    boundary: Vec<(FaceId, IntensiveQuantities<N>)>,
}

#[derive(Debug)]
pub struct Linearizer<const N: usize> {
    residual: BlackOilLocalResidual<GridProblem, N>,
    pvt: SimplePvt,
    vars: PrimaryVariables,
}

impl<const N: usize> Linearizer<N> {
    pub fn new(
        fluid_system: FluidSystem,
        config: ResidualConfig,
        problem: GridProblem,
        pvt: SimplePvt,
    ) -> AssemblyResult<Self> {
        pvt.validate()?;
        let residual = BlackOilLocalResidual::new(fluid_system, config, problem)?;
        let vars = PrimaryVariables::new(residual.layout(), residual.fluid_system())?;
        let num_eq = vars.num_variables();
        let problem = residual.problem();
        let grid = problem.grid();

        let regions = residual.fluid_system().num_regions();
        if let Some(cell) = grid.cells().iter().find(|c| c.pvt_region >= regions) {
            return Err(AssemblyError::NonPhysical {
                what: "pvt region",
                entity: "cell",
                index: cell.id.as_usize(),
            });
        }
        for (_, rates) in problem.sources() {
            check_len("source rates", num_eq, rates.len())?;
        }
        for conn in grid.boundary_connections() {
            let state = problem.boundary_state(conn.id).ok_or(AssemblyError::NonPhysical {
                what: "missing boundary state",
                entity: "connection",
                index: conn.id.as_usize(),
            })?;
            check_len("boundary state", num_eq, state.len())?;
        }

        tracing::debug!(
            cells = grid.num_cells(),
            connections = grid.connections().len(),
            num_eq,
            "linearizer ready"
        );

        Ok(Self {
            residual,
            pvt,
            vars,
        })
    }

    pub fn grid(&self) -> &Grid {
        self.residual.problem().grid()
    }

    pub fn local_residual(&self) -> &BlackOilLocalResidual<GridProblem, N> {
        &self.residual
    }

    pub fn primary_variables(&self) -> &PrimaryVariables {
        &self.vars
    }

    pub fn pvt(&self) -> &SimplePvt {
        &self.pvt
    }

    pub fn num_eq(&self) -> usize {
        self.vars.num_variables()
    }

    /// Length of the global unknown vector.
    pub fn num_unknowns(&self) -> usize {
        self.grid().num_cells() * self.num_eq()
    }

    /// Quantities of every cell, without derivatives.
    pub fn cell_quantities(&self, x: &DVector<Real>) -> AssemblyResult<Vec<IntensiveQuantities<N>>> {
        check_len("unknowns", self.num_unknowns(), x.len())?;
        let timer = Timer::start();
        let out = self
            .grid()
            .cells()
            .par_iter()
            .map(|cell| {
                self.pvt.quantities(
                    &self.vars,
                    self.residual.fluid_system(),
                    self.cell_values(x, cell.id.as_usize()),
                    cell.pvt_region,
                    false,
                )
            })
            .collect();
        timer.stop_into(&assembly_timing::QUANTITIES);
        out
    }

    /// Residual only.
    pub fn residual(
        &self,
        current: &DVector<Real>,
        previous: &DVector<Real>,
        dt: Real,
    ) -> AssemblyResult<DVector<Real>> {
        Ok(self.linearize(current, previous, dt)?.residual)
    }

    /// Residual and Jacobian at `current`, with storage differenced against `previous`.
    pub fn linearize(
        &self,
        current: &DVector<Real>,
        previous: &DVector<Real>,
        dt: Real,
    ) -> AssemblyResult<Linearization> {
        check_len("previous unknowns", self.num_unknowns(), previous.len())?;
        if !finite_positive(dt) {
            return Err(AssemblyError::Numeric {
                what: format!("time step must be positive and finite, got {dt}"),
            });
        }

        let frozen = Frozen {
            current: self.cell_quantities(current)?,
            previous: self.cell_quantities(previous)?,
            boundary: self.boundary_quantities()?,
        };

        let blocks = (0..self.grid().num_cells())
            .into_par_iter()
            .map(|j| self.column_pass(j, current, &frozen, dt))
            .collect::<AssemblyResult<Vec<_>>>()?;

        let timer = Timer::start();
        let n = self.num_unknowns();
        let num_eq = self.num_eq();
        let mut residual = DVector::zeros(n);
        let mut jacobian = DMatrix::zeros(n, n);
        for block in &blocks {
            for (row, values) in &block.rows {
                for (k, v) in values.iter().enumerate() {
                    let r = row * num_eq + k;
                    if *row == block.focus {
                        residual[r] = v.value();
                    }
                    for l in 0..num_eq {
                        jacobian[(r, block.focus * num_eq + l)] += v.derivative(l);
                    }
                }
            }
        }
        timer.stop_into(&assembly_timing::SCATTER);

        tracing::debug!(unknowns = n, residual_norm = residual.norm(), "linearized");
        Ok(Linearization { residual, jacobian })
    }

    fn cell_values<'a>(&self, x: &'a DVector<Real>, cell: usize) -> &'a [Real] {
        let n = self.num_eq();
        &x.as_slice()[cell * n..(cell + 1) * n]
    }

    fn boundary_quantities(&self) -> AssemblyResult<Vec<(FaceId, IntensiveQuantities<N>)>> {
        let problem = self.residual.problem();
        let grid = problem.grid();
        grid.connections()
            .iter()
            .filter_map(|conn| match conn.kind {
                ConnectionKind::Boundary { cell, .. } => Some((conn, cell)),
                ConnectionKind::Interior { .. } => None,
            })
            .map(|(conn, cell)| -> AssemblyResult<_> {
                let region = grid.cell(cell).map_or(0, |c| c.pvt_region);
                let values = problem.boundary_state(conn.id).unwrap_or(&[]);
                let q = self.pvt.quantities(
                    &self.vars,
                    self.residual.fluid_system(),
                    values,
                    region,
                    false,
                )?;
                Ok((conn.id, q))
            })
            .collect()
    }

    fn column_pass(
        &self,
        j: usize,
        x: &DVector<Real>,
        frozen: &Frozen<N>,
        dt: Real,
    ) -> AssemblyResult<ColumnBlock<N>> {
        let timer = Timer::start();
        let grid = self.grid();
        let residual = &self.residual;
        let cell = &grid.cells()[j];

        let seeded = self.pvt.quantities(
            &self.vars,
            residual.fluid_system(),
            self.cell_values(x, j),
            cell.pvt_region,
            true,
        )?;
        let mut total = residual.new_vector();
        let mut term = residual.new_vector();
        let mut old = residual.new_vector();

        residual.compute_storage(&mut term, &seeded, 0)?;
        residual.compute_storage(&mut old, &frozen.previous[j], 1)?;
        term -= &old;
        term.scale(cell.volume / dt);
        total += &term;

        let mut ctx = StencilContext::new();
        let focus = ctx.push_dof(cell.id, cell.volume, vec![seeded, frozen.previous[j].clone()]);
        ctx.set_focus(focus)?;

        residual.compute_source(&mut term, &ctx, focus, 0)?;
        term.scale(-cell.volume);
        total += &term;

        let mut rows = Vec::new();
        for &face_id in grid.cell_connections(cell.id) {
            let conn = grid.connection(face_id).ok_or(AssemblyError::InconsistentAdjacency {
                face: face_id,
                cell: cell.id,
            })?;
            let area = conn.props.area;
            match conn.kind {
                ConnectionKind::Interior { a, b } => {
                    let (other, normal) = if a == cell.id {
                        (b, conn.props.normal)
                    } else {
                        (a, conn.props.normal.map(|v| -v))
                    };
                    let o = other.as_usize();
                    let volume = grid.cells()[o].volume;
                    let local = ctx.push_dof(
                        other,
                        volume,
                        vec![frozen.current[o].clone(), frozen.previous[o].clone()],
                    );
                    let face = Face {
                        id: face_id,
                        interior: focus,
                        exterior: local,
                        geometry: FaceGeometry { area, normal },
                    };

                    residual.compute_flux(&mut term, &ctx, &face, 0)?;
                    term.scale(area);
                    total += &term;

                    // The neighbour's residual sees the same face from its side.
                    residual.compute_flux(&mut term, &ctx, &face.reversed(), 0)?;
                    term.scale(area);
                    rows.push((o, term.clone()));
                }
                ConnectionKind::Boundary { depth, .. } => {
                    if let Some((_, q)) = frozen.boundary.iter().find(|(id, _)| *id == face_id) {
                        ctx.push_boundary(face_id, q.clone());
                    }
                    let face = BoundaryFace {
                        id: face_id,
                        interior: focus,
                        geometry: conn.props.geometry(),
                        depth,
                    };
                    residual.compute_boundary_flux(&mut term, &ctx, &face, 0)?;
                    term.scale(area);
                    total += &term;
                }
            }
        }
        rows.push((j, total));

        tracing::trace!(cell = %cell.id, rows = rows.len(), "column pass");
        timer.stop_into(&assembly_timing::COLUMN_PASS);
        Ok(ColumnBlock { focus: j, rows })
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> AssemblyResult<()> {
    if expected != actual {
        return Err(AssemblyError::DimensionMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
