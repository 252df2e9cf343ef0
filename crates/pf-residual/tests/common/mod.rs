//! Shared fixtures: a tiny black-oil provider and a configurable problem.

#![allow(dead_code)]

use pf_core::{DofId, Evaluation, FaceId, Id, Real};
use pf_fluids::{FluidState, FluidSystem, IntensiveQuantities, Phase};
use pf_residual::{
    EqVector, Face, FaceGeometry, Problem, ResidualResult, StencilContext,
};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const REFERENCE_DENSITIES: [[Real; 3]; 2] = [[1000.0, 800.0, 1.2], [1020.0, 850.0, 0.9]];

/// Primary variables of one cell: pressure, water and gas saturation.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub pressure: Real,
    pub sw: Real,
    pub sg: Real,
    pub rs: Real,
    pub rv: Real,
    pub region: usize,
}

impl Cell {
    pub fn new(pressure: Real, sw: Real, sg: Real) -> Self {
        Self {
            pressure,
            sw,
            sg,
            rs: 0.0,
            rv: 0.0,
            region: 0,
        }
    }

    pub fn with_rs(mut self, rs: Real) -> Self {
        self.rs = rs;
        self
    }

    pub fn with_rv(mut self, rv: Real) -> Self {
        self.rv = rv;
        self
    }

    pub fn in_region(mut self, region: usize) -> Self {
        self.region = region;
        self
    }

    pub fn perturbed(mut self, var: usize, delta: Real) -> Self {
        match var {
            0 => self.pressure += delta,
            1 => self.sw += delta,
            _ => self.sg += delta,
        }
        self
    }

    pub fn var(&self, var: usize) -> Real {
        match var {
            0 => self.pressure,
            1 => self.sw,
            _ => self.sg,
        }
    }
}

/// Linear-compressibility properties with quadratic relative permeability.
///
/// With `seed` the primary variables occupy derivative slots 0..3.
pub fn quantities<const N: usize>(cell: Cell, seed: bool) -> IntensiveQuantities<N> {
    let var = |v: Real, i: usize| {
        if seed {
            Evaluation::variable(v, i)
        } else {
            Evaluation::constant(v)
        }
    };
    let p = var(cell.pressure, 0);
    let sw = var(cell.sw, 1);
    let sg = var(cell.sg, 2);
    let so = 1.0 - sw - sg;

    let mut fs = FluidState::new(cell.region);
    let props: [(Phase, Evaluation<N>, Real, Real, Real); 3] = [
        (Phase::Water, sw, 1.0, 4.0e-10, 1.0e-3),
        (Phase::Oil, so, 0.8, 1.0e-9, 2.0e-3),
        (Phase::Gas, sg, 0.01, 5.0e-8, 2.0e-5),
    ];
    for (phase, s, b_ref, compressibility, viscosity) in props {
        let inv_b = (1.0 + (p - 1.0e7) * compressibility) * (1.0 / b_ref);
        let rho = inv_b * REFERENCE_DENSITIES[cell.region][phase.index()];
        fs.set_pressure(phase, p)
            .set_saturation(phase, s)
            .set_inv_b(phase, inv_b)
            .set_density(phase, rho)
            .set_viscosity(phase, Evaluation::constant(viscosity))
            .set_mobility(phase, s * s / viscosity);
    }
    fs.set_rs(Evaluation::constant(cell.rs))
        .set_rv(Evaluation::constant(cell.rv));

    IntensiveQuantities::builder(fs, Evaluation::constant(0.25))
        .build()
        .expect("valid porosity")
}

pub fn three_phase(dissolved_gas: bool, vaporized_oil: bool) -> FluidSystem {
    FluidSystem::builder()
        .phases(&Phase::ALL)
        .dissolved_gas(dissolved_gas)
        .vaporized_oil(vaporized_oil)
        .reference_densities(&REFERENCE_DENSITIES)
        .build()
        .expect("valid fluid system")
}

pub fn oil_gas() -> FluidSystem {
    FluidSystem::builder()
        .phases(&[Phase::Oil, Phase::Gas])
        .dissolved_gas(true)
        .reference_densities(&REFERENCE_DENSITIES)
        .build()
        .expect("valid fluid system")
}

pub fn water_oil() -> FluidSystem {
    FluidSystem::builder()
        .phases(&[Phase::Water, Phase::Oil])
        .reference_densities(&REFERENCE_DENSITIES)
        .build()
        .expect("valid fluid system")
}

/// Problem with uniform transmissibility and per-dof depths.
#[derive(Debug, Default)]
pub struct TestProblem {
    pub transmissibility: Real,
    pub gravity: Real,
    pub depths: Vec<Real>,
    pub threshold: Real,
    /// Transmissibility multiplier per dof; 1 when absent.
    pub multipliers: Vec<Real>,
    pub multiplier_lookups: AtomicUsize,
    /// Constant source rate added to every slot.
    pub source_rate: Real,
    pub thermal_transmissibility: Real,
    pub diffusivity: Real,
}

impl TestProblem {
    pub fn new(transmissibility: Real) -> Self {
        Self {
            transmissibility,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.multiplier_lookups.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Problem<N> for TestProblem {
    fn gravity(&self) -> [Real; 3] {
        [0.0, 0.0, self.gravity]
    }

    fn transmissibility(&self, _face: FaceId) -> Real {
        self.transmissibility
    }

    fn boundary_transmissibility(&self, _face: FaceId) -> Real {
        self.transmissibility
    }

    fn threshold_pressure(&self, _face: FaceId) -> Real {
        self.threshold
    }

    fn dof_center_depth(&self, dof: DofId) -> Real {
        self.depths.get(dof.as_usize()).copied().unwrap_or(0.0)
    }

    fn rock_comp_trans_multiplier(
        &self,
        _quantities: &IntensiveQuantities<N>,
        dof: DofId,
    ) -> Evaluation<N> {
        self.multiplier_lookups.fetch_add(1, Ordering::Relaxed);
        Evaluation::constant(self.multipliers.get(dof.as_usize()).copied().unwrap_or(1.0))
    }

    fn thermal_transmissibility(&self, _face: FaceId) -> Real {
        self.thermal_transmissibility
    }

    fn diffusivity(&self, _face: FaceId) -> Real {
        self.diffusivity
    }

    fn source(
        &self,
        out: &mut EqVector<N>,
        _dof: DofId,
        _quantities: &IntensiveQuantities<N>,
        _time_level: usize,
    ) -> ResidualResult<()> {
        for slot in 0..out.len() {
            out[slot] += self.source_rate;
        }
        Ok(())
    }
}

/// Two-dof stencil with `focus` on dof 0 or 1.
pub fn two_cells<const N: usize>(
    a: IntensiveQuantities<N>,
    b: IntensiveQuantities<N>,
    focus: usize,
) -> StencilContext<N> {
    let mut ctx = StencilContext::new();
    ctx.push_dof(Id::from_index(0).unwrap(), 10.0, vec![a.clone(), a]);
    ctx.push_dof(Id::from_index(1).unwrap(), 10.0, vec![b.clone(), b]);
    ctx.set_focus(focus).expect("focus in stencil");
    ctx
}

pub fn face(area: Real) -> Face {
    Face {
        id: Id::from_index(0).unwrap(),
        interior: 0,
        exterior: 1,
        geometry: FaceGeometry {
            area,
            normal: [1.0, 0.0, 0.0],
        },
    }
}

pub fn assert_close(a: Real, b: Real, rel: Real) {
    let scale = a.abs().max(b.abs()).max(1e-300);
    assert!(
        (a - b).abs() <= rel * scale,
        "{a} vs {b} (rel diff {})",
        (a - b).abs() / scale
    );
}
