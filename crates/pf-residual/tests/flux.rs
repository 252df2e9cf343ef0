//! Face flux: upwinding, antisymmetry, fast path and derivative locality.

mod common;

use common::*;
use pf_core::{Id, bar};
use pf_fluids::Phase;
use pf_residual::upwind::{PotentialGeometry, phase_upwind};
use pf_residual::{
    BlackOilLocalResidual, BoundaryFace, EqVector, FaceGeometry, ResidualConfig, Side,
};
use proptest::prelude::*;

#[test]
fn two_cell_oil_gas_with_dissolved_gas() {
    let p1 = bar(200.0).value;
    let p2 = bar(150.0).value;
    let c1 = quantities::<2>(Cell::new(p1, 0.0, 0.3).with_rs(50.0), false);
    let c2 = quantities::<2>(Cell::new(p2, 0.0, 0.1).with_rs(50.0), false);

    let geometry = PotentialGeometry {
        depth_difference: 0.0,
        gravity: 0.0,
        threshold_pressure: 0.0,
    };
    for phase in [Phase::Oil, Phase::Gas] {
        let up = phase_upwind(phase, c1.fluid_state(), c2.fluid_state(), &geometry, None);
        assert_eq!(up.upstream, Side::Interior, "{phase}");
        assert_eq!(up.potential.value(), p1 - p2);
    }

    let trans = 1.0e-12;
    let residual =
        BlackOilLocalResidual::new(oil_gas(), ResidualConfig::default(), TestProblem::new(trans))
            .unwrap();
    let ctx = two_cells(c1.clone(), c2, 0);
    let mut out = residual.new_vector();
    residual.compute_flux(&mut out, &ctx, &face(1.0), 0).unwrap();

    let fs = c1.fluid_state();
    let darcy_o = (p1 - p2) * fs.mobility(Phase::Oil).value() * trans;
    let darcy_g = (p1 - p2) * fs.mobility(Phase::Gas).value() * trans;
    let oil_surface = fs.inv_b(Phase::Oil).value() * darcy_o;
    let gas_surface = fs.inv_b(Phase::Gas).value() * darcy_g;

    let oil = residual.layout().active_component_index(pf_fluids::Component::Oil).unwrap();
    let gas = residual.layout().active_component_index(pf_fluids::Component::Gas).unwrap();
    assert_close(out[oil].value(), oil_surface, 1e-12);
    assert_close(out[gas].value(), gas_surface + 50.0 * oil_surface, 1e-12);
    assert!(out[gas].value() > gas_surface);
}

#[test]
fn equal_pressures_short_circuit_without_lookups() {
    let problem = TestProblem::new(1.0e-12);
    let residual =
        BlackOilLocalResidual::<_, 3>::new(three_phase(true, false), ResidualConfig::default(), &problem)
            .unwrap();
    let a = quantities(Cell::new(2.0e7, 0.2, 0.3).with_rs(40.0), true);
    let b = quantities(Cell::new(2.0e7, 0.5, 0.1).with_rs(60.0), true);
    let ctx = two_cells(a, b, 0);

    let mut out = residual.new_vector();
    residual.compute_flux(&mut out, &ctx, &face(1.0), 0).unwrap();
    assert!(out.iter().all(|v| v.value() == 0.0 && v.is_constant()));
    assert_eq!(problem.lookups(), 0);
}

#[test]
fn threshold_pressure_blocks_small_drops() {
    let problem = TestProblem {
        threshold: 2.0e5,
        ..TestProblem::new(1.0e-12)
    };
    let residual =
        BlackOilLocalResidual::<_, 3>::new(three_phase(false, false), ResidualConfig::default(), &problem)
            .unwrap();
    let a = quantities(Cell::new(2.01e7, 0.2, 0.3), true);
    let b = quantities(Cell::new(2.0e7, 0.2, 0.3), true);
    let ctx = two_cells(a.clone(), b.clone(), 0);

    let mut out = residual.new_vector();
    residual.compute_flux(&mut out, &ctx, &face(1.0), 0).unwrap();
    assert_eq!(out.values(), vec![0.0; 3]);
    assert_eq!(problem.lookups(), 0);

    // Above the threshold the drop is reduced by it.
    let a = quantities(Cell::new(2.05e7, 0.2, 0.3), false);
    let ctx = two_cells(a.clone(), b, 0);
    residual.compute_flux(&mut out, &ctx, &face(1.0), 0).unwrap();
    let fs = a.fluid_state();
    let expected = 3.0e5 * fs.mobility(Phase::Water).value() * 1.0e-12 * fs.inv_b(Phase::Water).value();
    assert_close(out[0].value(), expected, 1e-12);
    assert_eq!(problem.lookups(), 3);
}

#[test]
fn multiplier_is_taken_from_upstream_only() {
    let flux_with = |multipliers: Vec<f64>| {
        let problem = TestProblem {
            multipliers,
            ..TestProblem::new(1.0e-12)
        };
        let residual = BlackOilLocalResidual::<_, 3>::new(
            three_phase(false, false),
            ResidualConfig::default(),
            problem,
        )
        .unwrap();
        let a = quantities(Cell::new(2.2e7, 0.2, 0.3), false);
        let b = quantities(Cell::new(2.0e7, 0.2, 0.3), false);
        let mut out = residual.new_vector();
        residual
            .compute_flux(&mut out, &two_cells(a, b, 0), &face(1.0), 0)
            .unwrap();
        out.values()
    };

    let base = flux_with(vec![1.0, 1.0]);
    assert_eq!(flux_with(vec![1.0, 7.0]), base);
    let doubled = flux_with(vec![2.0, 1.0]);
    for (d, b) in doubled.iter().zip(&base) {
        assert_close(*d, 2.0 * b, 1e-14);
    }
}

#[test]
fn gravity_drives_flow_between_equal_pressures() {
    // Interior deeper than exterior at equal pressure: every phase rises.
    let problem = TestProblem {
        gravity: 9.80665,
        depths: vec![1010.0, 1000.0],
        ..TestProblem::new(1.0e-12)
    };
    let residual =
        BlackOilLocalResidual::<_, 3>::new(three_phase(false, false), ResidualConfig::default(), &problem)
            .unwrap();
    let a = quantities(Cell::new(2.0e7, 0.2, 0.3), false);
    let b = quantities(Cell::new(2.0e7, 0.2, 0.3), false);
    let mut out = residual.new_vector();
    residual
        .compute_flux(&mut out, &two_cells(a, b, 0), &face(1.0), 0)
        .unwrap();
    assert!(out.values().iter().all(|v| *v < 0.0));
}

fn fd_flux(cells: [Cell; 2], var: usize, side: usize, h: f64) -> Vec<f64> {
    let residual = BlackOilLocalResidual::<_, 3>::new(
        three_phase(true, false),
        ResidualConfig::default(),
        TestProblem::new(1.0e-12),
    )
    .unwrap();
    let eval = |delta: f64| {
        let mut c = cells;
        c[side] = c[side].perturbed(var, delta);
        let ctx = two_cells(quantities(c[0], false), quantities(c[1], false), 0);
        let mut out = EqVector::<3>::zeros(3).unwrap();
        residual.compute_flux(&mut out, &ctx, &face(2.0), 0).unwrap();
        out.values()
    };
    let plus = eval(h);
    let minus = eval(-h);
    plus.iter().zip(&minus).map(|(p, m)| (p - m) / (2.0 * h)).collect()
}

#[test]
fn derivatives_follow_the_focus_dof_only() {
    let cells = [
        Cell::new(2.1e7, 0.2, 0.3).with_rs(45.0),
        Cell::new(2.0e7, 0.35, 0.15).with_rs(60.0),
    ];
    let residual = BlackOilLocalResidual::<_, 3>::new(
        three_phase(true, false),
        ResidualConfig::default(),
        TestProblem::new(1.0e-12),
    )
    .unwrap();

    for focus in [0, 1] {
        // Both cells seed the same derivative slots; only the focus may show up.
        let ctx = two_cells(quantities(cells[0], true), quantities(cells[1], true), focus);
        let mut out = residual.new_vector();
        residual.compute_flux(&mut out, &ctx, &face(2.0), 0).unwrap();

        for var in 0..3 {
            let h = 1e-6 * cells[focus].var(var).abs().max(1.0);
            let fd = fd_flux(cells, var, focus, h);
            for slot in 0..3 {
                let ad = out[slot].derivative(var);
                assert!(
                    (ad - fd[slot]).abs() <= 1e-6 * ad.abs().max(fd[slot].abs()).max(1e-20),
                    "focus {focus} var {var} slot {slot}: {ad} vs {}",
                    fd[slot]
                );
            }
        }
    }

    // Older time levels carry no derivatives at all.
    let ctx = two_cells(quantities(cells[0], true), quantities(cells[1], true), 0);
    let mut out = residual.new_vector();
    residual.compute_flux(&mut out, &ctx, &face(2.0), 1).unwrap();
    assert!(out.iter().all(|v| v.is_constant()));
}

#[test]
fn boundary_flux_uses_prescribed_exterior_state() {
    let residual = BlackOilLocalResidual::<_, 3>::new(
        three_phase(false, false),
        ResidualConfig::default(),
        TestProblem::new(1.0e-12),
    )
    .unwrap();
    let inside = quantities(Cell::new(2.0e7, 0.2, 0.3), true);
    let outside = quantities(Cell::new(1.5e7, 0.2, 0.3), true);
    let mut ctx = pf_residual::StencilContext::new();
    ctx.push_dof(Id::from_index(0).unwrap(), 10.0, vec![inside]);
    let bf = BoundaryFace {
        id: Id::from_index(4).unwrap(),
        interior: 0,
        geometry: FaceGeometry {
            area: 1.0,
            normal: [0.0, 1.0, 0.0],
        },
        depth: 0.0,
    };
    ctx.push_boundary(bf.id, outside);

    let mut out = residual.new_vector();
    residual.compute_boundary_flux(&mut out, &ctx, &bf, 0).unwrap();
    assert!(out.values().iter().all(|v| *v > 0.0));
    // Outflow: upstream is the interior, which is the focus.
    assert!(out[0].derivative(0) > 0.0);

    // Inflow from the boundary: upstream quantities lose their derivatives.
    let mut ctx2 = pf_residual::StencilContext::new();
    ctx2.push_dof(
        Id::from_index(0).unwrap(),
        10.0,
        vec![quantities(Cell::new(1.0e7, 0.2, 0.3), true)],
    );
    ctx2.push_boundary(bf.id, quantities(Cell::new(1.5e7, 0.2, 0.3), true));
    residual.compute_boundary_flux(&mut out, &ctx2, &bf, 0).unwrap();
    assert!(out.values().iter().all(|v| *v < 0.0));
    assert_eq!(out[0].derivative(1), 0.0);
}

#[test]
fn zero_area_is_rejected() {
    let residual = BlackOilLocalResidual::<_, 3>::new(
        three_phase(false, false),
        ResidualConfig::default(),
        TestProblem::new(1.0e-12),
    )
    .unwrap();
    let a = quantities(Cell::new(2.0e7, 0.2, 0.3), false);
    let mut out = residual.new_vector();
    assert!(
        residual
            .compute_flux(&mut out, &two_cells(a.clone(), a, 0), &face(0.0), 0)
            .is_err()
    );
}

proptest! {
    #[test]
    fn flux_is_antisymmetric(
        p1 in 1.0e7..3.0e7f64,
        p2 in 1.0e7..3.0e7f64,
        sw1 in 0.05..0.45f64,
        sg1 in 0.0..0.45f64,
        sw2 in 0.05..0.45f64,
        sg2 in 0.0..0.45f64,
        z1 in 0.0..100.0f64,
        z2 in 0.0..100.0f64,
        threshold in prop_oneof![Just(0.0f64), 0.0..1.0e6f64],
    ) {
        let problem = TestProblem {
            gravity: 9.80665,
            depths: vec![z1, z2],
            threshold,
            ..TestProblem::new(3.0e-13)
        };
        let residual = BlackOilLocalResidual::<_, 3>::new(
            three_phase(true, true),
            ResidualConfig::default(),
            problem,
        ).unwrap();
        let a = quantities(Cell::new(p1, sw1, sg1).with_rs(30.0).with_rv(1e-4), false);
        let b = quantities(Cell::new(p2, sw2, sg2).with_rs(70.0).with_rv(2e-4), false);
        let ctx = two_cells(a, b, 0);

        let f = face(1.5);
        let mut forward = residual.new_vector();
        let mut backward = residual.new_vector();
        residual.compute_flux(&mut forward, &ctx, &f, 0).unwrap();
        residual.compute_flux(&mut backward, &ctx, &f.reversed(), 0).unwrap();
        for (x, y) in forward.values().iter().zip(backward.values()) {
            prop_assert!((x + y).abs() <= 1e-12 * x.abs().max(y.abs()));
        }
    }
}
