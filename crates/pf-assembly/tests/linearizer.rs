//! Global assembly: conservation, derivative checks and structure.

use nalgebra::DVector;
use pf_assembly::{
    AssemblyError, ConnectionProps, Grid, GridBuilder, GridProblem, Linearizer, SimplePvt,
    central_difference_jacobian, compare_jacobians,
};
use pf_core::{FaceId, Id, Real};
use pf_fluids::{FluidSystem, Phase};
use pf_residual::{ModuleSwitches, ResidualConfig};
use proptest::prelude::*;

const VOLUME: Real = 1000.0;
const DT: Real = 86_400.0;

fn three_phase() -> FluidSystem {
    FluidSystem::builder()
        .phases(&Phase::ALL)
        .dissolved_gas(true)
        .reference_densities(&[[1000.0, 800.0, 1.0]])
        .build()
        .unwrap()
}

fn pvt() -> SimplePvt {
    SimplePvt {
        rs_slope: 5.0e-6,
        ..SimplePvt::default()
    }
}

/// Vertical column of `n` cells, 2 m apart, optionally open at the bottom.
fn column(n: usize, open_bottom: bool) -> (Grid, Option<FaceId>) {
    let mut b = GridBuilder::new();
    let cells: Vec<_> = (0..n)
        .map(|i| b.add_cell(format!("c{i}"), VOLUME, 100.0 + 2.0 * i as Real))
        .collect();
    let props = ConnectionProps {
        normal: [0.0, 0.0, 1.0],
        thermal_transmissibility: 50.0,
        ..ConnectionProps::new(100.0, 1.0e-11)
    };
    for pair in cells.windows(2) {
        b.add_connection(pair[0], pair[1], props);
    }
    let boundary = open_bottom.then(|| b.add_boundary(cells[n - 1], 100.0 + 2.0 * n as Real, props));
    (b.build().unwrap(), boundary)
}

fn linearizer<const N: usize>(
    n: usize,
    config: ResidualConfig,
    boundary_state: Option<Vec<Real>>,
) -> Linearizer<N> {
    let (grid, boundary) = column(n, boundary_state.is_some());
    let mut problem = GridProblem::new(grid);
    if let (Some(face), Some(state)) = (boundary, boundary_state) {
        problem.set_boundary_state(face, state).unwrap();
    }
    Linearizer::new(three_phase(), config, problem, pvt()).unwrap()
}

/// `[p, sw, sg]` per cell, pressure increasing with depth.
fn state(n: usize, extra: &[Real]) -> DVector<Real> {
    let mut values = Vec::new();
    for i in 0..n {
        let i = i as Real;
        values.extend([2.0e7 + 5.0e5 * i, 0.3 - 0.05 * i, 0.2 + 0.04 * i]);
        values.extend(extra.iter().map(|e| e + 5.0 * i));
    }
    DVector::from_vec(values)
}

fn component_sums(r: &DVector<Real>, num_eq: usize) -> Vec<Real> {
    (0..num_eq)
        .map(|k| r.iter().skip(k).step_by(num_eq).sum())
        .collect()
}

#[test]
fn closed_domain_conserves_every_component() {
    let lin = linearizer::<3>(4, ResidualConfig::default(), None);
    let x = state(4, &[]);
    let r = lin.residual(&x, &x, DT).unwrap();

    // Unchanged storage: only fluxes remain, and they cancel pairwise.
    let scale = r.amax();
    assert!(scale > 0.0);
    for sum in component_sums(&r, 3) {
        assert!(sum.abs() <= 1e-12 * scale, "sum {sum} vs scale {scale}");
    }
}

#[test]
fn sources_are_the_only_net_change() {
    let (grid, _) = column(3, false);
    let mut problem = GridProblem::new(grid);
    let rates = vec![1.0e-6, -2.0e-6, 3.0e-6];
    problem.set_source(Id::from_index(1).unwrap(), rates.clone()).unwrap();
    let lin = Linearizer::<3>::new(three_phase(), ResidualConfig::default(), problem, pvt()).unwrap();

    let x = state(3, &[]);
    let r = lin.residual(&x, &x, DT).unwrap();
    for (sum, rate) in component_sums(&r, 3).into_iter().zip(rates) {
        let expected = -VOLUME * rate;
        assert!((sum - expected).abs() <= 1e-9 * expected.abs(), "{sum} vs {expected}");
    }
}

#[test]
fn assembled_jacobian_matches_finite_differences() {
    let lin = linearizer::<3>(3, ResidualConfig::default(), Some(vec![2.05e7, 0.3, 0.2]));
    let previous = state(3, &[]);
    let mut x = previous.clone();
    for i in 0..3 {
        x[3 * i] += 2.0e4;
        x[3 * i + 1] += 0.01;
        x[3 * i + 2] -= 0.01;
    }

    let analytic = lin.linearize(&x, &previous, DT).unwrap().jacobian;
    let numeric =
        central_difference_jacobian(&x, |y| lin.residual(y, &previous, DT), 1.0e-7).unwrap();
    let mismatch = compare_jacobians(&analytic, &numeric).unwrap();
    assert!(
        mismatch.relative_error < 1e-6,
        "worst entry ({}, {}): {}",
        mismatch.row,
        mismatch.col,
        mismatch.relative_error
    );
}

#[test]
fn thermal_jacobian_matches_finite_differences() {
    let config = ResidualConfig {
        modules: ModuleSwitches {
            energy: true,
            ..ModuleSwitches::default()
        },
        energy_scaling_factor: 1.0e-6,
        ..ResidualConfig::default()
    };
    let lin = linearizer::<4>(3, config, None);
    assert_eq!(lin.num_eq(), 4);
    let previous = state(3, &[350.0]);
    let mut x = previous.clone();
    for i in 0..3 {
        x[4 * i] -= 1.0e4;
        x[4 * i + 3] += 2.0;
    }

    let analytic = lin.linearize(&x, &previous, DT).unwrap().jacobian;
    let numeric =
        central_difference_jacobian(&x, |y| lin.residual(y, &previous, DT), 1.0e-7).unwrap();
    let mismatch = compare_jacobians(&analytic, &numeric).unwrap();
    assert!(mismatch.relative_error < 1e-6, "{mismatch:?}");
}

#[test]
fn jacobian_couples_only_connected_cells() {
    let lin = linearizer::<3>(3, ResidualConfig::default(), None);
    let x = state(3, &[]);
    let jac = lin.linearize(&x, &x, DT).unwrap().jacobian;

    let block_is_zero = |i: usize, j: usize| {
        (0..3).all(|k| (0..3).all(|l| jac[(3 * i + k, 3 * j + l)] == 0.0))
    };
    assert!(block_is_zero(0, 2));
    assert!(block_is_zero(2, 0));
    assert!(!block_is_zero(0, 1));
    assert!(!block_is_zero(1, 0));
}

#[test]
fn higher_boundary_pressure_means_inflow() {
    let lin = linearizer::<3>(1, ResidualConfig::default(), Some(vec![2.5e7, 0.3, 0.2]));
    let x = state(1, &[]);
    let r = lin.residual(&x, &x, DT).unwrap();
    assert!(r.iter().all(|v| *v < 0.0), "{r:?}");
}

#[test]
fn pseudo_water_slot_gets_unit_storage_diagonal() {
    let oil_gas = FluidSystem::builder()
        .phases(&[Phase::Oil, Phase::Gas])
        .dissolved_gas(true)
        .reference_densities(&[[1000.0, 800.0, 1.0]])
        .build()
        .unwrap();
    let config = ResidualConfig {
        three_phase_indices: true,
        ..ResidualConfig::default()
    };
    let (grid, _) = column(2, false);
    let lin = Linearizer::<3>::new(oil_gas, config, GridProblem::new(grid), pvt()).unwrap();
    assert_eq!(lin.primary_variables().pressure_slot(), 1);

    let x = DVector::from_vec(vec![0.0, 2.0e7, 0.2, 0.0, 2.1e7, 0.3]);
    let lin_x = lin.linearize(&x, &x, DT).unwrap();
    assert_eq!(lin_x.residual[0], 0.0);
    assert!((lin_x.jacobian[(0, 0)] - VOLUME / DT).abs() < 1e-15);
    assert!((lin_x.jacobian[(3, 3)] - VOLUME / DT).abs() < 1e-15);
    assert_eq!(lin_x.jacobian[(0, 1)], 0.0);
}

#[test]
fn inconsistent_inputs_are_rejected() {
    let lin = linearizer::<3>(2, ResidualConfig::default(), None);
    let x = state(2, &[]);
    let short = DVector::from_element(5, 1.0);
    assert!(matches!(
        lin.linearize(&short, &x, DT),
        Err(AssemblyError::DimensionMismatch { .. })
    ));
    assert!(lin.linearize(&x, &x, 0.0).is_err());

    // A boundary connection without a prescribed state.
    let (grid, _) = column(2, true);
    let err = Linearizer::<3>::new(
        three_phase(),
        ResidualConfig::default(),
        GridProblem::new(grid),
        pvt(),
    )
    .unwrap_err();
    assert!(matches!(err, AssemblyError::NonPhysical { .. }));
}

proptest! {
    #[test]
    fn fluxes_cancel_for_any_state(
        dp in prop::collection::vec(-1.0e6..1.0e6f64, 3),
        sw in prop::collection::vec(0.1..0.4f64, 3),
        sg in prop::collection::vec(0.05..0.4f64, 3),
    ) {
        let lin = linearizer::<3>(3, ResidualConfig::default(), None);
        let mut values = Vec::new();
        for i in 0..3 {
            values.extend([2.0e7 + dp[i], sw[i], sg[i]]);
        }
        let x = DVector::from_vec(values);
        let r = lin.residual(&x, &x, DT).unwrap();
        let scale = r.amax().max(1e-300);
        for sum in component_sums(&r, 3) {
            prop_assert!(sum.abs() <= 1e-12 * scale);
        }
    }
}
