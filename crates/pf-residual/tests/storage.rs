//! Storage, conservation modes, equation layout and source terms.

mod common;

use common::*;
use pf_fluids::{Component, FluidSystem, Phase};
use pf_residual::{BlackOilLocalResidual, ResidualConfig, ResidualError};
use proptest::prelude::*;

#[test]
fn storage_accounts_for_dissolution_and_vaporization() {
    let residual = BlackOilLocalResidual::<_, 3>::new(
        three_phase(true, true),
        ResidualConfig::default(),
        TestProblem::new(1.0e-12),
    )
    .unwrap();
    let q = quantities::<3>(Cell::new(2.0e7, 0.2, 0.3).with_rs(50.0).with_rv(1.0e-4), true);
    let mut out = residual.new_vector();
    residual.compute_storage(&mut out, &q, 0).unwrap();

    let fs = q.fluid_state();
    let phi = q.porosity().value();
    let sv = |p: Phase| fs.saturation(p).value() * fs.inv_b(p).value() * phi;
    assert_close(out[0].value(), sv(Phase::Water), 1e-14);
    assert_close(out[1].value(), sv(Phase::Oil) + 1.0e-4 * sv(Phase::Gas), 1e-14);
    assert_close(out[2].value(), sv(Phase::Gas) + 50.0 * sv(Phase::Oil), 1e-14);
    // Water storage grows with water saturation.
    assert!(out[0].derivative(1) > 0.0);

    residual.compute_storage(&mut out, &q, 1).unwrap();
    assert!(out.iter().all(|v| v.is_constant()));
    assert_close(out[2].value(), sv(Phase::Gas) + 50.0 * sv(Phase::Oil), 1e-14);
}

#[test]
fn three_phase_numbering_registers_pseudo_unknown() {
    let config = ResidualConfig {
        three_phase_indices: true,
        ..ResidualConfig::default()
    };
    let residual =
        BlackOilLocalResidual::<_, 3>::new(oil_gas(), config, TestProblem::new(1.0e-12)).unwrap();
    assert_eq!(residual.layout().num_eq(), 3);
    assert!(residual.layout().is_pseudo(Component::Water));

    let q = quantities::<3>(Cell::new(2.0e7, 0.0, 0.3), true);
    let mut out = residual.new_vector();
    residual.compute_storage(&mut out, &q, 0).unwrap();
    assert_eq!(out[0].value(), 0.0);
    assert_eq!(out[0].derivative(0), 1.0);

    residual.compute_storage(&mut out, &q, 1).unwrap();
    assert_eq!(out[0].value(), 0.0);
    assert!(out[0].is_constant());

    let a = quantities(Cell::new(2.1e7, 0.0, 0.3), true);
    let b = quantities(Cell::new(2.0e7, 0.0, 0.3), true);
    residual
        .compute_flux(&mut out, &two_cells(a, b, 0), &face(1.0), 0)
        .unwrap();
    assert_eq!(out[0].value(), 0.0);
    assert!(out[0].is_constant());
    assert!(out[1].value() > 0.0);
}

#[test]
fn layout_larger_than_capacity_is_rejected() {
    let err = BlackOilLocalResidual::<_, 2>::new(
        three_phase(false, false),
        ResidualConfig::default(),
        TestProblem::new(1.0),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ResidualError::Layout {
            num_eq: 3,
            capacity: 2
        }
    );
}

#[test]
fn source_passes_through_and_scales_energy() {
    let mut config = ResidualConfig::default();
    config.modules.energy = true;
    config.energy_scaling_factor = 0.5;
    let problem = TestProblem {
        source_rate: 2.0,
        ..TestProblem::new(1.0)
    };
    let residual =
        BlackOilLocalResidual::<_, 4>::new(three_phase(false, false), config, problem).unwrap();
    let energy = residual.layout().energy().unwrap();
    assert_eq!(energy, 3);

    let q = quantities(Cell::new(2.0e7, 0.2, 0.3), false);
    let ctx = two_cells(q.clone(), q, 0);
    let mut out = residual.new_vector();
    residual.compute_source(&mut out, &ctx, 0, 0).unwrap();
    assert_eq!(out.values(), vec![2.0, 2.0, 2.0, 1.0]);
}

#[test]
fn non_positive_energy_scaling_is_rejected() {
    let config = ResidualConfig {
        energy_scaling_factor: 0.0,
        ..ResidualConfig::default()
    };
    assert!(
        BlackOilLocalResidual::<_, 3>::new(three_phase(false, false), config, TestProblem::new(1.0))
            .is_err()
    );
}

fn two_region_system() -> FluidSystem {
    three_phase(true, true)
}

proptest! {
    #[test]
    fn mass_mode_scales_surface_volumes_by_reference_density(
        p1 in 1.5e7..2.5e7f64,
        p2 in 1.5e7..2.5e7f64,
        sw in 0.05..0.45f64,
        sg in 0.0..0.45f64,
        rs in 0.0..100.0f64,
    ) {
        let surface = BlackOilLocalResidual::<_, 3>::new(
            two_region_system(),
            ResidualConfig::default(),
            TestProblem::new(1.0e-12),
        ).unwrap();
        let mass = BlackOilLocalResidual::<_, 3>::new(
            two_region_system(),
            ResidualConfig { conserve_surface_volume: false, ..ResidualConfig::default() },
            TestProblem::new(1.0e-12),
        ).unwrap();

        let a = quantities(Cell::new(p1, sw, sg).with_rs(rs).with_rv(1e-4).in_region(1), true);
        let b = quantities(Cell::new(p2, 0.3, 0.2).with_rs(rs).with_rv(1e-4).in_region(1), true);
        let ctx = two_cells(a.clone(), b, 0);

        let mut sv = surface.new_vector();
        let mut m = mass.new_vector();
        surface.compute_storage(&mut sv, &a, 0).unwrap();
        mass.compute_storage(&mut m, &a, 0).unwrap();
        let mut sv_flux = surface.new_vector();
        let mut m_flux = mass.new_vector();
        surface.compute_flux(&mut sv_flux, &ctx, &face(1.0), 0).unwrap();
        mass.compute_flux(&mut m_flux, &ctx, &face(1.0), 0).unwrap();

        for comp in Component::ALL {
            let slot = surface.layout().active_component_index(comp).unwrap();
            let rho = REFERENCE_DENSITIES[1][comp.phase().index()];
            for (x, y) in [(sv[slot], m[slot]), (sv_flux[slot], m_flux[slot])] {
                let expected = x.value() * rho;
                prop_assert!((y.value() - expected).abs() <= 1e-12 * expected.abs().max(1e-300));
                for k in 0..3 {
                    let dx = x.derivative(k) * rho;
                    prop_assert!((y.derivative(k) - dx).abs() <= 1e-12 * dx.abs().max(1e-300));
                }
            }
        }
    }
}
