//! Microbially induced calcite precipitation.
//!
//! Suspended microbes, oxygen and urea are dissolved in water and travel with
//! it. Biofilm and calcite are immobile and stored as volume fractions.
//! Reactions:
//! - Monod growth of suspended and attached biomass limited by oxygen
//! - first-order decay of both
//! - attachment of suspended microbes to the biofilm and detachment back
//! - urea hydrolysis by the biofilm, precipitating calcite

use super::{PhysicsModule, require};
use crate::config::{MicpParams, ResidualConfig};
use crate::error::ResidualResult;
use crate::flux::FluxContext;
use crate::layout::MicpSlots;
use crate::vector::EqVector;
use pf_fluids::{IntensiveQuantities, Phase};

#[derive(Debug, Clone)]
pub struct MicpModule {
    slots: Option<MicpSlots>,
    params: MicpParams,
}

impl MicpModule {
    pub fn new(slots: Option<MicpSlots>, config: &ResidualConfig) -> Self {
        Self {
            slots,
            params: config.micp.clone(),
        }
    }
}

impl<const N: usize> PhysicsModule<N> for MicpModule {
    fn name(&self) -> &'static str {
        "micp"
    }

    fn is_enabled(&self) -> bool {
        self.slots.is_some()
    }

    fn add_storage(
        &self,
        out: &mut EqVector<N>,
        quantities: &IntensiveQuantities<N>,
    ) -> ResidualResult<()> {
        let Some(slots) = self.slots else {
            return Ok(());
        };
        let m = require(quantities.micp(), "micp")?;
        let water = quantities.porosity() * quantities.fluid_state().saturation(Phase::Water);
        out[slots.microbes] += water * m.microbial_concentration;
        out[slots.oxygen] += water * m.oxygen_concentration;
        out[slots.urea] += water * m.urea_concentration;
        out[slots.biofilm] += m.biofilm_fraction;
        out[slots.calcite] += m.calcite_fraction;
        Ok(())
    }

    fn add_flux(&self, out: &mut EqVector<N>, ctx: &FluxContext<'_, N>) -> ResidualResult<()> {
        let Some(slots) = self.slots else {
            return Ok(());
        };
        let Some((side, q)) = ctx.upstream(Phase::Water) else {
            return Ok(());
        };
        let m = require(q.micp(), "micp")?;
        let darcy = ctx.phases().darcy(Phase::Water);
        out[slots.microbes] += ctx.keep(side, m.microbial_concentration) * darcy;
        out[slots.oxygen] += ctx.keep(side, m.oxygen_concentration) * darcy;
        out[slots.urea] += ctx.keep(side, m.urea_concentration) * darcy;
        Ok(())
    }

    fn add_source(
        &self,
        out: &mut EqVector<N>,
        quantities: &IntensiveQuantities<N>,
    ) -> ResidualResult<()> {
        let Some(slots) = self.slots else {
            return Ok(());
        };
        let m = require(quantities.micp(), "micp")?;
        let p = &self.params;

        let oxygen = m.oxygen_concentration.max_value(0.0);
        let urea = m.urea_concentration.max_value(0.0);
        let oxygen_monod = oxygen / (oxygen + p.oxygen_half_saturation);
        let urea_monod = urea / (urea + p.urea_half_saturation);

        let suspended = quantities.porosity()
            * quantities.fluid_state().saturation(Phase::Water)
            * m.microbial_concentration;
        let attached = m.biofilm_fraction * p.biofilm_density;

        let growth_suspended = oxygen_monod * suspended * p.max_growth_rate;
        let growth_attached = oxygen_monod * attached * p.max_growth_rate;
        let attachment = suspended * p.attachment_rate;
        let detachment = attached * p.detachment_rate;
        let hydrolysis = urea_monod * attached * p.urease_rate;

        out[slots.microbes] +=
            growth_suspended - suspended * p.decay_rate - attachment + detachment;
        out[slots.biofilm] +=
            (growth_attached - attached * p.decay_rate + attachment - detachment) / p.biofilm_density;
        out[slots.oxygen] -= (growth_suspended + growth_attached) * p.oxygen_yield;
        out[slots.urea] -= hydrolysis;
        out[slots.calcite] += hydrolysis * (p.calcite_yield / p.calcite_density);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::Evaluation;
    use pf_fluids::{FluidState, MicpQuantities};

    fn slots() -> MicpSlots {
        MicpSlots {
            microbes: 0,
            oxygen: 1,
            urea: 2,
            biofilm: 3,
            calcite: 4,
        }
    }

    fn quantities(oxygen: f64, urea: f64) -> IntensiveQuantities<5> {
        let mut fs = FluidState::new(0);
        fs.set_saturation(Phase::Water, Evaluation::constant(1.0));
        IntensiveQuantities::builder(fs, Evaluation::constant(0.2))
            .micp(MicpQuantities {
                microbial_concentration: Evaluation::constant(1.0e-3),
                oxygen_concentration: Evaluation::constant(oxygen),
                urea_concentration: Evaluation::constant(urea),
                biofilm_fraction: Evaluation::constant(0.01),
                calcite_fraction: Evaluation::constant(0.0),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn hydrolysis_converts_urea_into_calcite() {
        let module = MicpModule::new(Some(slots()), &ResidualConfig::default());
        let mut out = EqVector::<5>::zeros(5).unwrap();
        module.add_source(&mut out, &quantities(0.0, 10.0)).unwrap();

        let p = MicpParams::default();
        let urea_rate = -out[2].value();
        assert!(urea_rate > 0.0);
        let expected_calcite = urea_rate * p.calcite_yield / p.calcite_density;
        assert!((out[4].value() - expected_calcite).abs() <= 1e-15 * expected_calcite.max(1.0));
        // No oxygen, no growth: oxygen untouched.
        assert_eq!(out[1].value(), 0.0);
    }

    #[test]
    fn growth_consumes_oxygen() {
        let module = MicpModule::new(Some(slots()), &ResidualConfig::default());
        let mut out = EqVector::<5>::zeros(5).unwrap();
        module.add_source(&mut out, &quantities(1.0, 0.0)).unwrap();
        assert!(out[1].value() < 0.0);
        assert_eq!(out[2].value(), 0.0);
        assert_eq!(out[4].value(), 0.0);
    }

    #[test]
    fn disabled_module_is_a_no_op() {
        let module = MicpModule::new(None, &ResidualConfig::default());
        let mut out = EqVector::<5>::zeros(5).unwrap();
        PhysicsModule::<5>::add_source(&module, &mut out, &quantities(1.0, 1.0)).unwrap();
        assert!(out.values().iter().all(|v| *v == 0.0));
    }
}
