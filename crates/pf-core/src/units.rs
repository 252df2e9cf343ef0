// pf-core/src/units.rs

use uom::si::f64::{Pressure as UomPressure, Time as UomTime};

// Public canonical unit types (SI, f64)
pub type Pressure = UomPressure;
pub type Time = UomTime;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn days(v: f64) -> Time {
    use uom::si::time::day;
    Time::new::<day>(v)
}

pub mod constants {
    /// Standard gravity [m/s²].
    pub const G0_MPS2: f64 = 9.806_65;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_units_are_stored_in_si() {
        assert!((bar(1.0).value - 1.0e5).abs() < 1e-9);
        assert_eq!(bar(200.0), pa(2.0e7));
        assert!((days(1.0).value - 86_400.0).abs() < 1e-9);
        assert_eq!(days(0.5).value, 43_200.0);
    }
}
