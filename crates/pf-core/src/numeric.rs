/// Floating point type used throughout the engine
pub type Real = f64;

/// Finite and strictly positive (volumes, areas, time steps).
#[inline]
pub fn finite_positive(x: Real) -> bool {
    x.is_finite() && x > 0.0
}

/// Finite and not negative (transmissibilities, rates of optional terms).
#[inline]
pub fn finite_non_negative(x: Real) -> bool {
    x.is_finite() && x >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_checks_reject_non_finite() {
        assert!(finite_positive(1e-30));
        assert!(!finite_positive(0.0));
        assert!(!finite_positive(Real::INFINITY));
        assert!(finite_non_negative(0.0));
        assert!(!finite_non_negative(-1e-30));
        assert!(!finite_non_negative(Real::NAN));
    }
}
