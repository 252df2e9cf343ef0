//! Forward-mode dual numbers with a fixed number of derivative slots.
//!
//! An [`Evaluation<N>`] carries a value and the partial derivatives with respect
//! to `N` local unknowns. Arithmetic follows the chain rule. [`Evaluation::decay`]
//! strips the derivatives, which is how assembly code keeps derivative tracking
//! restricted to the focus degree of freedom of the current Jacobian column.
//!
//! # Example
//!
//! ```
//! use pf_core::Evaluation;
//!
//! let p = Evaluation::<2>::variable(200.0, 0);
//! let s = Evaluation::<2>::variable(0.5, 1);
//! let q = p * s * s;
//!
//! assert_eq!(q.value(), 50.0);
//! assert_eq!(q.derivative(0), 0.25);
//! assert_eq!(q.derivative(1), 200.0);
//! assert_eq!(q.decay().derivative(1), 0.0);
//! ```

use crate::numeric::Real;
use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

#[derive(Clone, Copy, PartialEq)]
pub struct Evaluation<const N: usize> {
    value: Real,
    derivatives: [Real; N],
}

impl<const N: usize> Evaluation<N> {
    /// Number of derivative slots.
    pub const SIZE: usize = N;

    /// A value with all derivatives zero.
    #[inline]
    pub const fn constant(value: Real) -> Self {
        Self {
            value,
            derivatives: [0.0; N],
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::constant(0.0)
    }

    /// A value with unit derivative w.r.t. slot `index`.
    ///
    /// An out-of-range `index` yields a constant.
    #[inline]
    pub fn variable(value: Real, index: usize) -> Self {
        let mut eval = Self::constant(value);
        if let Some(d) = eval.derivatives.get_mut(index) {
            *d = 1.0;
        }
        eval
    }

    /// Build from a value and an explicit derivative array.
    #[inline]
    pub const fn from_parts(value: Real, derivatives: [Real; N]) -> Self {
        Self { value, derivatives }
    }

    #[inline]
    pub fn value(&self) -> Real {
        self.value
    }

    /// Partial derivative w.r.t. slot `index` (zero when out of range).
    #[inline]
    pub fn derivative(&self, index: usize) -> Real {
        self.derivatives.get(index).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn derivatives(&self) -> &[Real; N] {
        &self.derivatives
    }

    #[inline]
    pub fn set_value(&mut self, value: Real) {
        self.value = value;
    }

    #[inline]
    pub fn set_derivative(&mut self, index: usize, d: Real) {
        if let Some(slot) = self.derivatives.get_mut(index) {
            *slot = d;
        }
    }

    /// The same value with every derivative discarded.
    #[inline]
    pub fn decay(self) -> Self {
        Self::constant(self.value)
    }

    /// Keep derivatives only when `keep` holds.
    #[inline]
    pub fn decay_unless(self, keep: bool) -> Self {
        if keep { self } else { self.decay() }
    }

    pub fn is_constant(&self) -> bool {
        self.derivatives.iter().all(|d| *d == 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.value.is_finite() && self.derivatives.iter().all(|d| d.is_finite())
    }

    /// Apply `f` with derivative `df` at the current value.
    #[inline]
    fn chain(self, f: Real, df: Real) -> Self {
        let mut out = Self::constant(f);
        for (o, d) in out.derivatives.iter_mut().zip(self.derivatives.iter()) {
            *o = df * d;
        }
        out
    }

    pub fn abs(self) -> Self {
        if self.value < 0.0 { -self } else { self }
    }

    pub fn sqrt(self) -> Self {
        let f = self.value.sqrt();
        self.chain(f, 0.5 / f)
    }

    pub fn exp(self) -> Self {
        let f = self.value.exp();
        self.chain(f, f)
    }

    pub fn ln(self) -> Self {
        self.chain(self.value.ln(), 1.0 / self.value)
    }

    pub fn powi(self, n: i32) -> Self {
        if n == 0 {
            return Self::constant(1.0);
        }
        self.chain(self.value.powi(n), Real::from(n) * self.value.powi(n - 1))
    }

    pub fn powf(self, exponent: Real) -> Self {
        self.chain(
            self.value.powf(exponent),
            exponent * self.value.powf(exponent - 1.0),
        )
    }

    /// Larger of `self` and `other`; ties keep `self`.
    pub fn max(self, other: Self) -> Self {
        if other.value > self.value { other } else { self }
    }

    /// Smaller of `self` and `other`; ties keep `self`.
    pub fn min(self, other: Self) -> Self {
        if other.value < self.value { other } else { self }
    }

    pub fn max_value(self, other: Real) -> Self {
        self.max(Self::constant(other))
    }

    pub fn min_value(self, other: Real) -> Self {
        self.min(Self::constant(other))
    }
}

impl<const N: usize> Default for Evaluation<N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize> From<Real> for Evaluation<N> {
    fn from(value: Real) -> Self {
        Self::constant(value)
    }
}

impl<const N: usize> fmt::Debug for Evaluation<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Evaluation({} | {:?})", self.value, self.derivatives)
    }
}

impl<const N: usize> fmt::Display for Evaluation<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<const N: usize> PartialEq<Real> for Evaluation<N> {
    fn eq(&self, other: &Real) -> bool {
        self.value == *other
    }
}

impl<const N: usize> PartialOrd<Real> for Evaluation<N> {
    fn partial_cmp(&self, other: &Real) -> Option<Ordering> {
        self.value.partial_cmp(other)
    }
}

impl<const N: usize> Neg for Evaluation<N> {
    type Output = Self;
    #[inline]
    fn neg(mut self) -> Self {
        self.value = -self.value;
        for d in self.derivatives.iter_mut() {
            *d = -*d;
        }
        self
    }
}

impl<const N: usize> AddAssign for Evaluation<N> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
        for (d, r) in self.derivatives.iter_mut().zip(rhs.derivatives.iter()) {
            *d += r;
        }
    }
}

impl<const N: usize> SubAssign for Evaluation<N> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.value -= rhs.value;
        for (d, r) in self.derivatives.iter_mut().zip(rhs.derivatives.iter()) {
            *d -= r;
        }
    }
}

impl<const N: usize> MulAssign for Evaluation<N> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        // (uv)' = u'v + uv'
        for (d, r) in self.derivatives.iter_mut().zip(rhs.derivatives.iter()) {
            *d = *d * rhs.value + self.value * r;
        }
        self.value *= rhs.value;
    }
}

impl<const N: usize> DivAssign for Evaluation<N> {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        // (u/v)' = (u'v - uv') / v^2
        let v2 = rhs.value * rhs.value;
        for (d, r) in self.derivatives.iter_mut().zip(rhs.derivatives.iter()) {
            *d = (*d * rhs.value - self.value * r) / v2;
        }
        self.value /= rhs.value;
    }
}

impl<const N: usize> AddAssign<Real> for Evaluation<N> {
    #[inline]
    fn add_assign(&mut self, rhs: Real) {
        self.value += rhs;
    }
}

impl<const N: usize> SubAssign<Real> for Evaluation<N> {
    #[inline]
    fn sub_assign(&mut self, rhs: Real) {
        self.value -= rhs;
    }
}

impl<const N: usize> MulAssign<Real> for Evaluation<N> {
    #[inline]
    fn mul_assign(&mut self, rhs: Real) {
        self.value *= rhs;
        for d in self.derivatives.iter_mut() {
            *d *= rhs;
        }
    }
}

impl<const N: usize> DivAssign<Real> for Evaluation<N> {
    #[inline]
    fn div_assign(&mut self, rhs: Real) {
        self.value /= rhs;
        for d in self.derivatives.iter_mut() {
            *d /= rhs;
        }
    }
}

macro_rules! binary_op {
    ($trait:ident, $method:ident, $assign:ident) => {
        impl<const N: usize> $trait for Evaluation<N> {
            type Output = Self;
            #[inline]
            fn $method(mut self, rhs: Self) -> Self {
                self.$assign(rhs);
                self
            }
        }

        impl<const N: usize> $trait<Real> for Evaluation<N> {
            type Output = Self;
            #[inline]
            fn $method(mut self, rhs: Real) -> Self {
                self.$assign(rhs);
                self
            }
        }
    };
}

binary_op!(Add, add, add_assign);
binary_op!(Sub, sub, sub_assign);
binary_op!(Mul, mul, mul_assign);
binary_op!(Div, div, div_assign);

impl<const N: usize> Add<Evaluation<N>> for Real {
    type Output = Evaluation<N>;
    #[inline]
    fn add(self, rhs: Evaluation<N>) -> Evaluation<N> {
        rhs + self
    }
}

impl<const N: usize> Sub<Evaluation<N>> for Real {
    type Output = Evaluation<N>;
    #[inline]
    fn sub(self, rhs: Evaluation<N>) -> Evaluation<N> {
        -rhs + self
    }
}

impl<const N: usize> Mul<Evaluation<N>> for Real {
    type Output = Evaluation<N>;
    #[inline]
    fn mul(self, rhs: Evaluation<N>) -> Evaluation<N> {
        rhs * self
    }
}

impl<const N: usize> Div<Evaluation<N>> for Real {
    type Output = Evaluation<N>;
    #[inline]
    fn div(self, rhs: Evaluation<N>) -> Evaluation<N> {
        Evaluation::constant(self) / rhs
    }
}

impl<const N: usize> core::iter::Sum for Evaluation<N> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn f(x: Evaluation<1>) -> Evaluation<1> {
        (x * x + 3.0).sqrt() / (1.0 + x.exp())
    }

    fn f_scalar(x: Real) -> Real {
        (x * x + 3.0).sqrt() / (1.0 + x.exp())
    }

    proptest! {
        #[test]
        fn chain_rule_matches_central_difference(x in -3.0_f64..3.0_f64) {
            let ad = f(Evaluation::variable(x, 0)).derivative(0);
            let h = 1e-6;
            let fd = (f_scalar(x + h) - f_scalar(x - h)) / (2.0 * h);
            prop_assert!((ad - fd).abs() <= 1e-6 * ad.abs().max(1.0));
        }
    }
}
