//! Fixed-capacity vector of conserved quantities.

use crate::error::{ResidualError, ResidualResult};
use pf_core::{Evaluation, Real};
use std::ops::{AddAssign, Index, IndexMut, SubAssign};

/// One [`Evaluation`] per equation slot.
///
/// Capacity is the derivative count `N`; the active length is fixed by the
/// equation layout and never grows past it.
#[derive(Debug, Clone, PartialEq)]
pub struct EqVector<const N: usize> {
    data: [Evaluation<N>; N],
    len: usize,
}

impl<const N: usize> EqVector<N> {
    /// All-zero vector with `len` active slots.
    pub fn zeros(len: usize) -> ResidualResult<Self> {
        if len > N {
            return Err(ResidualError::Layout {
                num_eq: len,
                capacity: N,
            });
        }
        Ok(Self::sized(len))
    }

    /// Caller guarantees `len <= N`.
    pub(crate) fn sized(len: usize) -> Self {
        Self {
            data: [Evaluation::zero(); N],
            len: len.min(N),
        }
    }

    /// Zero every slot, keeping the length.
    pub fn clear(&mut self) {
        self.data = [Evaluation::zero(); N];
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Evaluation<N>] {
        &self.data[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Evaluation<N>> {
        self.as_slice().iter()
    }

    /// Scalar parts of the active slots.
    pub fn values(&self) -> Vec<Real> {
        self.iter().map(Evaluation::value).collect()
    }

    pub fn get(&self, slot: usize) -> Option<&Evaluation<N>> {
        self.as_slice().get(slot)
    }

    /// Multiply every active slot by `factor`.
    pub fn scale(&mut self, factor: Real) {
        for v in &mut self.data[..self.len] {
            *v *= factor;
        }
    }
}

impl<const N: usize> Index<usize> for EqVector<N> {
    type Output = Evaluation<N>;

    fn index(&self, slot: usize) -> &Self::Output {
        &self.as_slice()[slot]
    }
}

impl<const N: usize> IndexMut<usize> for EqVector<N> {
    fn index_mut(&mut self, slot: usize) -> &mut Self::Output {
        &mut self.data[..self.len][slot]
    }
}

impl<const N: usize> AddAssign<&EqVector<N>> for EqVector<N> {
    fn add_assign(&mut self, rhs: &EqVector<N>) {
        let len = self.len.min(rhs.len);
        for (a, b) in self.data[..len].iter_mut().zip(&rhs.data[..len]) {
            *a += *b;
        }
    }
}

impl<const N: usize> SubAssign<&EqVector<N>> for EqVector<N> {
    fn sub_assign(&mut self, rhs: &EqVector<N>) {
        let len = self.len.min(rhs.len);
        for (a, b) in self.data[..len].iter_mut().zip(&rhs.data[..len]) {
            *a -= *b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_respects_capacity() {
        assert!(EqVector::<3>::zeros(3).is_ok());
        assert_eq!(
            EqVector::<3>::zeros(4),
            Err(ResidualError::Layout {
                num_eq: 4,
                capacity: 3
            })
        );
    }

    #[test]
    fn indexing_and_arithmetic() {
        let mut a = EqVector::<3>::zeros(2).unwrap();
        a[0] = Evaluation::variable(2.0, 0);
        a[1] = Evaluation::constant(3.0);
        let mut b = a.clone();
        b += &a;
        assert_eq!(b.values(), vec![4.0, 6.0]);
        assert_eq!(b[0].derivative(0), 2.0);
        b -= &a;
        assert_eq!(b, a);
        b.scale(0.5);
        assert_eq!(b.values(), vec![1.0, 1.5]);
        assert_eq!(b.len(), 2);
        assert!(b.get(2).is_none());
    }

    #[test]
    #[should_panic]
    fn index_past_length_panics() {
        let v = EqVector::<3>::zeros(2).unwrap();
        let _ = v[2];
    }
}
