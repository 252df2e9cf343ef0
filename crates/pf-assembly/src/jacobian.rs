//! Finite-difference Jacobians for checking assembled derivatives.

use crate::error::{AssemblyError, AssemblyResult};
use nalgebra::{DMatrix, DVector};

/// Compute a Jacobian using central finite differences.
///
/// Column j perturbs x[j] by `epsilon * max(|x[j]|, 1)` in both directions.
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> AssemblyResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> AssemblyResult<DVector<f64>>,
{
    if !pf_core::finite_positive(epsilon) {
        return Err(AssemblyError::Numeric {
            what: format!("finite-difference step must be positive, got {epsilon}"),
        });
    }
    let n = x.len();
    let m = f(x)?.len();

    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let f_plus = f(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[j] -= dx;
        let f_minus = f(&x_minus)?;

        let df = (f_plus - f_minus) / (2.0 * dx);
        jac.set_column(j, &df);
    }

    Ok(jac)
}

/// Largest disagreement between two Jacobians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobianMismatch {
    pub row: usize,
    pub col: usize,
    /// `|a - b|` scaled by the largest magnitude in the column.
    pub relative_error: f64,
}

/// Compare two Jacobians column by column.
///
/// Each entry's difference is scaled by the largest magnitude found in its
/// column of either matrix, so entries that are zero in both compare equal.
pub fn compare_jacobians(
    analytic: &DMatrix<f64>,
    numeric: &DMatrix<f64>,
) -> AssemblyResult<JacobianMismatch> {
    if analytic.shape() != numeric.shape() {
        return Err(AssemblyError::DimensionMismatch {
            what: "jacobian entries",
            expected: analytic.len(),
            actual: numeric.len(),
        });
    }

    let mut worst = JacobianMismatch {
        row: 0,
        col: 0,
        relative_error: 0.0,
    };
    for col in 0..analytic.ncols() {
        let scale = analytic
            .column(col)
            .amax()
            .max(numeric.column(col).amax());
        if scale == 0.0 {
            continue;
        }
        for row in 0..analytic.nrows() {
            let err = (analytic[(row, col)] - numeric[(row, col)]).abs() / scale;
            if err > worst.relative_error {
                worst = JacobianMismatch {
                    row,
                    col,
                    relative_error: err,
                };
            }
        }
    }
    Ok(worst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_quadratic() {
        // f(x) = (x0^2, x0*x1), J = [[2x0, 0], [x1, x0]]
        let f = |x: &DVector<f64>| -> AssemblyResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] * x[0], x[0] * x[1]]))
        };
        let x = DVector::from_vec(vec![3.0, -2.0]);
        let jac = central_difference_jacobian(&x, f, 1e-6).unwrap();

        assert!((jac[(0, 0)] - 6.0).abs() < 1e-8);
        assert!(jac[(0, 1)].abs() < 1e-8);
        assert!((jac[(1, 0)] + 2.0).abs() < 1e-8);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-8);
    }

    #[test]
    fn bad_step_is_rejected() {
        let f = |x: &DVector<f64>| -> AssemblyResult<DVector<f64>> { Ok(x.clone()) };
        let x = DVector::from_element(1, 1.0);
        assert!(central_difference_jacobian(&x, f, 0.0).is_err());
    }

    #[test]
    fn comparison_reports_worst_entry() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 100.0]);
        let b = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 99.0]);
        let mismatch = compare_jacobians(&a, &b).unwrap();
        assert_eq!((mismatch.row, mismatch.col), (1, 1));
        assert!((mismatch.relative_error - 0.01).abs() < 1e-12);

        let c = DMatrix::zeros(3, 2);
        assert!(compare_jacobians(&a, &c).is_err());
    }
}
