//! Dense linear algebra.
//!
//! A Jacobi eigensolver for the small symmetric matrices the regime model
//! validates, and a one-sided Jacobi SVD that solves least-squares problems
//! on the design matrix itself. Working on `X` rather than `X^T X` keeps the
//! condition number unsquared, so badly scaled but independent regressors
//! are still resolved.

use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

/// Sweep budget for the one-sided Jacobi SVD.
const MAX_SVD_SWEEPS: usize = 60;

/// Errors from the linear algebra helpers
#[derive(Debug, Error)]
pub enum LinalgError {
    /// Matrix is not square
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Row count
        rows: usize,
        /// Column count
        cols: usize,
    },

    /// Jacobi sweeps did not reduce the off-diagonal mass below tolerance
    #[error("Jacobi iteration did not converge after {iterations} steps")]
    NoConvergence {
        /// Rotations or sweeps performed
        iterations: usize,
    },

    /// Right-hand side has a different row count than the design
    #[error("Right-hand side has {actual} rows, design has {expected}")]
    RowMismatch {
        /// Design rows
        expected: usize,
        /// Right-hand side rows
        actual: usize,
    },
}

/// Result of eigenvalue decomposition
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues (sorted in descending order)
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors (columns are eigenvectors)
    pub eigenvectors: Array2<f64>,
}

impl EigenDecomposition {
    /// Smallest eigenvalue, or `0.0` for an empty matrix.
    pub fn min_eigenvalue(&self) -> f64 {
        self.eigenvalues.last().copied().unwrap_or(0.0)
    }
}

/// Thin singular value decomposition `A = U * diag(sigma) * V^T`.
///
/// Singular values are left in column order, not sorted. Columns of `u`
/// belonging to a zero singular value are zero.
#[derive(Debug, Clone)]
pub struct Svd {
    /// Left singular vectors, rows x cols
    pub u: Array2<f64>,
    /// Singular values, one per column of the input
    pub singular_values: Array1<f64>,
    /// Right singular vectors, cols x cols
    pub v: Array2<f64>,
}

/// Minimum-norm least-squares solution of `A X = B`.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    /// Solution, cols(A) x cols(B)
    pub solution: Array2<f64>,
    /// Singular values of `A` above the cutoff
    pub rank: usize,
}

/// Jacobi eigenvalue decomposition for symmetric matrices
///
/// Repeatedly annihilates the largest off-diagonal element until every
/// off-diagonal entry is below `tolerance` times the Frobenius norm of the
/// input. Only the upper triangle needs to be meaningful; the input is
/// symmetrised first.
///
/// # Arguments
/// * `matrix` - Symmetric matrix to decompose
/// * `max_iterations` - Maximum number of rotations
/// * `tolerance` - Relative convergence tolerance for off-diagonal elements
pub fn jacobi_eigendecomp(
    matrix: &Array2<f64>,
    max_iterations: usize,
    tolerance: f64,
) -> Result<EigenDecomposition, LinalgError> {
    let (n, cols) = matrix.dim();
    if n != cols {
        return Err(LinalgError::NotSquare { rows: n, cols });
    }

    let mut a = (matrix + &matrix.t()) / 2.0;
    let mut v = Array2::<f64>::eye(n);
    let scale = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let threshold = tolerance * scale.max(f64::MIN_POSITIVE);

    for _ in 0..max_iterations {
        let (p, q, apq) = largest_off_diagonal(&a);
        if apq.abs() <= threshold {
            break;
        }
        let (cos, sin) = rotation(a[[p, p]], a[[q, q]], apq);
        rotate(&mut a, &mut v, p, q, cos, sin);
    }
    if largest_off_diagonal(&a).2.abs() > threshold {
        return Err(LinalgError::NoConvergence {
            iterations: max_iterations,
        });
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let eigenvalues = order.iter().map(|&i| a[[i, i]]).collect();
    let mut eigenvectors = Array2::<f64>::zeros((n, n));
    for (to, &from) in order.iter().enumerate() {
        eigenvectors.column_mut(to).assign(&v.column(from));
    }

    Ok(EigenDecomposition {
        eigenvalues,
        eigenvectors,
    })
}

/// [`jacobi_eigendecomp`] with an iteration budget and tolerance suited to
/// the small matrices used here.
pub fn symmetric_eigen(matrix: &Array2<f64>) -> Result<EigenDecomposition, LinalgError> {
    let n = matrix.nrows().max(1);
    jacobi_eigendecomp(matrix, 100 * n * n, 1e-14)
}

/// One-sided (Hestenes) Jacobi SVD.
///
/// Pairs of columns are rotated until every pair is orthogonal to within
/// `rows * EPSILON` of the product of their norms.
pub fn svd(matrix: &Array2<f64>) -> Result<Svd, LinalgError> {
    let (rows, cols) = matrix.dim();
    let mut u = matrix.to_owned();
    let mut v = Array2::<f64>::eye(cols);
    let tolerance = f64::EPSILON * rows.max(1) as f64;

    let mut converged = false;
    for _ in 0..MAX_SVD_SWEEPS {
        let mut rotated = false;
        for p in 0..cols {
            for q in (p + 1)..cols {
                let alpha = u.column(p).dot(&u.column(p));
                let beta = u.column(q).dot(&u.column(q));
                let gamma = u.column(p).dot(&u.column(q));
                if gamma == 0.0 || gamma.abs() <= tolerance * (alpha * beta).sqrt() {
                    continue;
                }

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                if t == 0.0 {
                    continue;
                }
                let cos = 1.0 / (1.0 + t * t).sqrt();
                let sin = cos * t;
                rotate_columns(&mut u, p, q, cos, sin);
                rotate_columns(&mut v, p, q, cos, sin);
                rotated = true;
            }
        }
        if !rotated {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(LinalgError::NoConvergence {
            iterations: MAX_SVD_SWEEPS,
        });
    }

    let singular_values = u.map_axis(Axis(0), |col| col.dot(&col).sqrt());
    for (mut col, &sigma) in u.columns_mut().into_iter().zip(&singular_values) {
        if sigma > 0.0 {
            col /= sigma;
        }
    }

    Ok(Svd {
        u,
        singular_values,
        v,
    })
}

/// Minimum-norm solution of `min ||A X - B||` for every column of `B`.
///
/// Singular values at or below `EPSILON * max(rows, cols) * sigma_max` are
/// treated as zero.
pub fn least_squares(a: &Array2<f64>, b: &Array2<f64>) -> Result<LeastSquares, LinalgError> {
    let (rows, cols) = a.dim();
    if b.nrows() != rows {
        return Err(LinalgError::RowMismatch {
            expected: rows,
            actual: b.nrows(),
        });
    }

    let decomp = svd(a)?;
    let sigma_max = decomp.singular_values.fold(0.0_f64, |m, &x| m.max(x));
    let cutoff = f64::EPSILON * rows.max(cols) as f64 * sigma_max;

    let mut solution = Array2::<f64>::zeros((cols, b.ncols()));
    let mut rank = 0;
    for (j, &sigma) in decomp.singular_values.iter().enumerate() {
        if sigma <= cutoff || sigma == 0.0 {
            continue;
        }
        rank += 1;
        // v_j (u_j^T B) / sigma_j
        let projected = decomp.u.column(j).dot(b) / sigma;
        let v_j = decomp.v.column(j).insert_axis(Axis(1));
        solution += &v_j.dot(&projected.insert_axis(Axis(0)));
    }

    Ok(LeastSquares { solution, rank })
}

/// Whether `matrix` is square and equal to its transpose within `tolerance`.
pub fn is_symmetric(matrix: &Array2<f64>, tolerance: f64) -> bool {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return false;
    }
    (0..rows).all(|i| ((i + 1)..cols).all(|j| (matrix[[i, j]] - matrix[[j, i]]).abs() <= tolerance))
}

/// Whether a symmetric matrix has no eigenvalue below `-tolerance`.
pub fn is_positive_semidefinite(matrix: &Array2<f64>, tolerance: f64) -> bool {
    if !is_symmetric(matrix, tolerance.max(1e-12)) {
        return false;
    }
    if matrix.diag().iter().any(|&d| d < -tolerance) {
        return false;
    }
    symmetric_eigen(matrix).is_ok_and(|decomp| decomp.min_eigenvalue() >= -tolerance)
}

/// Find the largest off-diagonal element in a symmetric matrix
fn largest_off_diagonal(a: &Array2<f64>) -> (usize, usize, f64) {
    let n = a.nrows();
    let mut found = (0, 0, 0.0_f64);
    for i in 0..n {
        for j in (i + 1)..n {
            if a[[i, j]].abs() > found.2.abs() {
                found = (i, j, a[[i, j]]);
            }
        }
    }
    found
}

/// (cos, sin) of the rotation zeroing `a[p][q]`
fn rotation(app: f64, aqq: f64, apq: f64) -> (f64, f64) {
    let tau = (aqq - app) / (2.0 * apq);
    let t = if tau >= 0.0 {
        1.0 / (tau + (1.0 + tau * tau).sqrt())
    } else {
        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
    };
    let cos = 1.0 / (1.0 + t * t).sqrt();
    (cos, t * cos)
}

fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize, cos: f64, sin: f64) {
    let n = a.nrows();
    let (app, aqq, apq) = (a[[p, p]], a[[q, q]], a[[p, q]]);

    a[[p, p]] = cos * cos * app - 2.0 * cos * sin * apq + sin * sin * aqq;
    a[[q, q]] = sin * sin * app + 2.0 * cos * sin * apq + cos * cos * aqq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    for i in (0..n).filter(|&i| i != p && i != q) {
        let (aip, aiq) = (a[[i, p]], a[[i, q]]);
        a[[i, p]] = cos * aip - sin * aiq;
        a[[p, i]] = a[[i, p]];
        a[[i, q]] = sin * aip + cos * aiq;
        a[[q, i]] = a[[i, q]];
    }

    for i in 0..n {
        let (vip, viq) = (v[[i, p]], v[[i, q]]);
        v[[i, p]] = cos * vip - sin * viq;
        v[[i, q]] = sin * vip + cos * viq;
    }
}

fn rotate_columns(m: &mut Array2<f64>, p: usize, q: usize, cos: f64, sin: f64) {
    for i in 0..m.nrows() {
        let (mp, mq) = (m[[i, p]], m[[i, q]]);
        m[[i, p]] = cos * mp - sin * mq;
        m[[i, q]] = sin * mp + cos * mq;
    }
}
