//! First-order vector autoregression of the factor state.
//!
//! s_{t+1} = C * s_t + e_t
//!
//! C is estimated by least squares through the origin, one regression per
//! state dimension on the shared lagged state. The model is reported in
//! mean-reversion form, Phi = I - C, so that
//! s_{t+1} - s_t = -Phi * s_t + e_t.

use super::{CalibrationError, MIN_OBSERVATIONS};
use crate::covariance::sample_covariance;
use crate::regression::{Intercept, LinearRegression};
use ndarray::{Array2, s};

/// Fitted VAR(1).
#[derive(Debug, Clone)]
pub struct VarFit {
    /// Mean-reversion matrix I - C (M x M)
    pub phi: Array2<f64>,
    /// Regression coefficients C (M x M), row i = equation for state i
    pub coefficients: Array2<f64>,
    /// Residual covariance (M x M)
    pub sigma_state: Array2<f64>,
    /// Residuals, (T - 1) x M
    pub residuals: Array2<f64>,
    /// Numerical rank of the lagged states
    pub rank: usize,
}

/// Fit a VAR(1) to a T x M panel of states.
///
/// # Errors
/// Fails with [`CalibrationError::InsufficientData`] when fewer than
/// [`MIN_OBSERVATIONS`] rows are supplied, or with the regression's error.
pub fn fit_var1<L>(states: &Array2<f64>, regression: &L) -> Result<VarFit, CalibrationError>
where
    L: LinearRegression + ?Sized,
{
    let (n_obs, n_states) = states.dim();
    if n_obs < MIN_OBSERVATIONS {
        return Err(CalibrationError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: n_obs,
        });
    }

    let lagged = states.slice(s![..-1, ..]).to_owned();
    let next = states.slice(s![1.., ..]).to_owned();
    let fit = regression.fit(&lagged, &next, Intercept::Excluded)?;

    let phi = Array2::<f64>::eye(n_states) - &fit.coefficients;
    let sigma_state = sample_covariance(&fit.residuals)?;
    tracing::debug!(
        states = n_states,
        observations = n_obs,
        rank = fit.rank,
        "fitted VAR(1)"
    );

    Ok(VarFit {
        phi,
        coefficients: fit.coefficients,
        sigma_state,
        residuals: fit.residuals,
        rank: fit.rank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::OrdinaryLeastSquares;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, array};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Simulate s_{t+1} = (I - phi) s_t + noise from `start`.
    fn simulate(phi: &Array2<f64>, start: Array1<f64>, len: usize, noise: f64) -> Array2<f64> {
        let m = start.len();
        let transition = Array2::<f64>::eye(m) - phi;
        let mut rng = StdRng::seed_from_u64(7);
        let mut states = Array2::<f64>::zeros((len, m));
        states.row_mut(0).assign(&start);
        for t in 1..len {
            let shock: Array1<f64> = (0..m).map(|_| noise * rng.gen_range(-1.0..1.0)).collect();
            let next = transition.dot(&states.row(t - 1)) + shock;
            states.row_mut(t).assign(&next);
        }
        states
    }

    fn rotating_phi() -> Array2<f64> {
        // C = [[0.9, -0.2], [0.2, 0.9]]: a slowly decaying spiral
        array![[0.1, 0.2], [-0.2, 0.1]]
    }

    #[test]
    fn test_exact_recovery_without_noise() {
        let phi = rotating_phi();
        let states = simulate(&phi, array![1.0, 0.5], 50, 0.0);
        let fit = fit_var1(&states, &OrdinaryLeastSquares::new()).unwrap();

        assert_eq!(fit.rank, 2);
        assert_abs_diff_eq!(fit.phi, phi, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.sigma_state, Array2::<f64>::zeros((2, 2)), epsilon = 1e-12);
        assert_eq!(fit.residuals.dim(), (49, 2));
    }

    #[test]
    fn test_recovery_improves_as_noise_shrinks() {
        let phi = rotating_phi();
        let errors: Vec<f64> = [1e-2, 1e-4, 1e-6]
            .iter()
            .map(|&noise| {
                let states = simulate(&phi, array![1.0, 0.5], 200, noise);
                let fit = fit_var1(&states, &OrdinaryLeastSquares::new()).unwrap();
                (&fit.phi - &phi).mapv(f64::abs).sum()
            })
            .collect();

        assert!(errors[1] < errors[0]);
        assert!(errors[2] < errors[1]);
        assert!(errors[2] < 1e-3);
    }

    #[test]
    fn test_noise_covariance_matches_shock_scale() {
        // Uniform(-a, a) has variance a^2 / 3.
        let phi = array![[0.5, 0.0], [0.0, 0.3]];
        let states = simulate(&phi, array![0.0, 0.0], 2000, 0.03);
        let fit = fit_var1(&states, &OrdinaryLeastSquares::new()).unwrap();

        let expected = 0.03_f64.powi(2) / 3.0;
        assert_abs_diff_eq!(fit.sigma_state[[0, 0]], expected, epsilon = expected * 0.15);
        assert_abs_diff_eq!(fit.sigma_state[[1, 1]], expected, epsilon = expected * 0.15);
        assert_abs_diff_eq!(fit.sigma_state[[0, 1]], 0.0, epsilon = expected * 0.15);
    }

    #[test]
    fn test_collinear_states_use_minimum_norm() {
        // Second factor is always twice the first and x_{t+1} = 0.5 x_t,
        // so only c1 + 2 c2 is identified in each equation.
        let x: Vec<f64> = (0..10).map(|t| 0.5_f64.powi(t)).collect();
        let states = Array2::from_shape_fn((10, 2), |(t, j)| x[t] * (j + 1) as f64);
        let fit = fit_var1(&states, &OrdinaryLeastSquares::new()).unwrap();

        assert_eq!(fit.rank, 1);
        assert_abs_diff_eq!(fit.coefficients, array![[0.1, 0.2], [0.2, 0.4]], epsilon = 1e-10);
        assert_abs_diff_eq!(fit.phi, array![[0.9, -0.2], [-0.2, 0.6]], epsilon = 1e-10);
    }

    #[test]
    fn test_too_few_observations() {
        let states = array![[0.01, 0.02], [0.03, 0.04]];
        assert!(matches!(
            fit_var1(&states, &OrdinaryLeastSquares::new()),
            Err(CalibrationError::InsufficientData {
                required: 3,
                actual: 2
            })
        ));
    }
}
