//! Discrete Markov regime model.
//!
//! A hand-specified market model with `M` regimes and `N` assets: a
//! row-stochastic transition matrix between regimes, and for each regime a
//! mean excess-return vector and a return covariance matrix. Nothing is
//! estimated here; construction only validates the literal inputs.

use crate::linalg::{is_positive_semidefinite, is_symmetric};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance on transition row sums.
pub const STOCHASTIC_TOLERANCE: f64 = 1e-8;

/// Tolerance on covariance symmetry and smallest eigenvalue.
pub const COVARIANCE_TOLERANCE: f64 = 1e-10;

/// Regime model configuration errors
#[derive(Debug, Error)]
pub enum RegimeError {
    /// Declared and literal dimensions disagree
    #[error("Dimension mismatch for {name}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which input is malformed
        name: String,
        /// Declared dimension
        expected: usize,
        /// Observed dimension
        actual: usize,
    },

    /// Regime or asset count is zero
    #[error("Model needs at least one {0}")]
    Empty(&'static str),

    /// Transition row is not a probability distribution
    #[error("Transition row {row} is not a probability distribution: {reason}")]
    NotStochastic {
        /// Offending row
        row: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Covariance matrix is not symmetric positive-semidefinite
    #[error("Covariance matrix for regime {regime} is {reason}")]
    InvalidCovariance {
        /// Offending regime
        regime: usize,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Literal inputs of a [`RegimeModel`].
///
/// Matrices are nested row vectors so the configuration reads naturally
/// from TOML or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeModelConfig {
    /// Number of regimes (M)
    pub regimes: usize,
    /// Number of assets (N)
    pub assets: usize,
    /// M x M transition probabilities, `transition[i][j]` = P(i -> j)
    pub transition: Vec<Vec<f64>>,
    /// M x N per-period mean excess return in each regime
    pub mean_excess_return: Vec<Vec<f64>>,
    /// M matrices, each N x N, return covariance in each regime
    pub covariance: Vec<Vec<Vec<f64>>>,
    /// Per-period risk-free rate
    pub risk_free_rate: f64,
}

impl Default for RegimeModelConfig {
    /// Two-regime (bull/bear), four-asset quarterly calibration.
    fn default() -> Self {
        let scale = |m: [[f64; 4]; 4]| -> Vec<Vec<f64>> {
            m.iter()
                .map(|row| row.iter().map(|v| 0.01 * v).collect())
                .collect()
        };
        Self {
            regimes: 2,
            assets: 4,
            transition: vec![vec![0.7, 0.3], vec![0.4, 0.6]],
            mean_excess_return: vec![
                vec![0.167, 0.157, 0.057, 0.147],
                vec![-0.193, -0.063, -0.073, -0.113],
            ],
            covariance: vec![
                scale([
                    [3.06, 0.12, 0.15, 0.47],
                    [0.12, 3.19, 0.32, 0.27],
                    [0.15, 0.32, 1.30, 0.41],
                    [0.47, 0.27, 0.41, 2.22],
                ]),
                scale([
                    [4.88, 0.36, 1.16, 1.94],
                    [0.36, 3.69, 0.69, 0.64],
                    [1.16, 0.69, 2.57, 1.41],
                    [1.94, 0.64, 1.41, 5.80],
                ]),
            ],
            // Gross quarterly return on the risk-free asset.
            risk_free_rate: 1.003,
        }
    }
}

/// Validated, immutable regime model.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeModel {
    transition: Array2<f64>,
    mean_excess_return: Array2<f64>,
    covariance: Vec<Array2<f64>>,
    risk_free_rate: f64,
}

impl RegimeModel {
    /// Build and validate a regime model.
    ///
    /// # Errors
    /// Returns an error if any matrix disagrees with the declared regime or
    /// asset count, if a transition row is not a probability distribution,
    /// or if a covariance matrix is not symmetric positive-semidefinite.
    pub fn new(config: RegimeModelConfig) -> Result<Self, RegimeError> {
        let m = config.regimes;
        let n = config.assets;
        if m == 0 {
            return Err(RegimeError::Empty("regime"));
        }
        if n == 0 {
            return Err(RegimeError::Empty("asset"));
        }

        let transition = to_matrix(&config.transition, m, m, "transition")?;
        let mean_excess_return = to_matrix(&config.mean_excess_return, m, n, "mean_excess_return")?;
        if config.covariance.len() != m {
            return Err(mismatch("covariance", m, config.covariance.len()));
        }
        let covariance = config
            .covariance
            .iter()
            .enumerate()
            .map(|(i, rows)| to_matrix(rows, n, n, &format!("covariance[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        validate_transition(&transition)?;
        for (regime, cov) in covariance.iter().enumerate() {
            validate_covariance(regime, cov)?;
        }

        Ok(Self {
            transition,
            mean_excess_return,
            covariance,
            risk_free_rate: config.risk_free_rate,
        })
    }

    /// The documented two-regime calibration.
    pub fn default_calibration() -> Result<Self, RegimeError> {
        Self::new(RegimeModelConfig::default())
    }

    /// Number of regimes (M).
    pub fn regimes(&self) -> usize {
        self.transition.nrows()
    }

    /// Number of assets (N).
    pub fn assets(&self) -> usize {
        self.mean_excess_return.ncols()
    }

    /// M x M transition matrix.
    pub const fn transition(&self) -> &Array2<f64> {
        &self.transition
    }

    /// M x N mean excess returns.
    pub const fn mean_excess_return(&self) -> &Array2<f64> {
        &self.mean_excess_return
    }

    /// Per-regime covariance matrices.
    pub fn covariance(&self) -> &[Array2<f64>] {
        &self.covariance
    }

    /// Covariance matrix of one regime.
    pub fn covariance_for(&self, regime: usize) -> Option<&Array2<f64>> {
        self.covariance.get(regime)
    }

    /// Per-period risk-free rate.
    pub const fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Long-run probability of each regime.
    ///
    /// Power iteration from the uniform distribution; stops when successive
    /// iterates differ by less than `1e-14` in L1 norm or after 10 000 steps
    /// (a periodic chain never settles and returns the last iterate).
    pub fn stationary_distribution(&self) -> Array1<f64> {
        let m = self.regimes();
        let mut pi = Array1::from_elem(m, 1.0 / m as f64);
        for _ in 0..10_000 {
            let next = pi.dot(&self.transition);
            let delta: f64 = (&next - &pi).mapv(f64::abs).sum();
            pi = next;
            if delta < 1e-14 {
                break;
            }
        }
        pi
    }
}

fn mismatch(name: &str, expected: usize, actual: usize) -> RegimeError {
    RegimeError::DimensionMismatch {
        name: name.to_string(),
        expected,
        actual,
    }
}

/// Convert nested rows to a `rows x cols` matrix, rejecting ragged input.
fn to_matrix(
    data: &[Vec<f64>],
    rows: usize,
    cols: usize,
    name: &str,
) -> Result<Array2<f64>, RegimeError> {
    if data.len() != rows {
        return Err(mismatch(&format!("{name} rows"), rows, data.len()));
    }
    let mut matrix = Array2::<f64>::zeros((rows, cols));
    for (i, row) in data.iter().enumerate() {
        if row.len() != cols {
            return Err(mismatch(&format!("{name} row {i}"), cols, row.len()));
        }
        for (j, &v) in row.iter().enumerate() {
            matrix[[i, j]] = v;
        }
    }
    Ok(matrix)
}

fn validate_transition(transition: &Array2<f64>) -> Result<(), RegimeError> {
    for (row, probs) in transition.rows().into_iter().enumerate() {
        if let Some(p) = probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(RegimeError::NotStochastic {
                row,
                reason: format!("entry {p} outside [0, 1]"),
            });
        }
        let total = probs.sum();
        if (total - 1.0).abs() > STOCHASTIC_TOLERANCE {
            return Err(RegimeError::NotStochastic {
                row,
                reason: format!("sums to {total}"),
            });
        }
    }
    Ok(())
}

fn validate_covariance(regime: usize, cov: &Array2<f64>) -> Result<(), RegimeError> {
    if !is_symmetric(cov, COVARIANCE_TOLERANCE) {
        return Err(RegimeError::InvalidCovariance {
            regime,
            reason: "not symmetric",
        });
    }
    if !is_positive_semidefinite(cov, COVARIANCE_TOLERANCE) {
        return Err(RegimeError::InvalidCovariance {
            regime,
            reason: "not positive-semidefinite",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::symmetric_eigen;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[test]
    fn test_default_calibration() {
        let model = RegimeModel::default_calibration().unwrap();
        assert_eq!(model.regimes(), 2);
        assert_eq!(model.assets(), 4);
        assert_eq!(model.transition().dim(), (2, 2));
        assert_eq!(model.mean_excess_return().dim(), (2, 4));
        assert_eq!(model.covariance().len(), 2);
        assert_abs_diff_eq!(model.covariance()[1][[3, 3]], 0.058, epsilon = 1e-15);
        assert_eq!(model.risk_free_rate(), 1.003);
    }

    #[test]
    fn test_default_rows_sum_to_one_and_covariances_psd() {
        let model = RegimeModel::default_calibration().unwrap();
        for row in model.transition().rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
        for cov in model.covariance() {
            assert!(is_symmetric(cov, 0.0));
            let decomp = symmetric_eigen(cov).unwrap();
            assert!(decomp.min_eigenvalue() > 0.0);
        }
    }

    #[test]
    fn test_stationary_distribution() {
        // pi = pi P for [[0.7, 0.3], [0.4, 0.6]] gives (4/7, 3/7)
        let model = RegimeModel::default_calibration().unwrap();
        let pi = model.stationary_distribution();
        assert_abs_diff_eq!(pi[0], 4.0 / 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pi[1], 3.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_regime_single_asset() {
        let config = RegimeModelConfig {
            regimes: 1,
            assets: 1,
            transition: vec![vec![1.0]],
            mean_excess_return: vec![vec![0.02]],
            covariance: vec![vec![vec![0.04]]],
            risk_free_rate: 0.01,
        };
        let model = RegimeModel::new(config).unwrap();
        assert_eq!(model.covariance_for(0).unwrap()[[0, 0]], 0.04);
        assert!(model.covariance_for(1).is_none());
    }

    #[test]
    fn test_regime_count_mismatch() {
        let config = RegimeModelConfig {
            regimes: 3,
            ..Default::default()
        };
        let err = RegimeModel::new(config).unwrap_err();
        assert!(matches!(
            err,
            RegimeError::DimensionMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_asset_count_mismatch() {
        let config = RegimeModelConfig {
            assets: 5,
            ..Default::default()
        };
        assert!(matches!(
            RegimeModel::new(config),
            Err(RegimeError::DimensionMismatch {
                expected: 5,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_covariance_matrix() {
        let mut config = RegimeModelConfig::default();
        config.covariance.pop();
        assert!(matches!(
            RegimeModel::new(config),
            Err(RegimeError::DimensionMismatch { ref name, .. }) if name == "covariance"
        ));
    }

    #[test]
    fn test_ragged_mean_row_rejected() {
        let mut config = RegimeModelConfig::default();
        config.mean_excess_return[1].push(0.0);
        assert!(RegimeModel::new(config).is_err());
    }

    #[rstest]
    #[case(vec![vec![0.7, 0.2], vec![0.4, 0.6]])]
    #[case(vec![vec![1.2, -0.2], vec![0.4, 0.6]])]
    #[case(vec![vec![0.7, 0.3], vec![0.5, 0.6]])]
    fn test_non_stochastic_transition(#[case] transition: Vec<Vec<f64>>) {
        let config = RegimeModelConfig {
            transition,
            ..Default::default()
        };
        assert!(matches!(
            RegimeModel::new(config),
            Err(RegimeError::NotStochastic { .. })
        ));
    }

    #[test]
    fn test_asymmetric_covariance_rejected() {
        let mut config = RegimeModelConfig::default();
        config.covariance[0][0][1] = 0.5;
        assert!(matches!(
            RegimeModel::new(config),
            Err(RegimeError::InvalidCovariance {
                regime: 0,
                reason: "not symmetric"
            })
        ));
    }

    #[test]
    fn test_indefinite_covariance_rejected() {
        let config = RegimeModelConfig {
            regimes: 1,
            assets: 2,
            transition: vec![vec![1.0]],
            mean_excess_return: vec![vec![0.0, 0.0]],
            covariance: vec![vec![vec![1.0, 2.0], vec![2.0, 1.0]]],
            risk_free_rate: 0.0,
        };
        assert!(matches!(
            RegimeModel::new(config),
            Err(RegimeError::InvalidCovariance {
                regime: 0,
                reason: "not positive-semidefinite"
            })
        ));
    }

    #[rstest]
    #[case(0, 4)]
    #[case(2, 0)]
    fn test_empty_dimensions(#[case] regimes: usize, #[case] assets: usize) {
        let config = RegimeModelConfig {
            regimes,
            assets,
            ..Default::default()
        };
        assert!(matches!(RegimeModel::new(config), Err(RegimeError::Empty(_))));
    }

    #[test]
    fn test_config_from_toml() {
        let config: RegimeModelConfig = toml::from_str(
            r#"
            regimes = 1
            assets = 2
            transition = [[1.0]]
            mean_excess_return = [[0.01, 0.02]]
            covariance = [[[0.04, 0.01], [0.01, 0.09]]]
            risk_free_rate = 0.005
            "#,
        )
        .unwrap();
        let model = RegimeModel::new(config).unwrap();
        assert_eq!(model.assets(), 2);
        assert_eq!(model.risk_free_rate(), 0.005);
    }
}
