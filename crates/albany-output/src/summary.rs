//! Parameter summaries.
//!
//! Plain-data snapshots of the two parameter sources, suitable for printing
//! or handing to another process as JSON.

use crate::matrix::LabeledMatrix;
use crate::report::Report;
use albany_model::{FactorCalibrator, RegimeModel};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn numbered(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i}")).collect()
}

fn rule(output: &mut String, ch: &str) {
    output.push_str(&ch.repeat(72));
    output.push('\n');
}

/// Snapshot of a [`RegimeModel`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegimeSummary {
    /// Number of regimes (M).
    pub regimes: usize,

    /// Number of assets (N).
    pub assets: usize,

    /// Regime transition probabilities.
    pub transition: LabeledMatrix,

    /// Mean excess return by regime.
    pub mean_excess_return: LabeledMatrix,

    /// Return covariance, one matrix per regime.
    pub covariance: Vec<LabeledMatrix>,

    /// Long-run regime probabilities.
    pub stationary_distribution: Vec<f64>,

    /// Risk-free rate.
    pub risk_free_rate: f64,
}

impl RegimeSummary {
    /// Summarise a regime model. Regimes and assets are labelled by index.
    pub fn from_model(model: &RegimeModel) -> Self {
        let regimes = numbered("regime ", model.regimes());
        let assets = numbered("asset ", model.assets());
        Self {
            regimes: model.regimes(),
            assets: model.assets(),
            transition: LabeledMatrix::from_array(
                regimes.clone(),
                regimes.clone(),
                model.transition(),
            ),
            mean_excess_return: LabeledMatrix::from_array(
                regimes,
                assets.clone(),
                model.mean_excess_return(),
            ),
            covariance: model
                .covariance()
                .iter()
                .map(|cov| LabeledMatrix::from_array(assets.clone(), assets.clone(), cov))
                .collect(),
            stationary_distribution: model.stationary_distribution().to_vec(),
            risk_free_rate: model.risk_free_rate(),
        }
    }
}

impl Report for RegimeSummary {
    fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str("\nRegime Model\n");
        rule(&mut output, "=");
        output.push_str(&format!("  Regimes (M):              {}\n", self.regimes));
        output.push_str(&format!("  Assets (N):               {}\n", self.assets));
        output.push_str(&format!("  Risk-free rate:           {}\n", self.risk_free_rate));
        let stationary: Vec<String> = self
            .stationary_distribution
            .iter()
            .map(|p| format!("{p:.4}"))
            .collect();
        output.push_str(&format!(
            "  Stationary distribution:  [{}]\n\n",
            stationary.join(", ")
        ));

        output.push_str(&self.transition.to_ascii_table("Transition probabilities"));
        output.push('\n');
        output.push_str(&self.mean_excess_return.to_ascii_table("Mean excess return"));
        for (i, cov) in self.covariance.iter().enumerate() {
            output.push('\n');
            output.push_str(&cov.to_ascii_table(&format!("Covariance, regime {i}")));
        }
        output
    }
}

/// Snapshot of a calibrated [`FactorCalibrator`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationSummary {
    /// Number of factors (M).
    pub factors: usize,

    /// Number of assets (N).
    pub assets: usize,

    /// First date used.
    pub first_date: Option<NaiveDate>,

    /// Last date used.
    pub last_date: Option<NaiveDate>,

    /// Aligned observations used.
    pub observations: usize,

    /// Rows discarded because only one table had them.
    pub dropped_rows: usize,

    /// Whether a regression fell back to the minimum-norm solution.
    pub rank_deficient: bool,

    /// Return intercepts.
    pub alpha: LabeledMatrix,

    /// Factor loadings B.
    pub loadings: LabeledMatrix,

    /// Mean-reversion matrix Phi.
    pub phi: LabeledMatrix,

    /// Return residual covariance.
    pub sigma_return: LabeledMatrix,

    /// State residual covariance.
    pub sigma_state: LabeledMatrix,

    /// Mean risk-free rate.
    pub risk_free_rate: f64,
}

impl CalibrationSummary {
    /// Summarise a calibration, labelling rows and columns by factor and asset name.
    pub fn from_calibrator(calibrator: &FactorCalibrator) -> Self {
        let factors = calibrator.factors().to_vec();
        let assets = calibrator.assets().to_vec();
        let diagnostics = calibrator.diagnostics();
        Self {
            factors: calibrator.factor_count(),
            assets: calibrator.asset_count(),
            first_date: calibrator.dates().first().copied(),
            last_date: calibrator.dates().last().copied(),
            observations: diagnostics.observations,
            dropped_rows: diagnostics.dropped_rows,
            rank_deficient: diagnostics.is_rank_deficient(calibrator.factor_count()),
            alpha: LabeledMatrix::from_column(assets.clone(), "alpha", calibrator.alpha()),
            loadings: LabeledMatrix::from_array(
                assets.clone(),
                factors.clone(),
                calibrator.loadings(),
            ),
            phi: LabeledMatrix::from_array(factors.clone(), factors.clone(), calibrator.phi()),
            sigma_return: LabeledMatrix::from_array(
                assets.clone(),
                assets,
                calibrator.sigma_return(),
            ),
            sigma_state: LabeledMatrix::from_array(
                factors.clone(),
                factors,
                calibrator.sigma_state(),
            ),
            risk_free_rate: calibrator.risk_free_rate(),
        }
    }
}

impl Report for CalibrationSummary {
    fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str("\nFactor Model Calibration\n");
        rule(&mut output, "=");
        output.push_str(&format!("  Factors (M):              {}\n", self.factors));
        output.push_str(&format!("  Assets (N):               {}\n", self.assets));
        if let (Some(first), Some(last)) = (self.first_date, self.last_date) {
            output.push_str(&format!("  Sample:                   {first} to {last}\n"));
        }
        output.push_str(&format!(
            "  Observations:             {} ({} unmatched rows dropped)\n",
            self.observations, self.dropped_rows
        ));
        output.push_str(&format!(
            "  Risk-free rate:           {:.6}\n",
            self.risk_free_rate
        ));
        if self.rank_deficient {
            output.push_str("  Warning: rank-deficient regressors, minimum-norm solution used\n");
        }
        rule(&mut output, "-");

        for (title, matrix) in [
            ("Alpha (return intercepts)", &self.alpha),
            ("B (factor loadings)", &self.loadings),
            ("Phi (mean reversion)", &self.phi),
            ("Sigma_return (return residual covariance)", &self.sigma_return),
            ("Sigma_state (state residual covariance)", &self.sigma_state),
        ] {
            output.push('\n');
            output.push_str(&matrix.to_ascii_table(title));
        }
        output
    }
}
