//! 99 %-confidence trial-count estimator for probabilistic drops.
//!
//! The per-action yield spread is approximated by a fitted standard deviation
//! `sigma(mu)`. Solving `n·mu − z·sigma·√n − target = 0` for `√n` gives the
//! smallest action count whose lower confidence bound still covers `target`.

use serde::{Deserialize, Serialize};

use crate::Constants;

/// One-sided 99th percentile of the standard normal distribution.
pub const Z_99: f64 = 2.326;

/// Fitted standard deviation of the yield per action as a function of the
/// mean yield `mu`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum YieldFit {
    /// `sigma = coefficient · mu^exponent`
    PowerLaw { coefficient: f64, exponent: f64 },
    /// `sigma = coefficient · mu`
    Linear { coefficient: f64 },
}

impl YieldFit {
    pub const fn power_law() -> Self {
        Self::PowerLaw {
            coefficient: 0.2912,
            exponent: 1.032,
        }
    }

    pub const fn linear() -> Self {
        Self::Linear { coefficient: 0.3 }
    }

    pub fn sigma(self, mu: f64) -> f64 {
        match self {
            Self::PowerLaw {
                coefficient,
                exponent,
            } => coefficient * mu.powf(exponent),
            Self::Linear { coefficient } => coefficient * mu,
        }
    }
}

impl Default for YieldFit {
    fn default() -> Self {
        Self::power_law()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialEstimator {
    pub fit: YieldFit,
    pub z: f64,
}

impl Default for TrialEstimator {
    fn default() -> Self {
        Self::new(YieldFit::default(), Z_99)
    }
}

impl TrialEstimator {
    pub fn new(fit: YieldFit, z: f64) -> Self {
        Self { fit, z }
    }

    pub fn from_constants(constants: &Constants) -> Self {
        Self::new(constants.trial_fit, constants.trial_z_score)
    }

    /// Number of actions needed so that, with the configured confidence, at
    /// least `target` items drop when each action yields `mu` on average.
    ///
    /// Returns `None` when `mu` is not a positive finite number. A non-positive
    /// target needs no actions.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn estimate(&self, mu: f64, target: f64) -> Option<u64> {
        if !mu.is_finite() || mu <= 0.0 || !target.is_finite() {
            return None;
        }
        if target <= 0.0 {
            return Some(0);
        }
        let spread = self.z * self.fit.sigma(mu);
        let root = (spread + (spread * spread + 4.0 * mu * target).sqrt()) / (2.0 * mu);
        Some((root * root).ceil() as u64)
    }
}

/// Default power-law fit at 99 % confidence. Invalid `mean_yield` gives 0.
pub fn estimate_trials_for_confidence(mean_yield: f64, target_amount: f64) -> u64 {
    TrialEstimator::default()
        .estimate(mean_yield, target_amount)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_mean_unit_target_needs_two_actions() {
        // sigma = 0.2912, sqrt(n) = (0.677 + sqrt(0.459 + 4)) / 2 ≈ 1.394
        assert_eq!(estimate_trials_for_confidence(1.0, 1.0), 2);
    }

    #[test]
    fn estimate_exceeds_plain_division() {
        let estimator = TrialEstimator::default();
        let n = estimator.estimate(2.5, 1000.0).unwrap();
        assert!(n >= 400);
        assert!(n < 450, "n = {n}");
    }

    #[test]
    fn linear_fit_is_wider_than_power_law_for_small_mu() {
        let power = TrialEstimator::new(YieldFit::power_law(), Z_99);
        let linear = TrialEstimator::new(YieldFit::linear(), Z_99);
        let a = power.estimate(1.0, 50.0).unwrap();
        let b = linear.estimate(1.0, 50.0).unwrap();
        assert!(b >= a);
    }

    #[test]
    fn invalid_mean_has_no_estimate() {
        let estimator = TrialEstimator::default();
        assert_eq!(estimator.estimate(0.0, 10.0), None);
        assert_eq!(estimator.estimate(-1.0, 10.0), None);
        assert_eq!(estimator.estimate(f64::NAN, 10.0), None);
        assert_eq!(estimate_trials_for_confidence(0.0, 10.0), 0);
    }

    #[test]
    fn zero_target_needs_no_actions() {
        assert_eq!(TrialEstimator::default().estimate(1.5, 0.0), Some(0));
    }

    #[test]
    fn estimate_is_reproducible() {
        let estimator = TrialEstimator::default();
        let first = estimator.estimate(3.7, 123.4);
        for _ in 0..10 {
            assert_eq!(estimator.estimate(3.7, 123.4), first);
        }
    }

    #[test]
    fn fit_round_trips_through_json() {
        let json = serde_json::to_string(&YieldFit::linear()).unwrap();
        assert_eq!(json, r#"{"kind":"linear","coefficient":0.3}"#);
        let back: YieldFit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, YieldFit::linear());
    }
}
