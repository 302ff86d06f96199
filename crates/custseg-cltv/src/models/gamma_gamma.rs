//! Gamma-Gamma spend model
//!
//! Order values of a customer are Gamma(p, ν) with ν ~ Gamma(q, v) across
//! customers, independent of purchase frequency. For x orders averaging m:
//!
//! ```text
//! ll = lnΓ(px + q) - lnΓ(px) - lnΓ(q) + q ln v + (px - 1) ln m
//!      + px ln x - (px + q) ln(xm + v)
//! ```
//!
//! The conditional expected order value shrinks the customer's own average
//! toward the population mean `vp / (q - 1)`, which only exists for q > 1.

use super::{FitConfig, INITIAL_LOG_PARAM, PurchaseModel, SpendModel, check_inputs};
use crate::error::{CltvError, Result};
use crate::optimize::NelderMead;
use crate::special::ln_gamma;
use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const MIN_CUSTOMERS: usize = 2;

/// Weeks per month used by the default discounting schedule.
pub const DEFAULT_WEEKS_PER_PERIOD: f64 = 4.345;

/// Fitted Gamma-Gamma parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaGammaParams {
    /// Shape of the per-order value distribution
    pub p: f64,
    /// Shape of the customer-level rate distribution
    pub q: f64,
    /// Scale of the customer-level rate distribution
    pub v: f64,
}

impl GammaGammaParams {
    fn from_log(log_params: &Array1<f64>) -> Self {
        Self {
            p: log_params[0].exp(),
            q: log_params[1].exp(),
            v: log_params[2].exp(),
        }
    }

    fn sum_of_squares(&self) -> f64 {
        self.p.powi(2) + self.q.powi(2) + self.v.powi(2)
    }
}

/// Log-likelihood of one customer's average order value.
pub fn log_likelihood(params: &GammaGammaParams, frequency: f64, monetary_avg: f64) -> f64 {
    let GammaGammaParams { p, q, v } = *params;
    let (x, m) = (frequency, monetary_avg);
    let px = p * x;

    ln_gamma(px + q) - ln_gamma(px) - ln_gamma(q) + q * v.ln() + (px - 1.0) * m.ln()
        + px * x.ln()
        - (px + q) * (x * m + v).ln()
}

/// Mean negative log-likelihood plus the L2 penalty.
pub fn negative_log_likelihood(
    params: &GammaGammaParams,
    frequency: &Array1<f64>,
    monetary_avg: &Array1<f64>,
    penalizer: f64,
) -> f64 {
    let total = Zip::from(frequency)
        .and(monetary_avg)
        .fold(0.0, |acc, &x, &m| acc + log_likelihood(params, x, m));

    -total / frequency.len() as f64 + penalizer * params.sum_of_squares()
}

/// Fits the Gamma-Gamma model
#[derive(Debug, Clone, Default)]
pub struct GammaGammaFitter {
    config: FitConfig,
}

impl GammaGammaFitter {
    /// Create a fitter.
    pub const fn new(config: FitConfig) -> Self {
        Self { config }
    }

    /// Fit on order counts and average order values.
    pub fn fit(&self, frequency: &Array1<f64>, monetary_avg: &Array1<f64>) -> Result<GammaGammaModel> {
        let n = frequency.len();
        if n < MIN_CUSTOMERS {
            return Err(CltvError::InsufficientCustomers {
                required: MIN_CUSTOMERS,
                actual: n,
            });
        }
        check_inputs(n, &[("frequency", frequency), ("monetary_avg", monetary_avg)])?;
        if frequency.iter().any(|&x| x <= 0.0) {
            return Err(CltvError::InvalidParameter(
                "Gamma-Gamma needs at least one order per customer".to_string(),
            ));
        }
        if let Some(row) = monetary_avg.iter().position(|&m| m <= 0.0) {
            return Err(CltvError::NonPositiveMonetary {
                customer_id: format!("row {row}"),
                value: monetary_avg[row],
            });
        }

        let penalizer = self.config.penalizer;
        let objective = |log_params: &Array1<f64>| {
            let params = GammaGammaParams::from_log(log_params);
            negative_log_likelihood(&params, frequency, monetary_avg, penalizer)
        };

        let minimum = NelderMead::new(self.config.optimizer)
            .minimize(objective, &Array1::from_elem(3, INITIAL_LOG_PARAM));
        if !minimum.converged {
            warn!(
                iterations = minimum.iterations,
                value = minimum.value,
                "Gamma-Gamma fit did not converge, using best simplex vertex"
            );
        }

        let params = GammaGammaParams::from_log(&minimum.point);
        debug!(
            p = params.p,
            q = params.q,
            v = params.v,
            objective = minimum.value,
            iterations = minimum.iterations,
            "fitted Gamma-Gamma model"
        );

        GammaGammaModel::new(params, minimum.value)
    }
}

/// Fitted Gamma-Gamma model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaGammaModel {
    params: GammaGammaParams,
    objective: f64,
}

impl GammaGammaModel {
    fn new(params: GammaGammaParams, objective: f64) -> Result<Self> {
        let finite = params.p.is_finite() && params.q.is_finite() && params.v.is_finite();
        if !finite {
            return Err(CltvError::DegenerateModel {
                model: "Gamma-Gamma",
                reason: format!("non-finite parameters {params:?}"),
            });
        }
        if params.q <= 1.0 {
            return Err(CltvError::DegenerateModel {
                model: "Gamma-Gamma",
                reason: format!("q = {} must exceed 1 for a finite population mean", params.q),
            });
        }
        Ok(Self { params, objective })
    }

    /// Model with known parameters; fails if q <= 1.
    pub fn from_params(params: GammaGammaParams) -> Result<Self> {
        Self::new(params, f64::NAN)
    }

    /// Fitted parameters.
    pub const fn params(&self) -> &GammaGammaParams {
        &self.params
    }

    /// Penalized mean negative log-likelihood at the optimum.
    pub const fn objective(&self) -> f64 {
        self.objective
    }

    /// Mean order value across the population.
    pub fn population_mean(&self) -> f64 {
        let GammaGammaParams { p, q, v } = self.params;
        v * p / (q - 1.0)
    }

    /// Discounted lifetime value of one customer.
    ///
    /// The horizon is cut into periods of `weeks_per_period`; purchases
    /// expected in period i are valued at the conditional expected order
    /// value and discounted by `(1 + discount_rate)^(t_i / weeks_per_period)`.
    pub fn customer_lifetime_value<M: PurchaseModel>(
        &self,
        purchases: &M,
        frequency: f64,
        recency: f64,
        tenure: f64,
        monetary_avg: f64,
        horizon: &LifetimeHorizon,
    ) -> f64 {
        let value = self.expected_average_value(frequency, monetary_avg);
        let mut previous_purchases = 0.0;
        let mut clv = 0.0;

        for t in horizon.period_ends() {
            let expected = purchases.expected_purchases(t, frequency, recency, tenure);
            let discount = (1.0 + horizon.discount_rate).powf(t / horizon.weeks_per_period);
            clv += value * (expected - previous_purchases) / discount;
            previous_purchases = expected;
        }

        clv
    }
}

impl SpendModel for GammaGammaModel {
    fn expected_average_value(&self, frequency: f64, monetary_avg: f64) -> f64 {
        let GammaGammaParams { p, q, .. } = self.params;
        let weight = p * frequency / (p * frequency + q - 1.0);
        (1.0 - weight) * self.population_mean() + weight * monetary_avg
    }
}

/// Discounting schedule for lifetime value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifetimeHorizon {
    /// Total horizon in weeks (default: 6 months)
    pub horizon_weeks: f64,
    /// Weeks per discounting period (default: 4.345, one month)
    pub weeks_per_period: f64,
    /// Discount rate per period (default: 0.01)
    pub discount_rate: f64,
}

impl Default for LifetimeHorizon {
    fn default() -> Self {
        Self {
            horizon_weeks: 6.0 * DEFAULT_WEEKS_PER_PERIOD,
            weeks_per_period: DEFAULT_WEEKS_PER_PERIOD,
            discount_rate: 0.01,
        }
    }
}

impl LifetimeHorizon {
    /// End of each discounting period, `min(i * weeks_per_period, horizon_weeks)`.
    pub fn period_ends(&self) -> Vec<f64> {
        let periods = (self.horizon_weeks / self.weeks_per_period - 1e-9).ceil().max(0.0) as usize;
        (1..=periods)
            .map(|i| {
                if i == periods {
                    self.horizon_weeks
                } else {
                    (i as f64 * self.weeks_per_period).min(self.horizon_weeks)
                }
            })
            .collect()
    }

    /// Check that the schedule is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.horizon_weeks.is_finite() && self.horizon_weeks > 0.0) {
            return Err(CltvError::InvalidParameter(format!(
                "horizon_weeks must be positive, got {}",
                self.horizon_weeks
            )));
        }
        if !(self.weeks_per_period.is_finite() && self.weeks_per_period > 0.0) {
            return Err(CltvError::InvalidParameter(format!(
                "weeks_per_period must be positive, got {}",
                self.weeks_per_period
            )));
        }
        if !(self.discount_rate.is_finite() && self.discount_rate > -1.0) {
            return Err(CltvError::InvalidParameter(format!(
                "discount_rate must exceed -1, got {}",
                self.discount_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    /// Purchases accrue linearly at one per week.
    struct Linear;

    impl PurchaseModel for Linear {
        fn expected_purchases(&self, t: f64, _: f64, _: f64, _: f64) -> f64 {
            t
        }
    }

    fn model() -> GammaGammaModel {
        GammaGammaModel::from_params(GammaGammaParams { p: 6.25, q: 3.74, v: 15.44 }).unwrap()
    }

    #[test]
    fn test_expected_value_between_population_and_own_mean() {
        let m = model();
        let population = m.population_mean();

        for (x, own) in [(2.0, 10.0), (5.0, 80.0), (20.0, 35.0), (1.0, population)] {
            let expected = m.expected_average_value(x, own);
            let (lo, hi) = if own < population { (own, population) } else { (population, own) };
            assert!(expected >= lo - 1e-12 && expected <= hi + 1e-12);
        }
    }

    #[test]
    fn test_more_orders_means_less_shrinkage() {
        let m = model();
        let own = 100.0;
        let few = m.expected_average_value(2.0, own);
        let many = m.expected_average_value(50.0, own);
        assert!((own - many).abs() < (own - few).abs());
    }

    #[test]
    fn test_degenerate_q_rejected() {
        let result = GammaGammaModel::from_params(GammaGammaParams { p: 1.0, q: 0.9, v: 1.0 });
        assert!(matches!(result, Err(CltvError::DegenerateModel { .. })));
    }

    #[test]
    fn test_default_horizon_periods() {
        let ends = LifetimeHorizon::default().period_ends();
        assert_eq!(ends.len(), 6);
        assert_relative_eq!(ends[0], 4.345);
        assert_relative_eq!(ends[5], 26.07, max_relative = 1e-12);
    }

    #[test]
    fn test_partial_last_period() {
        let horizon = LifetimeHorizon {
            horizon_weeks: 10.0,
            weeks_per_period: 4.0,
            discount_rate: 0.0,
        };
        assert_eq!(horizon.period_ends(), vec![4.0, 8.0, 10.0]);
    }

    #[test]
    fn test_undiscounted_clv_is_value_times_purchases() {
        let m = model();
        let horizon = LifetimeHorizon {
            horizon_weeks: 12.0,
            weeks_per_period: 4.0,
            discount_rate: 0.0,
        };
        let clv = m.customer_lifetime_value(&Linear, 3.0, 10.0, 20.0, 40.0, &horizon);
        assert_relative_eq!(clv, 12.0 * m.expected_average_value(3.0, 40.0), max_relative = 1e-12);
    }

    #[test]
    fn test_discounting_lowers_clv() {
        let m = model();
        let plain = LifetimeHorizon {
            discount_rate: 0.0,
            ..Default::default()
        };
        let discounted = LifetimeHorizon::default();
        let a = m.customer_lifetime_value(&Linear, 3.0, 10.0, 20.0, 40.0, &plain);
        let b = m.customer_lifetime_value(&Linear, 3.0, 10.0, 20.0, 40.0, &discounted);
        assert!(b < a);
    }

    #[test]
    fn test_fit_recovers_sensible_model() {
        let frequency = array![2.0, 3.0, 5.0, 2.0, 4.0, 6.0, 3.0, 2.0, 8.0, 3.0, 4.0, 2.0];
        let monetary = array![12.0, 18.5, 15.0, 25.0, 11.0, 20.0, 14.0, 30.0, 16.5, 22.0, 19.0, 13.0];

        let model = GammaGammaFitter::default().fit(&frequency, &monetary).unwrap();
        assert!(model.params().q > 1.0);

        let sample_mean = monetary.mean().unwrap();
        assert!((model.population_mean() - sample_mean).abs() / sample_mean < 0.25);
    }

    #[test]
    fn test_fit_rejects_non_positive_monetary() {
        let result = GammaGammaFitter::default().fit(&array![2.0, 3.0], &array![10.0, 0.0]);
        assert!(matches!(result, Err(CltvError::NonPositiveMonetary { value, .. }) if value == 0.0));
    }

    #[test]
    fn test_validate_horizon() {
        assert!(LifetimeHorizon::default().validate().is_ok());
        let bad = LifetimeHorizon {
            weeks_per_period: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
