//! BG/NBD purchase model
//!
//! While alive a customer buys at Poisson rate λ ~ Gamma(r, α). After each
//! purchase they drop out with probability p ~ Beta(a, b). A customer's
//! history is summarized by (x, t_x, T): repeat purchase count, time of the
//! last purchase and time since the first, all measured from the first
//! purchase.
//!
//! Log-likelihood of one customer:
//!
//! ```text
//! A1 = lnΓ(r + x) - lnΓ(r) + r ln α
//! A2 = lnΓ(a + b) + lnΓ(b + x) - lnΓ(b) - lnΓ(a + b + x)
//! A3 = -(r + x) ln(α + T)
//! A4 = ln a - ln(b + max(x, 1) - 1) - (r + x) ln(α + t_x)
//! ll = A1 + A2 + ln(exp(A3) + 1{x > 0} exp(A4))
//! ```
//!
//! Times are rescaled by 10 / max(T) while fitting; α is mapped back to the
//! original unit afterwards.

use super::{FitConfig, INITIAL_LOG_PARAM, PurchaseModel, check_inputs};
use crate::error::{CltvError, Result};
use crate::optimize::NelderMead;
use crate::special::{ln_add_exp, ln_gamma, ln_hyp2f1};
use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const TIME_SCALE_TARGET: f64 = 10.0;
const MIN_CUSTOMERS: usize = 2;

/// Fitted BG/NBD parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaGeoParams {
    /// Shape of the purchase-rate distribution
    pub r: f64,
    /// Scale of the purchase-rate distribution (in weeks)
    pub alpha: f64,
    /// First shape of the dropout distribution
    pub a: f64,
    /// Second shape of the dropout distribution
    pub b: f64,
}

impl BetaGeoParams {
    fn from_log(log_params: &Array1<f64>) -> Self {
        Self {
            r: log_params[0].exp(),
            alpha: log_params[1].exp(),
            a: log_params[2].exp(),
            b: log_params[3].exp(),
        }
    }

    fn sum_of_squares(&self) -> f64 {
        self.r.powi(2) + self.alpha.powi(2) + self.a.powi(2) + self.b.powi(2)
    }

    fn is_finite(&self) -> bool {
        self.r.is_finite() && self.alpha.is_finite() && self.a.is_finite() && self.b.is_finite()
    }
}

/// Log-likelihood of a single customer history.
pub fn log_likelihood(params: &BetaGeoParams, frequency: f64, recency: f64, tenure: f64) -> f64 {
    let BetaGeoParams { r, alpha, a, b } = *params;
    let x = frequency;

    let a1 = ln_gamma(r + x) - ln_gamma(r) + r * alpha.ln();
    let a2 = ln_gamma(a + b) + ln_gamma(b + x) - ln_gamma(b) - ln_gamma(a + b + x);
    let a3 = -(r + x) * (alpha + tenure).ln();

    if x > 0.0 {
        let a4 = a.ln() - (b + x.max(1.0) - 1.0).ln() - (r + x) * (alpha + recency).ln();
        a1 + a2 + ln_add_exp(a3, a4)
    } else {
        a1 + a2 + a3
    }
}

/// Mean negative log-likelihood plus the L2 penalty.
pub fn negative_log_likelihood(
    params: &BetaGeoParams,
    frequency: &Array1<f64>,
    recency: &Array1<f64>,
    tenure: &Array1<f64>,
    penalizer: f64,
) -> f64 {
    let total = Zip::from(frequency)
        .and(recency)
        .and(tenure)
        .fold(0.0, |acc, &x, &t_x, &t| acc + log_likelihood(params, x, t_x, t));

    -total / frequency.len() as f64 + penalizer * params.sum_of_squares()
}

/// Fits the BG/NBD model
#[derive(Debug, Clone, Default)]
pub struct BetaGeoFitter {
    config: FitConfig,
}

impl BetaGeoFitter {
    /// Create a fitter.
    pub const fn new(config: FitConfig) -> Self {
        Self { config }
    }

    /// Fit on repeat purchase counts, recency and tenure (weeks).
    pub fn fit(
        &self,
        frequency: &Array1<f64>,
        recency: &Array1<f64>,
        tenure: &Array1<f64>,
    ) -> Result<BetaGeoModel> {
        let n = frequency.len();
        if n < MIN_CUSTOMERS {
            return Err(CltvError::InsufficientCustomers {
                required: MIN_CUSTOMERS,
                actual: n,
            });
        }
        check_inputs(
            n,
            &[("frequency", frequency), ("recency", recency), ("tenure", tenure)],
        )?;
        if frequency.iter().any(|&x| x < 0.0) || recency.iter().zip(tenure).any(|(&r, &t)| r < 0.0 || r > t) {
            return Err(CltvError::InvalidParameter(
                "histories need frequency >= 0 and 0 <= recency <= tenure".to_string(),
            ));
        }

        let max_tenure = tenure.fold(0.0_f64, |m, &t| m.max(t));
        if max_tenure <= 0.0 {
            return Err(CltvError::InvalidParameter(
                "all customers have zero tenure".to_string(),
            ));
        }
        let scale = TIME_SCALE_TARGET / max_tenure;
        let scaled_recency = recency * scale;
        let scaled_tenure = tenure * scale;

        let penalizer = self.config.penalizer;
        let objective = |log_params: &Array1<f64>| {
            let params = BetaGeoParams::from_log(log_params);
            negative_log_likelihood(&params, frequency, &scaled_recency, &scaled_tenure, penalizer)
        };

        let minimum = NelderMead::new(self.config.optimizer)
            .minimize(objective, &Array1::from_elem(4, INITIAL_LOG_PARAM));
        if !minimum.converged {
            warn!(
                iterations = minimum.iterations,
                value = minimum.value,
                "BG/NBD fit did not converge, using best simplex vertex"
            );
        }

        let mut params = BetaGeoParams::from_log(&minimum.point);
        params.alpha /= scale;

        if !params.is_finite() || !minimum.value.is_finite() {
            return Err(CltvError::DegenerateModel {
                model: "BG/NBD",
                reason: format!("non-finite parameters {params:?}"),
            });
        }

        debug!(
            r = params.r,
            alpha = params.alpha,
            a = params.a,
            b = params.b,
            objective = minimum.value,
            iterations = minimum.iterations,
            "fitted BG/NBD model"
        );

        Ok(BetaGeoModel {
            params,
            objective: minimum.value,
        })
    }
}

/// Fitted BG/NBD model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaGeoModel {
    params: BetaGeoParams,
    objective: f64,
}

impl BetaGeoModel {
    /// Model with known parameters.
    pub const fn from_params(params: BetaGeoParams) -> Self {
        Self {
            params,
            objective: f64::NAN,
        }
    }

    /// Fitted parameters.
    pub const fn params(&self) -> &BetaGeoParams {
        &self.params
    }

    /// Penalized mean negative log-likelihood at the optimum (NaN when the
    /// model was built from known parameters).
    pub const fn objective(&self) -> f64 {
        self.objective
    }

    /// Probability that the customer has not yet dropped out.
    pub fn probability_alive(&self, frequency: f64, recency: f64, tenure: f64) -> f64 {
        if frequency <= 0.0 {
            return 1.0;
        }
        let BetaGeoParams { r, alpha, a, b } = self.params;
        let ratio = (a / (b + frequency - 1.0))
            * ((alpha + tenure) / (alpha + recency)).powf(r + frequency);
        1.0 / (1.0 + ratio)
    }
}

impl PurchaseModel for BetaGeoModel {
    fn expected_purchases(&self, t: f64, frequency: f64, recency: f64, tenure: f64) -> f64 {
        let BetaGeoParams { r, alpha, a, b } = self.params;
        let x = frequency;

        let z = t / (alpha + tenure + t);
        let ln_hyp = ln_hyp2f1(r + x, b + x, a + b + x - 1.0, z);

        let first = (a + b + x - 1.0) / (a - 1.0);
        let second = 1.0 - (ln_hyp + (r + x) * ((alpha + tenure) / (alpha + tenure + t)).ln()).exp();

        let dropout = if x > 0.0 {
            (a / (b + x - 1.0)) * ((alpha + tenure) / (alpha + recency)).powf(r + x)
        } else {
            0.0
        };

        first * second / (1.0 + dropout)
    }
}
