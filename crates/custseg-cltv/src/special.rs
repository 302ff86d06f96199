//! Special functions
//!
//! - `ln_gamma`: re-exported from `statrs`.
//! - `ln_hyp2f1`: log of the Gauss hypergeometric function 2F1(a, b; c; z)
//!   for 0 <= z < 1, summed as a power series. When the direct series
//!   overflows or fails to converge the Euler transformation
//!
//!   2F1(a, b; c; z) = (1 - z)^(c - a - b) * 2F1(c - a, c - b; c; z)
//!
//!   is used instead, with the power carried in log space.

pub use statrs::function::gamma::ln_gamma;

const SERIES_MAX_TERMS: usize = 100_000;
const SERIES_TOLERANCE: f64 = 1e-15;

/// Power series of 2F1(a, b; c; z). `None` if it overflows or does not
/// converge.
fn hyp2f1_series(a: f64, b: f64, c: f64, z: f64) -> Option<f64> {
    let mut term = 1.0;
    let mut sum = 1.0;

    for k in 0..SERIES_MAX_TERMS {
        let k = k as f64;
        term *= (a + k) * (b + k) / ((c + k) * (k + 1.0)) * z;
        sum += term;

        if !sum.is_finite() {
            return None;
        }
        if term.abs() <= SERIES_TOLERANCE * sum.abs() {
            return Some(sum);
        }
    }

    None
}

/// Gauss hypergeometric function 2F1(a, b; c; z) for 0 <= z < 1.
pub fn hyp2f1(a: f64, b: f64, c: f64, z: f64) -> f64 {
    ln_hyp2f1(a, b, c, z).exp()
}

/// Natural log of 2F1(a, b; c; z) for 0 <= z < 1 where the function is
/// positive. Returns NaN outside that domain.
pub fn ln_hyp2f1(a: f64, b: f64, c: f64, z: f64) -> f64 {
    if !(0.0..1.0).contains(&z) {
        return f64::NAN;
    }

    match hyp2f1_series(a, b, c, z) {
        Some(value) if value > 0.0 => value.ln(),
        _ => match hyp2f1_series(c - a, c - b, c, z) {
            Some(value) if value > 0.0 => value.ln() + (c - a - b) * (1.0 - z).ln(),
            _ => f64::NAN,
        },
    }
}

/// `ln(exp(x) + exp(y))` without overflow.
pub fn ln_add_exp(x: f64, y: f64) -> f64 {
    let max = x.max(y);
    if max == f64::NEG_INFINITY {
        return max;
    }
    max + ((x - max).exp() + (y - max).exp()).ln()
}
