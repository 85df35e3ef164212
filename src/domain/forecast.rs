//! Forecast engine: one-step linear trend extrapolation.
//!
//! Fits an ordinary least-squares line over the most recent closes (oldest
//! first, index as the single feature) and predicts one step past the last
//! observation. Callers feed it at most [`FORECAST_LOOKBACK`] non-null
//! closes, already reversed into chronological order.

/// Maximum number of recent closes a forecast may consider.
pub const FORECAST_LOOKBACK: usize = 30;
/// A single point cannot determine a trend.
pub const MIN_FORECAST_POINTS: usize = 2;

/// Predict the next close from a chronological (oldest-first) close series.
///
/// Returns None with fewer than [`MIN_FORECAST_POINTS`] observations.
/// Otherwise fits `close ~ slope * t + intercept` over t = 0..L-1 in closed
/// form, evaluates at t = L, and rounds to 2 decimal places. A flat series
/// yields slope 0 and predicts the constant close; no special casing.
pub fn predict_next_close(closes: &[f64]) -> Option<f64> {
    let n = closes.len();
    if n < MIN_FORECAST_POINTS {
        return None;
    }

    let nf = n as f64;
    let mut sum_t = 0.0;
    let mut sum_tt = 0.0;
    let mut sum_y = 0.0;
    let mut sum_ty = 0.0;
    for (t, &y) in closes.iter().enumerate() {
        let t = t as f64;
        sum_t += t;
        sum_tt += t * t;
        sum_y += y;
        sum_ty += t * y;
    }

    // denominator is n * var(t) * n, nonzero for n >= 2 distinct indices
    let slope = (nf * sum_ty - sum_t * sum_y) / (nf * sum_tt - sum_t * sum_t);
    let intercept = (sum_y - slope * sum_t) / nf;

    Some(round_cents(slope * nf + intercept))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
