//! Time-series statistics for long-range fatigue analysis

use super::types::TimeSeriesInsight;

/// Least-squares slope and r² of `values` against their index.
///
/// Returns `(0.0, 0.0)` for fewer than two points. A flat series has no
/// trend, so its r² is 0.
pub fn linear_trend(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n < 2 {
        return (0.0, 0.0);
    }

    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n_f;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    let r_squared = if sxx == 0.0 || syy == 0.0 {
        0.0
    } else {
        (sxy * sxy / (sxx * syy)).clamp(0.0, 1.0)
    };
    (slope, r_squared)
}

/// Sample autocorrelation at `lag`; 0 for a constant or too-short series
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    let n = values.len();
    if lag == 0 || n <= lag {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    if variance == 0.0 {
        return 0.0;
    }

    let covariance: f64 = (lag..n)
        .map(|t| (values[t] - mean) * (values[t - lag] - mean))
        .sum();
    covariance / variance
}

/// CTR trend and weekly seasonality over an ordered daily series
pub fn analyze_ctr_series(
    ctr: &[f64],
    seasonality_min_points: usize,
    seasonality_threshold: f64,
) -> TimeSeriesInsight {
    let (ctr_slope, trend_strength) = linear_trend(ctr);
    let weekly_autocorrelation =
        (ctr.len() >= seasonality_min_points).then(|| autocorrelation(ctr, 7));

    TimeSeriesInsight {
        data_points: ctr.len(),
        ctr_slope,
        trend_strength,
        weekly_autocorrelation,
        has_weekly_seasonality: weekly_autocorrelation
            .map(|r| r > seasonality_threshold)
            .unwrap_or(false),
    }
}
