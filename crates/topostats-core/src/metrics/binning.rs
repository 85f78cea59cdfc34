//! Geometric (log-spaced) binning for spectral and scale-dependent curves.
//!
//! Bin `k` covers `[10^(k/n), 10^((k+1)/n))` with `n` points per decade, so
//! the x-axis sampling of every curve depends only on `n` and the observable
//! range of the data.

/// Average `(x, y)` pairs over geometric bins.
///
/// Points with `x <= 0` or non-finite coordinates are ignored. Each non-empty
/// bin contributes one point: the mean x and mean y of its members. Output is
/// ascending in x.
pub fn log_average(x: &[f64], y: &[f64], nb_points_per_decade: usize) -> (Vec<f64>, Vec<f64>) {
    let per_decade = nb_points_per_decade.max(1) as f64;
    let valid: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(x, y)| **x > 0.0 && x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();
    if valid.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let bin_of = |x: f64| (x.log10() * per_decade).floor() as i64;
    let first = valid.iter().map(|(x, _)| bin_of(*x)).min().unwrap_or(0);
    let last = valid.iter().map(|(x, _)| bin_of(*x)).max().unwrap_or(0);
    let n_bins = (last - first + 1) as usize;

    let mut sum_x = vec![0f64; n_bins];
    let mut sum_y = vec![0f64; n_bins];
    let mut count = vec![0u64; n_bins];
    for (x, y) in valid {
        let b = (bin_of(x) - first) as usize;
        sum_x[b] += x;
        sum_y[b] += y;
        count[b] += 1;
    }

    let mut out_x = Vec::new();
    let mut out_y = Vec::new();
    for b in 0..n_bins {
        if count[b] > 0 {
            out_x.push(sum_x[b] / count[b] as f64);
            out_y.push(sum_y[b] / count[b] as f64);
        }
    }
    (out_x, out_y)
}

/// Unique integer lags `round(10^(j/n))` for `j = 0, 1, …`, not exceeding
/// `max_lag`. Always starts at 1 when `max_lag >= 1`.
///
/// Exponents that would repeat the previous lag are skipped, so the work is
/// bounded by the number of lags returned, however dense `n` is.
pub fn log_spaced_lags(max_lag: usize, nb_points_per_decade: usize) -> Vec<usize> {
    let per_decade = nb_points_per_decade.max(1) as f64;
    let mut lags: Vec<usize> = Vec::new();
    let mut j = 0u64;
    loop {
        let lag = 10f64.powf(j as f64 / per_decade).round() as usize;
        if lag > max_lag {
            break;
        }
        if lags.last() != Some(&lag) {
            lags.push(lag);
        }
        // First exponent whose lag can round above the current one.
        let next = (per_decade * (lag as f64 + 0.5).log10()).ceil() as u64;
        j = next.max(j + 1);
    }
    lags
}
