use itertools::Itertools;

pub fn arithmetic_mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// Sample standard deviation (n - 1 denominator)
pub fn standard_deviation(x: &[f64]) -> f64 {
    if x.len() < 2 {
        return 0.0;
    }
    let mean = arithmetic_mean(x);
    let ss = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    (ss / (x.len() - 1) as f64).sqrt()
}

/// Pearson correlation coefficient
///
/// Undefined (NaN) when either input has no variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    let mx = arithmetic_mean(x);
    let my = arithmetic_mean(y);
    let (cov, vx, vy) = x
        .iter()
        .zip(y.iter())
        .fold((0.0, 0.0, 0.0), |(cov, vx, vy), (a, b)| {
            let (da, db) = (a - mx, b - my);
            (cov + da * db, vx + da * da, vy + db * db)
        });
    if vx == 0.0 || vy == 0.0 {
        return f64::NAN;
    }
    cov / (vx * vy).sqrt()
}

/// Ranks starting at 1, ties receive the average of the ranks they span
pub fn average_ranks(x: &[f64]) -> Vec<f64> {
    let order = (0..x.len())
        .sorted_by(|&a, &b| x[a].total_cmp(&x[b]))
        .collect::<Vec<_>>();
    let mut ranks = vec![0.0; x.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && x[order[end]] == x[order[start]] {
            end += 1;
        }
        // positions start..end share the mean of ranks start+1..=end
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Signal-to-noise ratio between the two label groups
///
/// The group with the larger label is the numerator's positive side. Each
/// standard deviation is floored at 20% of its group mean (0.2 when the mean is 0).
/// Returns NaN unless `labels` contains exactly two distinct values.
pub fn signal_to_noise(labels: &[f64], values: &[f64]) -> f64 {
    let classes = labels
        .iter()
        .copied()
        .sorted_by(f64::total_cmp)
        .dedup()
        .collect::<Vec<_>>();
    let &[lo, hi] = classes.as_slice() else {
        return f64::NAN;
    };
    let group = |class: f64| {
        labels
            .iter()
            .zip(values.iter())
            .filter(|(l, _)| **l == class)
            .map(|(_, v)| *v)
            .collect::<Vec<_>>()
    };
    let (hi_values, lo_values) = (group(hi), group(lo));
    let (mu_hi, mu_lo) = (arithmetic_mean(&hi_values), arithmetic_mean(&lo_values));
    let floored = |sd: f64, mu: f64| {
        let floor = if mu == 0.0 { 0.2 } else { 0.2 * mu.abs() };
        sd.max(floor)
    };
    let sd_hi = floored(standard_deviation(&hi_values), mu_hi);
    let sd_lo = floored(standard_deviation(&lo_values), mu_lo);
    (mu_hi - mu_lo) / (sd_hi + sd_lo)
}

/// Two-sided empirical p-value of `score` against a null distribution
///
/// `sorted_abs_null` must hold the absolute null scores in ascending order.
pub fn empirical_pvalue(score: f64, sorted_abs_null: &[f64]) -> Option<f64> {
    if !score.is_finite() || sorted_abs_null.is_empty() {
        return None;
    }
    let below = sorted_abs_null.partition_point(|&v| v < score.abs());
    let extreme = sorted_abs_null.len() - below;
    Some((1 + extreme) as f64 / (1 + sorted_abs_null.len()) as f64)
}
