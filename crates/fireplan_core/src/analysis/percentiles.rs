//! Nearest-rank percentiles
//!
//! The value at percentile `p` of `n` ascending values is the one at index
//! `floor(p / 100 * n)`, clamped to `n - 1`. No interpolation, so every
//! reported percentile is a value some run actually produced.

use crate::model::{FireAgePercentiles, PercentileSet};

/// Percentiles reported for every distribution
pub const PERCENTILES: [f64; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];

/// Index of percentile `p` in an ascending slice of `n > 0` values
pub fn percentile_index(p: f64, n: usize) -> usize {
    let rank = (p / 100.0 * n as f64).floor();
    if rank <= 0.0 {
        0
    } else {
        (rank as usize).min(n.saturating_sub(1))
    }
}

pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    sorted.get(percentile_index(p, sorted.len())).copied()
}

/// p10..p90 of `values`; all zero when there are none
pub fn percentile_set(values: &[f64]) -> PercentileSet {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let at = |p| percentile_of_sorted(&sorted, p).unwrap_or(0.0);
    PercentileSet {
        p10: at(PERCENTILES[0]),
        p25: at(PERCENTILES[1]),
        p50: at(PERCENTILES[2]),
        p75: at(PERCENTILES[3]),
        p90: at(PERCENTILES[4]),
    }
}

/// Percentiles of FIRE ages, ranking "never" (`None`) above every age
pub fn fire_age_percentiles(ages: &[Option<u32>]) -> FireAgePercentiles {
    let mut sorted = ages.to_vec();
    sorted.sort_by_key(|age| age.unwrap_or(u32::MAX));
    let at = |p| {
        if sorted.is_empty() {
            None
        } else {
            sorted[percentile_index(p, sorted.len())]
        }
    };
    FireAgePercentiles {
        p10: at(PERCENTILES[0]),
        p25: at(PERCENTILES[1]),
        p50: at(PERCENTILES[2]),
        p75: at(PERCENTILES[3]),
        p90: at(PERCENTILES[4]),
    }
}
