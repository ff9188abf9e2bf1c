//! Stage 3: Range Filter
//!
//! Narrows a strike profile to the strikes worth drawing around spot.

use super::{DisplayWindow, RangeConfig};
use crate::core::StrikeRecord;

/// Keep records with strike in `[spot*(1-pct), spot*(1+pct)]`, inclusive.
///
/// When more than `max_count` records fall in range they are down-sampled by
/// stride `ceil(count / max_count)`, keeping indices 0, stride, 2*stride, ...
/// This favours the low end of the window rather than centering on spot.
/// Input order is kept; nothing is sorted.
pub fn filter_range(
    records: &[StrikeRecord],
    spot: f64,
    pct: f64,
    max_count: Option<usize>,
) -> DisplayWindow {
    let lower = spot * (1.0 - pct);
    let upper = spot * (1.0 + pct);

    let in_range: Vec<StrikeRecord> = records
        .iter()
        .filter(|r| r.strike >= lower && r.strike <= upper)
        .copied()
        .collect();
    let count = in_range.len();

    if count == 0 {
        return DisplayWindow::empty(lower, upper);
    }

    let stride = match max_count {
        Some(0) => {
            return DisplayWindow {
                in_range: count,
                ..DisplayWindow::empty(lower, upper)
            }
        }
        Some(max) if count > max => count.div_ceil(max),
        _ => 1,
    };

    let kept = if stride > 1 {
        in_range.into_iter().step_by(stride).collect()
    } else {
        in_range
    };

    DisplayWindow {
        records: kept,
        lower,
        upper,
        in_range: count,
        stride,
    }
}

/// `filter_range` driven by a `RangeConfig`
pub fn filter_with(records: &[StrikeRecord], spot: f64, config: &RangeConfig) -> DisplayWindow {
    filter_range(records, spot, config.pct, config.max_count)
}

/// Index of the record whose strike is closest to spot (first on ties)
pub fn nearest_index(records: &[StrikeRecord], spot: f64) -> Option<usize> {
    records
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = (a.strike - spot).abs();
            let db = (b.strike - spot).abs();
            da.total_cmp(&db)
        })
        .map(|(i, _)| i)
}

/// The record nearest spot plus up to `n` records either side of it
pub fn around_spot(records: &[StrikeRecord], spot: f64, n: usize) -> Vec<StrikeRecord> {
    let Some(center) = nearest_index(records, spot) else {
        return Vec::new();
    };

    let start = center.saturating_sub(n);
    let end = center.saturating_add(n).saturating_add(1).min(records.len());
    records[start..end].to_vec()
}

/// Median gap between consecutive strikes (1.0 without two distinct strikes)
pub fn strike_spacing(records: &[StrikeRecord]) -> f64 {
    let mut diffs: Vec<f64> = records
        .windows(2)
        .map(|w| (w[1].strike - w[0].strike).abs())
        .filter(|&d| d > 1e-10)
        .collect();

    if diffs.is_empty() {
        return 1.0;
    }

    diffs.sort_by(|a, b| a.total_cmp(b));

    if diffs.len() % 2 == 0 {
        let mid = diffs.len() / 2;
        (diffs[mid - 1] + diffs[mid]) / 2.0
    } else {
        diffs[diffs.len() / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder(strikes: impl IntoIterator<Item = f64>) -> Vec<StrikeRecord> {
        strikes
            .into_iter()
            .map(|k| StrikeRecord::new(k, 1.0, 0.5, 1, 1))
            .collect()
    }

    #[test]
    fn test_inclusive_window() {
        let records = ladder([90.0, 95.0, 100.0, 105.0, 110.0]);
        let window = filter_range(&records, 100.0, 0.05, None);

        assert_eq!(window.strikes(), vec![95.0, 100.0, 105.0]);
        assert_eq!(window.lower, 95.0);
        assert_eq!(window.upper, 105.0);
        assert!(!window.is_sampled());
    }

    #[test]
    fn test_empty_when_nothing_in_range() {
        let records = ladder([50.0, 60.0]);
        let window = filter_range(&records, 100.0, 0.10, Some(10));
        assert!(window.is_empty());
        assert_eq!(window.in_range, 0);

        assert!(filter_range(&[], 100.0, 0.10, None).is_empty());
    }

    #[test]
    fn test_down_sample_stride() {
        // 120 strikes, all in range
        let records = ladder((0..120).map(|i| 940.0 + i as f64));
        let window = filter_range(&records, 1000.0, 0.10, Some(50));

        assert_eq!(window.in_range, 120);
        assert_eq!(window.stride, 3);
        assert_eq!(window.len(), 40);
        assert_eq!(window.records[0].strike, 940.0);
        assert_eq!(window.records[1].strike, 943.0);
        assert_eq!(window.records[39].strike, 940.0 + 117.0);

        let again = filter_range(&records, 1000.0, 0.10, Some(50));
        assert_eq!(window, again);
    }

    #[test]
    fn test_no_sampling_at_exact_cap() {
        let records = ladder((0..50).map(|i| 975.0 + i as f64));
        let window = filter_range(&records, 1000.0, 0.10, Some(50));
        assert_eq!(window.len(), 50);
        assert_eq!(window.stride, 1);
    }

    #[test]
    fn test_zero_cap_is_empty() {
        let records = ladder([100.0]);
        let window = filter_range(&records, 100.0, 0.10, Some(0));
        assert!(window.is_empty());
        assert_eq!(window.in_range, 1);
    }

    #[test]
    fn test_unsorted_input_kept_in_order() {
        let records = ladder([105.0, 95.0, 100.0]);
        let window = filter_range(&records, 100.0, 0.10, None);
        assert_eq!(window.strikes(), vec![105.0, 95.0, 100.0]);
    }

    #[test]
    fn test_around_spot() {
        let records = ladder((0..11).map(|i| 90.0 + 2.0 * i as f64));

        let near: Vec<f64> = around_spot(&records, 101.2, 2).iter().map(|r| r.strike).collect();
        assert_eq!(near, vec![98.0, 100.0, 102.0, 104.0, 106.0]);

        let edge: Vec<f64> = around_spot(&records, 80.0, 2).iter().map(|r| r.strike).collect();
        assert_eq!(edge, vec![90.0, 92.0, 94.0]);

        assert!(around_spot(&[], 100.0, 3).is_empty());
    }

    #[test]
    fn test_around_spot_huge_radius_returns_everything() {
        let records = ladder([95.0, 100.0, 105.0]);

        let all: Vec<f64> = around_spot(&records, 100.0, usize::MAX)
            .iter()
            .map(|r| r.strike)
            .collect();
        assert_eq!(all, vec![95.0, 100.0, 105.0]);

        let from_top: Vec<f64> = around_spot(&records, 200.0, usize::MAX - 1)
            .iter()
            .map(|r| r.strike)
            .collect();
        assert_eq!(from_top, vec![95.0, 100.0, 105.0]);
    }

    #[test]
    fn test_strike_spacing() {
        assert!((strike_spacing(&ladder([100.0, 101.0, 102.0, 103.0])) - 1.0).abs() < 1e-12);
        assert!((strike_spacing(&ladder([100.0, 105.0, 110.0, 115.0])) - 5.0).abs() < 1e-12);
        assert_eq!(strike_spacing(&ladder([100.0])), 1.0);
    }
}
