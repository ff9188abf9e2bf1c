//! Gamma concentration zones
//!
//! Contiguous strike runs whose gross gamma (call + put) sits in the top
//! fraction of the profile.

use serde::{Deserialize, Serialize};

use super::ClusterConfig;
use crate::core::{finite_or_zero, StrikeRecord};

/// Dominant side of a cluster's peak strike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GexSide {
    Call,
    Put,
}

/// A run of adjacent high-gamma strikes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterZone {
    /// First strike in the run
    pub start: f64,
    /// Last strike in the run
    pub end: f64,
    /// Strike with the most gross gamma in the run
    pub peak_strike: f64,
    /// Σ (call_gex + put_gex) over the run
    pub total_gex: f64,
    pub side: GexSide,
}

impl ClusterZone {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.start.min(self.end) && price <= self.start.max(self.end)
    }

    pub fn width(&self) -> f64 {
        (self.end - self.start).abs()
    }
}

fn gross(r: &StrikeRecord) -> f64 {
    finite_or_zero(r.call_gex) + finite_or_zero(r.put_gex)
}

/// Find high-gamma clusters, strongest first.
///
/// Needs at least three strikes. The threshold is the gross gamma ranked at
/// `max(1, floor(n * top_fraction))` in descending order; a non-positive
/// threshold yields no clusters.
pub fn find_clusters(records: &[StrikeRecord], config: &ClusterConfig) -> Vec<ClusterZone> {
    let n = records.len();
    if n < 3 {
        return Vec::new();
    }

    let mut ranked: Vec<f64> = records.iter().map(gross).collect();
    ranked.sort_by(|a, b| b.total_cmp(a));

    let threshold_idx = ((n as f64 * config.top_fraction) as usize).clamp(1, n - 1);
    let threshold = ranked[threshold_idx];
    if threshold <= 0.0 {
        return Vec::new();
    }

    let mut clusters = Vec::new();
    let mut run: Vec<&StrikeRecord> = Vec::new();

    for r in records {
        if gross(r) >= threshold {
            run.push(r);
        } else if !run.is_empty() {
            clusters.push(close_run(&run));
            run.clear();
        }
    }
    if !run.is_empty() {
        clusters.push(close_run(&run));
    }

    clusters.sort_by(|a, b| b.total_gex.total_cmp(&a.total_gex));
    clusters.truncate(config.max_clusters);
    clusters
}

fn close_run(run: &[&StrikeRecord]) -> ClusterZone {
    let mut peak = run[0];
    for &r in &run[1..] {
        if gross(r) > gross(peak) {
            peak = r;
        }
    }

    ClusterZone {
        start: run[0].strike,
        end: run[run.len() - 1].strike,
        peak_strike: peak.strike,
        total_gex: run.iter().map(|r| gross(r)).sum(),
        side: if peak.call_gex > peak.put_gex {
            GexSide::Call
        } else {
            GexSide::Put
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(gross_pairs: &[(f64, f64, f64)]) -> Vec<StrikeRecord> {
        gross_pairs
            .iter()
            .map(|&(k, c, p)| StrikeRecord::new(k, c, p, 0, 0))
            .collect()
    }

    #[test]
    fn test_too_few_strikes() {
        let records = profile(&[(100.0, 5.0, 5.0), (105.0, 5.0, 5.0)]);
        assert!(find_clusters(&records, &ClusterConfig::default()).is_empty());
    }

    #[test]
    fn test_single_zone_above_threshold() {
        // 10 strikes -> threshold index max(1, 1) = 1
        let records = profile(&[
            (90.0, 1.0, 0.0),
            (91.0, 1.0, 0.0),
            (92.0, 2.0, 50.0),
            (93.0, 1.0, 0.0),
            (94.0, 1.0, 0.0),
            (95.0, 1.0, 0.0),
            (96.0, 60.0, 5.0),
            (97.0, 55.0, 1.0),
            (98.0, 1.0, 0.0),
            (99.0, 1.0, 0.0),
        ]);
        // Ranked gross: 65, 56, 52, 1... -> threshold 56
        let clusters = find_clusters(&records, &ClusterConfig::default());

        assert_eq!(clusters.len(), 1);
        let zone = &clusters[0];
        assert_eq!(zone.start, 96.0);
        assert_eq!(zone.end, 97.0);
        assert_eq!(zone.peak_strike, 96.0);
        assert_eq!(zone.total_gex, 121.0);
        assert_eq!(zone.side, GexSide::Call);
        assert!(zone.contains(96.5));
        assert_eq!(zone.width(), 1.0);
    }

    #[test]
    fn test_sorted_and_truncated() {
        let records = profile(&[
            (100.0, 0.0, 50.0),
            (101.0, 0.0, 0.0),
            (102.0, 70.0, 10.0),
            (103.0, 0.0, 0.0),
            (104.0, 30.0, 0.0),
            (105.0, 0.0, 0.0),
        ]);
        // threshold index floor(6 * 0.3) = 1 -> ranked [80, 50, 30, 0, 0, 0] -> 50
        let config = ClusterConfig {
            top_fraction: 0.3,
            max_clusters: 5,
        };
        let clusters = find_clusters(&records, &config);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].peak_strike, 102.0);
        assert_eq!(clusters[0].side, GexSide::Call);
        assert_eq!(clusters[1].peak_strike, 100.0);
        assert_eq!(clusters[1].side, GexSide::Put);

        let config = ClusterConfig {
            top_fraction: 0.3,
            max_clusters: 1,
        };
        let clusters = find_clusters(&records, &config);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].total_gex, 80.0);
    }

    #[test]
    fn test_run_spans_whole_profile() {
        let config = ClusterConfig {
            top_fraction: 0.5,
            max_clusters: 5,
        };
        let records = profile(&[
            (100.0, 0.0, 40.0),
            (101.0, 0.0, 1.0),
            (102.0, 0.0, 1.0),
            (103.0, 10.0, 90.0),
        ]);
        // ranked [100, 40, 1, 1] -> threshold 1
        let clusters = find_clusters(&records, &config);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].peak_strike, 103.0);
        assert_eq!(clusters[0].side, GexSide::Put);
        assert_eq!(clusters[0].start, 100.0);
        assert_eq!(clusters[0].end, 103.0);
    }

    #[test]
    fn test_all_zero_has_no_clusters() {
        let records = profile(&[(100.0, 0.0, 0.0), (101.0, 0.0, 0.0), (102.0, 0.0, 0.0)]);
        assert!(find_clusters(&records, &ClusterConfig::default()).is_empty());
    }
}
