//! In-memory snapshot history
//!
//! Keeps a bounded run of snapshots per symbol and expiry bucket, plus the
//! alerts raised between consecutive ones.

use std::collections::{HashMap, VecDeque};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::GexSnapshot;
use crate::core::{GexError, GexResult};
use crate::profile::{Alert, GexEngine};

/// Snapshots kept per symbol and bucket
pub const DEFAULT_MAX_PER_KEY: usize = 500;
/// Alerts kept across all keys
pub const DEFAULT_MAX_ALERTS: usize = 2000;

/// A snapshot with its storage key and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    pub symbol: String,
    pub bucket: String,
    pub ts: String,
    pub snapshot: GexSnapshot,
}

/// One point of a net/gross GEX time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub ts: String,
    pub spot: Option<f64>,
    pub net_gex: Option<f64>,
    pub gross_gex: Option<f64>,
}

fn key(symbol: &str, bucket: &str) -> (String, String) {
    (symbol.to_ascii_uppercase(), bucket.to_ascii_uppercase())
}

/// Bounded snapshot and alert history
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    max_per_key: usize,
    max_alerts: usize,
    snapshots: HashMap<(String, String), VecDeque<StoredSnapshot>>,
    alerts: VecDeque<Alert>,
}

impl SnapshotHistory {
    pub fn new(max_per_key: usize, max_alerts: usize) -> Self {
        Self {
            max_per_key,
            max_alerts,
            snapshots: HashMap::new(),
            alerts: VecDeque::new(),
        }
    }

    /// Append a snapshot, dropping the oldest one for the key past the cap
    pub fn add_snapshot(&mut self, symbol: &str, bucket: &str, ts: &str, snapshot: GexSnapshot) {
        let (symbol, bucket) = key(symbol, bucket);
        let entries = self
            .snapshots
            .entry((symbol.clone(), bucket.clone()))
            .or_default();

        entries.push_back(StoredSnapshot {
            symbol,
            bucket,
            ts: ts.to_string(),
            snapshot,
        });
        while entries.len() > self.max_per_key {
            entries.pop_front();
        }
    }

    pub fn latest(&self, symbol: &str, bucket: &str) -> Option<&GexSnapshot> {
        self.snapshots
            .get(&key(symbol, bucket))
            .and_then(|entries| entries.back())
            .map(|stored| &stored.snapshot)
    }

    /// Most recent snapshot stored under `ts`
    pub fn get_by_ts(&self, symbol: &str, bucket: &str, ts: &str) -> Option<&GexSnapshot> {
        self.snapshots
            .get(&key(symbol, bucket))?
            .iter()
            .rev()
            .find(|stored| stored.ts == ts)
            .map(|stored| &stored.snapshot)
    }

    pub fn len(&self, symbol: &str, bucket: &str) -> usize {
        self.snapshots.get(&key(symbol, bucket)).map_or(0, VecDeque::len)
    }

    /// The last `limit` snapshots as a time series, oldest first.
    ///
    /// Net and gross GEX come from the published summary and are `None` when
    /// a snapshot has none.
    pub fn history_points(&self, symbol: &str, bucket: &str, limit: usize) -> Vec<HistoryPoint> {
        let Some(entries) = self.snapshots.get(&key(symbol, bucket)) else {
            return Vec::new();
        };

        entries
            .iter()
            .skip(entries.len().saturating_sub(limit))
            .map(|stored| {
                let snapshot = &stored.snapshot;
                let summary = snapshot.summary.unwrap_or_default();
                HistoryPoint {
                    ts: snapshot.meta.ts.clone().unwrap_or_else(|| stored.ts.clone()),
                    spot: snapshot.meta.spot,
                    net_gex: summary.net_gex,
                    gross_gex: summary.gross_gex,
                }
            })
            .collect()
    }

    /// Record alerts, newest first
    pub fn add_alerts(&mut self, alerts: impl IntoIterator<Item = Alert>) {
        for alert in alerts {
            self.alerts.push_front(alert);
        }
        self.alerts.truncate(self.max_alerts);
    }

    /// Up to `limit` recent alerts, newest first, optionally for one symbol
    pub fn recent_alerts(&self, symbol: Option<&str>, limit: usize) -> Vec<&Alert> {
        self.alerts
            .iter()
            .filter(|alert| match symbol {
                Some(symbol) => alert
                    .symbol
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(symbol)),
                None => true,
            })
            .take(limit)
            .collect()
    }

    /// Store a snapshot and return the alerts raised against the previous one
    /// for the same key.
    ///
    /// Summaries are resolved by `engine`, with published levels laid over
    /// them. Snapshots without a symbol or with an unknown bucket are rejected.
    pub fn ingest(&mut self, snapshot: GexSnapshot, engine: &GexEngine) -> GexResult<Vec<Alert>> {
        let symbol = snapshot.symbol().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(GexError::data("snapshot has no symbol"));
        }
        let bucket = snapshot.try_bucket()?;

        let summary_of = |snapshot: &GexSnapshot| {
            let profile = engine.profile_from_snapshot(snapshot);
            snapshot.effective_summary(&profile.summary)
        };

        let prev = self.latest(&symbol, bucket.label()).map(|prev| summary_of(prev));
        let cur = summary_of(&snapshot);

        let alerts: Vec<Alert> = engine
            .alerts(prev.as_ref(), &cur, snapshot.spot())
            .into_iter()
            .map(|alert| alert.for_key(&symbol, bucket.label()))
            .collect();

        if !alerts.is_empty() {
            tracing::info!("{} {}: {} alerts", symbol, bucket, alerts.len());
        }

        let ts = snapshot
            .meta
            .ts
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339());
        self.add_snapshot(&symbol, bucket.label(), &ts, snapshot);
        self.add_alerts(alerts.clone());

        Ok(alerts)
    }
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PER_KEY, DEFAULT_MAX_ALERTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExpiryBucket;
    use crate::data::SummaryOverrides;
    use crate::profile::AlertKind;

    fn snap(symbol: &str, ts: &str, net_gex: f64) -> GexSnapshot {
        let mut snapshot = GexSnapshot::empty(symbol, ExpiryBucket::Total, 500.0);
        snapshot.meta.ts = Some(ts.to_string());
        snapshot.summary = Some(SummaryOverrides {
            net_gex: Some(net_gex),
            gross_gex: Some(net_gex.abs() * 2.0),
            ..Default::default()
        });
        snapshot
    }

    #[test]
    fn test_bounded_per_key() {
        let mut history = SnapshotHistory::new(3, 10);
        for i in 0..5 {
            history.add_snapshot("spy", "total", &format!("t{}", i), snap("SPY", &format!("t{}", i), i as f64));
        }
        history.add_snapshot("QQQ", "TOTAL", "q0", snap("QQQ", "q0", 1.0));

        assert_eq!(history.len("SPY", "TOTAL"), 3);
        assert_eq!(history.len("qqq", "total"), 1);
        assert!(history.get_by_ts("SPY", "TOTAL", "t1").is_none());
        assert_eq!(
            history.get_by_ts("SPY", "TOTAL", "t3").unwrap().meta.ts.as_deref(),
            Some("t3")
        );
        assert_eq!(
            history.latest("SPY", "TOTAL").unwrap().meta.ts.as_deref(),
            Some("t4")
        );
        assert!(history.latest("SPY", "WEEKLY").is_none());
    }

    #[test]
    fn test_history_points() {
        let mut history = SnapshotHistory::default();
        for i in 0..4 {
            let ts = format!("t{}", i);
            history.add_snapshot("SPY", "TOTAL", &ts, snap("SPY", &ts, 10.0 * i as f64));
        }
        let mut bare = GexSnapshot::empty("SPY", ExpiryBucket::Total, 501.0);
        bare.meta.ts = None;
        history.add_snapshot("SPY", "TOTAL", "stored-ts", bare);

        let points = history.history_points("SPY", "TOTAL", 3);
        let stamps: Vec<&str> = points.iter().map(|p| p.ts.as_str()).collect();
        assert_eq!(stamps, vec!["t2", "t3", "stored-ts"]);
        assert_eq!(points[0].net_gex, Some(20.0));
        assert_eq!(points[1].gross_gex, Some(60.0));
        assert_eq!(points[2].net_gex, None);
        assert_eq!(points[2].spot, Some(501.0));

        assert!(history.history_points("IWM", "TOTAL", 10).is_empty());
    }

    #[test]
    fn test_ingest_raises_alerts_against_previous() {
        let engine = GexEngine::new();
        let mut history = SnapshotHistory::default();

        assert!(history.ingest(snap("spy", "t0", 1.0e9), &engine).unwrap().is_empty());

        let alerts = history.ingest(snap("SPY", "t1", -1.0e9), &engine).unwrap();
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::NetGexFlip, AlertKind::NetGexSpike]);
        assert_eq!(alerts[0].symbol.as_deref(), Some("SPY"));
        assert_eq!(alerts[0].bucket.as_deref(), Some("TOTAL"));

        // A different symbol has no previous snapshot
        assert!(history.ingest(snap("QQQ", "q0", -1.0e9), &engine).unwrap().is_empty());

        assert_eq!(history.len("SPY", "TOTAL"), 2);
        assert_eq!(history.recent_alerts(None, 10).len(), 2);
        assert_eq!(history.recent_alerts(Some("spy"), 1)[0].kind, AlertKind::NetGexSpike);
        assert!(history.recent_alerts(Some("QQQ"), 10).is_empty());
    }

    #[test]
    fn test_ingest_rejects_unkeyed_snapshots() {
        let engine = GexEngine::new();
        let mut history = SnapshotHistory::default();

        let no_symbol = GexSnapshot::from_json(r#"{"meta": {"spot": 500}}"#).unwrap();
        assert!(matches!(history.ingest(no_symbol, &engine), Err(GexError::Data(_))));

        let bad_bucket =
            GexSnapshot::from_json(r#"{"meta": {"spot": 500, "symbol": "SPY", "bucket": "YEARLY"}}"#)
                .unwrap();
        assert!(matches!(history.ingest(bad_bucket, &engine), Err(GexError::Data(_))));
        assert_eq!(history.len("SPY", "TOTAL"), 0);
    }

    #[test]
    fn test_alert_log_is_bounded() {
        let mut history = SnapshotHistory::new(10, 3);
        let engine = GexEngine::new();
        let mut net = 1.0e9;
        for i in 0..4 {
            history.ingest(snap("SPY", &format!("t{}", i), net), &engine).unwrap();
            net = -net;
        }
        assert_eq!(history.recent_alerts(None, 100).len(), 3);
    }
}
