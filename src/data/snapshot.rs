//! GEX snapshot documents
//!
//! The JSON shape published by the snapshot backend. Only the fields the
//! engine reads are modelled; anything else is ignored on load.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::{ExpiryBucket, GexError, GexResult};
use crate::profile::{GexProfile, LevelSummary, RawProfile, Regime};

/// Snapshot metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotMeta {
    /// Underlying price at snapshot time
    pub spot: Option<f64>,
    pub symbol: Option<String>,
    pub bucket: Option<String>,
    /// ISO-8601 timestamp
    pub ts: Option<String>,
    pub contract_count: Option<usize>,
}

/// Upstream precomputed levels.
///
/// When present these are authoritative over locally resolved values; the
/// caller decides per field by calling [`SummaryOverrides::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOverrides {
    #[serde(alias = "zero_gamma")]
    pub gamma_flip: Option<f64>,
    pub call_wall: Option<f64>,
    pub put_wall: Option<f64>,
    pub max_gamma: Option<f64>,
    pub net_gex: Option<f64>,
    pub gross_gex: Option<f64>,
    pub call_gex_total: Option<f64>,
    pub put_gex_total: Option<f64>,
    pub pc_ratio: Option<f64>,
    pub regime: Option<Regime>,
}

impl SummaryOverrides {
    /// Overrides carrying every field of `summary`
    pub fn from_summary(summary: &LevelSummary) -> Self {
        Self {
            gamma_flip: Some(summary.zero_gamma),
            call_wall: Some(summary.call_wall),
            put_wall: Some(summary.put_wall),
            max_gamma: Some(summary.max_gamma),
            net_gex: Some(summary.net_gex_total),
            gross_gex: Some(summary.gross_gex_total),
            call_gex_total: Some(summary.call_gex_total),
            put_gex_total: Some(summary.put_gex_total),
            pc_ratio: Some(summary.pc_ratio),
            regime: Some(summary.regime),
        }
    }

    /// Replace each local value with the upstream one where upstream has a
    /// finite value.
    ///
    /// The regime follows the upstream regime when given, otherwise the
    /// merged net total whenever upstream overrode it.
    pub fn apply(&self, local: &LevelSummary) -> LevelSummary {
        let finite = |upstream: Option<f64>| upstream.filter(|v| v.is_finite());
        let pick = |upstream: Option<f64>, local: f64| finite(upstream).unwrap_or(local);

        let net_gex_total = pick(self.net_gex, local.net_gex_total);
        let regime = match (self.regime, finite(self.net_gex)) {
            (Some(regime), _) => regime,
            (None, Some(net)) => Regime::from_net(net, true),
            (None, None) => local.regime,
        };

        LevelSummary {
            zero_gamma: pick(self.gamma_flip, local.zero_gamma),
            call_wall: pick(self.call_wall, local.call_wall),
            put_wall: pick(self.put_wall, local.put_wall),
            max_gamma: pick(self.max_gamma, local.max_gamma),
            net_gex_total,
            gross_gex_total: pick(self.gross_gex, local.gross_gex_total),
            call_gex_total: pick(self.call_gex_total, local.call_gex_total),
            put_gex_total: pick(self.put_gex_total, local.put_gex_total),
            pc_ratio: pick(self.pc_ratio, local.pc_ratio),
            regime,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.regime.is_none() && self.fields().iter().all(Option::is_none)
    }

    /// Whether every level is supplied upstream
    pub fn is_complete(&self) -> bool {
        self.regime.is_some() && self.fields().iter().all(Option::is_some)
    }

    fn fields(&self) -> [Option<f64>; 9] {
        [
            self.gamma_flip,
            self.call_wall,
            self.put_wall,
            self.max_gamma,
            self.net_gex,
            self.gross_gex,
            self.call_gex_total,
            self.put_gex_total,
            self.pc_ratio,
        ]
    }
}

/// A full GEX snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GexSnapshot {
    pub meta: SnapshotMeta,
    pub profile: RawProfile,
    pub summary: Option<SummaryOverrides>,
}

impl GexSnapshot {
    /// Snapshot with no strikes, stamped now
    pub fn empty(symbol: &str, bucket: ExpiryBucket, spot: f64) -> Self {
        Self {
            meta: SnapshotMeta {
                spot: Some(spot),
                symbol: Some(symbol.to_ascii_uppercase()),
                bucket: Some(bucket.label().to_string()),
                ts: Some(Utc::now().to_rfc3339()),
                contract_count: Some(0),
            },
            profile: RawProfile::default(),
            summary: None,
        }
    }

    /// Publish a computed profile as a snapshot, summary included
    pub fn from_profile(profile: &GexProfile) -> Self {
        Self {
            meta: SnapshotMeta {
                spot: Some(profile.spot),
                symbol: Some(profile.symbol.clone()),
                bucket: Some(profile.bucket.clone()),
                ts: Some(Utc::now().to_rfc3339()),
                contract_count: None,
            },
            profile: RawProfile::from_records(&profile.records),
            summary: Some(SummaryOverrides::from_summary(&profile.summary)),
        }
    }

    pub fn from_json(json: &str) -> GexResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> GexResult<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let snapshot: GexSnapshot = serde_json::from_reader(reader)?;
        tracing::debug!(
            "Loaded snapshot for {} with {} strikes from {:?}",
            snapshot.symbol(),
            snapshot.profile.strike_count(),
            path.as_ref()
        );
        Ok(snapshot)
    }

    pub fn to_json(&self) -> GexResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Spot price; missing or malformed reads as 0
    pub fn spot(&self) -> f64 {
        self.meta.spot.filter(|s| s.is_finite()).unwrap_or(0.0)
    }

    pub fn symbol(&self) -> &str {
        self.meta.symbol.as_deref().unwrap_or("")
    }

    pub fn bucket_label(&self) -> &str {
        self.meta.bucket.as_deref().unwrap_or(ExpiryBucket::Total.label())
    }

    pub fn bucket(&self) -> ExpiryBucket {
        ExpiryBucket::from_label(self.bucket_label()).unwrap_or_default()
    }

    /// Expiry bucket, rejecting labels that name no known bucket
    pub fn try_bucket(&self) -> GexResult<ExpiryBucket> {
        ExpiryBucket::from_label(self.bucket_label()).ok_or_else(|| {
            GexError::data(format!("unknown expiry bucket {:?}", self.bucket_label()))
        })
    }

    /// Local summary with any upstream levels laid over it
    pub fn effective_summary(&self, local: &LevelSummary) -> LevelSummary {
        match &self.summary {
            Some(overrides) => overrides.apply(local),
            None => *local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::build_profile;
    use std::io::Write;

    #[test]
    fn test_parse_minimal() {
        let snap = GexSnapshot::from_json(r#"{"meta": {"spot": 512.3}}"#).unwrap();
        assert_eq!(snap.spot(), 512.3);
        assert_eq!(snap.symbol(), "");
        assert_eq!(snap.bucket(), ExpiryBucket::Total);
        assert_eq!(snap.profile.strike_count(), 0);
        assert!(snap.summary.is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(GexSnapshot::from_json("not json").is_err());
    }

    #[test]
    fn test_overrides_partial() {
        let local = LevelSummary::at_spot(100.0);
        let overrides = SummaryOverrides {
            gamma_flip: Some(98.5),
            call_wall: Some(f64::NAN),
            net_gex: Some(-1.0e9),
            ..Default::default()
        };

        let merged = overrides.apply(&local);
        assert_eq!(merged.zero_gamma, 98.5);
        assert_eq!(merged.call_wall, 100.0);
        assert_eq!(merged.net_gex_total, -1.0e9);
        assert_eq!(merged.put_wall, 100.0);
        // Overridden net without an upstream regime re-derives it
        assert_eq!(merged.regime, Regime::NegativeGamma);
        assert_eq!(merged.pc_ratio, 1.0);
        assert!(!overrides.is_empty());
        assert!(!overrides.is_complete());
        assert!(SummaryOverrides::default().is_empty());
    }

    #[test]
    fn test_upstream_regime_and_totals_win() {
        let snap = GexSnapshot::from_json(
            r#"{
                "meta": {"spot": 100},
                "profile": {"strikes": [95, 100, 105], "call_gex": [5, 9, 4], "put_gex": [1, 2, 1]},
                "summary": {
                    "net_gex": -5e9,
                    "regime": "NEGATIVE_GAMMA",
                    "pc_ratio": 2.5,
                    "call_gex_total": 1e9,
                    "put_gex_total": 6e9,
                    "clusters": []
                }
            }"#,
        )
        .unwrap();
        let profile = build_profile(&snap);
        assert_eq!(profile.summary.regime, Regime::PositiveGamma);

        let effective = snap.effective_summary(&profile.summary);
        assert_eq!(effective.net_gex_total, -5e9);
        assert_eq!(effective.regime, Regime::NegativeGamma);
        assert_eq!(effective.pc_ratio, 2.5);
        assert_eq!(effective.call_gex_total, 1e9);
        assert_eq!(effective.put_gex_total, 6e9);
        // Levels upstream left out stay local
        assert_eq!(effective.call_wall, profile.summary.call_wall);
    }

    #[test]
    fn test_upstream_regime_kept_without_net() {
        let overrides = SummaryOverrides {
            regime: Some(Regime::PositiveGamma),
            ..Default::default()
        };
        let mut local = LevelSummary::at_spot(100.0);
        local.regime = Regime::NegativeGamma;

        assert_eq!(overrides.apply(&local).regime, Regime::PositiveGamma);
        assert_eq!(SummaryOverrides::default().apply(&local), local);
    }

    #[test]
    fn test_try_bucket_rejects_unknown_label() {
        let snap = GexSnapshot::from_json(r#"{"meta": {"bucket": "QUARTERLY"}}"#).unwrap();
        assert_eq!(snap.bucket(), ExpiryBucket::Total);
        assert!(matches!(snap.try_bucket(), Err(GexError::Data(_))));

        let snap = GexSnapshot::from_json(r#"{"meta": {"bucket": "weekly"}}"#).unwrap();
        assert_eq!(snap.try_bucket().unwrap(), ExpiryBucket::Weekly);
    }

    #[test]
    fn test_zero_gamma_alias() {
        let snap = GexSnapshot::from_json(r#"{"meta": {"spot": 1}, "summary": {"zero_gamma": 3.5}}"#)
            .unwrap();
        assert_eq!(snap.summary.unwrap().gamma_flip, Some(3.5));
    }

    #[test]
    fn test_effective_summary() {
        let snap = GexSnapshot::from_json(
            r#"{
                "meta": {"spot": 100},
                "profile": {"strikes": [100, 105], "net_gex": [10, -10]},
                "summary": {"call_wall": 120}
            }"#,
        )
        .unwrap();
        let profile = build_profile(&snap);

        let effective = snap.effective_summary(&profile.summary);
        assert_eq!(effective.zero_gamma, 102.5);
        assert_eq!(effective.call_wall, 120.0);
    }

    #[test]
    fn test_publish_and_reload() {
        let snap = GexSnapshot::from_json(
            r#"{
                "meta": {"spot": 100, "symbol": "SPY", "bucket": "WEEKLY"},
                "profile": {"strikes": [95, 100, 105], "call_gex": [1, 5, 2], "put_gex": [4, 1, 1]}
            }"#,
        )
        .unwrap();
        let profile = build_profile(&snap);
        let published = GexSnapshot::from_profile(&profile);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(published.to_json().unwrap().as_bytes()).unwrap();

        let reloaded = GexSnapshot::from_path(file.path()).unwrap();
        assert_eq!(reloaded.bucket(), ExpiryBucket::Weekly);
        assert!(reloaded.summary.unwrap().is_complete());
        assert_eq!(build_profile(&reloaded).records, profile.records);
    }

    #[test]
    fn test_missing_file() {
        assert!(GexSnapshot::from_path("/nonexistent/snapshot.json").is_err());
    }
}
