//! GexEngine - Main facade for the profile pipeline
//!
//! Combines aggregation, level resolution, clustering and range filtering into
//! a single interface.

use chrono::NaiveDate;

use crate::core::{ContractGreeks, ExpiryBucket, StrikeRecord};
use crate::data::GexSnapshot;

use super::{
    aggregate_bucket, aggregate_profile, compute_alerts, filter_with, find_clusters,
    resolve_levels, Alert, DisplayWindow, EngineConfig, GexProfile, LevelSummary,
};

/// Runs the full GEX pipeline with a fixed configuration
pub struct GexEngine {
    config: EngineConfig,
}

impl GexEngine {
    /// Create a new engine with default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Get current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Update configuration
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Build a profile from a snapshot's per-strike arrays.
    ///
    /// Upstream `summary` values are not consulted; see
    /// [`SummaryOverrides::apply`](crate::data::SummaryOverrides::apply).
    pub fn profile_from_snapshot(&self, snapshot: &GexSnapshot) -> GexProfile {
        let records = aggregate_profile(&snapshot.profile);
        self.profile_from_records(
            snapshot.symbol(),
            snapshot.bucket_label(),
            snapshot.spot(),
            records,
        )
    }

    /// Build a profile from raw contract greeks for one expiry bucket
    pub fn profile_from_contracts(
        &self,
        symbol: &str,
        spot: f64,
        bucket: ExpiryBucket,
        today: NaiveDate,
        contracts: &[ContractGreeks],
    ) -> GexProfile {
        let (records, stats) =
            aggregate_bucket(contracts, spot, bucket, today, &self.config.compute);

        tracing::debug!(
            "{} {}: {} contracts -> {} strikes ({:?})",
            symbol,
            bucket,
            contracts.len(),
            records.len(),
            stats
        );

        self.profile_from_records(symbol, bucket.label(), spot, records)
    }

    /// Resolve levels and clusters for already aggregated records
    pub fn profile_from_records(
        &self,
        symbol: &str,
        bucket: &str,
        spot: f64,
        records: Vec<StrikeRecord>,
    ) -> GexProfile {
        let summary = resolve_levels(&records, spot);
        let clusters = find_clusters(&records, &self.config.clusters);

        GexProfile {
            symbol: symbol.to_string(),
            bucket: bucket.to_string(),
            spot,
            records,
            summary,
            clusters,
        }
    }

    /// Window for the dashboard mini-profile
    pub fn dashboard_window(&self, profile: &GexProfile) -> DisplayWindow {
        filter_with(&profile.records, profile.spot, &self.config.dashboard)
    }

    /// Window for the full GEX page
    pub fn full_window(&self, profile: &GexProfile) -> DisplayWindow {
        filter_with(&profile.records, profile.spot, &self.config.full)
    }

    /// Level shift alerts between two summaries, using the configured thresholds
    pub fn alerts(
        &self,
        prev: Option<&LevelSummary>,
        cur: &LevelSummary,
        spot: f64,
    ) -> Vec<Alert> {
        compute_alerts(prev, cur, spot, &self.config.alerts)
    }
}

impl Default for GexEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to build a profile with the default configuration
pub fn build_profile(snapshot: &GexSnapshot) -> GexProfile {
    GexEngine::new().profile_from_snapshot(snapshot)
}

/// Convenience function with custom config
pub fn build_profile_with_config(snapshot: &GexSnapshot, config: EngineConfig) -> GexProfile {
    GexEngine::with_config(config).profile_from_snapshot(snapshot)
}
