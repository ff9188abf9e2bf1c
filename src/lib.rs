//! # GEX Profile - Dealer Gamma Exposure Engine
//!
//! Builds per-strike gamma exposure (GEX) profiles from option-chain snapshots
//! and derives the levels options-flow traders watch.
//!
//! ## Overview
//!
//! The pipeline is a pure one-way transformation, recomputed on every refresh:
//! - **Strike aggregation**: raw per-strike arrays or per-contract greeks into
//!   `StrikeRecord`s
//! - **Level resolution**: zero gamma (gamma flip), call wall, put wall, max
//!   gamma, gross/net totals
//! - **Range filter**: display windows around spot for the dashboard and the
//!   full GEX page
//! - **Alerts**: level shifts between consecutive snapshots, kept with a
//!   bounded snapshot history
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gex_profile::prelude::*;
//!
//! let snapshot = GexSnapshot::from_path("spy_total.json").unwrap();
//!
//! let engine = GexEngine::new();
//! let profile = engine.profile_from_snapshot(&snapshot);
//!
//! // Prefer upstream levels where the backend published them
//! let levels = snapshot.effective_summary(&profile.summary);
//! println!("Gamma flip: {:.2}", levels.zero_gamma);
//!
//! let window = engine.dashboard_window(&profile);
//! println!("{} strikes on the dashboard", window.len());
//! ```
//!
//! ## Failure model
//!
//! The core never fails: empty input resolves every level to spot, and NaN or
//! missing numbers count as 0. Only file and cache I/O return `GexResult`.

pub mod core;
pub mod data;
pub mod profile;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        ContractGreeks, ExpiryBucket, GexError, GexResult, OptionType, StrikeRecord,
    };

    // Snapshot I/O
    pub use crate::data::{
        load_or_synthetic, reference_spot, CacheConfig, FixtureProvider, GexSnapshot,
        HistoryPoint, SeededSyntheticProvider, SnapshotCache, SnapshotHistory, SnapshotMeta,
        SummaryOverrides, SyntheticDataProvider,
    };

    // Profile pipeline
    pub use crate::profile::{
        aggregate_bucket,
        aggregate_contracts,
        aggregate_profile,
        around_spot,
        build_profile,
        compute_alerts,
        build_profile_with_config,
        filter_range,
        find_clusters,
        resolve_levels,
        strike_spacing,
        zero_gamma,
        AggregationStats,
        Alert,
        AlertKind,
        AlertRuleSettings,
        ClusterConfig,
        ClusterZone,
        ComputeSettings,
        DisplayWindow,
        // Config
        EngineConfig,
        // Engine
        GexEngine,
        GexProfile,
        GexSide,
        KeyLevel,
        KeyLevelKind,
        LevelSummary,
        RangeConfig,
        RawProfile,
        Regime,
    };
}

// Re-export main types at crate root
pub use crate::core::{GexError, GexResult, StrikeRecord};
pub use crate::profile::{GexEngine, GexProfile, LevelSummary};
