//! Gamma Exposure Profile
//!
//! Builds a per-strike dealer gamma profile and derives the levels traders
//! watch around it.
//!
//! Pipeline:
//! 1. **Aggregation**: raw parallel arrays (or raw contracts) → `StrikeRecord`s
//! 2. **Resolution**: records → zero gamma, call/put walls, max gamma, totals
//! 3. **Range filter**: records → display window around spot (independent of 2)
//!
//! Consecutive summaries can be diffed into level shift alerts (`alerts`).
//!
//! Every stage is a pure function of its inputs; running the pipeline twice on
//! the same data yields identical output.

mod aggregator;
mod alerts;
mod clusters;
mod config;
mod engine;
mod range;
mod resolver;

pub use aggregator::*;
pub use alerts::*;
pub use clusters::*;
pub use config::*;
pub use engine::*;
pub use range::*;
pub use resolver::*;

use serde::{Deserialize, Serialize};

use crate::core::StrikeRecord;

/// Sign of aggregate dealer gamma
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// Net gamma > 0: dealers dampen moves
    PositiveGamma,
    /// Net gamma <= 0: dealers amplify moves
    NegativeGamma,
    /// No strikes to judge from
    Unknown,
}

impl Regime {
    pub fn from_net(net_gex_total: f64, has_data: bool) -> Self {
        if !has_data {
            Regime::Unknown
        } else if net_gex_total > 0.0 {
            Regime::PositiveGamma
        } else {
            Regime::NegativeGamma
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Regime::PositiveGamma => "Positive Gamma",
            Regime::NegativeGamma => "Negative Gamma",
            Regime::Unknown => "Unknown",
        }
    }
}

/// Scalar levels derived from a strike profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    /// Price where net gamma changes sign (interpolated)
    pub zero_gamma: f64,
    /// Strike with the largest call gamma
    pub call_wall: f64,
    /// Strike with the largest put gamma
    pub put_wall: f64,
    /// Strike with the largest |net gamma|
    pub max_gamma: f64,
    /// Σ net_gex
    pub net_gex_total: f64,
    /// Σ |net_gex|
    pub gross_gex_total: f64,
    /// Σ call_gex
    pub call_gex_total: f64,
    /// Σ put_gex
    pub put_gex_total: f64,
    /// Σ put_oi / Σ call_oi (1.0 without call open interest)
    pub pc_ratio: f64,
    pub regime: Regime,
}

impl LevelSummary {
    /// Summary of an empty profile: every level sits at spot
    pub fn at_spot(spot: f64) -> Self {
        Self {
            zero_gamma: spot,
            call_wall: spot,
            put_wall: spot,
            max_gamma: spot,
            net_gex_total: 0.0,
            gross_gex_total: 0.0,
            call_gex_total: 0.0,
            put_gex_total: 0.0,
            pc_ratio: 1.0,
            regime: Regime::Unknown,
        }
    }

    /// Ordered level list for chart annotation
    pub fn key_levels(&self) -> Vec<KeyLevel> {
        vec![
            KeyLevel::new(KeyLevelKind::Flip, self.zero_gamma),
            KeyLevel::new(KeyLevelKind::CallWall, self.call_wall),
            KeyLevel::new(KeyLevelKind::PutWall, self.put_wall),
            KeyLevel::new(KeyLevelKind::MaxGamma, self.max_gamma),
        ]
    }
}

/// Kind of annotated level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyLevelKind {
    Flip,
    CallWall,
    PutWall,
    MaxGamma,
}

impl KeyLevelKind {
    pub fn label(&self) -> &'static str {
        match self {
            KeyLevelKind::Flip => "Gamma Flip",
            KeyLevelKind::CallWall => "Call Wall",
            KeyLevelKind::PutWall => "Put Wall",
            KeyLevelKind::MaxGamma => "Max Gamma",
        }
    }
}

/// A labelled price level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyLevel {
    pub label: String,
    pub value: f64,
    pub kind: KeyLevelKind,
}

impl KeyLevel {
    pub fn new(kind: KeyLevelKind, value: f64) -> Self {
        Self {
            label: kind.label().to_string(),
            value,
            kind,
        }
    }

    /// Signed distance from spot as a fraction of spot
    pub fn distance_pct(&self, spot: f64) -> f64 {
        if spot > 0.0 {
            (self.value - spot) / spot
        } else {
            0.0
        }
    }
}

/// Strike records narrowed to a price window around spot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayWindow {
    /// Records kept, in input order
    pub records: Vec<StrikeRecord>,
    /// Lower price bound (inclusive)
    pub lower: f64,
    /// Upper price bound (inclusive)
    pub upper: f64,
    /// Records in range before down-sampling
    pub in_range: usize,
    /// Stride used when down-sampling (1 = every record)
    pub stride: usize,
}

impl DisplayWindow {
    pub fn empty(lower: f64, upper: f64) -> Self {
        Self {
            records: Vec::new(),
            lower,
            upper,
            in_range: 0,
            stride: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn strikes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.strike).collect()
    }

    /// Whether down-sampling dropped records
    pub fn is_sampled(&self) -> bool {
        self.stride > 1
    }
}

/// Output of the full pipeline for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GexProfile {
    pub symbol: String,
    pub bucket: String,
    pub spot: f64,
    /// Full strike profile, in input order
    pub records: Vec<StrikeRecord>,
    /// Locally resolved levels
    pub summary: LevelSummary,
    /// Gamma concentration zones, strongest first
    pub clusters: Vec<ClusterZone>,
}

impl GexProfile {
    pub fn key_levels(&self) -> Vec<KeyLevel> {
        self.summary.key_levels()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn strikes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.strike).collect()
    }
}
