//! Configuration for the GEX profile pipeline

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AlertRuleSettings;
use crate::core::{GexError, GexResult};

/// Configuration for the whole engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Contract aggregation
    pub compute: ComputeSettings,
    /// Cluster detection
    pub clusters: ClusterConfig,
    /// Dashboard mini-profile window
    pub dashboard: RangeConfig,
    /// Full GEX page window
    pub full: RangeConfig,
    /// Level shift alert thresholds
    pub alerts: AlertRuleSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compute: ComputeSettings::default(),
            clusters: ClusterConfig::default(),
            dashboard: RangeConfig::default(),
            full: RangeConfig::full_page(),
            alerts: AlertRuleSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Wide windows, no down-sampling
    pub fn wide() -> Self {
        Self {
            dashboard: RangeConfig {
                pct: 0.15,
                max_count: None,
            },
            full: RangeConfig {
                pct: 0.25,
                max_count: None,
            },
            ..Default::default()
        }
    }

    /// Tight windows for small screens
    pub fn compact() -> Self {
        Self {
            dashboard: RangeConfig {
                pct: 0.05,
                max_count: Some(20),
            },
            full: RangeConfig {
                pct: 0.10,
                max_count: Some(60),
            },
            ..Default::default()
        }
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_path(path: impl AsRef<Path>) -> GexResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GexResult<()> {
        for (name, range) in [("dashboard", &self.dashboard), ("full", &self.full)] {
            if !(range.pct.is_finite() && range.pct >= 0.0) {
                return Err(GexError::invalid_input(format!(
                    "{} window pct must be a non-negative number, got {}",
                    name, range.pct
                )));
            }
        }
        let thresholds = [
            ("net_gex_change_pct_threshold", self.alerts.net_gex_change_pct_threshold),
            ("gamma_flip_shift_pct_threshold", self.alerts.gamma_flip_shift_pct_threshold),
            ("wall_shift_points_threshold", self.alerts.wall_shift_points_threshold),
        ];
        for (name, value) in thresholds {
            if !(value.is_finite() && value >= 0.0) {
                return Err(GexError::invalid_input(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !(self.compute.aggregation_range_pct > 0.0) {
            return Err(GexError::invalid_input(
                "aggregation_range_pct must be positive",
            ));
        }
        Ok(())
    }
}

/// Contract → strike aggregation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeSettings {
    /// Contracts with less open interest are skipped
    /// Default: 1
    pub min_oi: f64,

    /// Contracts further than this fraction from spot are skipped
    /// Default: 0.30
    pub aggregation_range_pct: f64,

    /// Shares per contract
    /// Default: 100
    pub gamma_multiplier: f64,

    /// Exposure proxy `oi * spot * proxy_scale` used when gamma is 0
    /// Default: 0.001
    pub proxy_scale: f64,

    /// Expirations aggregated per bucket
    /// Default: 5
    pub max_expirations: usize,
}

impl Default for ComputeSettings {
    fn default() -> Self {
        Self {
            min_oi: 1.0,
            aggregation_range_pct: 0.30,
            gamma_multiplier: 100.0,
            proxy_scale: 0.001,
            max_expirations: 5,
        }
    }
}

/// Cluster zone detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Fraction of strikes ranked above the threshold strike
    /// Default: 0.15
    pub top_fraction: f64,

    /// Maximum clusters reported
    /// Default: 5
    pub max_clusters: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            top_fraction: 0.15,
            max_clusters: 5,
        }
    }
}

/// A display window around spot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Half-width as a fraction of spot
    pub pct: f64,
    /// Down-sample above this many strikes
    pub max_count: Option<usize>,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            pct: 0.10,
            max_count: Some(40),
        }
    }
}

impl RangeConfig {
    /// The full-page window
    pub fn full_page() -> Self {
        Self {
            pct: 0.15,
            max_count: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.dashboard.pct, 0.10);
        assert_eq!(config.dashboard.max_count, Some(40));
        assert_eq!(config.full, RangeConfig::full_page());
        assert_eq!(config.compute.gamma_multiplier, 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"full": {{"pct": 0.2, "max_count": 100}}}}"#).unwrap();

        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.full.pct, 0.2);
        assert_eq!(config.full.max_count, Some(100));
        assert_eq!(config.dashboard, RangeConfig::default());
        assert_eq!(config.clusters.max_clusters, 5);
    }

    #[test]
    fn test_invalid_pct_rejected() {
        let mut config = EngineConfig::default();
        config.dashboard.pct = -0.1;
        assert!(matches!(config.validate(), Err(GexError::InvalidInput(_))));
    }

    #[test]
    fn test_alert_thresholds_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"alerts": {{"wall_shift_points_threshold": 5}}}}"#).unwrap();

        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.alerts.wall_shift_points_threshold, 5.0);
        assert_eq!(config.alerts.net_gex_change_pct_threshold, 0.35);

        let mut config = EngineConfig::default();
        config.alerts.gamma_flip_shift_pct_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_presets() {
        let compact = EngineConfig::compact();
        let wide = EngineConfig::wide();
        assert!(compact.dashboard.pct < wide.dashboard.pct);
        assert!(wide.full.max_count.is_none());
    }
}
