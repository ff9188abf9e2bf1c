//! Level shift alerts
//!
//! Compares the level summaries of two consecutive snapshots and reports the
//! moves worth a trader's attention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LevelSummary;

/// Alert thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertRuleSettings {
    /// Relative change in net GEX that raises a spike alert
    /// Default: 0.35
    pub net_gex_change_pct_threshold: f64,

    /// Gamma flip move, as a fraction of spot, that raises a shift alert
    /// Default: 0.004
    pub gamma_flip_shift_pct_threshold: f64,

    /// Call/put wall move in points that raises a shift alert
    /// Default: 10
    pub wall_shift_points_threshold: f64,
}

impl Default for AlertRuleSettings {
    fn default() -> Self {
        Self {
            net_gex_change_pct_threshold: 0.35,
            gamma_flip_shift_pct_threshold: 0.004,
            wall_shift_points_threshold: 10.0,
        }
    }
}

/// Kind of level shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    /// Net GEX changed sign
    NetGexFlip,
    /// Net GEX moved by more than the spike threshold
    NetGexSpike,
    /// Gamma flip level moved
    GammaFlipShift,
    /// Call or put wall moved
    WallShift,
}

impl AlertKind {
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::NetGexFlip => "NET_GEX_FLIP",
            AlertKind::NetGexSpike => "NET_GEX_SPIKE",
            AlertKind::GammaFlipShift => "GAMMA_FLIP_SHIFT",
            AlertKind::WallShift => "WALL_SHIFT",
        }
    }
}

/// A single alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub ts: DateTime<Utc>,
    pub kind: AlertKind,
    pub title: String,
    pub detail: String,
    pub symbol: Option<String>,
    pub bucket: Option<String>,
}

impl Alert {
    fn new(kind: AlertKind, title: impl Into<String>, detail: String) -> Self {
        Self {
            ts: Utc::now(),
            kind,
            title: title.into(),
            detail,
            symbol: None,
            bucket: None,
        }
    }

    /// Tag with the snapshot key it was raised for
    pub fn for_key(mut self, symbol: &str, bucket: &str) -> Self {
        self.symbol = Some(symbol.to_ascii_uppercase());
        self.bucket = Some(bucket.to_ascii_uppercase());
        self
    }
}

/// Relative change, 0 when there is no previous value to compare against
fn pct_change(prev: f64, cur: f64) -> f64 {
    if prev == 0.0 {
        0.0
    } else {
        (cur - prev) / prev.abs()
    }
}

/// Alerts raised moving from `prev` to `cur`.
///
/// No previous summary means nothing to compare, so no alerts. The gamma flip
/// rule is skipped without a positive spot.
pub fn compute_alerts(
    prev: Option<&LevelSummary>,
    cur: &LevelSummary,
    spot: f64,
    settings: &AlertRuleSettings,
) -> Vec<Alert> {
    let Some(prev) = prev else {
        return Vec::new();
    };

    let mut alerts = Vec::new();

    let prev_net = prev.net_gex_total;
    let cur_net = cur.net_gex_total;
    if (prev_net <= 0.0 && cur_net > 0.0) || (prev_net >= 0.0 && cur_net < 0.0) {
        alerts.push(Alert::new(
            AlertKind::NetGexFlip,
            "Net GEX flipped sign",
            format!("{:.0} -> {:.0}", prev_net, cur_net),
        ));
    }

    let pct = pct_change(prev_net, cur_net).abs();
    if pct >= settings.net_gex_change_pct_threshold {
        alerts.push(Alert::new(
            AlertKind::NetGexSpike,
            "Large Net GEX change",
            format!("change {:.0}% ({:.0} -> {:.0})", pct * 100.0, prev_net, cur_net),
        ));
    }

    if spot.is_finite() && spot > 0.0 {
        let moved = (cur.zero_gamma - prev.zero_gamma).abs();
        if moved >= settings.gamma_flip_shift_pct_threshold * spot {
            alerts.push(Alert::new(
                AlertKind::GammaFlipShift,
                "Gamma Flip moved",
                format!(
                    "{:.2} -> {:.2} (spot {:.2})",
                    prev.zero_gamma, cur.zero_gamma, spot
                ),
            ));
        }
    }

    for (label, prev_wall, cur_wall) in [
        ("Call Wall", prev.call_wall, cur.call_wall),
        ("Put Wall", prev.put_wall, cur.put_wall),
    ] {
        if (cur_wall - prev_wall).abs() >= settings.wall_shift_points_threshold {
            alerts.push(Alert::new(
                AlertKind::WallShift,
                format!("{} moved", label),
                format!("{:.2} -> {:.2}", prev_wall, cur_wall),
            ));
        }
    }

    alerts
}
