//! Per-strike exposure records

use serde::{Deserialize, Serialize};

/// Aggregated gamma exposure at one strike
///
/// `put_gex` is kept as a non-negative magnitude; renderers apply the sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeRecord {
    /// Strike price (> 0)
    pub strike: f64,
    /// Call dollar gamma
    pub call_gex: f64,
    /// Put dollar gamma (magnitude)
    pub put_gex: f64,
    /// Net dealer gamma, `call_gex - put_gex` unless supplied upstream
    pub net_gex: f64,
    /// Call open interest
    pub call_oi: u64,
    /// Put open interest
    pub put_oi: u64,
}

impl StrikeRecord {
    /// Build a record with `net_gex` derived from the call and put sides
    pub fn new(strike: f64, call_gex: f64, put_gex: f64, call_oi: u64, put_oi: u64) -> Self {
        Self {
            strike,
            call_gex,
            put_gex,
            net_gex: call_gex - put_gex,
            call_oi,
            put_oi,
        }
    }

    /// Build a record trusting an upstream `net_gex`
    pub fn with_net(
        strike: f64,
        call_gex: f64,
        put_gex: f64,
        net_gex: f64,
        call_oi: u64,
        put_oi: u64,
    ) -> Self {
        Self {
            strike,
            call_gex,
            put_gex,
            net_gex,
            call_oi,
            put_oi,
        }
    }

    /// Call plus put gamma at this strike
    pub fn total_gex(&self) -> f64 {
        self.call_gex + self.put_gex
    }

    /// Total open interest at this strike
    pub fn total_oi(&self) -> u64 {
        self.call_oi.saturating_add(self.put_oi)
    }
}

/// Read a possibly missing or malformed number as 0
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Convert a raw open-interest number to a contract count
pub fn oi_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
