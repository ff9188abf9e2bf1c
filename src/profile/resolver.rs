//! Stage 2: Level Resolution
//!
//! Derives zero gamma, walls, max gamma and totals from a strike profile.

use super::{LevelSummary, Regime};
use crate::core::{finite_or_zero, StrikeRecord};

/// Sign in {-1, 0, +1}; `f64::signum` maps 0.0 to +1.0
fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Resolve the level summary for `records` at `spot`.
///
/// Records are expected in ascending strike order. An empty profile resolves
/// every level to `spot`.
pub fn resolve_levels(records: &[StrikeRecord], spot: f64) -> LevelSummary {
    if records.is_empty() {
        return LevelSummary::at_spot(spot);
    }

    let mut net_gex_total = 0.0;
    let mut gross_gex_total = 0.0;
    let mut call_gex_total = 0.0;
    let mut put_gex_total = 0.0;
    let mut call_oi_total: u64 = 0;
    let mut put_oi_total: u64 = 0;

    for r in records {
        let net = finite_or_zero(r.net_gex);
        net_gex_total += net;
        gross_gex_total += net.abs();
        call_gex_total += finite_or_zero(r.call_gex);
        put_gex_total += finite_or_zero(r.put_gex);
        call_oi_total = call_oi_total.saturating_add(r.call_oi);
        put_oi_total = put_oi_total.saturating_add(r.put_oi);
    }

    let pc_ratio = if call_oi_total > 0 {
        put_oi_total as f64 / call_oi_total as f64
    } else {
        1.0
    };

    LevelSummary {
        zero_gamma: zero_gamma(records, spot),
        call_wall: argmax_strike(records, |r| r.call_gex).unwrap_or(spot),
        put_wall: argmax_strike(records, |r| r.put_gex).unwrap_or(spot),
        max_gamma: argmax_strike(records, |r| r.net_gex.abs()).unwrap_or(spot),
        net_gex_total,
        gross_gex_total,
        call_gex_total,
        put_gex_total,
        pc_ratio,
        regime: Regime::from_net(net_gex_total, true),
    }
}

/// Price where net gamma first changes sign, by linear interpolation between
/// adjacent strikes. Falls back to `spot` when no crossing exists.
pub fn zero_gamma(records: &[StrikeRecord], spot: f64) -> f64 {
    for pair in records.windows(2) {
        let (s1, s2) = (&pair[0], &pair[1]);
        let n1 = finite_or_zero(s1.net_gex);
        let n2 = finite_or_zero(s2.net_gex);

        if sign(n1) == sign(n2) {
            continue;
        }

        let denom = n1.abs() + n2.abs();
        if denom == 0.0 {
            continue;
        }

        return s1.strike + (s2.strike - s1.strike) * n1.abs() / denom;
    }

    spot
}

/// Strike of the record maximizing `key`; ties go to the first record
fn argmax_strike(records: &[StrikeRecord], key: impl Fn(&StrikeRecord) -> f64) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for r in records {
        let value = finite_or_zero(key(r));
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((r.strike, value)),
        }
    }
    best.map(|(strike, _)| strike)
}

/// Strike of the largest call gamma, `None` for an empty profile
pub fn call_wall(records: &[StrikeRecord]) -> Option<f64> {
    argmax_strike(records, |r| r.call_gex)
}

/// Strike of the largest put gamma, `None` for an empty profile
pub fn put_wall(records: &[StrikeRecord]) -> Option<f64> {
    argmax_strike(records, |r| r.put_gex)
}
