//! Stage 1: Strike Aggregation
//!
//! Turns raw per-strike arrays, or raw per-contract greeks, into `StrikeRecord`s.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::ComputeSettings;
use crate::core::{
    finite_or_zero, oi_count, ContractGreeks, ExpiryBucket, OptionType, StrikeRecord,
};

/// Per-strike parallel arrays as published in a snapshot `profile` block.
///
/// Arrays may be missing, `null`, shorter or longer than `strikes`, and may
/// contain `null` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProfile {
    pub strikes: Option<Vec<Option<f64>>>,
    pub call_gex: Option<Vec<Option<f64>>>,
    pub put_gex: Option<Vec<Option<f64>>>,
    pub net_gex: Option<Vec<Option<f64>>>,
    pub call_oi: Option<Vec<Option<f64>>>,
    pub put_oi: Option<Vec<Option<f64>>>,
}

fn wrap(values: &[f64]) -> Option<Vec<Option<f64>>> {
    Some(values.iter().copied().map(Some).collect())
}

impl RawProfile {
    /// Build from plain arrays, leaving `net_gex` to be derived
    pub fn from_arrays(
        strikes: &[f64],
        call_gex: &[f64],
        put_gex: &[f64],
        call_oi: &[f64],
        put_oi: &[f64],
    ) -> Self {
        Self {
            strikes: wrap(strikes),
            call_gex: wrap(call_gex),
            put_gex: wrap(put_gex),
            net_gex: None,
            call_oi: wrap(call_oi),
            put_oi: wrap(put_oi),
        }
    }

    /// Supply upstream `net_gex` values
    pub fn with_net_gex(mut self, net_gex: &[f64]) -> Self {
        self.net_gex = wrap(net_gex);
        self
    }

    /// Flatten records back into parallel arrays
    pub fn from_records(records: &[StrikeRecord]) -> Self {
        let col = |f: fn(&StrikeRecord) -> f64| -> Option<Vec<Option<f64>>> {
            Some(records.iter().map(|r| Some(f(r))).collect())
        };
        Self {
            strikes: col(|r| r.strike),
            call_gex: col(|r| r.call_gex),
            put_gex: col(|r| r.put_gex),
            net_gex: col(|r| r.net_gex),
            call_oi: col(|r| r.call_oi as f64),
            put_oi: col(|r| r.put_oi as f64),
        }
    }

    pub fn strike_count(&self) -> usize {
        self.strikes.as_ref().map_or(0, Vec::len)
    }
}

/// Value at `i`, if the array has one
fn value_at(values: &Option<Vec<Option<f64>>>, i: usize) -> Option<f64> {
    values.as_ref().and_then(|v| v.get(i).copied().flatten())
}

/// Build strike records from parallel arrays.
///
/// One record per valid strike, in input order. Missing gex/oi values read as
/// 0; arrays longer than `strikes` are ignored past its length. A present,
/// finite `net_gex` entry is kept as-is, otherwise `call_gex - put_gex`.
/// Strikes that are missing, non-finite or not positive are skipped.
pub fn aggregate_profile(raw: &RawProfile) -> Vec<StrikeRecord> {
    let strikes = match raw.strikes.as_ref() {
        Some(s) if !s.is_empty() => s,
        _ => return Vec::new(),
    };

    let mut records = Vec::with_capacity(strikes.len());
    let mut skipped = 0usize;

    for (i, strike) in strikes.iter().enumerate() {
        let strike = match strike {
            Some(k) if k.is_finite() && *k > 0.0 => *k,
            _ => {
                skipped += 1;
                continue;
            }
        };

        let call_gex = finite_or_zero(value_at(&raw.call_gex, i).unwrap_or(0.0));
        let put_gex = finite_or_zero(value_at(&raw.put_gex, i).unwrap_or(0.0));
        let call_oi = oi_count(value_at(&raw.call_oi, i).unwrap_or(0.0));
        let put_oi = oi_count(value_at(&raw.put_oi, i).unwrap_or(0.0));

        let record = match value_at(&raw.net_gex, i).filter(|n| n.is_finite()) {
            Some(net) => StrikeRecord::with_net(strike, call_gex, put_gex, net, call_oi, put_oi),
            None => StrikeRecord::new(strike, call_gex, put_gex, call_oi, put_oi),
        };
        records.push(record);
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} invalid strikes out of {}", skipped, strikes.len());
    }

    records
}

/// Why a contract was left out of an aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationStats {
    pub no_strike: usize,
    pub out_of_range: usize,
    pub low_oi: usize,
    pub wrong_expiry: usize,
    pub added: usize,
}

/// Running sums for one strike during contract aggregation
#[derive(Debug, Default)]
struct StrikeRow {
    call_gex: f64,
    put_gex: f64,
    net_gex: f64,
    call_oi: f64,
    put_oi: f64,
}

/// Aggregate raw contracts into strike records sorted by strike.
///
/// Exposure per contract is `gamma * oi * spot * gamma_multiplier`; when gamma
/// is 0 (after hours) the proxy `oi * spot * proxy_scale` stands in. Calls add
/// to net gamma and puts subtract from it.
pub fn aggregate_contracts(
    contracts: &[ContractGreeks],
    spot: f64,
    settings: &ComputeSettings,
) -> (Vec<StrikeRecord>, AggregationStats) {
    let mut stats = AggregationStats::default();
    if !(spot.is_finite() && spot > 0.0) {
        return (Vec::new(), stats);
    }

    // Keyed by strike bits: for positive finite strikes bit order is numeric order
    let mut rows: BTreeMap<u64, StrikeRow> = BTreeMap::new();

    for c in contracts {
        if !(c.strike.is_finite() && c.strike > 0.0) {
            stats.no_strike += 1;
            continue;
        }
        if c.moneyness_distance(spot) > settings.aggregation_range_pct {
            stats.out_of_range += 1;
            continue;
        }

        let oi = c.oi_or_zero();
        if oi < settings.min_oi {
            stats.low_oi += 1;
            continue;
        }
        stats.added += 1;

        let gamma = c.gamma_or_zero();
        let gex = if gamma == 0.0 {
            oi * spot * settings.proxy_scale
        } else {
            gamma * oi * spot * settings.gamma_multiplier
        };

        let row = rows.entry(c.strike.to_bits()).or_default();
        match c.right {
            OptionType::Call => {
                row.call_gex += gex;
                row.call_oi += oi;
            }
            OptionType::Put => {
                row.put_gex += gex;
                row.put_oi += oi;
            }
        }
        row.net_gex += c.right.phi() * gex;
    }

    tracing::debug!(
        "Contract filter stats: {:?}, resulting strikes: {}",
        stats,
        rows.len()
    );

    let records = rows
        .into_iter()
        .map(|(bits, row)| {
            StrikeRecord::with_net(
                f64::from_bits(bits),
                row.call_gex,
                row.put_gex,
                row.net_gex,
                oi_count(row.call_oi),
                oi_count(row.put_oi),
            )
        })
        .collect();

    (records, stats)
}

/// Aggregate only the contracts whose expiry falls in `bucket`.
///
/// At most `settings.max_expirations` of the bucket's expirations are used,
/// nearest first.
pub fn aggregate_bucket(
    contracts: &[ContractGreeks],
    spot: f64,
    bucket: ExpiryBucket,
    today: chrono::NaiveDate,
    settings: &ComputeSettings,
) -> (Vec<StrikeRecord>, AggregationStats) {
    let mut expirations: Vec<chrono::NaiveDate> = contracts.iter().map(|c| c.expiry).collect();
    expirations.sort();
    expirations.dedup();

    let selected: HashSet<chrono::NaiveDate> = bucket
        .filter_expirations(&expirations, today)
        .into_iter()
        .take(settings.max_expirations)
        .collect();

    let kept: Vec<ContractGreeks> = contracts
        .iter()
        .filter(|c| selected.contains(&c.expiry))
        .cloned()
        .collect();

    let (records, mut stats) = aggregate_contracts(&kept, spot, settings);
    stats.wrong_expiry = contracts.len() - kept.len();
    (records, stats)
}
