//! Synthetic snapshot data
//!
//! Stand-in snapshots for when the live feed is unavailable. Shaped exactly
//! like real ones so the engine treats both the same.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{GexSnapshot, SnapshotMeta, SummaryOverrides};
use crate::core::ExpiryBucket;
use crate::profile::RawProfile;

/// Strike step of generated ladders
const STRIKE_STEP: f64 = 5.0;
/// Strikes generated on each side of the base strike
const STRIKES_PER_SIDE: i32 = 15;

/// Source of snapshots used in place of live data
pub trait SyntheticDataProvider {
    fn snapshot(&mut self, symbol: &str, bucket: ExpiryBucket) -> GexSnapshot;
}

/// Reference spot for well-known underlyings, 500 otherwise
pub fn reference_spot(symbol: &str) -> f64 {
    match symbol.to_ascii_uppercase().as_str() {
        "SPY" => 591.0,
        "QQQ" => 520.0,
        "SPX" => 5905.0,
        "IWM" => 225.0,
        "NVDA" => 140.0,
        "AAPL" => 255.0,
        "TSLA" => 455.0,
        _ => 500.0,
    }
}

/// Random but reproducible snapshots from a seeded ChaCha8 generator.
///
/// Generates 31 strikes at $5 steps around spot; call and put exposure decay
/// linearly with distance from spot and vanish 20% away.
pub struct SeededSyntheticProvider {
    rng: ChaCha8Rng,
}

impl SeededSyntheticProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate around an explicit spot
    pub fn snapshot_at(&mut self, symbol: &str, bucket: ExpiryBucket, spot: f64) -> GexSnapshot {
        let base_strike = (spot / STRIKE_STEP).round() * STRIKE_STEP;
        let n = (2 * STRIKES_PER_SIDE + 1) as usize;

        let mut strikes = Vec::with_capacity(n);
        let mut call_gex = Vec::with_capacity(n);
        let mut put_gex = Vec::with_capacity(n);
        let mut call_oi = Vec::with_capacity(n);
        let mut put_oi = Vec::with_capacity(n);

        for i in -STRIKES_PER_SIDE..=STRIKES_PER_SIDE {
            let strike = base_strike + i as f64 * STRIKE_STEP;
            let decay = 1.0 - (strike - spot).abs() / spot * 5.0;

            strikes.push(strike);
            call_gex.push((200e6 * self.rng.gen_range(0.3..1.0) * decay).max(0.0));
            put_gex.push((150e6 * self.rng.gen_range(0.3..1.0) * decay).max(0.0));
            call_oi.push(self.rng.gen_range(10_000.0_f64..80_000.0).trunc());
            put_oi.push(self.rng.gen_range(10_000.0_f64..60_000.0).trunc());
        }

        let net_gex: Vec<f64> = call_gex.iter().zip(&put_gex).map(|(c, p)| c - p).collect();
        let call_wall = first_max(&strikes, &call_gex);
        let put_wall = first_max(&strikes, &put_gex);
        let zero_gamma = spot + self.rng.gen_range(-5.0..5.0);

        GexSnapshot {
            meta: SnapshotMeta {
                spot: Some(spot),
                symbol: Some(symbol.to_ascii_uppercase()),
                bucket: Some(bucket.label().to_string()),
                ts: Some(chrono::Utc::now().to_rfc3339()),
                contract_count: None,
            },
            summary: Some(SummaryOverrides {
                gamma_flip: Some(zero_gamma),
                call_wall,
                put_wall,
                net_gex: Some(net_gex.iter().sum()),
                ..Default::default()
            }),
            profile: RawProfile::from_arrays(&strikes, &call_gex, &put_gex, &call_oi, &put_oi)
                .with_net_gex(&net_gex),
        }
    }
}

impl SyntheticDataProvider for SeededSyntheticProvider {
    fn snapshot(&mut self, symbol: &str, bucket: ExpiryBucket) -> GexSnapshot {
        self.snapshot_at(symbol, bucket, reference_spot(symbol))
    }
}

fn first_max(strikes: &[f64], values: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for (&k, &v) in strikes.iter().zip(values) {
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((k, v));
        }
    }
    best.map(|(k, _)| k)
}

/// Always returns the same snapshot, re-labelled for the request
pub struct FixtureProvider {
    fixture: GexSnapshot,
}

impl FixtureProvider {
    pub fn new(fixture: GexSnapshot) -> Self {
        Self { fixture }
    }
}

impl SyntheticDataProvider for FixtureProvider {
    fn snapshot(&mut self, symbol: &str, bucket: ExpiryBucket) -> GexSnapshot {
        let mut snapshot = self.fixture.clone();
        snapshot.meta.symbol = Some(symbol.to_ascii_uppercase());
        snapshot.meta.bucket = Some(bucket.label().to_string());
        snapshot
    }
}
