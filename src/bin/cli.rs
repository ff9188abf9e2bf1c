//! GEX Profile CLI
//!
//! Loads a snapshot (or generates a synthetic one), runs the profile engine and
//! prints the resolved levels.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gex_profile::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "gex", about = "Gamma exposure profile and key levels")]
struct Args {
    /// Snapshot JSON file; synthetic data is used when missing or unreadable
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Symbol for synthetic data and cache keys
    #[arg(long, default_value = "SPY")]
    symbol: String,

    /// Expiry bucket: 0DTE, WEEKLY, MONTHLY or TOTAL
    #[arg(long, default_value = "TOTAL")]
    bucket: String,

    /// Seed for synthetic data
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Engine config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache directory for computed snapshots
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Ignore levels published in the snapshot summary
    #[arg(long)]
    prefer_local: bool,

    /// Print the profile as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let bucket = ExpiryBucket::from_label(&args.bucket)
        .with_context(|| format!("unknown bucket {:?}", args.bucket))?;

    let config = match &args.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => EngineConfig::default(),
    };
    let engine = GexEngine::with_config(config);

    let cache = match &args.cache_dir {
        Some(dir) => Some(SnapshotCache::new(CacheConfig {
            cache_dir: dir.clone(),
            ..Default::default()
        })?),
        None => None,
    };

    let cached = cache
        .as_ref()
        .and_then(|cache| cache.latest_or_miss(&args.symbol, bucket));

    let mut history = SnapshotHistory::default();
    let (snapshot, synthetic) = match cached {
        Some(snapshot) => (snapshot, false),
        None => {
            let mut provider = SeededSyntheticProvider::new(args.seed);
            let (snapshot, synthetic) =
                load_or_synthetic(args.snapshot.as_deref(), &mut provider, &args.symbol, bucket);
            if let (Some(cache), false) = (&cache, synthetic) {
                // The previous entry, however old, is the baseline for alerts
                if let Some(previous) = cache.stored(&args.symbol, bucket) {
                    if let Err(e) = history.ingest(previous, &engine) {
                        tracing::warn!("Skipping previous snapshot: {}", e);
                    }
                }
                cache.save(&args.symbol, bucket, &snapshot)?;
            }
            (snapshot, synthetic)
        }
    };

    let alerts = match history.ingest(snapshot.clone(), &engine) {
        Ok(alerts) => alerts,
        Err(e) => {
            tracing::warn!("No alerts for this snapshot: {}", e);
            Vec::new()
        }
    };

    let profile = engine.profile_from_snapshot(&snapshot);
    let summary = if args.prefer_local {
        profile.summary
    } else {
        snapshot.effective_summary(&profile.summary)
    };
    let dashboard = engine.dashboard_window(&profile);

    if args.json {
        let out = serde_json::json!({
            "profile": profile,
            "summary": summary,
            "levels": summary.key_levels(),
            "dashboard": dashboard,
            "alerts": alerts,
            "synthetic": synthetic,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let symbol = if profile.symbol.is_empty() {
        args.symbol.as_str()
    } else {
        profile.symbol.as_str()
    };

    println!("GEX Profile: {} [{}]", symbol, profile.bucket);
    println!("==========================\n");
    if synthetic {
        println!("(synthetic data)\n");
    }

    println!("Spot: {:.2}", profile.spot);
    println!("Strikes: {}", profile.records.len());
    println!("Regime: {}", summary.regime.label());
    println!("Net GEX: {:.3}B", summary.net_gex_total / 1e9);
    println!("Gross GEX: {:.3}B", summary.gross_gex_total / 1e9);
    println!("Put/Call OI: {:.2}", summary.pc_ratio);

    println!("\n--- Key Levels ---\n");
    for level in summary.key_levels() {
        println!(
            "{:<12} {:>10.2}  ({:+.2}%)",
            level.label,
            level.value,
            level.distance_pct(profile.spot) * 100.0
        );
    }

    if !profile.clusters.is_empty() {
        println!("\n--- Gamma Clusters ---\n");
        for zone in &profile.clusters {
            println!(
                "{:.0}-{:.0} peak {:.0} | {:?} | {:.3}B",
                zone.start,
                zone.end,
                zone.peak_strike,
                zone.side,
                zone.total_gex / 1e9
            );
        }
    }

    if !alerts.is_empty() {
        println!("\n--- Alerts ---\n");
        for alert in &alerts {
            println!("[{}] {}: {}", alert.kind.label(), alert.title, alert.detail);
        }
    }

    println!(
        "\n--- Dashboard Window ({:.2} - {:.2}, {} of {} strikes) ---\n",
        dashboard.lower,
        dashboard.upper,
        dashboard.len(),
        dashboard.in_range
    );
    for r in &dashboard.records {
        println!(
            "{:>8.1}  call {:>10.3}M  put {:>10.3}M  net {:>+10.3}M",
            r.strike,
            r.call_gex / 1e6,
            r.put_gex / 1e6,
            r.net_gex / 1e6
        );
    }

    Ok(())
}
