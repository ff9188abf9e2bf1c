//! Example: Resolve GEX levels from a hand-built profile
//!
//! Run with: cargo run --example gex_levels

use gex_profile::prelude::*;

fn main() {
    let spot = 500.0;

    // Call gamma builds above spot, put gamma below
    let strikes: Vec<f64> = (0..41).map(|i| 450.0 + 2.5 * i as f64).collect();
    let call_gex: Vec<f64> = strikes
        .iter()
        .map(|&k| 120e6 * (-((k - 510.0) / 15.0).powi(2)).exp())
        .collect();
    let put_gex: Vec<f64> = strikes
        .iter()
        .map(|&k| 150e6 * (-((k - 485.0) / 12.0).powi(2)).exp())
        .collect();
    let oi: Vec<f64> = strikes.iter().map(|_| 25_000.0).collect();

    let raw = RawProfile::from_arrays(&strikes, &call_gex, &put_gex, &oi, &oi);
    let records = aggregate_profile(&raw);

    let engine = GexEngine::with_config(EngineConfig::compact());
    let profile = engine.profile_from_records("DEMO", "TOTAL", spot, records);

    println!("=== GEX Levels ===\n");
    println!("Spot: {:.2}", profile.spot);
    println!("Strike spacing: {:.2}", strike_spacing(&profile.records));
    println!("Regime: {}\n", profile.summary.regime.label());

    for level in profile.key_levels() {
        println!("{:<12} {:>8.2}", level.label, level.value);
    }

    println!("\n--- Clusters ---\n");
    for zone in &profile.clusters {
        println!(
            "{:.1}-{:.1} peak {:.1} ({:?})",
            zone.start, zone.end, zone.peak_strike, zone.side
        );
    }

    let dashboard = engine.dashboard_window(&profile);
    println!(
        "\nDashboard: {} of {} strikes (stride {})",
        dashboard.len(),
        dashboard.in_range,
        dashboard.stride
    );

    let near: Vec<f64> = around_spot(&profile.records, spot, 3)
        .iter()
        .map(|r| r.strike)
        .collect();
    println!("Nearest strikes: {:?}", near);
}
