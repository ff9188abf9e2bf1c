//! Snapshot I/O
//!
//! Handles:
//! - Snapshot JSON documents and upstream summary overrides
//! - Local snapshot caching
//! - Bounded in-memory snapshot and alert history
//! - Synthetic snapshots when live data is unavailable

pub mod cache;
pub mod history;
pub mod snapshot;
pub mod synthetic;

pub use cache::*;
pub use history::*;
pub use snapshot::*;
pub use synthetic::*;

use std::path::Path;

use crate::core::ExpiryBucket;

/// Load a snapshot file, falling back to synthetic data on any failure.
///
/// Returns the snapshot and whether it is synthetic.
pub fn load_or_synthetic(
    path: Option<&Path>,
    provider: &mut dyn SyntheticDataProvider,
    symbol: &str,
    bucket: ExpiryBucket,
) -> (GexSnapshot, bool) {
    if let Some(path) = path {
        match GexSnapshot::from_path(path) {
            Ok(snapshot) => return (snapshot, false),
            Err(e) => tracing::warn!("Failed to load snapshot {:?}: {}", path, e),
        }
    }

    tracing::info!("Using synthetic {} {} snapshot", symbol, bucket);
    (provider.snapshot(symbol, bucket), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_to_synthetic() {
        let mut provider = SeededSyntheticProvider::new(3);
        let (snap, synthetic) = load_or_synthetic(
            Some(Path::new("/nonexistent/snap.json")),
            &mut provider,
            "SPY",
            ExpiryBucket::Total,
        );

        assert!(synthetic);
        assert_eq!(snap.symbol(), "SPY");
        assert_eq!(snap.profile.strike_count(), 31);
    }

    #[test]
    fn test_real_file_preferred() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        std::fs::write(&path, r#"{"meta": {"spot": 42, "symbol": "ABC"}}"#).unwrap();

        let mut provider = SeededSyntheticProvider::new(3);
        let (snap, synthetic) =
            load_or_synthetic(Some(&path), &mut provider, "SPY", ExpiryBucket::Total);

        assert!(!synthetic);
        assert_eq!(snap.symbol(), "ABC");
        assert_eq!(snap.spot(), 42.0);
    }
}
