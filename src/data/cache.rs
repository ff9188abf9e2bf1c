//! Local snapshot caching
//!
//! Keeps the latest snapshot per symbol and expiry bucket on disk so repeated
//! requests within the refresh interval reuse it.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use super::GexSnapshot;
use crate::core::{ExpiryBucket, GexResult};

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache directory
    pub cache_dir: PathBuf,
    /// Maximum age before refresh (in seconds)
    pub max_age_secs: i64,
    /// Whether to use cache
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/snapshots"),
            max_age_secs: 60,
            enabled: true,
        }
    }
}

/// Snapshot cache manager
pub struct SnapshotCache {
    config: CacheConfig,
}

impl SnapshotCache {
    pub fn new(config: CacheConfig) -> GexResult<Self> {
        if config.enabled && !config.cache_dir.exists() {
            fs::create_dir_all(&config.cache_dir)?;
        }

        Ok(Self { config })
    }

    /// Cache file for a symbol and bucket
    fn cache_key(&self, symbol: &str, bucket: ExpiryBucket) -> PathBuf {
        self.config.cache_dir.join(format!(
            "{}_{}.json",
            symbol.to_ascii_uppercase(),
            bucket.label()
        ))
    }

    /// Check if a cached snapshot exists and is younger than the max age
    pub fn is_valid(&self, symbol: &str, bucket: ExpiryBucket) -> bool {
        if !self.config.enabled {
            return false;
        }

        let path = self.cache_key(symbol, bucket);
        let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) else {
            return false;
        };

        let modified: DateTime<Utc> = modified.into();
        Utc::now() - modified < Duration::seconds(self.config.max_age_secs)
    }

    /// Store a snapshot, replacing any previous one for the key
    pub fn save(&self, symbol: &str, bucket: ExpiryBucket, snapshot: &GexSnapshot) -> GexResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let path = self.cache_key(symbol, bucket);
        fs::write(&path, snapshot.to_json()?)?;

        tracing::info!("Cached {} {} snapshot at {:?}", symbol, bucket, path);
        Ok(())
    }

    /// Latest valid snapshot for the key, if any
    pub fn latest(&self, symbol: &str, bucket: ExpiryBucket) -> GexResult<Option<GexSnapshot>> {
        if !self.is_valid(symbol, bucket) {
            return Ok(None);
        }

        let snapshot = GexSnapshot::from_path(self.cache_key(symbol, bucket))?;
        tracing::info!("Loaded {} {} snapshot from cache", symbol, bucket);
        Ok(Some(snapshot))
    }

    /// Like `latest`, but an unreadable cache file counts as a miss
    pub fn latest_or_miss(&self, symbol: &str, bucket: ExpiryBucket) -> Option<GexSnapshot> {
        self.latest(symbol, bucket).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable {} {} cache entry: {}", symbol, bucket, e);
            None
        })
    }

    /// Stored snapshot for the key regardless of age; unreadable files count as
    /// missing
    pub fn stored(&self, symbol: &str, bucket: ExpiryBucket) -> Option<GexSnapshot> {
        let path = self.cache_key(symbol, bucket);
        if !self.config.enabled || !path.exists() {
            return None;
        }

        match GexSnapshot::from_path(&path) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Remove every cached bucket for a symbol
    pub fn clear(&self, symbol: &str) -> GexResult<()> {
        if !self.config.cache_dir.exists() {
            return Ok(());
        }

        let prefix = format!("{}_", symbol.to_ascii_uppercase());
        for entry in fs::read_dir(&self.config.cache_dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();

            if file_name.starts_with(&prefix) && file_name.ends_with(".json") {
                fs::remove_file(entry.path())?;
            }
        }

        Ok(())
    }

    /// Symbols with at least one cached snapshot
    pub fn list_cached(&self) -> GexResult<Vec<String>> {
        let mut symbols = Vec::new();

        if !self.config.cache_dir.exists() {
            return Ok(symbols);
        }

        for entry in fs::read_dir(&self.config.cache_dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();

            let Some(stem) = file_name.strip_suffix(".json") else {
                continue;
            };
            if let Some((symbol, _bucket)) = stem.rsplit_once('_') {
                if !symbols.iter().any(|s| s == symbol) {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
