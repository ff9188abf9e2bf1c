//! Expiry buckets
//!
//! Groups option expirations by days to expiry so a profile can be built for
//! same-day, weekly, monthly or all contracts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Expirations kept when a bucket matches nothing
const FALLBACK_EXPIRIES: usize = 3;

/// Expiry bucket used to select which expirations feed a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpiryBucket {
    /// Same-day expiry only
    #[serde(rename = "0DTE")]
    ZeroDte,
    /// Up to 7 days out
    Weekly,
    /// Up to 30 days out
    Monthly,
    /// Every listed expiry
    #[default]
    Total,
}

impl ExpiryBucket {
    /// Label for display and cache keys
    pub fn label(&self) -> &'static str {
        match self {
            ExpiryBucket::ZeroDte => "0DTE",
            ExpiryBucket::Weekly => "WEEKLY",
            ExpiryBucket::Monthly => "MONTHLY",
            ExpiryBucket::Total => "TOTAL",
        }
    }

    /// Parse a label, case-insensitive
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "0DTE" => Some(ExpiryBucket::ZeroDte),
            "WEEKLY" => Some(ExpiryBucket::Weekly),
            "MONTHLY" => Some(ExpiryBucket::Monthly),
            "TOTAL" => Some(ExpiryBucket::Total),
            _ => None,
        }
    }

    /// Whether an expiry `dte` days out belongs to this bucket
    pub fn contains_days(&self, dte: i64) -> bool {
        match self {
            ExpiryBucket::ZeroDte => dte == 0,
            ExpiryBucket::Weekly => dte <= 7,
            ExpiryBucket::Monthly => dte <= 30,
            ExpiryBucket::Total => true,
        }
    }

    /// Select the expirations for this bucket, preserving input order.
    ///
    /// When nothing matches, the first three expirations are returned instead
    /// so a profile can still be drawn.
    pub fn filter_expirations(&self, expirations: &[NaiveDate], today: NaiveDate) -> Vec<NaiveDate> {
        if *self == ExpiryBucket::Total {
            return expirations.to_vec();
        }

        let selected: Vec<NaiveDate> = expirations
            .iter()
            .copied()
            .filter(|exp| self.contains_days((*exp - today).num_days()))
            .collect();

        if selected.is_empty() {
            expirations.iter().copied().take(FALLBACK_EXPIRIES).collect()
        } else {
            selected
        }
    }
}

impl std::fmt::Display for ExpiryBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
