//! Option contract inputs
//!
//! Raw per-contract greeks as delivered by an option-chain provider, before
//! they are aggregated into strike records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(alias = "C", alias = "CALL", alias = "call")]
    Call,
    #[serde(alias = "P", alias = "PUT", alias = "put")]
    Put,
}

impl OptionType {
    /// Dealer gamma direction: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Parse a provider "right" field ("C", "P", "call", "PUT", ...)
    pub fn from_right(right: &str) -> Option<Self> {
        match right.trim().to_ascii_uppercase().as_str() {
            "C" | "CALL" => Some(OptionType::Call),
            "P" | "PUT" => Some(OptionType::Put),
            _ => None,
        }
    }
}

/// Greeks and open interest for a single option contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractGreeks {
    /// Strike price
    pub strike: f64,
    /// Call or put
    pub right: OptionType,
    /// Expiration date
    pub expiry: NaiveDate,
    /// Per-share gamma (missing or zero after hours)
    #[serde(default)]
    pub gamma: Option<f64>,
    /// Open interest in contracts
    #[serde(default, alias = "oi")]
    pub open_interest: Option<f64>,
}

impl ContractGreeks {
    pub fn new(
        strike: f64,
        right: OptionType,
        expiry: NaiveDate,
        gamma: f64,
        open_interest: f64,
    ) -> Self {
        Self {
            strike,
            right,
            expiry,
            gamma: Some(gamma),
            open_interest: Some(open_interest),
        }
    }

    /// Gamma, with missing or non-finite values read as 0
    pub fn gamma_or_zero(&self) -> f64 {
        self.gamma.filter(|g| g.is_finite()).unwrap_or(0.0)
    }

    /// Open interest, with missing, negative or non-finite values read as 0
    pub fn oi_or_zero(&self) -> f64 {
        self.open_interest
            .filter(|oi| oi.is_finite())
            .map(|oi| oi.max(0.0))
            .unwrap_or(0.0)
    }

    /// Calendar days to expiry from `today`
    pub fn days_to_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry - today).num_days()
    }

    /// Distance from spot as a fraction of spot
    pub fn moneyness_distance(&self, spot: f64) -> f64 {
        (self.strike - spot).abs() / spot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type() {
        assert_eq!(OptionType::Call.phi(), 1.0);
        assert_eq!(OptionType::Put.phi(), -1.0);

        assert_eq!(OptionType::from_right("c"), Some(OptionType::Call));
        assert_eq!(OptionType::from_right(" PUT "), Some(OptionType::Put));
        assert_eq!(OptionType::from_right("X"), None);
    }

    #[test]
    fn test_contract_deserialize_aliases() {
        let json = r#"{"strike": 500.0, "right": "C", "expiry": "2025-06-20", "gamma": 0.01, "oi": 1200}"#;
        let c: ContractGreeks = serde_json::from_str(json).unwrap();

        assert_eq!(c.right, OptionType::Call);
        assert_eq!(c.oi_or_zero(), 1200.0);
        assert!((c.gamma_or_zero() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_missing_values_read_as_zero() {
        let json = r#"{"strike": 500.0, "right": "P", "expiry": "2025-06-20", "gamma": null}"#;
        let c: ContractGreeks = serde_json::from_str(json).unwrap();

        assert_eq!(c.gamma_or_zero(), 0.0);
        assert_eq!(c.oi_or_zero(), 0.0);
    }

    #[test]
    fn test_days_to_expiry() {
        let expiry = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 13).unwrap();
        let c = ContractGreeks::new(500.0, OptionType::Put, expiry, 0.0, 10.0);

        assert_eq!(c.days_to_expiry(today), 7);
        assert!((c.moneyness_distance(400.0) - 0.25).abs() < 1e-12);
    }
}
