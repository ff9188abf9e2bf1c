//! Core data types for the GEX profile engine
//!
//! Defines fundamental types:
//! - StrikeRecord: per-strike call/put/net gamma exposure and open interest
//! - ContractGreeks: raw per-contract gamma and open interest
//! - ExpiryBucket: expiry selection (0DTE / weekly / monthly / total)
//! - GexError: errors raised by the I/O shell

pub mod error;
pub mod expiry;
pub mod option;
pub mod strike;

pub use error::*;
pub use expiry::*;
pub use option::*;
pub use strike::*;
