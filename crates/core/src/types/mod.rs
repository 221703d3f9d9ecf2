//! Core types for the TOB feed.
//!
//! Prices and sizes use fixed-point decimals so that exchange-native decimal
//! strings compare numerically, never lexically. Timestamps are raw
//! nanoseconds from a monotonic clock.

pub mod market;
pub mod market_data;
pub mod price;
pub mod quantity;
pub mod timestamp;

// Re-export primary types for convenient access via `tob_core::types::*`.
pub use market::{Exchange, Pair, Side};
pub use market_data::{BookLevel, TopOfBook};
pub use price::Price;
pub use quantity::Quantity;
pub use timestamp::Timestamp;
