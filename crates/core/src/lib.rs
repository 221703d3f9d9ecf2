//! # tob-core
//!
//! Shared building blocks for the TOB top-of-book feed: fixed-point
//! price/quantity types, the canonical [`types::TopOfBook`] value, venue
//! identifiers, layered configuration, and logging setup.

pub mod config;
pub mod logging;
pub mod types;
