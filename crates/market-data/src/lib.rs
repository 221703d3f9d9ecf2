//! # tob-market-data
//!
//! Protocol adapters for eight exchange websocket dialects, the order-book
//! ladder reduction engine, and the subscription orchestrator that composes
//! an adapter with a channel and recovers from transport failure.
//!
//! Consumers call [`subscription::subscribe`] and receive a lazy stream of
//! canonical [`tob_core::types::TopOfBook`] values; they never see
//! venue-specific message shapes or transport errors.

pub mod channel;
pub mod exchange;
pub mod ladder;
pub mod subscription;
pub mod ws;
