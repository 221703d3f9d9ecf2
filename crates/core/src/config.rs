//! Layered configuration for the TOB feed.
//!
//! Configuration is loaded in layers with increasing priority:
//! 1. Compiled-in defaults (production endpoints, BTC/USD pair spellings)
//! 2. TOML configuration file (if provided)
//! 3. Environment variable overrides (prefix `TOB`, nested with `__`,
//!    e.g. `TOB__FEED__RECONNECT__DELAY_MS=5000`)
//!
//! These are public market-data feeds; no credentials exist anywhere in the
//! configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::types::Exchange;

// ── Default value functions ────────────────────────────────────────────

/// Default ladder depth kept per side: 20 levels.
fn default_depth_levels() -> usize {
    20
}

/// Default capacity of the per-subscription tick channel.
fn default_channel_capacity() -> usize {
    64
}

/// Default fixed reconnect delay: 10 000 ms.
fn default_reconnect_delay_ms() -> u64 {
    10_000
}

// ── Configuration structs ──────────────────────────────────────────────

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bitstamp connection settings.
    pub bitstamp: VenueConfig,
    /// BitMEX connection settings.
    pub bitmex: VenueConfig,
    /// FTX connection settings.
    pub ftx: VenueConfig,
    /// Binance connection settings.
    pub binance: VenueConfig,
    /// Coinbase connection settings.
    pub coinbase: VenueConfig,
    /// Kraken connection settings.
    pub kraken: VenueConfig,
    /// Bitfinex connection settings.
    pub bitfinex: VenueConfig,
    /// Bybit connection settings.
    pub bybit: VenueConfig,
    /// Feed behavior settings shared by every subscription.
    pub feed: FeedConfig,
}

/// Per-venue connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    /// WebSocket endpoint URL.
    pub ws_url: String,
    /// Trading pair in this venue's native spelling.
    pub pair: String,
}

/// Feed behavior configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Ladder depth maintained per book side.
    #[serde(default = "default_depth_levels")]
    pub depth_levels: usize,
    /// Bounded capacity of each subscription's tick channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Reconnection parameters.
    pub reconnect: ReconnectSettings,
}

/// Reconnection parameters: a fixed delay, retried without limit.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectSettings {
    /// Fixed delay before resubscribing while online, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub delay_ms: u64,
}

/// Apply the compiled-in default layer to a builder.
fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    builder
        .set_default("bitstamp.ws_url", "wss://ws.bitstamp.net")?
        .set_default("bitstamp.pair", "btcusd")?
        .set_default("bitmex.ws_url", "wss://www.bitmex.com/realtime")?
        .set_default("bitmex.pair", "XBTUSD")?
        .set_default("ftx.ws_url", "wss://ftx.com/ws/")?
        .set_default("ftx.pair", "BTC/USD")?
        .set_default("binance.ws_url", "wss://stream.binance.com:9443/stream")?
        .set_default("binance.pair", "btcusdt")?
        .set_default("coinbase.ws_url", "wss://ws-feed.exchange.coinbase.com")?
        .set_default("coinbase.pair", "BTC-USD")?
        .set_default("kraken.ws_url", "wss://ws.kraken.com")?
        .set_default("kraken.pair", "XBT/USD")?
        .set_default("bitfinex.ws_url", "wss://api-pub.bitfinex.com/ws/2")?
        .set_default("bitfinex.pair", "BTCUSD")?
        .set_default("bybit.ws_url", "wss://stream.bybit.com/realtime")?
        .set_default("bybit.pair", "BTCUSD")?
        .set_default("feed.depth_levels", 20i64)?
        .set_default("feed.channel_capacity", 64i64)?
        .set_default("feed.reconnect.delay_ms", 10_000i64)
}

impl AppConfig {
    /// Load configuration using layered sources.
    ///
    /// 1. Compiled-in production defaults for all eight venues.
    /// 2. TOML file at `config_path` (if `Some`).
    /// 3. Environment variable overrides with prefix `TOB` and `__` as the
    ///    nesting separator.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = with_defaults(Config::builder())?;

        if let Some(path) = config_path {
            let path_str = path.to_str().context("config path is not valid UTF-8")?;
            builder = builder.add_source(File::with_name(path_str).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("TOB").separator("__"));

        let config = builder.build().context("failed to assemble configuration")?;
        config
            .try_deserialize()
            .context("failed to deserialize configuration")
    }

    /// Connection settings for one venue.
    pub fn venue(&self, exchange: Exchange) -> &VenueConfig {
        match exchange {
            Exchange::Bitstamp => &self.bitstamp,
            Exchange::Bitmex => &self.bitmex,
            Exchange::Ftx => &self.ftx,
            Exchange::Binance => &self.binance,
            Exchange::Coinbase => &self.coinbase,
            Exchange::Kraken => &self.kraken,
            Exchange::Bitfinex => &self.bitfinex,
            Exchange::Bybit => &self.bybit,
        }
    }
}
