//! TOB ticker binary.
//!
//! Subscribes to the configured pair on all eight venues and logs every
//! canonical top-of-book tick until interrupted.

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use tob_core::config::AppConfig;
use tob_core::types::Exchange;
use tob_market_data::subscription::subscribe;

/// TOB top-of-book ticker.
#[derive(Parser, Debug)]
#[command(name = "tob-ticker", about = "Top-of-book ticker across eight exchanges")]
struct Args {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit JSON logs instead of pretty output.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config)?;

    tob_core::logging::init_tracing(args.json_logs);
    tracing::info!(venues = Exchange::ALL.len(), "starting tob-ticker");

    let cancel = CancellationToken::new();
    let mut tasks = Vec::with_capacity(Exchange::ALL.len());

    for exchange in Exchange::ALL {
        let mut stream = subscribe(exchange, &config);
        let task_cancel = cancel.clone();
        tasks.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    tick = stream.recv() => match tick {
                        Some(tick) => {
                            tracing::info!(
                                exchange = %tick.exchange,
                                pair = %tick.pair,
                                bid = %tick.bid.price,
                                bid_size = %tick.bid.size,
                                ask = %tick.ask.price,
                                ask_size = %tick.ask.size,
                                mid = %tick.mid_price(),
                                spread = %tick.spread(),
                                "top of book"
                            );
                        }
                        None => break,
                    }
                }
            }
        }));
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, detaching subscriptions");
    cancel.cancel();
    for task in tasks {
        let _ = task.await;
    }

    tracing::info!("shutdown complete");
    Ok(())
}
