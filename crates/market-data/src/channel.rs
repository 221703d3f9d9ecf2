//! Bidirectional message channel abstraction over one exchange connection.
//!
//! The subscription orchestrator talks to a [`MarketChannel`]: it can send
//! a JSON request and pull raw JSON frames until the channel fails. The
//! production implementation is [`WsChannel`] over `tokio-tungstenite`;
//! tests substitute scripted in-memory channels.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Transport failures surfaced to the orchestrator.
///
/// Every variant is recovered by the reconnect policy; none reach the
/// consumer.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Underlying websocket transport error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A text frame that is not valid JSON.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The remote closed the connection.
    #[error("connection closed by remote")]
    Closed,
}

/// One logical connection to an exchange: send requests, pull frames.
#[async_trait]
pub trait MarketChannel: Send {
    /// Send a JSON request (subscribe/unsubscribe).
    async fn send(&mut self, msg: Value) -> Result<(), ChannelError>;

    /// Pull the next raw frame.
    ///
    /// `None` means the stream ended; `Some(Err(_))` is a transport
    /// failure. Either way the orchestrator hands control to the reconnect
    /// policy.
    async fn next_frame(&mut self) -> Option<Result<Value, ChannelError>>;
}

/// Production channel over a websocket connection.
pub struct WsChannel {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsChannel {
    /// Connect to a websocket endpoint.
    pub async fn connect(url: &str) -> Result<Self, ChannelError> {
        tracing::debug!(url = %url, "connecting");
        let (inner, _response) = connect_async(url).await?;
        tracing::info!(url = %url, "connected");
        Ok(Self { inner })
    }
}

#[async_trait]
impl MarketChannel for WsChannel {
    async fn send(&mut self, msg: Value) -> Result<(), ChannelError> {
        self.inner.send(Message::Text(msg.to_string())).await?;
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Result<Value, ChannelError>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(&text).map_err(ChannelError::from));
                }
                Ok(Message::Ping(payload)) => {
                    if let Err(e) = self.inner.send(Message::Pong(payload)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Close(frame)) => {
                    tracing::warn!(frame = ?frame, "close frame received");
                    return Some(Err(ChannelError::Closed));
                }
                // Pong / binary / raw frames carry no market data.
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
