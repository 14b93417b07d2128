//! Channel transport abstraction.
//!
//! The channel state machine is written against these traits so tests can
//! substitute a scripted transport; production uses the WebSocket
//! implementation below.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use shiptrack_core::error::{AppError, ErrorKind};
use shiptrack_core::result::AppResult;

/// A single established push connection.
#[async_trait]
pub trait ChannelConnection: Send {
    /// Sends one text frame.
    async fn send_text(&mut self, text: String) -> AppResult<()>;

    /// Receives the next text frame. `None` means the peer closed cleanly;
    /// an error means the connection broke.
    async fn next_text(&mut self) -> Option<AppResult<String>>;
}

/// Establishes push connections.
#[async_trait]
pub trait ChannelTransport: Send + Sync + 'static {
    type Connection: ChannelConnection;

    async fn connect(&self, url: &str) -> AppResult<Self::Connection>;
}

/// Production transport over tokio-tungstenite.
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport;

pub struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

#[async_trait]
impl ChannelTransport for WebSocketTransport {
    type Connection = WebSocketConnection;

    async fn connect(&self, url: &str) -> AppResult<Self::Connection> {
        let (stream, _response) = connect_async(url).await.map_err(|e| {
            AppError::with_source(ErrorKind::ServiceUnavailable, "WebSocket connect failed", e)
        })?;
        Ok(WebSocketConnection { stream })
    }
}

#[async_trait]
impl ChannelConnection for WebSocketConnection {
    async fn send_text(&mut self, text: String) -> AppResult<()> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ServiceUnavailable, "WebSocket send failed", e)
            })
    }

    async fn next_text(&mut self) -> Option<AppResult<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Close(_)) => return None,
                // Control and binary frames carry nothing for us.
                Ok(_) => continue,
                Err(e) => {
                    return Some(Err(AppError::with_source(
                        ErrorKind::ServiceUnavailable,
                        "WebSocket receive failed",
                        e,
                    )));
                }
            }
        }
    }
}
