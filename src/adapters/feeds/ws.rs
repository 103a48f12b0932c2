//! WebSocket Price Feed - tokio-tungstenite transport
//!
//! Implements the `PriceStreamConnector` port over a plain WebSocket.
//! The server pushes one full price snapshot per text frame; the client
//! never writes application messages.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, instrument};

use crate::error::TransportError;
use crate::ports::price_stream::{PriceStream, PriceStreamConnector};

/// Opens WebSocket connections to the price endpoint.
#[derive(Debug, Clone)]
pub struct WsPriceConnector {
    /// WebSocket URL, e.g. `ws://localhost:8080/ws`.
    url: String,
}

impl WsPriceConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl PriceStreamConnector for WsPriceConnector {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn connect(&self) -> Result<Box<dyn PriceStream>, TransportError> {
        let (ws_stream, response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        info!(status = %response.status(), "Price feed WebSocket connected");

        Ok(Box::new(WsPriceStream { inner: ws_stream }))
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// A single live WebSocket session.
pub struct WsPriceStream {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl PriceStream for WsPriceStream {
    async fn next_frame(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Binary(bytes))) => {
                    // Not expected from the feed; let the parser reject it if it is not JSON.
                    return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Some(Ok(Message::Ping(data))) => {
                    // Pong is handled automatically by tungstenite
                    debug!(len = data.len(), "Price feed ping received");
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Price feed close frame received");
                    return Ok(None);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(TransportError::Dropped(e.to_string())),
                None => return Ok(None),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.inner.close(None).await {
            debug!(error = %e, "Price feed close handshake failed");
        }
    }
}
