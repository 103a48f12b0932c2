//! Price Stream Port - Streaming Price Feed Interface
//!
//! The feed client only needs two things from the transport:
//! open a connection, and read its inbound frames in order.
//! No outbound application messages are ever sent.

use async_trait::async_trait;

use crate::error::TransportError;

/// One live streaming connection.
#[async_trait]
pub trait PriceStream: Send {
  /// Wait for the next inbound text frame.
  ///
  /// Returns `Ok(None)` when the peer closed the connection and
  /// `Err` when the connection failed. Either ends the session.
  async fn next_frame(&mut self) -> Result<Option<String>, TransportError>;

  /// Close the connection. Best effort; errors are swallowed.
  async fn close(&mut self);
}

/// Factory for streaming connections.
///
/// The feed client holds at most one stream returned from here at a
/// time; the previous one is always dropped before `connect` is called.
#[async_trait]
pub trait PriceStreamConnector: Send + Sync + 'static {
  /// Establish a new connection to the price endpoint.
  async fn connect(&self) -> Result<Box<dyn PriceStream>, TransportError>;

  /// Endpoint description for logs.
  fn endpoint(&self) -> &str;
}
