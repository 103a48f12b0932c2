//! Price feed connection state machine.
//!
//! Pure transition logic for the streaming connection: no I/O, no timers.
//! The feed task feeds events in and acts on the returned delays, which
//! keeps the invariants testable on their own:
//! - the attempt counter only grows while disconnected and resets to zero
//!   on every well-formed snapshot
//! - each lost connection yields exactly one reconnect delay
//! - `Closed` is terminal

use std::time::Duration;

use super::backoff::ReconnectPolicy;

/// Lifecycle of the feed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// A connection attempt is in progress, or the handshake completed
    /// and the first snapshot has not arrived yet.
    Connecting,
    /// At least one snapshot has been received on the live connection.
    Open,
    /// Waiting out the backoff delay before the next attempt.
    Reconnecting {
        /// Consecutive failed attempts so far.
        attempt: u32,
    },
    /// Torn down. No further connection attempts.
    Closed,
}

#[derive(Debug, Clone)]
pub struct FeedStateMachine {
    state: ConnectionState,
    attempts: u32,
    policy: ReconnectPolicy,
}

impl FeedStateMachine {
    /// Start in `Connecting` with a zero attempt counter.
    pub const fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Connecting,
            attempts: 0,
            policy,
        }
    }

    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    pub const fn is_closed(&self) -> bool {
        matches!(self.state, ConnectionState::Closed)
    }

    /// Handshake completed. Stays `Connecting` until the first snapshot.
    pub fn on_connected(&mut self) {
        if !self.is_closed() {
            self.state = ConnectionState::Connecting;
        }
    }

    /// A well-formed snapshot arrived: the connection is `Open` and the
    /// backoff counter starts over.
    pub fn on_snapshot(&mut self) {
        if !self.is_closed() {
            self.state = ConnectionState::Open;
            self.attempts = 0;
        }
    }

    /// A frame failed to parse. Neither the state nor the counter change.
    pub const fn on_malformed(&self) {}

    /// The connection failed or closed. Returns the delay before the next
    /// attempt, or `None` once torn down.
    pub fn on_connection_lost(&mut self) -> Option<Duration> {
        if self.is_closed() {
            return None;
        }
        self.attempts = self.attempts.saturating_add(1);
        self.state = ConnectionState::Reconnecting {
            attempt: self.attempts,
        };
        Some(self.policy.delay(self.attempts))
    }

    /// Backoff delay elapsed; a new attempt begins.
    pub fn on_backoff_elapsed(&mut self) {
        if let ConnectionState::Reconnecting { .. } = self.state {
            self.state = ConnectionState::Connecting;
        }
    }

    pub fn on_teardown(&mut self) {
        self.state = ConnectionState::Closed;
    }
}
