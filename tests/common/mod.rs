//! Scripted in-memory price stream for feed tests.
//!
//! Each `connect` consumes the next `Plan`; an exhausted script refuses.
//! Accepted connections hand the test a `Session` that pushes frames
//! into the stream. Dropping the session closes the stream from the
//! peer side.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crypto_dashboard_client::error::TransportError;
use crypto_dashboard_client::ports::price_stream::{PriceStream, PriceStreamConnector};

#[derive(Debug, Clone, Copy)]
pub enum Plan {
    Refuse,
    Accept,
}

type Frame = Result<Option<String>, TransportError>;

/// Peer side of one accepted connection.
pub struct Session {
    frames_tx: mpsc::UnboundedSender<Frame>,
}

impl Session {
    pub fn send(&self, text: &str) {
        let _ = self.frames_tx.send(Ok(Some(text.to_string())));
    }

    /// Fail the connection with a read error.
    pub fn fail(&self) {
        let _ = self.frames_tx.send(Err(TransportError::Dropped("reset by peer".to_string())));
    }

    /// Resolves once the client has dropped its end of the connection.
    pub async fn dropped(&self) {
        self.frames_tx.closed().await;
    }
}

#[derive(Default)]
pub struct Stats {
    live: AtomicUsize,
    max_live: AtomicUsize,
    closed: AtomicUsize,
}

impl Stats {
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    /// Connections closed by the client through `PriceStream::close`.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct ScriptedConnector {
    plans: Mutex<VecDeque<Plan>>,
    attempts_tx: mpsc::UnboundedSender<Instant>,
    sessions_tx: mpsc::UnboundedSender<Session>,
    stats: Arc<Stats>,
}

/// Test-side view of a `ScriptedConnector`.
pub struct Script {
    pub attempts: mpsc::UnboundedReceiver<Instant>,
    pub sessions: mpsc::UnboundedReceiver<Session>,
    pub stats: Arc<Stats>,
}

impl Script {
    /// Wait for `n` connection attempts and return the gaps between them in ms.
    pub async fn gaps_ms(&mut self, n: usize) -> Vec<u128> {
        let mut times = Vec::with_capacity(n);
        for _ in 0..n {
            times.push(self.attempts.recv().await.expect("connector dropped"));
        }
        times.windows(2).map(|w| (w[1] - w[0]).as_millis()).collect()
    }

    pub async fn next_session(&mut self) -> Session {
        self.sessions.recv().await.expect("connector dropped")
    }
}

pub fn scripted(plans: impl IntoIterator<Item = Plan>) -> (ScriptedConnector, Script) {
    let (attempts_tx, attempts) = mpsc::unbounded_channel();
    let (sessions_tx, sessions) = mpsc::unbounded_channel();
    let stats = Arc::new(Stats::default());

    let connector = ScriptedConnector {
        plans: Mutex::new(plans.into_iter().collect()),
        attempts_tx,
        sessions_tx,
        stats: Arc::clone(&stats),
    };
    (connector, Script { attempts, sessions, stats })
}

#[async_trait]
impl PriceStreamConnector for ScriptedConnector {
    async fn connect(&self) -> Result<Box<dyn PriceStream>, TransportError> {
        let _ = self.attempts_tx.send(Instant::now());
        let plan = self.plans.lock().unwrap().pop_front().unwrap_or(Plan::Refuse);

        match plan {
            Plan::Refuse => Err(TransportError::Connect("connection refused".to_string())),
            Plan::Accept => {
                let (frames_tx, frames_rx) = mpsc::unbounded_channel();
                let live = self.stats.live.fetch_add(1, Ordering::SeqCst) + 1;
                self.stats.max_live.fetch_max(live, Ordering::SeqCst);
                let _ = self.sessions_tx.send(Session { frames_tx });

                Ok(Box::new(ScriptedStream {
                    frames_rx,
                    stats: Arc::clone(&self.stats),
                }))
            }
        }
    }

    fn endpoint(&self) -> &str {
        "scripted://prices"
    }
}

struct ScriptedStream {
    frames_rx: mpsc::UnboundedReceiver<Frame>,
    stats: Arc<Stats>,
}

#[async_trait]
impl PriceStream for ScriptedStream {
    async fn next_frame(&mut self) -> Result<Option<String>, TransportError> {
        self.frames_rx.recv().await.unwrap_or(Ok(None))
    }

    async fn close(&mut self) {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        self.frames_rx.close();
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.stats.live.fetch_sub(1, Ordering::SeqCst);
    }
}
