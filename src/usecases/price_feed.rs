//! Price Feed Client - resilient streaming price snapshot
//!
//! Owns one streaming connection at a time, replaces the snapshot on
//! every well-formed message, and reconnects with linear backoff on
//! any failure. All state lives in a single task: the connection, the
//! state machine and the publishing side of the snapshot channel.
//!
//! Readers get the latest snapshot through a `watch` channel of
//! `Arc<PriceSnapshot>`, so every published value is immutable.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::domain::backoff::ReconnectPolicy;
use crate::domain::connection::{ConnectionState, FeedStateMachine};
use crate::domain::prices::PriceSnapshot;
use crate::error::TransportError;
use crate::ports::price_stream::{PriceStream, PriceStreamConnector};

/// Upper bound on the close handshake during teardown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// How a single connection session ended.
enum SessionEnd {
    Teardown,
    Lost(TransportError),
}

/// Streaming price feed with automatic reconnection.
pub struct PriceFeedClient<C: PriceStreamConnector> {
    connector: C,
    policy: ReconnectPolicy,
    snapshot_tx: watch::Sender<Arc<PriceSnapshot>>,
    connected_tx: watch::Sender<bool>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl<C: PriceStreamConnector> PriceFeedClient<C> {
    /// Create a client with an empty snapshot. Nothing connects until
    /// [`run`](Self::run) or [`spawn`](Self::spawn).
    pub fn new(connector: C, policy: ReconnectPolicy) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(PriceSnapshot::default()));
        let (connected_tx, _) = watch::channel(false);

        Self {
            connector,
            policy,
            snapshot_tx,
            connected_tx,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Receiver for snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PriceSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Receiver for the connection flag (true while `Open`).
    pub fn connected(&self) -> watch::Receiver<bool> {
        self.connected_tx.subscribe()
    }

    /// Run the feed on its own task.
    pub fn spawn(self) -> PriceFeedHandle {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let snapshot_rx = self.subscribe();
        let connected_rx = self.connected();
        let task = tokio::spawn(self.run(shutdown_rx));

        PriceFeedHandle {
            shutdown_tx,
            task: Some(task),
            snapshot_rx,
            connected_rx,
        }
    }

    /// Connection loop. Returns only on shutdown (signal sent or sender dropped).
    #[instrument(skip_all, fields(endpoint = %self.connector.endpoint()))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut machine = FeedStateMachine::new(self.policy);
        info!("Price feed starting");

        loop {
            let connected = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                result = self.connector.connect() => result,
            };

            let lost = match connected {
                Ok(mut stream) => {
                    machine.on_connected();
                    debug!("Price feed handshake complete, awaiting first snapshot");

                    match self.stream(stream.as_mut(), &mut machine, &mut shutdown_rx).await {
                        SessionEnd::Teardown => {
                            if tokio::time::timeout(CLOSE_TIMEOUT, stream.close()).await.is_err() {
                                debug!("Price feed close timed out");
                            }
                            break;
                        }
                        SessionEnd::Lost(e) => e,
                    }
                }
                Err(e) => e,
            };

            self.set_connected(false);

            let Some(delay) = machine.on_connection_lost() else {
                break;
            };
            if let Some(m) = &self.metrics {
                m.feed_reconnects.inc();
            }
            warn!(
                error = %lost,
                attempt = machine.attempts(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Price feed connection lost, reconnecting"
            );

            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                () = tokio::time::sleep(delay) => machine.on_backoff_elapsed(),
            }
        }

        machine.on_teardown();
        self.set_connected(false);
        info!("Price feed torn down");
    }

    /// Read frames from one live connection until it ends or shutdown.
    async fn stream(
        &self,
        stream: &mut dyn PriceStream,
        machine: &mut FeedStateMachine,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> SessionEnd {
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => return SessionEnd::Teardown,
                frame = stream.next_frame() => match frame {
                    Ok(Some(text)) => self.apply_frame(&text, machine),
                    Ok(None) => return SessionEnd::Lost(TransportError::Closed),
                    Err(e) => return SessionEnd::Lost(e),
                },
            }
        }
    }

    /// Replace the snapshot with a well-formed frame, or drop the frame.
    fn apply_frame(&self, text: &str, machine: &mut FeedStateMachine) {
        match PriceSnapshot::parse(text) {
            Ok(snapshot) => {
                let opened = machine.state() != ConnectionState::Open;
                machine.on_snapshot();
                if opened {
                    info!(symbols = snapshot.len(), "Price feed open");
                    self.set_connected(true);
                }

                self.snapshot_tx.send_replace(Arc::new(snapshot));
                if let Some(m) = &self.metrics {
                    m.snapshots_received.inc();
                }
            }
            Err(e) => {
                machine.on_malformed();
                warn!(error = %e, len = text.len(), "Discarding malformed price message");
                if let Some(m) = &self.metrics {
                    m.malformed_frames.inc();
                }
            }
        }
    }

    fn set_connected(&self, connected: bool) {
        self.connected_tx.send_if_modified(|current| {
            let changed = *current != connected;
            *current = connected;
            changed
        });
        if let Some(m) = &self.metrics {
            m.feed_connected.set(i64::from(connected));
        }
    }
}

/// Handle to a spawned price feed.
///
/// Dropping the handle aborts the feed task, which drops any live
/// connection and pending reconnect timer with it. Prefer
/// [`teardown`](Self::teardown) for a graceful close.
pub struct PriceFeedHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: Option<JoinHandle<()>>,
    snapshot_rx: watch::Receiver<Arc<PriceSnapshot>>,
    connected_rx: watch::Receiver<bool>,
}

impl PriceFeedHandle {
    /// Latest snapshot (empty until the first message).
    pub fn snapshot(&self) -> Arc<PriceSnapshot> {
        Arc::clone(&self.snapshot_rx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<PriceSnapshot>> {
        self.snapshot_rx.clone()
    }

    pub fn connected(&self) -> watch::Receiver<bool> {
        self.connected_rx.clone()
    }

    pub fn is_connected(&self) -> bool {
        *self.connected_rx.borrow()
    }

    /// Stop the feed: cancel any pending reconnect, close the live
    /// connection, and wait for the task to finish.
    pub async fn teardown(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Price feed task did not finish cleanly");
            }
        }
    }
}

impl Drop for PriceFeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
