//! Trade Ledger - typed store for the trade history
//!
//! Fetches `GET /trades` and publishes the list through a `watch`
//! channel. The ledger is not wired to order confirmations: it changes
//! only when `load` or `refresh` is called.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{info, instrument, warn};

use crate::domain::trade::TradeRecord;
use crate::error::LedgerError;
use crate::ports::order_gateway::OrderGateway;

pub type TradeList = Arc<Vec<TradeRecord>>;

pub struct TradeLedger<G: OrderGateway> {
    gateway: Arc<G>,
    trades_tx: watch::Sender<TradeList>,
    loaded: AtomicBool,
    /// Serializes first loads so concurrent callers share one fetch.
    load_lock: Mutex<()>,
}

impl<G: OrderGateway> TradeLedger<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let (trades_tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            gateway,
            trades_tx,
            loaded: AtomicBool::new(false),
            load_lock: Mutex::new(()),
        }
    }

    /// Fetch the history once. Later calls, including ones that arrive
    /// while the first fetch is in flight, return the cached count
    /// without touching the backend. A failed fetch leaves the ledger
    /// unloaded so the next call tries again.
    pub async fn load(&self) -> Result<usize, LedgerError> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(self.trades_tx.borrow().len());
        }

        let _guard = self.load_lock.lock().await;
        if self.loaded.load(Ordering::Acquire) {
            return Ok(self.trades_tx.borrow().len());
        }
        self.refresh().await
    }

    /// Re-fetch the history. On failure the previous list stays published.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<usize, LedgerError> {
        match self.gateway.fetch_trades().await {
            Ok(trades) => {
                let count = trades.len();
                self.trades_tx.send_replace(Arc::new(trades));
                self.loaded.store(true, Ordering::Release);
                info!(count, "Trade history updated");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch trade history");
                Err(e)
            }
        }
    }

    /// Current list in backend order.
    pub fn trades(&self) -> TradeList {
        Arc::clone(&self.trades_tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<TradeList> {
        self.trades_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tokio_test::{assert_pending, assert_ready_ok, task};

    use super::*;
    use crate::domain::trade::{OrderRequest, Side, TradeConfirmation};
    use crate::error::SubmissionError;

    /// Answers the first history query, then never again.
    #[derive(Default)]
    struct AnswersOnce {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OrderGateway for AnswersOnce {
        async fn place_order(&self, _order: &OrderRequest) -> Result<TradeConfirmation, SubmissionError> {
            Err(SubmissionError::Transport("unused".to_string()))
        }

        async fn fetch_trades(&self) -> Result<Vec<TradeRecord>, LedgerError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
                std::future::pending::<()>().await;
            }
            Ok(vec![TradeRecord {
                id: 1,
                symbol: "BTC".to_string(),
                side: Side::Buy,
                quantity: 1.0,
                price: 61234.5,
                executed_at: None,
            }])
        }
    }

    /// Answers every history query after a delay, counting calls.
    #[derive(Default)]
    struct SlowGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OrderGateway for SlowGateway {
        async fn place_order(&self, _order: &OrderRequest) -> Result<TradeConfirmation, SubmissionError> {
            Err(SubmissionError::Transport("unused".to_string()))
        }

        async fn fetch_trades(&self) -> Result<Vec<TradeRecord>, LedgerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_loads_share_one_fetch() {
        let gateway = Arc::new(SlowGateway::default());
        let ledger = TradeLedger::new(Arc::clone(&gateway));

        let (a, b, c) = tokio::join!(ledger.load(), ledger.load(), ledger.load());

        assert_eq!(a.unwrap(), 0);
        assert_eq!(b.unwrap(), 0);
        assert_eq!(c.unwrap(), 0);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_load_is_served_from_cache() {
        let ledger = TradeLedger::new(Arc::new(AnswersOnce::default()));
        assert_eq!(ledger.load().await.unwrap(), 1);

        let mut load = task::spawn(ledger.load());
        assert_eq!(assert_ready_ok!(load.poll()), 1);
    }

    #[tokio::test]
    async fn test_refresh_always_queries_backend() {
        let ledger = TradeLedger::new(Arc::new(AnswersOnce::default()));
        ledger.load().await.unwrap();

        let mut refresh = task::spawn(ledger.refresh());
        assert_pending!(refresh.poll());
        assert_eq!(ledger.trades().len(), 1);
    }
}
