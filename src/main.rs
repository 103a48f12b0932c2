//! Crypto Dashboard Client — Entry Point
//!
//! Streams live prices, shows the trade history and places orders
//! typed on stdin. Runs until SIGINT or end of input.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create ApiClient + HttpOrderGateway (OrderGateway port)
//! 4. Load the trade history once
//! 5. Spawn the price feed (WebSocket, auto-reconnect)
//! 6. Spawn health/metrics server
//! 7. Read order lines from stdin until SIGINT or EOF
//! 8. Tear down: feed first, then the health server

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

use crypto_dashboard_client::adapters::api::{ApiClient, ApiClientConfig, HttpOrderGateway};
use crypto_dashboard_client::adapters::feeds::WsPriceConnector;
use crypto_dashboard_client::adapters::metrics::{HealthServer, MetricsRegistry};
use crypto_dashboard_client::config::{self, AppConfig};
use crypto_dashboard_client::domain::prices::PriceSnapshot;
use crypto_dashboard_client::domain::trade::OrderRequest;
use crypto_dashboard_client::usecases::{PriceFeedClient, TradeLedger, TradeSubmissionFlow};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.client.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.client.name,
        version = env!("CARGO_PKG_VERSION"),
        ws_url = %config.feed.ws_url,
        api = %config.api.base_url,
        "Starting crypto dashboard client"
    );

    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    let metrics = if config.metrics.enabled {
        Some(Arc::new(MetricsRegistry::new().context("Failed to create metrics registry")?))
    } else {
        None
    };

    // ── 3. Backend client + order gateway ───────────────────
    let api_client = Arc::new(
        ApiClient::new(ApiClientConfig::from(&config.api)).context("Failed to create API client")?,
    );
    let gateway = Arc::new(HttpOrderGateway::new(Arc::clone(&api_client)));

    let mut submissions = TradeSubmissionFlow::new(Arc::clone(&gateway));
    if let Some(m) = &metrics {
        submissions = submissions.with_metrics(Arc::clone(m));
    }

    // ── 4. Trade history, fetched once ──────────────────────
    let ledger = TradeLedger::new(Arc::clone(&gateway));
    match ledger.load().await {
        Ok(count) => {
            info!(count, "Trade history loaded");
            for record in ledger.trades().iter() {
                info!(id = record.id, executed_at = ?record.executed_at, "{record}");
            }
        }
        Err(e) => warn!(error = %e, "Trade history unavailable"),
    }

    // ── 5. Price feed with auto-reconnect ───────────────────
    let mut feed = PriceFeedClient::new(
        WsPriceConnector::new(config.feed.ws_url.clone()),
        config.feed.reconnect_policy(),
    );
    if let Some(m) = &metrics {
        feed = feed.with_metrics(Arc::clone(m));
    }
    let feed = feed.spawn();
    let ticker_handle = tokio::spawn(log_ticker(feed.subscribe()));

    // ── 6. Health/metrics server ────────────────────────────
    let health_handle = match &metrics {
        Some(m) => Some(spawn_health(&config, feed.connected(), Arc::clone(m), &shutdown_tx).await?),
        None => None,
    };

    info!("Dashboard running; enter orders as `<buy|sell> <SYMBOL> <quantity>`");

    // ── 7. Order entry until SIGINT or EOF ──────────────────
    tokio::select! {
        () = read_orders(&submissions, &config.trading.supported_symbols) => {
            info!("Input closed, shutting down");
        }
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
    }

    // ── 8. Graceful shutdown ────────────────────────────────
    feed.teardown().await;
    ticker_handle.abort();

    let _ = shutdown_tx.send(());
    if let Some(handle) = health_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Log the ticker whenever a new snapshot is published.
async fn log_ticker(mut snapshot_rx: watch::Receiver<Arc<PriceSnapshot>>) {
    while snapshot_rx.changed().await.is_ok() {
        let snapshot = Arc::clone(&snapshot_rx.borrow_and_update());
        for line in snapshot.ticker_lines() {
            info!(target: "ticker", "{line}");
        }
    }
}

/// Parse order lines and submit each on its own task.
///
/// Submissions are independent; a slow confirmation never blocks the
/// next line.
async fn read_orders(submissions: &TradeSubmissionFlow<HttpOrderGateway>, supported: &[String]) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                error!(error = %e, "Failed to read stdin");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let order = match OrderRequest::parse(&line, supported) {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "Invalid order");
                continue;
            }
        };

        let handle = submissions.spawn_submit(order);
        tokio::spawn(async move {
            match handle.await {
                Ok(Ok(confirmation)) => info!("Trade successful: {confirmation}"),
                Ok(Err(e)) => error!(detail = %e, "{}", e.user_message()),
                Err(e) => error!(error = %e, "Order task failed"),
            }
        });
    }
}

async fn spawn_health(
    config: &AppConfig,
    feed_connected: watch::Receiver<bool>,
    metrics: Arc<MetricsRegistry>,
    shutdown_tx: &broadcast::Sender<()>,
) -> Result<tokio::task::JoinHandle<()>> {
    let listener = tokio::net::TcpListener::bind(&config.metrics.bind_address)
        .await
        .with_context(|| format!("Failed to bind health server on {}", config.metrics.bind_address))?;

    let server = HealthServer::new(feed_connected, metrics);
    let shutdown_rx = shutdown_tx.subscribe();

    Ok(tokio::spawn(async move {
        if let Err(e) = server.serve(listener, shutdown_rx).await {
            error!(error = %e, "Health server failed");
        }
    }))
}
