use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crossroad_stats::{StatsBackend, StatsClient};
use dashboard_api_server::AppState;
use tracklet_relay::{RedisConnector, RelayOptions, UpstreamConnector};

use crate::config::ServeArgs;
use crate::error::ServerError;

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    tracing::info!("semaforo-server starting");

    // --- Upstream stream connector ---
    let connector: Arc<dyn UpstreamConnector> = Arc::new(RedisConnector::new(&args.redis())?);
    tracing::info!(
        host = %args.redis_host,
        port = args.redis_port,
        topic = %args.default_topic,
        "upstream stream configured"
    );

    // --- Stats backend ---
    let stats = if args.mock_data {
        tracing::info!("serving built-in mock crossroad data");
        StatsBackend::Mock
    } else {
        let client = StatsClient::new(&args.clickhouse())?;
        tracing::info!(
            host = %args.clickhouse_host,
            port = args.clickhouse_port,
            database = %args.clickhouse_database,
            "clickhouse configured"
        );
        StatsBackend::ClickHouse(client)
    };

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();

    let state = AppState {
        connector,
        stats: Arc::new(stats),
        default_topic: args.default_topic.clone(),
        relay: RelayOptions::default(),
    };

    // --- API server (HTTP + SSE) ---
    let api_port = args.port;
    let api_token = token.clone();
    let mut api_handle = tokio::spawn(async move {
        if let Err(e) = dashboard_api_server::run(api_port, state, api_token).await {
            tracing::error!(error = %e, "api server error");
        }
    });

    tracing::info!(port = args.port, "dashboard api (http+sse) listening");
    tracing::info!("server ready");

    // --- Ожидание Ctrl+C ---
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down...");

    token.cancel();

    // Open SSE connections keep graceful shutdown from completing;
    // give it a bounded window, then abort.
    if tokio::time::timeout(Duration::from_secs(5), &mut api_handle)
        .await
        .is_err()
    {
        api_handle.abort();
        let _ = api_handle.await;
    }

    tracing::info!("shutdown complete");
    Ok(())
}
