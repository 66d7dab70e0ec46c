use std::sync::Arc;
use std::time::Duration;

use futures_core::Stream;

use crate::decode;
use crate::project;
use crate::upstream::{Cursor, UpstreamConnector, UpstreamStream};
use crate::RelayError;

// ═══════════════════════════════════════════════════════════════
//  Relay Loop — reader → decoder → projector → client frames
// ═══════════════════════════════════════════════════════════════

/// Один кадр server-push канала.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Serialized non-empty FeatureCollection.
    Data(String),
    /// No-data heartbeat, so proxies and the client keep the connection.
    Keepalive,
    /// One-shot notification, emitted before a reconnect attempt
    /// (or as the last frame on an unexpected internal failure).
    Error(String),
}

#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Bounded wait of one upstream read.
    pub block_timeout: Duration,
    /// Cooldown before re-establishing the connection after a failure.
    pub retry_cooldown: Duration,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            block_timeout: Duration::from_secs(1),
            retry_cooldown: Duration::from_secs(5),
        }
    }
}

/// Бесконечная ленивая последовательность кадров для одного клиента.
///
/// Каждый вызов создаёт независимый relay instance со своим курсором,
/// заякоренным на "сейчас". Завершается только когда потребитель
/// перестаёт читать (drop), либо на фатальной внутренней ошибке.
///
/// Cursor сохраняется через reconnect: чтение со старого id по
/// append-only потоку просто возвращает всё более новое.
pub fn frames(
    connector: Arc<dyn UpstreamConnector>,
    topic: String,
    options: RelayOptions,
) -> impl Stream<Item = Frame> + Send {
    async_stream::stream! {
        let mut cursor = Cursor::Latest;

        'connecting: loop {
            let mut upstream = match establish(connector.as_ref()).await {
                Ok(upstream) => upstream,
                Err(e) => {
                    tracing::warn!(topic = %topic, error = %e, "upstream connect failed");
                    yield Frame::Error(e.to_string());
                    tokio::time::sleep(options.retry_cooldown).await;
                    continue 'connecting;
                }
            };
            tracing::debug!(topic = %topic, "upstream connected");

            loop {
                let batch = match upstream
                    .read_batch(&topic, &cursor, options.block_timeout)
                    .await
                {
                    Ok(batch) => batch,
                    Err(e) => {
                        tracing::warn!(topic = %topic, error = %e, "upstream read failed, reconnecting");
                        yield Frame::Error(e.to_string());
                        tokio::time::sleep(options.retry_cooldown).await;
                        continue 'connecting;
                    }
                };

                if batch.entries.is_empty() {
                    yield Frame::Keepalive;
                    continue;
                }

                cursor = batch.next_cursor;
                for entry in &batch.entries {
                    let Some(raw) = entry.payload() else { continue };
                    let Some(payload) = decode::decode(raw) else { continue };

                    let collection = project::project(&payload);
                    if collection.is_empty() {
                        continue;
                    }

                    let json = match serde_json::to_string(&collection) {
                        Ok(json) => json,
                        Err(e) => {
                            let e = RelayError::Serialize(e);
                            tracing::error!(topic = %topic, error = %e, "relay terminated");
                            yield Frame::Error(e.to_string());
                            return;
                        }
                    };
                    yield Frame::Data(json);
                }
            }
        }
    }
}

/// CONNECTING: установить соединение и проверить liveness.
async fn establish(
    connector: &dyn UpstreamConnector,
) -> Result<Box<dyn UpstreamStream>, RelayError> {
    let mut upstream = connector.connect().await?;
    upstream.probe().await?;
    Ok(upstream)
}
