use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use redis::streams::{StreamReadOptions, StreamReadReply};

use crate::RelayError;

// ═══════════════════════════════════════════════════════════════
//  Cursor / RawEntry — позиция и единица чтения потока
// ═══════════════════════════════════════════════════════════════

/// Позиция чтения в append-only потоке. Двигается только вперёд
/// и только после подтверждённого чтения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Only entries appended after the anchor point of the connection.
    Latest,
    /// Strictly after the given entry id.
    At(String),
}

/// Имя поля записи, содержащего сериализованный tracking payload.
pub const PAYLOAD_FIELD: &str = "payload";

/// Одна запись потока: (entry id, field map).
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub id: String,
    pub fields: HashMap<String, String>,
}

impl RawEntry {
    /// Serialized tracking payload, if the entry carries one.
    pub fn payload(&self) -> Option<&str> {
        self.fields.get(PAYLOAD_FIELD).map(String::as_str)
    }
}

/// Результат одного bounded-wait чтения.
#[derive(Debug, Clone)]
pub struct ReadBatch {
    /// Entries in stream order since the request cursor. Empty on timeout.
    pub entries: Vec<RawEntry>,
    /// Id of the last entry; equals the request cursor when `entries` is empty.
    pub next_cursor: Cursor,
}

// ═══════════════════════════════════════════════════════════════
//  Upstream traits — seam для mock-транспортов в тестах
// ═══════════════════════════════════════════════════════════════

/// Одно живое соединение с upstream потоком.
pub trait UpstreamStream: Send {
    /// Lightweight liveness probe, run once after connect.
    fn probe(&mut self) -> Pin<Box<dyn Future<Output = Result<(), RelayError>> + Send + '_>>;

    /// Block up to `block` waiting for entries strictly after `cursor`.
    /// Timeout with no entries is an empty batch, not an error. A connection
    /// error means the caller must re-establish before retrying.
    fn read_batch<'a>(
        &'a mut self,
        topic: &'a str,
        cursor: &'a Cursor,
        block: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<ReadBatch, RelayError>> + Send + 'a>>;
}

/// Фабрика соединений: relay переустанавливает соединение после сбоя.
pub trait UpstreamConnector: Send + Sync {
    fn connect(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn UpstreamStream>, RelayError>> + Send + '_>>;
}

// ═══════════════════════════════════════════════════════════════
//  Redis Streams implementation
// ═══════════════════════════════════════════════════════════════

/// Параметры подключения к upstream Redis.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 6379,
            password: None,
        }
    }
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
// Must exceed the longest XREAD block the relay requests.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RedisConnector {
    client: redis::Client,
}

impl RedisConnector {
    pub fn new(config: &RedisConfig) -> Result<Self, RelayError> {
        let info = redis::ConnectionInfo {
            addr: redis::ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: redis::RedisConnectionInfo {
                db: 0,
                username: None,
                password: config.password.clone(),
                ..Default::default()
            },
        };
        let client = redis::Client::open(info)?;
        Ok(Self { client })
    }
}

impl UpstreamConnector for RedisConnector {
    fn connect(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn UpstreamStream>, RelayError>> + Send + '_>>
    {
        Box::pin(async move {
            let conn = self
                .client
                .get_multiplexed_async_connection_with_timeouts(RESPONSE_TIMEOUT, CONNECT_TIMEOUT)
                .await?;
            Ok(Box::new(RedisStream { conn }) as Box<dyn UpstreamStream>)
        })
    }
}

struct RedisStream {
    conn: MultiplexedConnection,
}

impl UpstreamStream for RedisStream {
    fn probe(&mut self) -> Pin<Box<dyn Future<Output = Result<(), RelayError>> + Send + '_>> {
        Box::pin(async move {
            let _: String = redis::cmd("PING").query_async(&mut self.conn).await?;
            Ok(())
        })
    }

    fn read_batch<'a>(
        &'a mut self,
        topic: &'a str,
        cursor: &'a Cursor,
        block: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<ReadBatch, RelayError>> + Send + 'a>> {
        Box::pin(async move {
            let id = match cursor {
                Cursor::Latest => "$".to_string(),
                Cursor::At(id) => id.clone(),
            };
            let options = StreamReadOptions::default().block(block.as_millis() as usize);
            let reply: StreamReadReply = self
                .conn
                .xread_options(&[topic], &[id.as_str()], &options)
                .await?;

            let mut entries = Vec::new();
            for key in reply.keys {
                for stream_id in key.ids {
                    let mut fields = HashMap::with_capacity(stream_id.map.len());
                    for (name, value) in &stream_id.map {
                        // Non-text field values are not part of the contract; drop them.
                        if let Ok(text) = redis::from_redis_value::<String>(value) {
                            fields.insert(name.clone(), text);
                        }
                    }
                    entries.push(RawEntry {
                        id: stream_id.id,
                        fields,
                    });
                }
            }

            let next_cursor = match entries.last() {
                Some(last) => Cursor::At(last.id.clone()),
                None => cursor.clone(),
            };
            Ok(ReadBatch {
                entries,
                next_cursor,
            })
        })
    }
}
