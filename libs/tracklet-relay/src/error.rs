#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Транзиентный сбой транспорта — восстанавливается через reconnect.
    #[error("upstream connection: {0}")]
    Connection(String),

    /// Сериализация исходящей коллекции. Единственный фатальный путь relay loop.
    #[error("serialize feature collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<redis::RedisError> for RelayError {
    fn from(e: redis::RedisError) -> Self {
        RelayError::Connection(e.to_string())
    }
}
