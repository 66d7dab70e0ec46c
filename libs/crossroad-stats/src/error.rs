#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("clickhouse request: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx ответ; тело ответа ClickHouse как сообщение.
    #[error("clickhouse: {0}")]
    Server(String),

    #[error("parse row: {0}")]
    Parse(#[from] serde_json::Error),
}
