#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("relay: {0}")]
    Relay(#[from] tracklet_relay::RelayError),

    #[error("stats: {0}")]
    Stats(#[from] crossroad_stats::StatsError),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
