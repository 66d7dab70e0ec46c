use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use serde::Deserialize;

use tracklet_relay::Frame;

use super::AppState;

// ═══════════════════════════════════════════════════════════════
//  SSE: GET /api/stream?topic=...
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct StreamParams {
    topic: Option<String>,
}

/// Один relay instance на соединение; живёт пока клиент читает.
/// Backpressure естественный: следующий кадр вычисляется только после
/// того, как текущий принят транспортом.
pub(crate) async fn handle_stream(
    State(state): State<AppState>,
    Query(params): Query<StreamParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let topic = params.topic.unwrap_or_else(|| state.default_topic.clone());
    tracing::info!(topic = %topic, "stream client connected");

    let frames = tracklet_relay::frames(state.connector.clone(), topic, state.relay.clone());
    Sse::new(frames.map(|frame| Ok::<_, Infallible>(frame_event(frame))))
}

fn frame_event(frame: Frame) -> Event {
    match frame {
        Frame::Data(json) => Event::default().data(json),
        Frame::Keepalive => Event::default().comment("keepalive"),
        Frame::Error(message) => Event::default().event("error").data(message),
    }
}
