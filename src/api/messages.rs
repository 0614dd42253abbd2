use std::sync::Arc;

use axum::{
    Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tokio::sync::mpsc;

use crate::{
    bot::Bot,
    types::{Flow, Inbound},
};

const REPLY_BUFFER: usize = 16;

/// Runs one inbound chat message through the bot.
///
/// Responds with the ordered list of outbound events, or `204 No Content`
/// when no classifier claimed the message. Attachment paths stay valid for
/// the configured cleanup delay.
pub async fn messages(
    Extension(bot): Extension<Arc<Bot>>,
    Json(msg): Json<Inbound>,
) -> Response {
    if bot.is_stopped() {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let (tx, mut rx) = mpsc::channel(REPLY_BUFFER);
    let worker = tokio::spawn(async move { bot.handle(&msg, &tx).await });

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    match worker.await {
        Ok(Flow::Handled) => Json(events).into_response(),
        Ok(Flow::Pass) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::warn!("message handler crashed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
