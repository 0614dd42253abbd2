use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::bot::Bot;

pub async fn health(Extension(bot): Extension<Arc<Bot>>) -> Json<Value> {
    Json(json!({
        "status": if bot.is_stopped() { "stopping" } else { "ok" },
        "version": env!("CARGO_PKG_VERSION"),
        "pending_sessions": bot.store().len(),
    }))
}
