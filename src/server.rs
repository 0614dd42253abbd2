use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr, sync::Arc};

use crate::{Res, api, bot::Bot};

pub fn router(bot: Arc<Bot>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/messages", post(api::messages))
        .layer(Extension(bot))
}

/// Serves the webhook surface until Ctrl-C, then shuts the bot down.
pub async fn start_api_server(bot: Arc<Bot>, addr: &str) -> Res<()> {
    let addr = SocketAddr::from_str(addr)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, router(Arc::clone(&bot)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    bot.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
