use std::sync::Arc;

use crate::{bot::Bot, cli::load_config, config, error, info, server, success, warning};

pub async fn serve() {
    let config = load_config().await;
    if config.api_config.endpoint().is_none() {
        warning!("No catalog endpoint configured; searches will find nothing.");
    }

    let addr = config::server_addr();
    let bot = Arc::new(Bot::start(config));
    info!("Serving on http://{}", addr);

    if let Err(e) = server::start_api_server(bot, &addr).await {
        error!("Server failed. Err: {}", e);
    }
    success!("Stopped.");
}
