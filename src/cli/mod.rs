//! # CLI Module
//!
//! User-facing commands of the `songpick` binary.
//!
//! - [`serve`] - runs the webhook server (`POST /messages`, `GET /health`)
//!   until Ctrl-C, then shuts the bot down cleanly.
//! - [`chat`] - a local stand-in for a chat host: every stdin line is an
//!   inbound message from one conversation, replies are printed as they arrive.
//! - [`search`] - one-shot catalog search printed as a table, handy for
//!   checking an `api_config` block.
//!
//! Every command loads the configuration through [`load_config`] and exits
//! with a readable message when it is broken.

mod chat;
mod search;
mod serve;

pub use chat::chat;
pub use search::search;
pub use serve::serve;

use crate::{config::Config, error};

pub(crate) async fn load_config() -> Config {
    match Config::load().await {
        Ok(config) => config,
        Err(e) => error!(
            "Cannot load config from {}. Err: {}",
            crate::config::config_path().display(),
            e
        ),
    }
}
