//! # Message Dispatch
//!
//! [`Bot`] owns every long-lived piece of state: the session table, the
//! shared HTTP pool, the janitor task and its cancellation token. Inbound
//! messages are offered to an ordered chain of classifiers; the first one that
//! returns [`Flow::Handled`] claims the message and the rest are skipped.
//!
//! ```text
//! Inbound ──▶ search command ──pass──▶ numeric reply ──pass──▶ song link ──pass──▶ (ignored)
//!                  │                        │                      │
//!               catalog                session store            catalog
//!                  └───────────────┬────────┘──────────────────────┘
//!                                player
//! ```

use std::sync::{Arc, Mutex};

use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    download::{Player, UrlPolicy},
    error::SessionError,
    http::HttpPool,
    management::{Janitor, SessionStore, sweep_temp_files},
    meting::{CatalogClient, LinkRecognizer},
    types::{Flow, Inbound, Outbound, SelectionMode},
    utils,
};

/// Classifiers in the order they see a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    SearchCommand,
    NumericReply,
    SongLink,
}

pub const CHAIN: [Classifier; 3] = [
    Classifier::SearchCommand,
    Classifier::NumericReply,
    Classifier::SongLink,
];

pub struct Bot {
    config: Config,
    http: Arc<HttpPool>,
    store: Arc<SessionStore>,
    catalog: CatalogClient,
    links: LinkRecognizer,
    player: Player,
    cancel: CancellationToken,
    janitor: Mutex<Option<JoinHandle<()>>>,
}

impl Bot {
    /// Builds the bot and starts its janitor. Must run inside a tokio runtime.
    pub fn start(config: Config) -> Self {
        let http = Arc::new(HttpPool::with_url_policy(UrlPolicy::new(
            config.strict_url_check,
        )));
        let store = Arc::new(SessionStore::new(config.session_expiry()));
        let catalog = CatalogClient::new(
            Arc::clone(&http),
            config.api_config.clone(),
            config.api_timeout(),
        );
        let player = Player::from_config(&config, Arc::clone(&http));

        let cancel = CancellationToken::new();
        let janitor = Janitor::new(
            Arc::clone(&store),
            config.temp_dir(),
            config.janitor_interval(),
            config.download_timeout() + config.cleanup_delay() + config.janitor_interval(),
        )
        .spawn(cancel.clone());

        tracing::info!(
            "bot started (source: {}, mode: {:?})",
            config.default_source,
            config.selection_mode
        );

        Self {
            config,
            http,
            store,
            catalog,
            links: LinkRecognizer::new(),
            player,
            cancel,
            janitor: Mutex::new(Some(janitor)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Offers `msg` to each classifier in [`CHAIN`] and emits replies into `tx`.
    pub async fn handle(&self, msg: &Inbound, tx: &mpsc::Sender<Outbound>) -> Flow {
        for classifier in CHAIN {
            let flow = match classifier {
                Classifier::SearchCommand => self.on_search_command(msg, tx).await,
                Classifier::NumericReply => self.on_numeric_reply(msg, tx).await,
                Classifier::SongLink => self.on_song_link(msg, tx).await,
            };
            if flow == Flow::Handled {
                tracing::debug!("{:?} handled message from {}", classifier, msg.conversation_id);
                return Flow::Handled;
            }
        }
        Flow::Pass
    }

    async fn on_search_command(&self, msg: &Inbound, tx: &mpsc::Sender<Outbound>) -> Flow {
        let Some(keyword) = utils::strip_command(&msg.text, &self.config.search_command) else {
            return Flow::Pass;
        };
        if keyword.is_empty() {
            send(
                tx,
                Outbound::Notice(format!("Usage: /{} <song name>", self.config.search_command)),
            )
            .await;
            return Flow::Handled;
        }

        let source = self.config.default_source;
        let mut results = match self.catalog.search(keyword, source).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("search for '{}' on {} failed: {}", keyword, source, e);
                send(tx, Outbound::Failure("No matching songs found".to_string())).await;
                return Flow::Handled;
            }
        };

        match self.config.selection_mode {
            SelectionMode::Direct => {
                let first = results.swap_remove(0);
                self.player.deliver(&first, tx).await;
            }
            SelectionMode::Manual => {
                results.truncate(self.config.search_result_count);
                let list = utils::format_result_list(&results, self.store.expiry().as_secs());
                self.store.put(&msg.conversation_id, results);
                send(tx, Outbound::Notice(list)).await;
            }
        }
        Flow::Handled
    }

    async fn on_numeric_reply(&self, msg: &Inbound, tx: &mpsc::Sender<Outbound>) -> Flow {
        let Some(number) = utils::parse_selection(&msg.text) else {
            return Flow::Pass;
        };
        let index = number.checked_sub(1).unwrap_or(usize::MAX);

        match self.store.take_if_valid(&msg.conversation_id, index) {
            Ok(song) => {
                self.player.deliver(&song, tx).await;
                Flow::Handled
            }
            // plain numbers in chat are not ours when no search is pending
            Err(SessionError::NotFound) => Flow::Pass,
            Err(SessionError::Expired) => {
                send(
                    tx,
                    Outbound::Notice("Search session expired, please search again".to_string()),
                )
                .await;
                Flow::Handled
            }
            Err(SessionError::OutOfRange { len, .. }) => {
                send(
                    tx,
                    Outbound::Notice(format!("Pick a number between 1 and {}", len)),
                )
                .await;
                Flow::Handled
            }
        }
    }

    async fn on_song_link(&self, msg: &Inbound, tx: &mpsc::Sender<Outbound>) -> Flow {
        if !self.config.auto_parse_url {
            return Flow::Pass;
        }
        let Some((source, song_id)) = self.links.recognize(&msg.text) else {
            return Flow::Pass;
        };

        send(tx, Outbound::Progress("Resolving song link...".to_string())).await;
        match self.catalog.lookup(&song_id, source).await {
            Ok(song) => {
                self.player.deliver(&song, tx).await;
            }
            Err(e) => {
                tracing::warn!("lookup of {} song {} failed: {}", source, song_id, e);
                send(
                    tx,
                    Outbound::Failure("Could not resolve that song link".to_string()),
                )
                .await;
            }
        }
        Flow::Handled
    }

    /// Stops the janitor and waits for it, closes the HTTP pool, clears the
    /// session table and removes every prefixed temp file. Safe to call twice.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let janitor = self
            .janitor
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = janitor {
            if let Err(e) = handle.await {
                tracing::warn!("janitor ended abnormally: {}", e);
            }
        }

        if self.http.close() {
            tracing::debug!("http pool released");
        }

        let dropped = self.store.drain();
        if dropped > 0 {
            tracing::info!("dropped {} pending search sessions", dropped);
        }

        match sweep_temp_files(&self.config.temp_dir(), None).await {
            Ok(0) => {}
            Ok(n) => tracing::info!("removed {} temp files", n),
            Err(e) => tracing::warn!("temp file cleanup failed: {}", e),
        }
        tracing::info!("bot stopped");
    }

    /// `true` once [`Bot::shutdown`] has started.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

async fn send(tx: &mpsc::Sender<Outbound>, event: Outbound) {
    if tx.send(event).await.is_err() {
        tracing::debug!("reply channel closed, dropping event");
    }
}
