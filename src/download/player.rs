use std::{path::PathBuf, sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    config::Config,
    download::{Fetcher, UrlPolicy},
    http::HttpPool,
    types::{Outbound, SongRecord},
};

/// Turns a chosen song into a sequence of outbound events.
///
/// Each call to [`Player::deliver`] is one playback attempt: every failure
/// ends that attempt with a single notice and never reaches the caller.
#[derive(Debug, Clone)]
pub struct Player {
    fetcher: Fetcher,
    policy: UrlPolicy,
    max_bytes: u64,
    download_timeout: Duration,
    cleanup_delay: Duration,
}

impl Player {
    pub fn new(
        fetcher: Fetcher,
        policy: UrlPolicy,
        max_bytes: u64,
        download_timeout: Duration,
        cleanup_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            policy,
            max_bytes,
            download_timeout,
            cleanup_delay,
        }
    }

    pub fn from_config(config: &Config, http: Arc<HttpPool>) -> Self {
        Self::new(
            Fetcher::new(http, config.temp_dir()),
            UrlPolicy::new(config.strict_url_check),
            config.max_file_bytes(),
            config.download_timeout(),
            config.cleanup_delay(),
        )
    }

    /// Emits progress, the file attachment, or a failure notice into `tx`.
    ///
    /// On success the temp file is deleted `cleanup_delay` after it was handed
    /// to `tx`, giving the transport time to read it. The returned handle
    /// resolves once that deletion ran; `None` means no file was produced.
    pub async fn deliver(
        &self,
        song: &SongRecord,
        tx: &mpsc::Sender<Outbound>,
    ) -> Option<JoinHandle<()>> {
        let Some(url) = song.play_url.as_deref().filter(|u| !u.trim().is_empty()) else {
            let _ = tx
                .send(Outbound::Failure(format!(
                    "No playable address for {}",
                    song.title
                )))
                .await;
            return None;
        };

        if let Err(e) = self.policy.check(url) {
            tracing::warn!("rejected song url for '{}': {}", song.title, e);
            let _ = tx
                .send(Outbound::Failure(format!(
                    "Refusing to fetch {}: {}",
                    song.title, e
                )))
                .await;
            return None;
        }

        let _ = tx
            .send(Outbound::Progress(format!(
                "Preparing audio: {}...",
                song.display_name()
            )))
            .await;

        let file = match self
            .fetcher
            .fetch(url, self.max_bytes, self.download_timeout)
            .await
        {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("download of '{}' failed: {}", song.title, e);
                let notice = if e.is_size_limit() {
                    format!(
                        "{} exceeds the {} MiB size limit",
                        song.title,
                        self.max_bytes / (1024 * 1024)
                    )
                } else {
                    format!("Download failed: {}", song.title)
                };
                let _ = tx.send(Outbound::Failure(notice)).await;
                return None;
            }
        };

        let path = file.path.clone();
        let delay = match tx.send(Outbound::Attachment(file)).await {
            Ok(()) => self.cleanup_delay,
            // nobody will read it
            Err(_) => Duration::ZERO,
        };
        Some(tokio::spawn(remove_after(path, delay)))
    }
}

async fn remove_after(path: PathBuf, delay: Duration) {
    tokio::time::sleep(delay).await;
    match async_fs::remove_file(&path).await {
        Ok(()) => tracing::debug!("removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("failed to remove {}: {}", path.display(), e),
    }
}
