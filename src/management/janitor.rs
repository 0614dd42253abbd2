use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use futures_util::StreamExt;
use tokio::{task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{management::SessionStore, utils::TEMP_FILE_PREFIX};

/// Background loop that evicts expired sessions and orphaned temp files.
#[derive(Debug, Clone)]
pub struct Janitor {
    store: Arc<SessionStore>,
    temp_dir: PathBuf,
    interval: Duration,
    orphan_age: Duration,
}

impl Janitor {
    /// `orphan_age` must exceed the longest a download plus its cleanup delay
    /// can take, otherwise in-flight files get swept.
    pub fn new(
        store: Arc<SessionStore>,
        temp_dir: PathBuf,
        interval: Duration,
        orphan_age: Duration,
    ) -> Self {
        Self {
            store,
            temp_dir,
            interval,
            orphan_age,
        }
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Ticks every `interval` until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::debug!("janitor started (interval {:?})", self.interval);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
            self.tick().await;
        }
        tracing::debug!("janitor stopped");
    }

    /// One sweep. Failures are logged and never end the loop.
    pub async fn tick(&self) -> usize {
        let expired = self.store.sweep_expired(Instant::now());
        if expired > 0 {
            tracing::info!("evicted {} expired search sessions", expired);
        }

        match sweep_temp_files(&self.temp_dir, Some(self.orphan_age)).await {
            Ok(0) => {}
            Ok(n) => tracing::info!("removed {} orphaned temp files", n),
            Err(e) => tracing::warn!("temp file sweep failed: {}", e),
        }

        expired
    }
}

/// Deletes files in `dir` carrying the download prefix.
///
/// With `older_than`, only files last modified at least that long ago go.
/// Files that vanish or refuse deletion are skipped.
pub async fn sweep_temp_files(dir: &Path, older_than: Option<Duration>) -> io::Result<usize> {
    let mut entries = async_fs::read_dir(dir).await?;
    let mut removed = 0;

    while let Some(entry) = entries.next().await {
        let Ok(entry) = entry else {
            continue;
        };
        if !entry
            .file_name()
            .to_string_lossy()
            .starts_with(TEMP_FILE_PREFIX)
        {
            continue;
        }

        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        if let Some(age) = older_than {
            let old_enough = metadata
                .modified()
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .is_some_and(|elapsed| elapsed >= age);
            if !old_enough {
                continue;
            }
        }

        match async_fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => tracing::debug!("could not remove {}: {}", entry.path().display(), e),
        }
    }

    Ok(removed)
}
