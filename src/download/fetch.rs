use std::{path::PathBuf, sync::Arc, time::Duration};

use futures_util::StreamExt;
use reqwest::{StatusCode, header::CONTENT_TYPE};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::{
    error::FetchError,
    http::HttpPool,
    types::DownloadedFile,
    utils::{TEMP_FILE_PREFIX, infer_extension},
};

const CHUNK_SIZE: usize = 8192;

/// Streams remote audio into prefixed temp files.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: Arc<HttpPool>,
    temp_dir: PathBuf,
}

impl Fetcher {
    pub fn new(http: Arc<HttpPool>, temp_dir: PathBuf) -> Self {
        Self { http, temp_dir }
    }

    pub fn temp_dir(&self) -> &PathBuf {
        &self.temp_dir
    }

    /// Downloads `url` into a new temp file.
    ///
    /// The caller must have run the URL through the policy check. The declared
    /// `Content-Length` is checked against `max_bytes` before the body is
    /// touched, and the running byte count is checked again while streaming.
    /// Any failure removes the partially written file.
    pub async fn fetch(
        &self,
        url: &str,
        max_bytes: u64,
        timeout: Duration,
    ) -> Result<DownloadedFile, FetchError> {
        let client = self.http.client().ok_or(FetchError::Closed)?;
        let resp = client.get(url).timeout(timeout).send().await?;

        if resp.status() != StatusCode::OK {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        let declared = resp.content_length().ok_or(FetchError::UnknownLength)?;
        if declared == 0 {
            return Err(FetchError::EmptyBody);
        }
        if declared > max_bytes {
            return Err(FetchError::TooLarge {
                size: declared,
                limit: max_bytes,
            });
        }

        let extension = infer_extension(
            resp.headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        );

        // the temp path deletes the file when dropped, so every early return
        // below cleans up after itself
        let (file, temp_path) = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(extension)
            .tempfile_in(&self.temp_dir)?
            .into_parts();
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, tokio::fs::File::from_std(file));

        let mut written: u64 = 0;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > max_bytes {
                return Err(FetchError::TooLarge {
                    size: written,
                    limit: max_bytes,
                });
            }
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;
        writer.into_inner().sync_all().await?;

        if written == 0 {
            return Err(FetchError::EmptyBody);
        }

        let path = temp_path.keep().map_err(|e| FetchError::Io(e.error))?;
        tracing::info!("downloaded {} bytes to {}", written, path.display());

        Ok(DownloadedFile {
            path,
            size: written,
            extension,
        })
    }
}
