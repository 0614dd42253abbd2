use std::{sync::Arc, time::Duration};

use reqwest::StatusCode;
use serde_json::Value;

use crate::{
    config::ApiConfig,
    error::CatalogError,
    http::HttpPool,
    types::{SongRecord, Source},
    utils,
};

/// Client for a Meting-style catalog endpoint.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Arc<HttpPool>,
    api: ApiConfig,
    timeout: Duration,
}

impl CatalogClient {
    pub fn new(http: Arc<HttpPool>, api: ApiConfig, timeout: Duration) -> Self {
        Self { http, api, timeout }
    }

    /// Searches `source` for `keyword`. Results keep the catalog's ranking.
    ///
    /// # Errors
    ///
    /// Any transport problem, non-200 status, non-JSON body or empty result
    /// list is an error; callers treat all of them as "nothing found".
    pub async fn search(
        &self,
        keyword: &str,
        source: Source,
    ) -> Result<Vec<SongRecord>, CatalogError> {
        let json = self.request("search", "keywords", keyword, source).await?;
        let songs: Vec<SongRecord> = match json {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| parse_song(item, source))
                .collect(),
            _ => Vec::new(),
        };

        if songs.is_empty() {
            return Err(CatalogError::Empty);
        }
        tracing::debug!("{} results for '{}' on {}", songs.len(), keyword, source);
        Ok(songs)
    }

    /// Fetches a single song by its catalog id.
    ///
    /// The endpoint answers with either an object or a one-element array.
    pub async fn lookup(&self, song_id: &str, source: Source) -> Result<SongRecord, CatalogError> {
        let json = self.request("song", "id", song_id, source).await?;
        let item = match &json {
            Value::Array(items) => items.first(),
            Value::Object(_) => Some(&json),
            _ => None,
        };

        item.and_then(|item| parse_song(item, source))
            .map(|mut song| {
                if song.id.is_none() {
                    song.id = Some(song_id.to_string());
                }
                song
            })
            .ok_or(CatalogError::Empty)
    }

    async fn request(
        &self,
        kind: &str,
        query_key: &str,
        query: &str,
        source: Source,
    ) -> Result<Value, CatalogError> {
        let endpoint = self.api.endpoint().ok_or(CatalogError::NotConfigured)?;
        let client = self.http.client().ok_or(CatalogError::Closed)?;

        let cache_buster = utils::cache_buster();
        let res = client
            .get(&endpoint)
            .query(&[
                ("server", source.as_str()),
                ("type", kind),
                (query_key, query),
                ("_t", cache_buster.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            return Err(CatalogError::Status(res.status().as_u16()));
        }

        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn parse_song(item: &Value, source: Source) -> Option<SongRecord> {
    if !item.is_object() {
        return None;
    }

    let title = first_str(item, &["title", "name"]);
    let play_url = first_str(item, &["url", "download_url"]);
    if title.is_none() && play_url.is_none() {
        return None;
    }

    let author = ["author", "artist"]
        .iter()
        .find_map(|key| match &item[*key] {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Array(names) => {
                let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
                (!names.is_empty()).then(|| names.join(" / "))
            }
            _ => None,
        })
        .unwrap_or_default();

    let id = match &item["id"] {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };

    Some(SongRecord {
        id,
        source: Some(source),
        title: title.unwrap_or_else(|| "Unknown".to_string()),
        author,
        play_url,
        cover_url: first_str(item, &["pic", "cover"]),
        lyric_url: first_str(item, &["lrc", "lyric"]),
    })
}

fn first_str(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item[*key].as_str())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
