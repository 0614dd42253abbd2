use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tokio::time::Instant;

/// A remote music catalog understood by the Meting-style endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Netease,
    Tencent,
    Kugou,
    Kuwo,
    Baidu,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Netease,
        Source::Tencent,
        Source::Kugou,
        Source::Kuwo,
        Source::Baidu,
    ];

    /// Value sent as the `server` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Netease => "netease",
            Source::Tencent => "tencent",
            Source::Kugou => "kugou",
            Source::Kuwo => "kuwo",
            Source::Baidu => "baidu",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Source::ALL
            .into_iter()
            .find(|source| source.as_str() == wanted)
            .ok_or_else(|| format!("unknown source '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Manual,
    Direct,
}

/// One song as returned by the catalog. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    pub id: Option<String>,
    pub source: Option<Source>,
    pub title: String,
    pub author: String,
    pub play_url: Option<String>,
    pub cover_url: Option<String>,
    pub lyric_url: Option<String>,
}

impl SongRecord {
    pub fn display_name(&self) -> String {
        if self.author.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.author)
        }
    }
}

#[derive(Tabled)]
pub struct SongTableRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub title: String,
    pub author: String,
    pub id: String,
}

/// Pending result set for one conversation.
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub conversation_id: String,
    pub results: Vec<SongRecord>,
    pub created_at: Instant,
}

/// A fully written temp file handed to the outbound channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub size: u64,
    pub extension: &'static str,
}

/// A chat message addressed to the bot.
#[derive(Debug, Clone, Deserialize)]
pub struct Inbound {
    pub conversation_id: String,
    pub text: String,
}

/// Events emitted back to the conversation, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum Outbound {
    Notice(String),
    Progress(String),
    Attachment(DownloadedFile),
    Failure(String),
}

/// Result of offering a message to one classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Handled,
    Pass,
}
