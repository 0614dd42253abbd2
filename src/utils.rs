use chrono::Utc;

use crate::types::SongRecord;

pub const TEMP_FILE_PREFIX: &str = "songpick_dl_";

pub fn infer_extension(content_type: Option<&str>) -> &'static str {
    let ctype = content_type.unwrap_or_default().to_ascii_lowercase();
    if ctype.contains("flac") {
        ".flac"
    } else if ctype.contains("m4a") || ctype.contains("mp4") {
        ".m4a"
    } else if ctype.contains("wav") {
        ".wav"
    } else {
        ".mp3"
    }
}

/// Parses a numeric chat reply into the 1-based number the user typed.
///
/// Only plain ASCII digits count; anything else is ordinary chat.
pub fn parse_selection(text: &str) -> Option<usize> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // too many digits still means "a number", just an unusable one
    Some(text.parse::<usize>().unwrap_or(usize::MAX))
}

/// Splits `"/点歌 七里香"` into the keyword, if `text` starts with `command`.
///
/// The leading slash is optional. Returns `Some("")` for a bare command.
pub fn strip_command<'a>(text: &'a str, command: &str) -> Option<&'a str> {
    let text = text.trim();
    let text = text.strip_prefix('/').unwrap_or(text);
    let rest = text.strip_prefix(command)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

pub fn format_result_list(results: &[SongRecord], expiry_secs: u64) -> String {
    let mut resp = format!("Search results (valid for {}s):", expiry_secs);
    for (i, song) in results.iter().enumerate() {
        resp.push_str(&format!("\n{}. {}", i + 1, song.display_name()));
    }
    resp
}

pub fn cache_buster() -> String {
    Utc::now().timestamp_millis().to_string()
}
