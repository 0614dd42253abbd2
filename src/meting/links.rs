use regex::Regex;

use crate::types::Source;

/// Patterns tried in this order; the first source that matches wins even when
/// a later one would match too.
const BUILTIN_PATTERNS: [(Source, &str); 4] = [
    (
        Source::Netease,
        r"music\.163\.com/.*song\?id=(\d+)|music\.163\.com/song/(\d+)",
    ),
    (
        Source::Tencent,
        r"y\.qq\.com/.*songDetail/([a-zA-Z0-9]+)|y\.qq\.com/.*songmid=([a-zA-Z0-9]+)",
    ),
    (Source::Kugou, r"kugou\.com/.*hash=([a-zA-Z0-9]+)"),
    (Source::Kuwo, r"kuwo\.cn/play_detail/(\d+)"),
];

/// Finds streaming-service song links in free-form chat text.
#[derive(Debug, Clone)]
pub struct LinkRecognizer {
    patterns: Vec<(Source, Regex)>,
}

impl LinkRecognizer {
    pub fn new() -> Self {
        let patterns = BUILTIN_PATTERNS
            .iter()
            .map(|(source, pattern)| {
                let regex = Regex::new(pattern).expect("built-in link pattern compiles");
                (*source, regex)
            })
            .collect();
        Self { patterns }
    }

    /// Builds a recognizer from a custom, ordered table.
    pub fn with_patterns(table: &[(Source, &str)]) -> Result<Self, regex::Error> {
        let patterns = table
            .iter()
            .map(|(source, pattern)| Ok((*source, Regex::new(pattern)?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { patterns })
    }

    /// Returns the source and song id of the first matching pattern.
    ///
    /// The id is the first non-empty capture group, so one pattern can carry
    /// several alternative URL shapes.
    pub fn recognize(&self, text: &str) -> Option<(Source, String)> {
        for (source, regex) in &self.patterns {
            let Some(caps) = regex.captures(text) else {
                continue;
            };
            let id = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str())
                .find(|s| !s.is_empty())?;
            return Some((*source, id.to_string()));
        }
        None
    }
}

impl Default for LinkRecognizer {
    fn default() -> Self {
        Self::new()
    }
}
