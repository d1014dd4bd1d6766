use serde::{Deserialize, Serialize};

/// How a title is treated before it becomes part of a match key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleMode {
    /// Use the title as published.
    Full,
    /// Cut the title at the first `(` so "(feat. X)" / "(Remix)" suffixes
    /// don't break matching. Used for streaming charts.
    StripSuffix,
}

/// Reduce an (artist, title) pair to the key used to align a prediction
/// against a chart entry.
///
/// Only the first whitespace-delimited token of the artist is kept, which
/// drops featured artists. Everything that is not `a-z` after lower-casing is
/// removed, so casing, punctuation, digits and spacing never affect the key.
/// Distinct songs can collide; that is accepted.
pub fn match_key(artist: &str, title: &str, mode: TitleMode) -> String {
    let primary_artist = artist.split_whitespace().next().unwrap_or("");
    let title = match mode {
        TitleMode::Full => title,
        TitleMode::StripSuffix => title.split('(').next().unwrap_or(""),
    };

    format!("{primary_artist}-{title}")
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}
