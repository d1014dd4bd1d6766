use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::ChartKind;
use crate::scoring::match_key;

use super::snapshot::{ChartDataError, ChartEntry, ChartSnapshot};

/// Weekly ranked chart as served by the feed.
///
/// Numeric fields arrive as numbers, numeric strings, `"-"` or not at all, so
/// they are kept as raw JSON and parsed leniently.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankFeedPayload {
    pub week: String,
    #[serde(default)]
    pub songs: Vec<RankFeedSong>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankFeedSong {
    #[serde(default)]
    pub rank: Value,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub position: FeedPosition,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedPosition {
    #[serde(default, alias = "positionLastWeek")]
    pub last_week: Value,
    #[serde(default, alias = "peakPosition")]
    pub peak: Value,
    #[serde(default, alias = "weeksOnChart")]
    pub weeks_on_chart: Value,
}

/// Parse a feed number. Anything that is not a non-negative integer is `None`.
fn lenient_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts `2024-05-04` and `Week of May 4, 2024`.
pub fn parse_week(week: &str) -> Result<NaiveDate, ChartDataError> {
    let trimmed = week.trim();
    let without_prefix = trimmed.strip_prefix("Week of ").unwrap_or(trimmed);

    NaiveDate::parse_from_str(without_prefix, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(without_prefix, "%B %d, %Y"))
        .map_err(|_| ChartDataError::InvalidDate(week.to_string()))
}

/// Missing optional metadata stays `None` and is scored as zero.
///
/// The rank is the exception: a missing, zero or non-numeric rank falls back
/// to the song's 1-based position in the feed instead of zero.
pub fn into_snapshot(payload: RankFeedPayload) -> Result<ChartSnapshot, ChartDataError> {
    let date = parse_week(&payload.week)?;
    let mode = ChartKind::RankFeed.title_mode();

    let entries = payload
        .songs
        .into_iter()
        .enumerate()
        .map(|(i, song)| {
            let source_rank = u32::try_from(i + 1).unwrap_or(u32::MAX);
            let rank = lenient_u32(&song.rank)
                .filter(|r| *r > 0)
                .unwrap_or(source_rank);

            ChartEntry {
                match_key: match_key(&song.artist, &song.title, mode),
                rank,
                peak_rank: lenient_u32(&song.position.peak),
                last_week_rank: lenient_u32(&song.position.last_week),
                weeks_on_chart: lenient_u32(&song.position.weeks_on_chart),
                streams: None,
                title: song.title,
                artist: song.artist,
            }
        })
        .collect();

    Ok(ChartSnapshot::new(ChartKind::RankFeed, date, entries))
}
