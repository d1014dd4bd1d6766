use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::charts::{ChartEntry, ChartPair};
use crate::models::{ChartKind, SongPick, SongPoints};

use super::normalize::match_key;

/// Decimal places kept per song before lead-single doubling.
const POINT_SCALE: u32 = 4;

/// Base score scale: a pick at its exact chart rank earns this much.
const MAX_BASE_POINTS: i64 = 10;

/// Weeks-on-chart beyond which the stability index is capped.
const STABILITY_CAP_AFTER_WEEKS: i64 = 50;
/// Stability index used once a song is past the cap.
const STABILITY_CAP: i64 = 11;

const LEAD_SINGLE_MULTIPLIER: Decimal = Decimal::TWO;
const NEW_ENTRY_MULTIPLIER: Decimal = Decimal::TWO;
/// Weight applied to the current stream count / current rank in the momentum formula.
const STREAM_WEIGHT: Decimal = Decimal::TWO;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("zero denominator while scoring `{match_key}` at rank {rank}")]
    ZeroDenominator { match_key: String, rank: u32 },

    #[error("streaming chart entry `{match_key}` has no stream count")]
    MissingStreams { match_key: String },

    #[error("streaming chart scored without a previous snapshot")]
    MissingPreviousSnapshot,
}

/// Per-song breakdown and total for one slate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlateScore {
    pub total_points: Decimal,
    pub breakdown: Vec<SongPoints>,
}

/// Score a slate against chart truth.
///
/// Picks are visited in slate order; the 1-indexed position is the rank the
/// user claimed. A pick that did not chart is kept in the breakdown with zero
/// points. Lead singles are doubled after the formula is applied.
pub fn score_slate(picks: &[SongPick], chart: &ChartPair) -> Result<SlateScore, ScoringError> {
    let current = &chart.current;
    let previous = match current.kind() {
        ChartKind::RankFeed => None,
        ChartKind::StreamTable => Some(
            chart
                .previous
                .as_ref()
                .ok_or(ScoringError::MissingPreviousSnapshot)?,
        ),
    };
    let mode = current.title_mode();

    let mut total_points = Decimal::ZERO;
    let mut breakdown = Vec::with_capacity(picks.len());

    for (i, pick) in picks.iter().enumerate() {
        let position = u32::try_from(i + 1).unwrap_or(u32::MAX);
        let key = match_key(&pick.artist, &pick.title, mode);
        let entry = current.get(&key);

        let base = match (entry, previous) {
            (None, _) => Decimal::ZERO,
            (Some(entry), None) => rank_points(position, entry),
            (Some(entry), Some(previous)) => momentum_points(entry, previous.get(&key))?,
        };

        let points = if pick.lead_single {
            base * LEAD_SINGLE_MULTIPLIER
        } else {
            base
        };
        total_points += points;

        breakdown.push(SongPoints {
            position,
            title: pick.title.clone(),
            artist: pick.artist.clone(),
            match_key: key,
            chart_rank: entry.map(|e| e.rank),
            points,
            lead_single: pick.lead_single,
        });
    }

    Ok(SlateScore {
        total_points,
        breakdown,
    })
}

fn stability_index(weeks_on_chart: i64) -> i64 {
    if weeks_on_chart > STABILITY_CAP_AFTER_WEEKS {
        STABILITY_CAP
    } else {
        weeks_on_chart.max(1)
    }
}

/// Rank-feed formula.
///
/// `base = 10 - min(|position - rank|, 9)`, plus a bonus of
/// `(movement / 10 - peak_gap / 20) / (1 + stability / 10)` where movement is
/// last week's rank minus this week's and peak_gap is the distance below the
/// all-time peak. New entries (no last-week rank) are doubled. Never negative.
/// Absent metadata counts as zero.
pub fn rank_points(position: u32, entry: &ChartEntry) -> Decimal {
    let rank = i64::from(entry.rank);
    let last_week = i64::from(entry.last_week_rank.unwrap_or(0));
    let peak = i64::from(entry.peak_rank.unwrap_or(0));
    let weeks = i64::from(entry.weeks_on_chart.unwrap_or(0));

    let distance = (i64::from(position) - rank).abs().min(MAX_BASE_POINTS - 1);
    let base = Decimal::from(MAX_BASE_POINTS - distance);

    let movement = if last_week > 0 { last_week - rank } else { 0 };
    let peak_gap = if peak > 0 { (rank - peak).max(0) } else { 0 };
    let damping = Decimal::ONE + Decimal::from(stability_index(weeks)) / Decimal::TEN;
    let bonus = (Decimal::from(movement) / Decimal::TEN - Decimal::from(peak_gap) / Decimal::from(20))
        / damping;

    let mut raw = base + bonus;
    if last_week == 0 {
        raw *= NEW_ENTRY_MULTIPLIER;
    }

    raw.max(Decimal::ZERO).round_dp(POINT_SCALE)
}

/// Streaming momentum formula.
///
/// Charted in both periods: `(prev_rank + 2*streams) / (prev_streams + 2*rank)`.
/// New entry: `2*streams / rank`.
pub fn momentum_points(
    entry: &ChartEntry,
    previous: Option<&ChartEntry>,
) -> Result<Decimal, ScoringError> {
    let streams = entry.streams.ok_or_else(|| ScoringError::MissingStreams {
        match_key: entry.match_key.clone(),
    })?;
    let streams = Decimal::from(streams);
    let rank = Decimal::from(entry.rank);

    let (numerator, denominator) = match previous {
        Some(prev) => {
            let prev_streams = prev.streams.ok_or_else(|| ScoringError::MissingStreams {
                match_key: prev.match_key.clone(),
            })?;
            (
                Decimal::from(prev.rank) + STREAM_WEIGHT * streams,
                Decimal::from(prev_streams) + STREAM_WEIGHT * rank,
            )
        }
        None => (STREAM_WEIGHT * streams, rank),
    };

    if denominator.is_zero() {
        return Err(ScoringError::ZeroDenominator {
            match_key: entry.match_key.clone(),
            rank: entry.rank,
        });
    }

    Ok((numerator / denominator).round_dp(POINT_SCALE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartSnapshot;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 4).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn feed_entry(key: &str, rank: u32, peak: u32, last_week: Option<u32>, weeks: u32) -> ChartEntry {
        ChartEntry {
            match_key: key.into(),
            title: key.into(),
            artist: key.into(),
            rank,
            peak_rank: Some(peak),
            last_week_rank: last_week,
            weeks_on_chart: Some(weeks),
            streams: None,
        }
    }

    fn stream_entry(key: &str, rank: u32, streams: u64) -> ChartEntry {
        ChartEntry {
            match_key: key.into(),
            title: key.into(),
            artist: key.into(),
            rank,
            peak_rank: None,
            last_week_rank: None,
            weeks_on_chart: None,
            streams: Some(streams),
        }
    }

    fn feed_pair(entries: Vec<ChartEntry>) -> ChartPair {
        ChartPair::single(ChartSnapshot::new(ChartKind::RankFeed, date(), entries))
    }

    #[test]
    fn test_concrete_scenario() {
        let chart = feed_pair(vec![feed_entry("ax", 1, 1, Some(2), 3)]);
        let picks = vec![SongPick::new("A", "X"), SongPick::new("B", "Y")];

        let score = score_slate(&picks, &chart).unwrap();
        assert_eq!(score.breakdown.len(), 2);

        let first = &score.breakdown[0];
        assert_eq!(first.match_key, "ax");
        assert_eq!(first.chart_rank, Some(1));
        assert!(first.points > Decimal::ZERO);
        // base 10 + (1/10) / 1.3
        assert_eq!(first.points, dec("10.0769"));

        let second = &score.breakdown[1];
        assert_eq!(second.position, 2);
        assert_eq!(second.points, Decimal::ZERO);
        assert_eq!(second.chart_rank, None);

        assert_eq!(score.total_points, first.points);
    }

    #[test]
    fn test_unmatched_does_not_alter_others() {
        let chart = feed_pair(vec![feed_entry("ax", 1, 1, Some(2), 3)]);
        let alone = score_slate(&[SongPick::new("A", "X")], &chart).unwrap();
        let with_miss = score_slate(
            &[SongPick::new("A", "X"), SongPick::new("Nobody", "Nothing")],
            &chart,
        )
        .unwrap();
        assert_eq!(alone.breakdown[0], with_miss.breakdown[0]);
        assert_eq!(alone.total_points, with_miss.total_points);
    }

    #[test]
    fn test_position_distance_lowers_base() {
        let entry = feed_entry("ax", 3, 3, Some(3), 10);
        assert_eq!(rank_points(3, &entry), Decimal::from(10));
        assert_eq!(rank_points(1, &entry), Decimal::from(8));
        // Distance is capped so a charting song always earns at least one point
        assert_eq!(rank_points(100, &entry), Decimal::from(1));
    }

    #[test]
    fn test_new_entry_doubled() {
        let entry = feed_entry("ax", 5, 5, None, 1);
        assert_eq!(rank_points(5, &entry), Decimal::from(20));
    }

    #[test]
    fn test_stability_cap_after_fifty_weeks() {
        let fifty = feed_entry("ax", 1, 1, Some(11), 50);
        let fifty_one = feed_entry("ax", 1, 1, Some(11), 51);
        // bonus 1.0 damped by 1 + 50/10 and by 1 + 11/10
        assert_eq!(rank_points(1, &fifty), dec("10.1667"));
        assert_eq!(rank_points(1, &fifty_one), dec("10.4762"));
    }

    #[test]
    fn test_falling_song_never_negative() {
        let entry = feed_entry("ax", 100, 1, Some(2), 1);
        assert_eq!(rank_points(1, &entry), Decimal::ZERO);
    }

    #[test]
    fn test_missing_metadata_scores_as_zero() {
        let entry = ChartEntry {
            peak_rank: None,
            last_week_rank: None,
            weeks_on_chart: None,
            ..feed_entry("ax", 2, 0, None, 0)
        };
        // base 10, no bonus, new-entry doubling
        assert_eq!(rank_points(2, &entry), Decimal::from(20));
    }

    #[test]
    fn test_lead_single_doubles_once() {
        let chart = feed_pair(vec![feed_entry("ax", 1, 1, Some(2), 3)]);
        let plain = score_slate(&[SongPick::new("A", "X")], &chart).unwrap();
        let lead = score_slate(&[SongPick::new("A", "X").lead()], &chart).unwrap();

        let p = plain.breakdown[0].points;
        assert_eq!(lead.breakdown[0].points, p * Decimal::TWO);
        assert_eq!(lead.total_points, p * Decimal::TWO);
        assert!(lead.breakdown[0].lead_single);
    }

    #[test]
    fn test_deterministic() {
        let chart = feed_pair(vec![
            feed_entry("ax", 1, 1, Some(2), 3),
            feed_entry("by", 2, 1, Some(1), 20),
        ]);
        let picks = vec![
            SongPick::new("B", "Y").lead(),
            SongPick::new("A", "X"),
            SongPick::new("C", "Z"),
        ];
        let first = score_slate(&picks, &chart).unwrap();
        let second = score_slate(&picks, &chart).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_momentum_formula() {
        let current = ChartSnapshot::new(
            ChartKind::StreamTable,
            date(),
            vec![stream_entry("aone", 1, 1000), stream_entry("btwo", 2, 500)],
        );
        let previous = ChartSnapshot::new(
            ChartKind::StreamTable,
            date().pred_opt().unwrap(),
            vec![stream_entry("aone", 2, 800)],
        );
        let chart = ChartPair {
            current,
            previous: Some(previous),
        };

        let score = score_slate(&[SongPick::new("A", "One"), SongPick::new("B", "Two")], &chart)
            .unwrap();
        // (2 + 2*1000) / (800 + 2*1)
        assert_eq!(score.breakdown[0].points, dec("2.4963"));
        // new entry: 2*500 / 2
        assert_eq!(score.breakdown[1].points, Decimal::from(500));
    }

    #[test]
    fn test_momentum_matches_stripped_titles() {
        let current = ChartSnapshot::new(
            ChartKind::StreamTable,
            date(),
            vec![stream_entry("taylorantihero", 4, 100)],
        );
        let chart = ChartPair {
            current,
            previous: Some(ChartSnapshot::new(ChartKind::StreamTable, date(), vec![])),
        };
        let score = score_slate(&[SongPick::new("Taylor Swift", "Anti-Hero (Remix)")], &chart)
            .unwrap();
        assert_eq!(score.breakdown[0].points, Decimal::from(50));
    }

    #[test]
    fn test_zero_denominator_is_error() {
        let current = ChartSnapshot::new(
            ChartKind::StreamTable,
            date(),
            vec![stream_entry("aone", 0, 1000)],
        );
        let chart = ChartPair {
            current,
            previous: Some(ChartSnapshot::new(ChartKind::StreamTable, date(), vec![])),
        };
        let err = score_slate(&[SongPick::new("A", "One")], &chart).unwrap_err();
        assert_eq!(
            err,
            ScoringError::ZeroDenominator {
                match_key: "aone".into(),
                rank: 0
            }
        );
    }

    #[test]
    fn test_stream_chart_requires_previous() {
        let chart = ChartPair::single(ChartSnapshot::new(ChartKind::StreamTable, date(), vec![]));
        assert_eq!(
            score_slate(&[SongPick::new("A", "One")], &chart),
            Err(ScoringError::MissingPreviousSnapshot)
        );
    }
}
