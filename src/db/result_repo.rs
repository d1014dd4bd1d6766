use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{ChartKind, LeaderboardEntry, ResultSummary, SongPoints};

#[derive(Debug, Clone, FromRow)]
pub struct ResultRow {
    pub id: Uuid,
    pub chart_id: Uuid,
    pub chart_name: String,
    pub kind: String,
    pub round_date: NaiveDate,
    pub computed_at: DateTime<Utc>,
    pub entries: i64,
}

impl TryFrom<ResultRow> for ResultSummary {
    type Error = anyhow::Error;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        let kind = ChartKind::from_str(&row.kind)
            .ok_or_else(|| anyhow::anyhow!("result {} has unknown kind {:?}", row.id, row.kind))?;

        Ok(ResultSummary {
            id: row.id,
            chart_id: row.chart_id,
            chart_name: row.chart_name,
            kind,
            round_date: row.round_date,
            computed_at: row.computed_at,
            entries: row.entries,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct EntryRow {
    pub user_id: Uuid,
    pub username: String,
    pub total_points: Decimal,
    pub breakdown: Json<Vec<SongPoints>>,
}

impl From<EntryRow> for LeaderboardEntry {
    fn from(row: EntryRow) -> Self {
        LeaderboardEntry {
            user_id: row.user_id,
            username: row.username,
            total_points: row.total_points,
            breakdown: row.breakdown.0,
        }
    }
}

const SUMMARY_SELECT: &str = r#"
    SELECT r.id, r.chart_id, r.chart_name, r.kind, r.round_date, r.computed_at,
           (SELECT COUNT(*) FROM leaderboard_entries e WHERE e.result_id = r.id) AS entries
    FROM results r
"#;

pub async fn get_result(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<ResultRow>> {
    let row = sqlx::query_as::<_, ResultRow>(&format!("{SUMMARY_SELECT} WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_result_for_round(
    pool: &PgPool,
    chart_id: Uuid,
    round_date: NaiveDate,
) -> anyhow::Result<Option<ResultRow>> {
    let row = sqlx::query_as::<_, ResultRow>(&format!(
        "{SUMMARY_SELECT} WHERE r.chart_id = $1 AND r.round_date = $2"
    ))
    .bind(chart_id)
    .bind(round_date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// All results, newest round first.
pub async fn list_results(pool: &PgPool) -> anyhow::Result<Vec<ResultRow>> {
    let rows = sqlx::query_as::<_, ResultRow>(&format!(
        "{SUMMARY_SELECT} ORDER BY r.round_date DESC, r.computed_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Leaderboard in the order it was recorded.
pub async fn get_entries(pool: &PgPool, result_id: Uuid) -> anyhow::Result<Vec<EntryRow>> {
    let rows = sqlx::query_as::<_, EntryRow>(
        r#"
        SELECT user_id, username, total_points, breakdown
        FROM leaderboard_entries
        WHERE result_id = $1
        ORDER BY seq ASC
        "#,
    )
    .bind(result_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Insert the result header. Returns `None` if the round already has one.
pub async fn insert_result(
    conn: &mut PgConnection,
    chart_id: Uuid,
    chart_name: &str,
    kind: ChartKind,
    round_date: NaiveDate,
    computed_at: DateTime<Utc>,
) -> anyhow::Result<Option<Uuid>> {
    let id: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO results (chart_id, chart_name, kind, round_date, computed_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (chart_id, round_date) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(chart_id)
    .bind(chart_name)
    .bind(kind.as_str())
    .bind(round_date)
    .bind(computed_at)
    .fetch_optional(conn)
    .await?;

    Ok(id.map(|(id,)| id))
}

pub async fn insert_entry(
    conn: &mut PgConnection,
    result_id: Uuid,
    seq: i32,
    entry: &LeaderboardEntry,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO leaderboard_entries (result_id, seq, user_id, username, total_points, breakdown)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(result_id)
    .bind(seq)
    .bind(entry.user_id)
    .bind(&entry.username)
    .bind(entry.total_points)
    .bind(Json(&entry.breakdown))
    .execute(conn)
    .await?;

    Ok(())
}
