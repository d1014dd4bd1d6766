use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{PredictionSlate, SongPick};
use crate::settlement::ConsumedSlate;

#[derive(Debug, Clone, FromRow)]
pub struct SlateRow {
    pub id: Uuid,
    pub chart_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub picks: Json<Vec<SongPick>>,
    pub submitted_at: DateTime<Utc>,
}

impl From<SlateRow> for PredictionSlate {
    fn from(row: SlateRow) -> Self {
        PredictionSlate {
            id: row.id,
            chart_id: row.chart_id,
            user_id: row.user_id,
            username: row.username,
            picks: row.picks.0,
            submitted_at: row.submitted_at,
        }
    }
}

/// Slates waiting to be settled for a chart, oldest first.
pub async fn get_pending_slates(pool: &PgPool, chart_id: Uuid) -> anyhow::Result<Vec<SlateRow>> {
    let rows = sqlx::query_as::<_, SlateRow>(
        r#"
        SELECT s.id, s.chart_id, s.user_id, u.username, s.picks, s.submitted_at
        FROM prediction_slates s
        JOIN users u ON u.id = s.user_id
        WHERE s.chart_id = $1
        ORDER BY s.submitted_at ASC, s.id ASC
        "#,
    )
    .bind(chart_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Insert or replace a user's slate for a chart.
pub async fn upsert_slate(
    pool: &PgPool,
    chart_id: Uuid,
    user_id: Uuid,
    picks: &[SongPick],
) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO prediction_slates (chart_id, user_id, picks)
        VALUES ($1, $2, $3)
        ON CONFLICT (chart_id, user_id) DO UPDATE
            SET picks = EXCLUDED.picks, submitted_at = NOW()
        RETURNING id
        "#,
    )
    .bind(chart_id)
    .bind(user_id)
    .bind(Json(picks))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Delete the given slates, each only in the version that was scored. A
/// slate resubmitted since then keeps its row. Returns how many rows went.
pub async fn delete_slates(
    conn: &mut PgConnection,
    consumed: &[ConsumedSlate],
) -> anyhow::Result<u64> {
    let ids: Vec<Uuid> = consumed.iter().map(|c| c.id).collect();
    let submitted: Vec<DateTime<Utc>> = consumed.iter().map(|c| c.submitted_at).collect();

    let result = sqlx::query(
        r#"
        DELETE FROM prediction_slates s
        USING UNNEST($1::uuid[], $2::timestamptz[]) AS c(id, submitted_at)
        WHERE s.id = c.id AND s.submitted_at = c.submitted_at
        "#,
    )
    .bind(&ids)
    .bind(&submitted)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}
