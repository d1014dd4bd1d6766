use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{Cadence, ChartKind, ChartRound, Schedule};

#[derive(Debug, Clone, FromRow)]
pub struct ChartRow {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub chart_key: String,
    pub cadence: String,
    pub cost: Decimal,
    pub prize_pool: Decimal,
    pub round_date: NaiveDate,
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

impl TryFrom<ChartRow> for ChartRound {
    type Error = anyhow::Error;

    fn try_from(row: ChartRow) -> Result<Self, Self::Error> {
        let kind = ChartKind::from_str(&row.kind)
            .ok_or_else(|| anyhow::anyhow!("chart {} has unknown kind {:?}", row.id, row.kind))?;
        let cadence = Cadence::from_str(&row.cadence).ok_or_else(|| {
            anyhow::anyhow!("chart {} has unknown cadence {:?}", row.id, row.cadence)
        })?;

        Ok(ChartRound {
            id: row.id,
            name: row.name,
            kind,
            chart_key: row.chart_key,
            cadence,
            cost: row.cost,
            prize_pool: row.prize_pool,
            round_date: row.round_date,
            opens_at: row.opens_at,
            closes_at: row.closes_at,
        })
    }
}

const CHART_COLUMNS: &str =
    "id, name, kind, chart_key, cadence, cost, prize_pool, round_date, opens_at, closes_at";

pub async fn get_chart(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<ChartRow>> {
    let row = sqlx::query_as::<_, ChartRow>(&format!(
        "SELECT {CHART_COLUMNS} FROM charts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn list_charts(pool: &PgPool) -> anyhow::Result<Vec<ChartRow>> {
    let rows = sqlx::query_as::<_, ChartRow>(&format!(
        "SELECT {CHART_COLUMNS} FROM charts ORDER BY name ASC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn insert_chart(pool: &PgPool, chart: &ChartRound) -> anyhow::Result<ChartRow> {
    let row = sqlx::query_as::<_, ChartRow>(&format!(
        r#"
        INSERT INTO charts (id, name, kind, chart_key, cadence, cost, prize_pool, round_date, opens_at, closes_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {CHART_COLUMNS}
        "#
    ))
    .bind(chart.id)
    .bind(&chart.name)
    .bind(chart.kind.as_str())
    .bind(&chart.chart_key)
    .bind(chart.cadence.as_str())
    .bind(chart.cost)
    .bind(chart.prize_pool)
    .bind(chart.round_date)
    .bind(chart.opens_at)
    .bind(chart.closes_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Lock the chart row for the rest of the transaction.
pub async fn lock_chart(conn: &mut PgConnection, id: Uuid) -> anyhow::Result<Option<ChartRow>> {
    let row = sqlx::query_as::<_, ChartRow>(&format!(
        "SELECT {CHART_COLUMNS} FROM charts WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

/// Move the chart to its next round.
pub async fn advance_schedule(
    conn: &mut PgConnection,
    id: Uuid,
    next: &Schedule,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE charts
        SET round_date = $2, opens_at = $3, closes_at = $4
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(next.round_date)
    .bind(next.opens_at)
    .bind(next.closes_at)
    .execute(conn)
    .await?;

    Ok(())
}
