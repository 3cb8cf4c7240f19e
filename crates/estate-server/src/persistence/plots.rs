//! Plot persistence operations.
//!
//! Neighbour lookups and the tail shift lean on the
//! `(estate_id, order_number)` index.

use anyhow::Result;
use chrono::{DateTime, Utc};
use estate_core::Plot;
use sqlx::SqliteConnection;
use uuid::Uuid;

const PLOT_COLUMNS: &str =
    "id, estate_id, x, y, order_number, distance, tree_height, created_at";

pub async fn insert_plot(conn: &mut SqliteConnection, plot: &Plot) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO plots (id, estate_id, x, y, order_number, distance, tree_height, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(plot.id.to_string())
    .bind(plot.estate_id.to_string())
    .bind(plot.x)
    .bind(plot.y)
    .bind(plot.order_number)
    .bind(plot.distance)
    .bind(plot.tree_height)
    .bind(plot.created_at.to_rfc3339())
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn update_distance(conn: &mut SqliteConnection, plot: &Plot) -> Result<()> {
    sqlx::query("UPDATE plots SET distance = ?2 WHERE id = ?1")
        .bind(plot.id.to_string())
        .bind(plot.distance)
        .execute(conn)
        .await?;
    Ok(())
}

/// Add `delta` to every plot after `order_number` in one statement.
pub async fn shift_distances_after(
    conn: &mut SqliteConnection,
    estate_id: Uuid,
    order_number: i64,
    delta: i64,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE plots SET distance = distance + ?3 WHERE estate_id = ?1 AND order_number > ?2",
    )
    .bind(estate_id.to_string())
    .bind(order_number)
    .bind(delta)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn find_by_coordinates(
    conn: &mut SqliteConnection,
    estate_id: Uuid,
    x: i64,
    y: i64,
) -> Result<Option<Plot>> {
    let sql = format!("SELECT {PLOT_COLUMNS} FROM plots WHERE estate_id = ?1 AND x = ?2 AND y = ?3");
    let row = sqlx::query_as::<_, PlotRow>(&sql)
        .bind(estate_id.to_string())
        .bind(x)
        .bind(y)
        .fetch_optional(conn)
        .await?;
    row.map(Plot::try_from).transpose()
}

pub async fn find_by_order(
    conn: &mut SqliteConnection,
    estate_id: Uuid,
    order_number: i64,
) -> Result<Option<Plot>> {
    let sql = format!("SELECT {PLOT_COLUMNS} FROM plots WHERE estate_id = ?1 AND order_number = ?2");
    fetch_one_plot(conn, &sql, estate_id, order_number).await
}

pub async fn find_nearest_behind(
    conn: &mut SqliteConnection,
    estate_id: Uuid,
    order_number: i64,
) -> Result<Option<Plot>> {
    let sql = format!(
        "SELECT {PLOT_COLUMNS} FROM plots WHERE estate_id = ?1 AND order_number < ?2 \
         ORDER BY order_number DESC LIMIT 1"
    );
    fetch_one_plot(conn, &sql, estate_id, order_number).await
}

pub async fn find_nearest_ahead(
    conn: &mut SqliteConnection,
    estate_id: Uuid,
    order_number: i64,
) -> Result<Option<Plot>> {
    let sql = format!(
        "SELECT {PLOT_COLUMNS} FROM plots WHERE estate_id = ?1 AND order_number > ?2 \
         ORDER BY order_number ASC LIMIT 1"
    );
    fetch_one_plot(conn, &sql, estate_id, order_number).await
}

/// Furthest plot whose distance does not exceed `ceiling`.
pub async fn find_by_max_distance(
    conn: &mut SqliteConnection,
    estate_id: Uuid,
    ceiling: i64,
) -> Result<Option<Plot>> {
    let sql = format!(
        "SELECT {PLOT_COLUMNS} FROM plots WHERE estate_id = ?1 AND distance <= ?2 \
         ORDER BY distance DESC, order_number DESC LIMIT 1"
    );
    fetch_one_plot(conn, &sql, estate_id, ceiling).await
}

/// Median tree height, averaging the two middle rows for an even count.
pub async fn median_tree_height(conn: &mut SqliteConnection, estate_id: Uuid) -> Result<i64> {
    let median: Option<f64> = sqlx::query_scalar(
        r#"
        WITH ranked AS (
            SELECT
                tree_height,
                ROW_NUMBER() OVER (ORDER BY tree_height) AS row_num,
                COUNT(*) OVER () AS total_count
            FROM plots
            WHERE estate_id = ?1
        )
        SELECT AVG(tree_height) FROM ranked
        WHERE row_num IN ((total_count + 1) / 2, (total_count + 2) / 2)
        "#,
    )
    .bind(estate_id.to_string())
    .fetch_one(conn)
    .await?;

    Ok(median.map(|m| m as i64).unwrap_or(0))
}

async fn fetch_one_plot(
    conn: &mut SqliteConnection,
    sql: &str,
    estate_id: Uuid,
    value: i64,
) -> Result<Option<Plot>> {
    let row = sqlx::query_as::<_, PlotRow>(sql)
        .bind(estate_id.to_string())
        .bind(value)
        .fetch_optional(conn)
        .await?;
    row.map(Plot::try_from).transpose()
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct PlotRow {
    id: String,
    estate_id: String,
    x: i64,
    y: i64,
    order_number: i64,
    distance: i64,
    tree_height: i64,
    created_at: String,
}

impl TryFrom<PlotRow> for Plot {
    type Error = anyhow::Error;

    fn try_from(row: PlotRow) -> Result<Self> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Plot {
            id: Uuid::parse_str(&row.id)?,
            estate_id: Uuid::parse_str(&row.estate_id)?,
            x: row.x,
            y: row.y,
            order_number: row.order_number,
            distance: row.distance,
            tree_height: row.tree_height,
            created_at,
        })
    }
}
