//! Estate persistence operations.

use anyhow::Result;
use chrono::{DateTime, Utc};
use estate_core::Estate;
use sqlx::SqliteConnection;
use uuid::Uuid;

pub async fn insert_estate(conn: &mut SqliteConnection, estate: &Estate) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO estates (
            id, width, length,
            tree_count, tree_max_height, tree_min_height, tree_median_height,
            total_distance, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(estate.id.to_string())
    .bind(estate.width)
    .bind(estate.length)
    .bind(estate.tree_count)
    .bind(estate.tree_max_height)
    .bind(estate.tree_min_height)
    .bind(estate.tree_median_height)
    .bind(estate.total_distance)
    .bind(estate.created_at.to_rfc3339())
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn find_estate(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Estate>> {
    let row = sqlx::query_as::<_, EstateRow>(
        r#"
        SELECT id, width, length, tree_count, tree_max_height, tree_min_height,
               tree_median_height, total_distance, created_at
        FROM estates WHERE id = ?1
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(conn)
    .await?;

    row.map(Estate::try_from).transpose()
}

/// Write back the aggregate columns; dimensions never change.
pub async fn update_estate(conn: &mut SqliteConnection, estate: &Estate) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE estates SET
            tree_count = ?2, tree_max_height = ?3, tree_min_height = ?4,
            tree_median_height = ?5, total_distance = ?6
        WHERE id = ?1
        "#,
    )
    .bind(estate.id.to_string())
    .bind(estate.tree_count)
    .bind(estate.tree_max_height)
    .bind(estate.tree_min_height)
    .bind(estate.tree_median_height)
    .bind(estate.total_distance)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        anyhow::bail!("estate {} vanished during update", estate.id);
    }
    Ok(())
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct EstateRow {
    id: String,
    width: i64,
    length: i64,
    tree_count: i64,
    tree_max_height: i64,
    tree_min_height: i64,
    tree_median_height: i64,
    total_distance: i64,
    created_at: String,
}

impl TryFrom<EstateRow> for Estate {
    type Error = anyhow::Error;

    fn try_from(row: EstateRow) -> Result<Self> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Estate {
            id: Uuid::parse_str(&row.id)?,
            width: row.width,
            length: row.length,
            tree_count: row.tree_count,
            tree_max_height: row.tree_max_height,
            tree_min_height: row.tree_min_height,
            tree_median_height: row.tree_median_height,
            total_distance: row.total_distance,
            created_at,
        })
    }
}
