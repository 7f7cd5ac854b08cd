use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

use super::row_helpers::{is_unique_violation, map_room_row};
use super::{ConflictError, NotFoundError};

const SELECT_ROOM: &str = r#"
    SELECT r.*,
           COALESCE((SELECT COUNT(*) FROM students s WHERE s.room_id = r.id AND s.tenant_id = r.tenant_id), 0) AS occupied
    FROM rooms r
"#;

/// Room database operations. Every statement is filtered by `tenant_id`.
pub struct RoomRepo;

impl RoomRepo {
    pub async fn list(pool: &Pool<Sqlite>, tenant_id: i64) -> Result<Vec<Room>> {
        let rows = sqlx::query(&format!("{} WHERE r.tenant_id = ? ORDER BY r.floor, r.number", SELECT_ROOM))
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_room_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, tenant_id: i64, id: i64) -> Result<Option<Room>> {
        let row = sqlx::query(&format!("{} WHERE r.tenant_id = ? AND r.id = ?", SELECT_ROOM))
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_room_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, tenant_id: i64, req: &CreateRoomRequest) -> Result<Room> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO rooms (tenant_id, number, floor, capacity, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tenant_id)
        .bind(&req.number)
        .bind(req.floor)
        .bind(req.capacity)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| duplicate_number(e, &req.number))?;

        Self::get(pool, tenant_id, result.last_insert_rowid())
            .await?
            .context("Room not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, tenant_id: i64, id: i64, req: &CreateRoomRequest) -> Result<Room> {
        let result = sqlx::query(
            r#"
            UPDATE rooms SET number = ?, floor = ?, capacity = ?, updated_at = ?
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(&req.number)
        .bind(req.floor)
        .bind(req.capacity)
        .bind(Utc::now())
        .bind(id)
        .bind(tenant_id)
        .execute(pool)
        .await
        .map_err(|e| duplicate_number(e, &req.number))?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError::new("Room", &id.to_string()).into());
        }

        Self::get(pool, tenant_id, id)
            .await?
            .context("Room not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, tenant_id: i64, id: i64) -> Result<()> {
        let mut tx = pool.begin().await?;
        sqlx::query("UPDATE students SET room_id = NULL WHERE room_id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM rooms WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError::new("Room", &id.to_string()).into());
        }
        tx.commit().await?;
        Ok(())
    }
}

fn duplicate_number(err: sqlx::Error, number: &str) -> anyhow::Error {
    if is_unique_violation(&err) {
        ConflictError::new(format!("Room {} already exists", number)).into()
    } else {
        err.into()
    }
}
