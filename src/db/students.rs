use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

use super::row_helpers::map_student_row;
use super::rooms::RoomRepo;
use super::{ConflictError, NotFoundError};

/// Student database operations. Every statement is filtered by `tenant_id`.
pub struct StudentRepo;

impl StudentRepo {
    pub async fn list(pool: &Pool<Sqlite>, tenant_id: i64) -> Result<Vec<Student>> {
        let rows = sqlx::query("SELECT * FROM students WHERE tenant_id = ? ORDER BY name")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_student_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, tenant_id: i64, id: i64) -> Result<Option<Student>> {
        let row = sqlx::query("SELECT * FROM students WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_student_row))
    }

    /// The room, when given, must belong to the same tenant and have a free bed
    pub async fn create(pool: &Pool<Sqlite>, tenant_id: i64, req: &CreateStudentRequest) -> Result<Student> {
        if let Some(room_id) = req.room_id {
            let room = RoomRepo::get(pool, tenant_id, room_id)
                .await?
                .ok_or_else(|| NotFoundError::new("Room", &room_id.to_string()))?;
            if room.occupied >= room.capacity {
                return Err(ConflictError::new(format!("Room {} is full", room.number)).into());
            }
        }

        let result = sqlx::query(
            "INSERT INTO students (tenant_id, name, email, room_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(tenant_id)
        .bind(&req.name)
        .bind(req.email.as_deref().unwrap_or(""))
        .bind(req.room_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Self::get(pool, tenant_id, result.last_insert_rowid())
            .await?
            .context("Student not found after creation")
    }

    pub async fn delete(pool: &Pool<Sqlite>, tenant_id: i64, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM students WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError::new("Student", &id.to_string()).into());
        }
        Ok(())
    }
}
