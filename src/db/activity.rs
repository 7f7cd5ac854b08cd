use anyhow::Result;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::{ActivityLog, NewActivity};

use super::row_helpers::map_activity_row;

/// Activity (audit) log operations
pub struct ActivityRepo;

impl ActivityRepo {
    pub async fn create(pool: &Pool<Sqlite>, entry: &NewActivity) -> Result<()> {
        sqlx::query(
            "INSERT INTO activity_logs (tenant_id, user_id, action, detail, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.tenant_id)
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(&entry.detail)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn list_for_tenant(pool: &Pool<Sqlite>, tenant_id: i64, limit: i32) -> Result<Vec<ActivityLog>> {
        let rows = sqlx::query(
            "SELECT * FROM activity_logs WHERE tenant_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(rows.iter().map(map_activity_row).collect())
    }

    /// Platform-wide log for superadmins
    pub async fn list_all(pool: &Pool<Sqlite>, limit: i32) -> Result<Vec<ActivityLog>> {
        let rows = sqlx::query("SELECT * FROM activity_logs ORDER BY created_at DESC, id DESC LIMIT ?")
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_activity_row).collect())
    }
}
