use anyhow::Result;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::Notification;

use super::row_helpers::map_notification_row;

pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(pool: &Pool<Sqlite>, user_id: i64, title: &str, message: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO notifications (user_id, title, message, is_read, created_at) VALUES (?, ?, ?, 0, ?)",
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn list_for_user(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<Notification>> {
        let rows = sqlx::query("SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_notification_row).collect())
    }

    /// Scoped by owner: marking someone else's notification is a not-found
    pub async fn mark_read(pool: &Pool<Sqlite>, user_id: i64, id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Notification", &id.to_string()).into());
        }
        Ok(())
    }
}
