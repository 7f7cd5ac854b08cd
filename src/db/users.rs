use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::models::{NewUser, Role, User};

use super::row_helpers::{is_unique_violation, map_user_row};

/// User database operations
pub struct UserRepo;

impl UserRepo {
    /// Emails are unique platform-wide and compared case-insensitively
    pub async fn get_by_email(pool: &Pool<Sqlite>, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_user_row).transpose()
    }

    pub async fn list_by_role(pool: &Pool<Sqlite>, role: Role) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users WHERE role = ? ORDER BY id")
            .bind(role.as_str())
            .fetch_all(pool)
            .await?;
        rows.iter().map(map_user_row).collect()
    }

    pub async fn list_for_tenant(pool: &Pool<Sqlite>, tenant_id: i64) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users WHERE tenant_id = ? ORDER BY email")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;
        rows.iter().map(map_user_row).collect()
    }

    pub async fn insert(conn: &mut SqliteConnection, user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, name, password_hash, role, tenant_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.email.trim())
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.tenant_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                anyhow::Error::new(super::ConflictError::new(
                    "A user with this email already exists",
                ))
            } else {
                e.into()
            }
        })?;

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref()
            .map(map_user_row)
            .transpose()?
            .context("User not found after creation")
    }

    pub async fn create(pool: &Pool<Sqlite>, user: &NewUser) -> Result<User> {
        let mut conn = pool.acquire().await?;
        Self::insert(&mut conn, user).await
    }
}
