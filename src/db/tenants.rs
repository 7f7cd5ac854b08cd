use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::models::*;
use super::row_helpers::map_tenant_row;

pub struct TenantRepo;

impl TenantRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Tenant>> {
        let rows = sqlx::query("SELECT * FROM tenants ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_tenant_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Tenant>> {
        let row = sqlx::query("SELECT * FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_tenant_row))
    }

    pub async fn get_by_subdomain(pool: &Pool<Sqlite>, subdomain: &str) -> Result<Option<Tenant>> {
        let row = sqlx::query("SELECT * FROM tenants WHERE subdomain = ?")
            .bind(subdomain)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_tenant_row))
    }

    /// Insert on an open connection so approval can run it inside a transaction.
    pub async fn insert(conn: &mut SqliteConnection, name: &str, subdomain: &str) -> Result<Tenant> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tenants (name, subdomain, is_active, created_at) VALUES (?, ?, 1, ?)",
        )
        .bind(name)
        .bind(subdomain)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if super::row_helpers::is_unique_violation(&e) {
                anyhow::Error::new(super::ConflictError::new(format!(
                    "subdomain '{}' is already taken",
                    subdomain
                )))
            } else {
                e.into()
            }
        })?;

        let row = sqlx::query("SELECT * FROM tenants WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref()
            .map(map_tenant_row)
            .context("Tenant not found after creation")
    }

    pub async fn create(pool: &Pool<Sqlite>, name: &str, subdomain: &str) -> Result<Tenant> {
        let mut conn = pool.acquire().await?;
        Self::insert(&mut conn, name, subdomain).await
    }

    /// Flip the active flag. Tenants are never deleted.
    pub async fn set_active(pool: &Pool<Sqlite>, id: i64, active: bool) -> Result<Tenant> {
        let result = sqlx::query("UPDATE tenants SET is_active = ? WHERE id = ?")
            .bind(if active { 1 } else { 0 })
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Tenant", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("Tenant not found after update")
    }
}
