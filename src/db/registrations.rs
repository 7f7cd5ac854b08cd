use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

use super::row_helpers::{is_unique_violation, map_registration_row};
use super::tenants::TenantRepo;
use super::users::UserRepo;
use super::{ConflictError, NotFoundError};

/// Registration request database operations
pub struct RegistrationRepo;

impl RegistrationRepo {
    pub async fn list(pool: &Pool<Sqlite>, status: Option<RegistrationStatus>) -> Result<Vec<RegistrationRequest>> {
        let rows = match status {
            Some(status) => {
                sqlx::query("SELECT * FROM registration_requests WHERE status = ? ORDER BY requested_at DESC")
                    .bind(status.as_str())
                    .fetch_all(pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM registration_requests ORDER BY requested_at DESC")
                    .fetch_all(pool)
                    .await?
            }
        };
        rows.iter().map(map_registration_row).collect()
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<RegistrationRequest>> {
        let row = sqlx::query("SELECT * FROM registration_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_registration_row).transpose()
    }

    /// True when the slug belongs to a tenant or to a pending request
    pub async fn is_subdomain_taken(pool: &Pool<Sqlite>, subdomain: &str) -> Result<bool> {
        let taken: i64 = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM tenants WHERE subdomain = ?)
                OR EXISTS (SELECT 1 FROM registration_requests WHERE subdomain = ? AND status = 'PENDING')
            "#,
        )
        .bind(subdomain)
        .bind(subdomain)
        .fetch_one(pool)
        .await?;
        Ok(taken != 0)
    }

    /// Store a PENDING request, reserving the slug.
    ///
    /// The availability check and the insert are one statement, and the
    /// partial unique index on pending slugs backs it up, so two concurrent
    /// submissions for the same slug store at most one row.
    /// Returns `None` when the slug is already taken or pending.
    pub async fn create_pending(pool: &Pool<Sqlite>, req: &NewRegistration) -> Result<Option<RegistrationRequest>> {
        let result = sqlx::query(
            r#"
            INSERT INTO registration_requests
                (hostel_name, subdomain, admin_email, admin_name, password_hash, status, requested_at)
            SELECT ?, ?, ?, ?, ?, 'PENDING', ?
            WHERE NOT EXISTS (SELECT 1 FROM tenants WHERE subdomain = ?)
              AND NOT EXISTS (SELECT 1 FROM registration_requests WHERE subdomain = ? AND status = 'PENDING')
            "#,
        )
        .bind(&req.hostel_name)
        .bind(&req.subdomain)
        .bind(&req.admin_email)
        .bind(&req.admin_name)
        .bind(&req.password_hash)
        .bind(Utc::now())
        .bind(&req.subdomain)
        .bind(&req.subdomain)
        .execute(pool)
        .await;

        let result = match result {
            Ok(r) => r,
            Err(e) if is_unique_violation(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Registration not found after creation")
            .map(Some)
    }

    /// Convert a PENDING request into an active tenant plus its admin user.
    /// All three writes commit together or not at all.
    pub async fn approve(pool: &Pool<Sqlite>, id: i64, reviewer_id: i64) -> Result<ApprovedRegistration> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query("SELECT * FROM registration_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let pending = row
            .as_ref()
            .map(map_registration_row)
            .transpose()?
            .ok_or_else(|| NotFoundError::new("Registration", &id.to_string()))?;

        if pending.status != RegistrationStatus::Pending {
            return Err(ConflictError::new(format!(
                "registration already {}",
                pending.status.as_str().to_lowercase()
            ))
            .into());
        }

        let tenant = TenantRepo::insert(&mut tx, &pending.hostel_name, &pending.subdomain).await?;
        let admin = UserRepo::insert(
            &mut tx,
            &NewUser {
                email: pending.admin_email.clone(),
                name: pending.admin_name.clone(),
                password_hash: pending.password_hash.clone(),
                role: Role::Admin,
                tenant_id: Some(tenant.id),
            },
        )
        .await?;

        let updated = sqlx::query(
            r#"
            UPDATE registration_requests
            SET status = 'APPROVED', reviewed_at = ?, reviewed_by = ?
            WHERE id = ? AND status = 'PENDING'
            "#,
        )
        .bind(Utc::now())
        .bind(reviewer_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(ConflictError::new("registration was reviewed concurrently").into());
        }

        tx.commit().await?;

        let registration = Self::get(pool, id)
            .await?
            .context("Registration not found after approval")?;
        Ok(ApprovedRegistration { registration, tenant, admin })
    }

    /// Terminal rejection; frees the slug and has no other side effects.
    pub async fn reject(pool: &Pool<Sqlite>, id: i64, reviewer_id: i64, reason: &str) -> Result<RegistrationRequest> {
        let result = sqlx::query(
            r#"
            UPDATE registration_requests
            SET status = 'REJECTED', reviewed_at = ?, reviewed_by = ?, rejection_reason = ?
            WHERE id = ? AND status = 'PENDING'
            "#,
        )
        .bind(Utc::now())
        .bind(reviewer_id)
        .bind(reason)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return match Self::get(pool, id).await? {
                None => Err(NotFoundError::new("Registration", &id.to_string()).into()),
                Some(r) => Err(ConflictError::new(format!(
                    "registration already {}",
                    r.status.as_str().to_lowercase()
                ))
                .into()),
            };
        }

        Self::get(pool, id)
            .await?
            .context("Registration not found after rejection")
    }
}
