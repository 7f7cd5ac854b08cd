use anyhow::Result;
use sqlx::{Row, sqlite::SqliteRow};

use crate::models::*;

/// Filter empty strings to None: used when DB stores '' instead of NULL
pub fn none_if_empty(opt: Option<String>) -> Option<String> {
    opt.filter(|s| !s.is_empty())
}

/// SQLite stores booleans as 0/1 integers
fn flag(row: &SqliteRow, column: &str) -> bool {
    let v: i32 = row.get(column);
    v == 1
}

/// Map a SQLite row to a Tenant struct
pub fn map_tenant_row(row: &SqliteRow) -> Tenant {
    Tenant {
        id: row.get("id"),
        name: row.get("name"),
        subdomain: row.get("subdomain"),
        is_active: flag(row, "is_active"),
        created_at: row.get("created_at"),
    }
}

/// Map a SQLite row to a User struct; fails on an unknown role value
pub fn map_user_row(row: &SqliteRow) -> Result<User> {
    let role: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        role: role.parse()?,
        tenant_id: row.get("tenant_id"),
        created_at: row.get("created_at"),
    })
}

/// Map a SQLite row to a RegistrationRequest struct
pub fn map_registration_row(row: &SqliteRow) -> Result<RegistrationRequest> {
    let status: String = row.get("status");
    Ok(RegistrationRequest {
        id: row.get("id"),
        hostel_name: row.get("hostel_name"),
        subdomain: row.get("subdomain"),
        admin_email: row.get("admin_email"),
        admin_name: row.get("admin_name"),
        password_hash: row.get("password_hash"),
        status: status.parse()?,
        requested_at: row.get("requested_at"),
        reviewed_at: row.get("reviewed_at"),
        reviewed_by: row.get("reviewed_by"),
        rejection_reason: none_if_empty(row.get("rejection_reason")),
    })
}

/// Map a SQLite row to a Notification struct
pub fn map_notification_row(row: &SqliteRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        message: row.get("message"),
        is_read: flag(row, "is_read"),
        created_at: row.get("created_at"),
    }
}

/// Map a SQLite row to an ActivityLog struct
pub fn map_activity_row(row: &SqliteRow) -> ActivityLog {
    ActivityLog {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        user_id: row.get("user_id"),
        action: row.get("action"),
        detail: row.get("detail"),
        created_at: row.get("created_at"),
    }
}

/// Map a SQLite row to a Room struct (with aggregated occupancy)
pub fn map_room_row(row: &SqliteRow) -> Room {
    Room {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        number: row.get("number"),
        floor: row.get("floor"),
        capacity: row.get("capacity"),
        occupied: row.get("occupied"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row to a Student struct
pub fn map_student_row(row: &SqliteRow) -> Student {
    Student {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        name: row.get("name"),
        email: none_if_empty(row.get("email")),
        room_id: row.get("room_id"),
        created_at: row.get("created_at"),
    }
}

/// True when a sqlx error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
