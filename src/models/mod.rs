mod activity;
mod auth;
mod notification;
mod registration;
mod rooms;
mod students;
mod tenant;

pub use activity::*;
pub use auth::*;
pub use notification::*;
pub use registration::*;
pub use rooms::*;
pub use students::*;
pub use tenant::*;

/// Canonical activity log action values
pub mod activity_action {
    pub const LOGIN_SUCCEEDED: &str = "login_succeeded";
    pub const LOGIN_INVALID_CREDENTIALS: &str = "login_invalid_credentials";
    pub const LOGIN_TENANT_NOT_FOUND: &str = "login_tenant_not_found";
    pub const LOGIN_TENANT_SUSPENDED: &str = "login_tenant_suspended";
    pub const LOGIN_TENANT_MISMATCH: &str = "login_tenant_mismatch";
    pub const LOGIN_RATE_LIMITED: &str = "login_rate_limited";
    pub const TENANT_APPROVED: &str = "tenant_approved";
    pub const TENANT_SUSPENDED: &str = "tenant_suspended";
    pub const TENANT_ACTIVATED: &str = "tenant_activated";
    pub const REGISTRATION_REJECTED: &str = "registration_rejected";
    pub const ROOM_CREATED: &str = "room_created";
    pub const ROOM_UPDATED: &str = "room_updated";
    pub const ROOM_DELETED: &str = "room_deleted";
    pub const STUDENT_CREATED: &str = "student_created";
    pub const STUDENT_DELETED: &str = "student_deleted";
}
