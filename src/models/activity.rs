use chrono::{DateTime, Utc};
use serde::Serialize;

/// ActivityLog is one audit entry, optionally bound to a tenant
#[derive(Debug, Clone, Serialize)]
pub struct ActivityLog {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub action: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub tenant_id: Option<i64>,
    pub user_id: Option<i64>,
    pub action: &'static str,
    pub detail: String,
}
