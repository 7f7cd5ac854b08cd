use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tenant is one hostel, identified by its subdomain slug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub subdomain: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
