use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: i64,
    pub tenant_id: i64,
    pub number: String,
    pub floor: i32,
    pub capacity: i32,
    pub occupied: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub number: String,
    #[serde(default)]
    pub floor: i32,
    #[serde(default = "default_capacity")]
    pub capacity: i32,
}

fn default_capacity() -> i32 { 1 }
