use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "PENDING",
            RegistrationStatus::Approved => "APPROVED",
            RegistrationStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(RegistrationStatus::Pending),
            "APPROVED" => Ok(RegistrationStatus::Approved),
            "REJECTED" => Ok(RegistrationStatus::Rejected),
            other => Err(anyhow::anyhow!("unknown registration status: {}", other)),
        }
    }
}

/// A self-service signup awaiting superadmin review
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest {
    pub id: i64,
    pub hostel_name: String,
    pub subdomain: String,
    pub admin_email: String,
    pub admin_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: RegistrationStatus,
    pub requested_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<i64>,
    pub rejection_reason: Option<String>,
}

/// Body of the public registration form
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRegistrationRequest {
    pub hostel_name: String,
    pub subdomain: String,
    pub admin_name: String,
    pub admin_email: String,
    pub password: String,
}

/// Validated registration ready for storage
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub hostel_name: String,
    pub subdomain: String,
    pub admin_email: String,
    pub admin_name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RejectRegistrationRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationListQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// Result of approving a registration
#[derive(Debug, Clone, Serialize)]
pub struct ApprovedRegistration {
    pub registration: RegistrationRequest,
    pub tenant: super::Tenant,
    pub admin: super::User,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlugAvailability {
    pub subdomain: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
