use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role is a closed set: tenant admins and platform superadmins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Superadmin => "SUPERADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "SUPERADMIN" => Ok(Role::Superadmin),
            other => Err(anyhow::anyhow!("unknown role: {}", other)),
        }
    }
}

/// User represents an account that can log in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub tenant_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// New user row; superadmins carry no tenant
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub tenant_id: Option<i64>,
}

/// LoginRequest for authenticating against a subdomain.
/// An empty `subdomain` is a root-domain login attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub subdomain: String,
}

/// LoginResponse returned on successful authentication
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session: Session,
}

/// Session is the typed payload carried by an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub tenant_id: Option<i64>,
    pub subdomain: String,
}

impl Session {
    pub fn is_superadmin(&self) -> bool {
        self.role == Role::Superadmin
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub tenant_id: Option<i64>,
    pub subdomain: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn session(&self) -> Option<Session> {
        Some(Session {
            user_id: self.sub.parse().ok()?,
            email: self.email.clone(),
            role: self.role,
            tenant_id: self.tenant_id,
            subdomain: self.subdomain.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_db_text() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Superadmin.as_str().parse::<Role>().unwrap(), Role::Superadmin);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Superadmin).unwrap(), "\"SUPERADMIN\"");
    }

    #[test]
    fn test_claims_with_bad_subject_have_no_session() {
        let claims = Claims {
            sub: "not-a-number".into(),
            email: "a@b.c".into(),
            role: Role::Admin,
            tenant_id: Some(1),
            subdomain: "acme".into(),
            exp: 0,
            iat: 0,
        };
        assert!(claims.session().is_none());
    }
}
