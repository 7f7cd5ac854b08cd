//! Access gate: decides whether (email, password, slug) may open a session.

mod throttle;

pub use throttle::LoginThrottle;

use std::sync::Arc;
use thiserror::Error;

use crate::db::Store;
use crate::models::{activity_action, Role, Session, User};
use crate::tenancy::{ResolutionError, TenantResolver};

/// Login failure kinds. Callers such as audit logging tell them apart;
/// the HTTP layer collapses only `InvalidCredentials` into one message.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("hostel not found")]
    TenantNotFound,
    #[error("this hostel is suspended")]
    TenantSuspended,
    #[error("you don't have access to this hostel")]
    TenantMismatch,
    #[error("too many failed login attempts, try again later")]
    RateLimited,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AccessError {
    pub fn activity_action(&self) -> Option<&'static str> {
        match self {
            AccessError::InvalidCredentials => Some(activity_action::LOGIN_INVALID_CREDENTIALS),
            AccessError::TenantNotFound => Some(activity_action::LOGIN_TENANT_NOT_FOUND),
            AccessError::TenantSuspended => Some(activity_action::LOGIN_TENANT_SUSPENDED),
            AccessError::TenantMismatch => Some(activity_action::LOGIN_TENANT_MISMATCH),
            AccessError::RateLimited => Some(activity_action::LOGIN_RATE_LIMITED),
            AccessError::Internal(_) => None,
        }
    }
}

impl From<ResolutionError> for AccessError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::NotFound(_) => AccessError::TenantNotFound,
            ResolutionError::Suspended(_) => AccessError::TenantSuspended,
            ResolutionError::Storage(e) => AccessError::Internal(e),
        }
    }
}

/// A rejected attempt, with whatever identity was established before the
/// failure so the audit entry can be attributed.
#[derive(Debug)]
pub struct Denied {
    pub error: AccessError,
    pub user: Option<User>,
}

impl From<AccessError> for Denied {
    fn from(error: AccessError) -> Self {
        Self { error, user: None }
    }
}

pub struct AccessGate {
    store: Store,
    resolver: TenantResolver,
    throttle: Arc<LoginThrottle>,
    /// Verified against when the email is unknown, so both failure paths cost one bcrypt check
    dummy_hash: String,
}

impl AccessGate {
    pub fn new(
        store: Store,
        resolver: TenantResolver,
        throttle: Arc<LoginThrottle>,
        bcrypt_cost: u32,
    ) -> anyhow::Result<Self> {
        let dummy_hash = bcrypt::hash(uuid::Uuid::new_v4().to_string(), bcrypt_cost)
            .map_err(|e| anyhow::anyhow!("Failed to prepare credential check: {}", e))?;
        Ok(Self {
            store,
            resolver,
            throttle,
            dummy_hash,
        })
    }

    /// Check credentials and tenant binding; on success return the session to mint.
    ///
    /// An empty `slug` is a root-domain login. Superadmins skip every tenant
    /// check. Admins must belong to the resolved, active tenant.
    ///
    /// Stricter than a plain credential check on the root domain: an admin
    /// with no slug is still bound to their home tenant, and a suspended home
    /// tenant refuses the login.
    pub async fn authenticate(&self, email: &str, password: &str, slug: &str) -> Result<(User, Session), Denied> {
        let key = email.trim().to_ascii_lowercase();
        let slug = slug.trim().to_ascii_lowercase();

        if self.throttle.is_blocked(&key) {
            return Err(AccessError::RateLimited.into());
        }

        let user = self.verify_credentials(&key, password).await.map_err(|e| {
            if matches!(e, AccessError::InvalidCredentials) {
                self.throttle.record_failure(&key);
            }
            Denied::from(e)
        })?;
        self.throttle.clear(&key);

        match self.bind_tenant(&user, &slug).await {
            Ok(subdomain) => {
                let session = Session {
                    user_id: user.id,
                    email: user.email.clone(),
                    role: user.role,
                    tenant_id: user.tenant_id,
                    subdomain,
                };
                Ok((user, session))
            }
            Err(error) => Err(Denied { error, user: Some(user) }),
        }
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AccessError> {
        let user = self.store.get_user_by_email(email).await?;

        let hash = user.as_ref().map(|u| u.password_hash.as_str()).unwrap_or(&self.dummy_hash);
        // A malformed stored hash is treated as a mismatch
        let valid = bcrypt::verify(password, hash).unwrap_or(false);

        match user {
            Some(user) if valid => Ok(user),
            _ => Err(AccessError::InvalidCredentials),
        }
    }

    /// Returns the subdomain the session should carry.
    async fn bind_tenant(&self, user: &User, slug: &str) -> Result<String, AccessError> {
        if user.role == Role::Superadmin {
            // No home tenant: keep the slug they authenticated against
            return Ok(slug.to_string());
        }

        let home_id = user.tenant_id.ok_or(AccessError::TenantMismatch)?;

        if slug.is_empty() {
            // Root-domain login still needs a live home tenant
            let home = self.resolver.resolve_id(home_id).await?;
            return Ok(home.subdomain);
        }

        let tenant = self.resolver.resolve(slug).await?;
        if tenant.id != home_id {
            return Err(AccessError::TenantMismatch);
        }
        Ok(tenant.subdomain)
    }
}
