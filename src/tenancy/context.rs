use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::models::Tenant;

/// Request header carrying the resolved slug to downstream handlers.
/// Any client-supplied value is stripped before routing.
pub const TENANT_HEADER: &str = "x-tenant-slug";

/// Tenant resolution for one request, computed once by the routing
/// middleware and stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantContext {
    /// Public surface, no tenant
    Root,
    Active(Tenant),
    /// Tenant exists but is deactivated; only the notice page is served
    Suspended(Tenant),
}

impl TenantContext {
    pub fn tenant(&self) -> Option<&Tenant> {
        match self {
            TenantContext::Root => None,
            TenantContext::Active(t) | TenantContext::Suspended(t) => Some(t),
        }
    }

    pub fn slug(&self) -> Option<&str> {
        self.tenant().map(|t| t.subdomain.as_str())
    }
}

/// Missing context means the request never went through tenant routing;
/// treat it as the public surface rather than guessing a tenant.
#[async_trait::async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .unwrap_or(TenantContext::Root))
    }
}
