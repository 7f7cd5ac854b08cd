use thiserror::Error;

use crate::db::Store;
use crate::models::Tenant;

use super::context::TenantContext;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("tenant not found: {0}")]
    NotFound(String),
    #[error("tenant suspended: {}", .0.subdomain)]
    Suspended(Tenant),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Maps slugs to tenants. Holds no per-request state: every call reads the
/// store, so suspension and reactivation apply on the very next request.
#[derive(Clone)]
pub struct TenantResolver {
    store: Store,
    /// Pre-seeded demo tenant, served without a lookup while it is active
    demo: Option<Tenant>,
}

impl TenantResolver {
    pub fn new(store: Store, demo: Option<Tenant>) -> Self {
        Self { store, demo }
    }

    pub fn demo_tenant(&self) -> Option<&Tenant> {
        self.demo.as_ref()
    }

    /// Resolve a slug to an active tenant.
    pub async fn resolve(&self, slug: &str) -> Result<Tenant, ResolutionError> {
        if let Some(demo) = self.demo.as_ref().filter(|d| d.is_active && d.subdomain == slug) {
            return Ok(demo.clone());
        }

        let tenant = self
            .store
            .get_tenant_by_subdomain(slug)
            .await?
            .ok_or_else(|| ResolutionError::NotFound(slug.to_string()))?;

        if !tenant.is_active {
            return Err(ResolutionError::Suspended(tenant));
        }
        Ok(tenant)
    }

    /// Resolve a tenant by id, applying the same active check as [`resolve`].
    ///
    /// [`resolve`]: TenantResolver::resolve
    pub async fn resolve_id(&self, id: i64) -> Result<Tenant, ResolutionError> {
        let tenant = self
            .store
            .get_tenant(id)
            .await?
            .ok_or_else(|| ResolutionError::NotFound(id.to_string()))?;

        if !tenant.is_active {
            return Err(ResolutionError::Suspended(tenant));
        }
        Ok(tenant)
    }

    /// Suspended tenants still get a context so their notice page can be served;
    /// unknown slugs stay an error.
    pub async fn context_for_slug(&self, slug: &str) -> Result<TenantContext, ResolutionError> {
        match self.resolve(slug).await {
            Ok(tenant) => Ok(TenantContext::Active(tenant)),
            Err(ResolutionError::Suspended(tenant)) => Ok(TenantContext::Suspended(tenant)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_store;

    async fn resolver() -> (Store, TenantResolver) {
        let store = test_store().await;
        let resolver = TenantResolver::new(store.clone(), None);
        (store, resolver)
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let (store, resolver) = resolver().await;
        store.create_tenant("Acme Hostel", "acme").await.unwrap();

        let err = resolver.resolve("foo").await.unwrap_err();
        assert!(matches!(err, ResolutionError::NotFound(ref s) if s == "foo"));
    }

    #[tokio::test]
    async fn test_suspension_and_reactivation_apply_on_next_lookup() {
        let (store, resolver) = resolver().await;
        let acme = store.create_tenant("Acme Hostel", "acme").await.unwrap();

        assert_eq!(resolver.resolve("acme").await.unwrap().id, acme.id);

        store.set_tenant_active(acme.id, false).await.unwrap();
        let err = resolver.resolve("acme").await.unwrap_err();
        assert!(matches!(err, ResolutionError::Suspended(ref t) if t.id == acme.id));

        store.set_tenant_active(acme.id, true).await.unwrap();
        assert!(resolver.resolve("acme").await.is_ok());
    }

    #[tokio::test]
    async fn test_context_for_slug() {
        let (store, resolver) = resolver().await;
        let acme = store.create_tenant("Acme Hostel", "acme").await.unwrap();

        let ctx = resolver.context_for_slug("acme").await.unwrap();
        assert!(matches!(ctx, TenantContext::Active(ref t) if t.id == acme.id));

        store.set_tenant_active(acme.id, false).await.unwrap();
        let ctx = resolver.context_for_slug("acme").await.unwrap();
        assert!(matches!(ctx, TenantContext::Suspended(_)));
        assert_eq!(ctx.slug(), Some("acme"));

        assert!(matches!(
            resolver.context_for_slug("foo").await,
            Err(ResolutionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_demo_slug_served_from_pinned_tenant() {
        let store = test_store().await;
        let demo = store.create_tenant("Demo Hostel", "demo").await.unwrap();
        let resolver = TenantResolver::new(store, Some(demo.clone()));

        assert_eq!(resolver.resolve("demo").await.unwrap(), demo);
    }

    #[tokio::test]
    async fn test_inactive_demo_takes_general_path() {
        let store = test_store().await;
        let demo = store.create_tenant("Demo Hostel", "demo").await.unwrap();
        let demo = store.set_tenant_active(demo.id, false).await.unwrap();
        let resolver = TenantResolver::new(store.clone(), Some(demo.clone()));

        let err = resolver.resolve("demo").await.unwrap_err();
        assert!(matches!(err, ResolutionError::Suspended(ref t) if t.id == demo.id));
        assert!(matches!(
            resolver.context_for_slug("demo").await.unwrap(),
            TenantContext::Suspended(_)
        ));
    }
}
