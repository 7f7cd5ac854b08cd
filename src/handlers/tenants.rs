use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::auth::SuperAdmin;
use crate::models::*;
use crate::tenancy::TenantContext;
use crate::AppState;

use super::{record_activity, ApiError};

/// GET /api/tenants/lookup/:slug: public branding lookup, suspended
/// tenants included so the client can show the notice
pub async fn lookup_tenant(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Tenant>, ApiError> {
    let tenant = state
        .store
        .get_tenant_by_subdomain(&slug.trim().to_ascii_lowercase())
        .await?
        .ok_or_else(|| ApiError::not_found("Hostel"))?;
    Ok(Json(tenant))
}

/// GET /api/tenant: the tenant this request's host resolved to
pub async fn current_tenant(ctx: TenantContext) -> Result<Json<Tenant>, ApiError> {
    ctx.tenant()
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Hostel"))
}

pub async fn list_tenants(
    _admin: SuperAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Tenant>>, ApiError> {
    let tenants = state.store.list_tenants().await?;
    Ok(Json(tenants))
}

pub async fn suspend_tenant(
    admin: SuperAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Tenant>, ApiError> {
    if state.resolver.demo_tenant().is_some_and(|d| d.id == id) {
        return Err(ApiError::bad_request("The demo hostel cannot be suspended"));
    }
    set_active(&state, admin, id, false).await
}

pub async fn activate_tenant(
    admin: SuperAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Tenant>, ApiError> {
    set_active(&state, admin, id, true).await
}

async fn set_active(
    state: &Arc<AppState>,
    admin: SuperAdmin,
    id: i64,
    active: bool,
) -> Result<Json<Tenant>, ApiError> {
    let tenant = state.store.set_tenant_active(id, active).await?;
    let action = if active {
        activity_action::TENANT_ACTIVATED
    } else {
        activity_action::TENANT_SUSPENDED
    };

    tracing::info!("Tenant {} ({}) {} by {}", tenant.subdomain, tenant.id, action, admin.session.email);
    record_activity(
        state,
        NewActivity {
            tenant_id: Some(tenant.id),
            user_id: Some(admin.session.user_id),
            action,
            detail: tenant.subdomain.clone(),
        },
    )
    .await;
    Ok(Json(tenant))
}
