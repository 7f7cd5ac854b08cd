use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::auth::{SuperAdmin, TenantScope};
use crate::models::ActivityLog;
use crate::AppState;

use super::{ApiError, LimitQuery};

/// GET /api/activity: this hostel's log
pub async fn list_activity(
    scope: TenantScope,
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ActivityLog>>, ApiError> {
    let entries = state.store.list_activity(scope.tenant_id(), query.sanitize()).await?;
    Ok(Json(entries))
}

/// GET /api/admin/activity: platform-wide log
pub async fn list_all_activity(
    _admin: SuperAdmin,
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ActivityLog>>, ApiError> {
    let entries = state.store.list_all_activity(query.sanitize()).await?;
    Ok(Json(entries))
}
