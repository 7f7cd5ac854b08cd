use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{auth::AuthUser, handlers::ApiError, models::Notification, AppState};

pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state.store.list_notifications(auth.session.user_id).await?;
    Ok(Json(notifications))
}

pub async fn mark_notification_read(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.mark_notification_read(auth.session.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
