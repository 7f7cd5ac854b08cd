use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::auth::TenantScope;
use crate::models::*;
use crate::AppState;

use super::{created, record_activity, ApiError};

fn validate(req: &CreateRoomRequest) -> Result<(), ApiError> {
    if req.number.trim().is_empty() {
        return Err(ApiError::bad_request("room number is required"));
    }
    if req.capacity < 1 {
        return Err(ApiError::bad_request("capacity must be at least 1"));
    }
    Ok(())
}

/// List the current hostel's rooms
pub async fn list_rooms(
    scope: TenantScope,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Room>>, ApiError> {
    let rooms = state.store.list_rooms(scope.tenant_id()).await?;
    Ok(Json(rooms))
}

pub async fn get_room(
    scope: TenantScope,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Room>, ApiError> {
    let room = state
        .store
        .get_room(scope.tenant_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("room"))?;
    Ok(Json(room))
}

pub async fn create_room(
    scope: TenantScope,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    validate(&req)?;
    let room = state.store.create_room(scope.tenant_id(), &req).await?;

    record_activity(
        &state,
        NewActivity {
            tenant_id: Some(scope.tenant_id()),
            user_id: Some(scope.session.user_id),
            action: activity_action::ROOM_CREATED,
            detail: format!("room {}", room.number),
        },
    )
    .await;

    Ok(created(room))
}

pub async fn update_room(
    scope: TenantScope,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<Json<Room>, ApiError> {
    validate(&req)?;
    let room = state.store.update_room(scope.tenant_id(), id, &req).await?;

    record_activity(
        &state,
        NewActivity {
            tenant_id: Some(scope.tenant_id()),
            user_id: Some(scope.session.user_id),
            action: activity_action::ROOM_UPDATED,
            detail: format!("room {}", room.number),
        },
    )
    .await;

    Ok(Json(room))
}

/// Delete a room; its students stay, unassigned
pub async fn delete_room(
    scope: TenantScope,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_room(scope.tenant_id(), id).await?;

    record_activity(
        &state,
        NewActivity {
            tenant_id: Some(scope.tenant_id()),
            user_id: Some(scope.session.user_id),
            action: activity_action::ROOM_DELETED,
            detail: format!("room id={}", id),
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
