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

pub async fn list_students(
    scope: TenantScope,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let students = state.store.list_students(scope.tenant_id()).await?;
    Ok(Json(students))
}

pub async fn get_student(
    scope: TenantScope,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Student>, ApiError> {
    let student = state
        .store
        .get_student(scope.tenant_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("student"))?;
    Ok(Json(student))
}

/// Create a student, optionally placing them in one of this hostel's rooms
pub async fn create_student(
    scope: TenantScope,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let student = state.store.create_student(scope.tenant_id(), &req).await?;

    record_activity(
        &state,
        NewActivity {
            tenant_id: Some(scope.tenant_id()),
            user_id: Some(scope.session.user_id),
            action: activity_action::STUDENT_CREATED,
            detail: student.name.clone(),
        },
    )
    .await;

    Ok(created(student))
}

pub async fn delete_student(
    scope: TenantScope,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_student(scope.tenant_id(), id).await?;

    record_activity(
        &state,
        NewActivity {
            tenant_id: Some(scope.tenant_id()),
            user_id: Some(scope.session.user_id),
            action: activity_action::STUDENT_DELETED,
            detail: format!("student id={}", id),
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
