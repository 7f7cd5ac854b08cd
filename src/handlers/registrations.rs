use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::auth::SuperAdmin;
use crate::models::*;
use crate::tenancy::validate_slug;
use crate::AppState;

use super::{created, record_activity, ApiError};

const MIN_PASSWORD_LEN: usize = 8;

/// POST /api/registrations: public self-service signup
pub async fn submit_registration(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitRegistrationRequest>,
) -> Result<(StatusCode, Json<RegistrationRequest>), ApiError> {
    // Reserved and malformed slugs are refused before touching the store
    let subdomain = validate_slug(&req.subdomain, &state.config.tenancy)?;

    let hostel_name = req.hostel_name.trim();
    let admin_name = req.admin_name.trim();
    let admin_email = req.admin_email.trim().to_ascii_lowercase();
    if hostel_name.is_empty() || admin_name.is_empty() {
        return Err(ApiError::bad_request("hostel name and admin name are required"));
    }
    if !admin_email.contains('@') {
        return Err(ApiError::bad_request("a valid admin email is required"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if state.store.get_user_by_email(&admin_email).await?.is_some() {
        return Err(ApiError::conflict("An account with this email already exists"));
    }

    let password_hash = bcrypt::hash(&req.password, state.config.bcrypt_cost)
        .map_err(|e| ApiError::internal(format!("password hashing error: {}", e)))?;

    let registration = state
        .store
        .create_registration(&NewRegistration {
            hostel_name: hostel_name.to_string(),
            subdomain,
            admin_email,
            admin_name: admin_name.to_string(),
            password_hash,
        })
        .await?
        .ok_or_else(|| ApiError::conflict("subdomain taken or pending").with_code("subdomain_unavailable"))?;

    tracing::info!(
        "Registration {} submitted for '{}' ({})",
        registration.id,
        registration.subdomain,
        registration.hostel_name
    );
    notify_superadmins(&state, &registration).await;

    Ok(created(registration))
}

async fn notify_superadmins(state: &Arc<AppState>, registration: &RegistrationRequest) {
    let superadmins = match state.store.list_superadmins().await {
        Ok(users) => users,
        Err(e) => {
            tracing::warn!("Could not load superadmins to notify: {}", e);
            return;
        }
    };

    let title = "New hostel registration";
    let message = format!(
        "{} requested the subdomain '{}' (admin: {} <{}>)",
        registration.hostel_name, registration.subdomain, registration.admin_name, registration.admin_email
    );
    for user in superadmins {
        if let Err(e) = state.store.create_notification(user.id, title, &message).await {
            tracing::warn!("Failed to notify superadmin {}: {}", user.email, e);
        }
    }
}

/// GET /api/registrations/check/:slug
pub async fn check_subdomain(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<SlugAvailability>, ApiError> {
    let availability = match validate_slug(&slug, &state.config.tenancy) {
        Err(e) => SlugAvailability {
            subdomain: slug,
            available: false,
            reason: Some(e.to_string()),
        },
        Ok(subdomain) => {
            let taken = state.store.is_subdomain_taken(&subdomain).await?;
            SlugAvailability {
                subdomain,
                available: !taken,
                reason: taken.then(|| "subdomain taken or pending".to_string()),
            }
        }
    };
    Ok(Json(availability))
}

pub async fn list_registrations(
    _admin: SuperAdmin,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegistrationListQuery>,
) -> Result<Json<Vec<RegistrationRequest>>, ApiError> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(s) => Some(s.parse::<RegistrationStatus>().map_err(|e| ApiError::bad_request(e.to_string()))?),
    };
    Ok(Json(state.store.list_registrations(status).await?))
}

pub async fn get_registration(
    _admin: SuperAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RegistrationRequest>, ApiError> {
    let registration = state
        .store
        .get_registration(id)
        .await?
        .ok_or_else(|| ApiError::not_found("registration"))?;
    Ok(Json(registration))
}

pub async fn approve_registration(
    admin: SuperAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApprovedRegistration>, ApiError> {
    let approved = state.store.approve_registration(id, admin.session.user_id).await?;

    tracing::info!(
        "Registration {} approved by {}: tenant '{}' (id={})",
        id,
        admin.session.email,
        approved.tenant.subdomain,
        approved.tenant.id
    );
    record_activity(
        &state,
        NewActivity {
            tenant_id: Some(approved.tenant.id),
            user_id: Some(admin.session.user_id),
            action: activity_action::TENANT_APPROVED,
            detail: approved.tenant.subdomain.clone(),
        },
    )
    .await;

    Ok(Json(approved))
}

pub async fn reject_registration(
    admin: SuperAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<RejectRegistrationRequest>,
) -> Result<Json<RegistrationRequest>, ApiError> {
    let reason = req.reason.trim();
    if reason.is_empty() {
        return Err(ApiError::bad_request("a rejection reason is required"));
    }

    let rejected = state.store.reject_registration(id, admin.session.user_id, reason).await?;

    tracing::info!("Registration {} ('{}') rejected by {}", id, rejected.subdomain, admin.session.email);
    record_activity(
        &state,
        NewActivity {
            tenant_id: None,
            user_id: Some(admin.session.user_id),
            action: activity_action::REGISTRATION_REJECTED,
            detail: format!("{}: {}", rejected.subdomain, reason),
        },
    )
    .await;

    Ok(Json(rejected))
}
