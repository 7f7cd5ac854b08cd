use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::auth::{issue_token, removal_cookie, session_cookie, AuthUser};
use crate::models::{activity_action, LoginRequest, LoginResponse, NewActivity, Session};
use crate::AppState;

use super::{record_activity, ApiError, MessageResponse};

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let detail = format!("email={} subdomain={}", req.email.trim(), req.subdomain.trim());

    let (user, session) = match state.gate.authenticate(&req.email, &req.password, &req.subdomain).await {
        Ok(ok) => ok,
        Err(denied) => {
            if let Some(action) = denied.error.activity_action() {
                tracing::warn!("Login denied ({}): {}", action, detail);
                record_activity(
                    &state,
                    NewActivity {
                        tenant_id: denied.user.as_ref().and_then(|u| u.tenant_id),
                        user_id: denied.user.as_ref().map(|u| u.id),
                        action,
                        detail,
                    },
                )
                .await;
            }
            return Err(denied.error.into());
        }
    };

    let token = issue_token(&session, &state.config.jwt_secret, state.config.session_ttl_hours)
        .map_err(|e| ApiError::internal(format!("token generation error: {}", e)))?;

    tracing::info!("User {} logged in ({})", user.email, session.role);
    record_activity(
        &state,
        NewActivity {
            tenant_id: user.tenant_id,
            user_id: Some(user.id),
            action: activity_action::LOGIN_SUCCEEDED,
            detail,
        },
    )
    .await;

    Ok((
        jar.add(session_cookie(token.clone())),
        Json(LoginResponse { token, session }),
    ))
}

/// POST /api/auth/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    (jar.remove(removal_cookie()), MessageResponse::new("logged out"))
}

/// GET /api/auth/session
pub async fn current_session(auth: AuthUser) -> Json<Session> {
    Json(auth.session)
}
