//! Page routes. Rendering lives in the frontend; these return the context a
//! page needs (which page, which hostel, who is signed in) after the same
//! access checks a rendered page would get.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{decode_session, issue_token, session_cookie, TenantScope, SESSION_COOKIE};
use crate::models::{Role, Session, Tenant};
use crate::tenancy::TenantContext;
use crate::AppState;

use super::ApiError;

#[derive(Debug, Serialize)]
pub struct PageContext {
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

fn page(name: &str, tenant: Option<Tenant>, session: Option<Session>) -> Json<PageContext> {
    Json(PageContext {
        page: name.to_string(),
        tenant,
        session,
    })
}

fn jar_session(state: &AppState, jar: &CookieJar) -> Option<Session> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| decode_session(c.value(), &state.config.jwt_secret))
}

pub async fn landing(State(state): State<Arc<AppState>>, jar: CookieJar) -> Json<PageContext> {
    page("landing", None, jar_session(&state, &jar))
}

pub async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Json<PageContext> {
    page("login", None, jar_session(&state, &jar))
}

pub async fn register_page() -> Json<PageContext> {
    page("register", None, None)
}

/// `/superadmin` and everything under it
pub async fn superadmin_console(State(state): State<Arc<AppState>>, jar: CookieJar, uri: Uri) -> Response {
    match jar_session(&state, &jar) {
        Some(session) if session.is_superadmin() => {
            let name = uri.path().trim_matches('/').to_string();
            page(&name, None, Some(session)).into_response()
        }
        _ => Redirect::temporary("/login").into_response(),
    }
}

/// Fallback for rewritten tenant paths (`/{slug}/...`).
pub async fn tenant_page(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
    jar: CookieJar,
    uri: Uri,
) -> Response {
    let Some(slug) = ctx.slug() else {
        return ApiError::not_found("Page").into_response();
    };
    let Some(rest) = uri.path().strip_prefix('/').and_then(|p| p.strip_prefix(slug)) else {
        return ApiError::not_found("Page").into_response();
    };
    if !(rest.is_empty() || rest.starts_with('/')) {
        return ApiError::not_found("Page").into_response();
    }
    let name = match rest.trim_matches('/') {
        "" => "home",
        other => other,
    };

    let tenant = match &ctx {
        TenantContext::Suspended(t) => {
            return (StatusCode::FORBIDDEN, page("suspended", Some(t.clone()), None)).into_response();
        }
        TenantContext::Active(t) => t.clone(),
        TenantContext::Root => return ApiError::not_found("Page").into_response(),
    };

    if name == "suspended" {
        return Redirect::temporary("/").into_response();
    }

    let session = jar_session(&state, &jar);
    if is_public_page(&state, name) {
        return page(name, Some(tenant), session).into_response();
    }

    let session = match session {
        Some(s) => s,
        None if state.config.tenancy.is_demo(&tenant.subdomain) => {
            return match demo_login(&state, &tenant).await {
                Ok((cookie, session)) => (jar.add(cookie), page(name, Some(tenant), Some(session))).into_response(),
                Err(e) => e.into_response(),
            };
        }
        None => return Redirect::temporary("/login").into_response(),
    };

    match TenantScope::authorize(session, &ctx) {
        Ok(scope) => page(name, Some(scope.tenant), Some(scope.session)).into_response(),
        Err(e) => e.into_response(),
    }
}

fn is_public_page(state: &AppState, name: &str) -> bool {
    state.config.tenancy.public_routes.iter().any(|r| {
        let r = r.trim_start_matches('/');
        name == r || name.starts_with(&format!("{}/", r))
    })
}

/// Anonymous visitors to the demo hostel are signed in as its seeded admin.
async fn demo_login(
    state: &AppState,
    tenant: &Tenant,
) -> Result<(Cookie<'static>, Session), ApiError> {
    let user = state
        .store
        .list_tenant_users(tenant.id)
        .await?
        .into_iter()
        .find(|u| u.role == Role::Admin)
        .ok_or_else(|| ApiError::not_found("Demo account"))?;

    let session = Session {
        user_id: user.id,
        email: user.email,
        role: user.role,
        tenant_id: Some(tenant.id),
        subdomain: tenant.subdomain.clone(),
    };
    let token = issue_token(&session, &state.config.jwt_secret, state.config.session_ttl_hours)
        .map_err(|e| ApiError::internal(format!("token generation error: {}", e)))?;

    tracing::info!("Demo visitor signed in as {}", session.email);
    Ok((session_cookie(token), session))
}
