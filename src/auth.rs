use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::handlers::ErrorResponse;
use crate::models::{Claims, Session, Tenant};
use crate::tenancy::TenantContext;
use crate::AppState;

/// Cookie carrying the session token for browser page requests
pub const SESSION_COOKIE: &str = "hh_session";

/// Sign a session into a JWT valid for `ttl_hours`.
pub fn issue_token(session: &Session, secret: &str, ttl_hours: i64) -> anyhow::Result<String> {
    let now = chrono::Utc::now();
    let exp = now + chrono::TimeDelta::hours(ttl_hours);

    let claims = Claims {
        sub: session.user_id.to_string(),
        email: session.email.clone(),
        role: session.role,
        tenant_id: session.tenant_id,
        subdomain: session.subdomain.clone(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Decode and validate a token; any failure is "no session".
pub fn decode_session(token: &str, secret: &str) -> Option<Session> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )
    .ok()?;
    data.claims.session()
}

/// Token from the session cookie, if present.
pub fn cookie_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

/// Valid session from the cookie alone; used by the routing middleware,
/// which only sees browser navigation.
pub fn session_from_headers(headers: &HeaderMap, secret: &str) -> Option<Session> {
    cookie_token(headers).and_then(|t| decode_session(&t, secret))
}

/// Browser-session cookie; the token's own `exp` bounds its lifetime
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Extractor that validates the session token and provides the session.
///
/// Add `auth: AuthUser` to a handler's parameters to require authentication.
pub struct AuthUser {
    pub session: Session,
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Bearer header first (API clients), then the session cookie (browser)
        let token = match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
            Err(_) if parts.headers.contains_key(axum::http::header::AUTHORIZATION) => {
                return Err(AuthError::InvalidToken);
            }
            Err(_) => cookie_token(&parts.headers).ok_or(AuthError::MissingToken)?,
        };

        let session = decode_session(&token, &state.config.jwt_secret).ok_or(AuthError::InvalidToken)?;
        Ok(AuthUser { session })
    }
}

/// Requires a SUPERADMIN session.
pub struct SuperAdmin {
    pub session: Session,
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for SuperAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser { session } = AuthUser::from_request_parts(parts, state).await?;
        if !session.is_superadmin() {
            return Err(AuthError::Forbidden("superadmin access required"));
        }
        Ok(SuperAdmin { session })
    }
}

/// The tenant a request may read and write, after matching the session
/// against the request's resolved tenant. Handlers take the tenant id from
/// here and nowhere else.
pub struct TenantScope {
    pub tenant: Tenant,
    pub session: Session,
}

impl TenantScope {
    pub fn tenant_id(&self) -> i64 {
        self.tenant.id
    }

    /// Check a session against a request context.
    pub fn authorize(session: Session, ctx: &TenantContext) -> Result<Self, AuthError> {
        let tenant = match ctx {
            TenantContext::Root => return Err(AuthError::NoTenant),
            TenantContext::Suspended(_) => return Err(AuthError::Forbidden("this hostel is suspended")),
            TenantContext::Active(t) => t,
        };

        if session.is_superadmin() || session.tenant_id == Some(tenant.id) {
            Ok(TenantScope {
                tenant: tenant.clone(),
                session,
            })
        } else {
            Err(AuthError::Forbidden("you don't have access to this hostel"))
        }
    }
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for TenantScope {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser { session } = AuthUser::from_request_parts(parts, state).await?;
        let ctx = match TenantContext::from_request_parts(parts, state).await {
            Ok(ctx) => ctx,
            Err(never) => match never {},
        };
        TenantScope::authorize(session, &ctx)
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    Forbidden(&'static str),
    NoTenant,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AuthError::NoTenant => (StatusCode::BAD_REQUEST, "No hostel selected for this request"),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn tenant(id: i64, slug: &str) -> Tenant {
        Tenant {
            id,
            name: slug.to_string(),
            subdomain: slug.to_string(),
            is_active: true,
            created_at: chrono::Utc::now(),
        }
    }

    fn session(role: Role, tenant_id: Option<i64>) -> Session {
        Session {
            user_id: 7,
            email: "u@x.com".into(),
            role,
            tenant_id,
            subdomain: String::new(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let s = Session { subdomain: "acme".into(), ..session(Role::Admin, Some(1)) };
        let token = issue_token(&s, "secret", 1).unwrap();
        assert_eq!(decode_session(&token, "secret"), Some(s));
        assert_eq!(decode_session(&token, "other-secret"), None);
        assert_eq!(decode_session("garbage", "secret"), None);
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(&session(Role::Admin, Some(1)), "secret", -2).unwrap();
        assert_eq!(decode_session(&token, "secret"), None);
    }

    #[test]
    fn test_scope_matches_own_tenant_only() {
        let acme = TenantContext::Active(tenant(1, "acme"));
        let other = TenantContext::Active(tenant(2, "other"));

        let scope = TenantScope::authorize(session(Role::Admin, Some(1)), &acme).unwrap();
        assert_eq!(scope.tenant_id(), 1);
        assert!(matches!(
            TenantScope::authorize(session(Role::Admin, Some(1)), &other),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn test_scope_superadmin_uses_request_tenant() {
        let other = TenantContext::Active(tenant(2, "other"));
        let scope = TenantScope::authorize(session(Role::Superadmin, None), &other).unwrap();
        assert_eq!(scope.tenant_id(), 2);
    }

    #[test]
    fn test_scope_fails_closed_without_active_tenant() {
        assert!(matches!(
            TenantScope::authorize(session(Role::Superadmin, None), &TenantContext::Root),
            Err(AuthError::NoTenant)
        ));
        assert!(matches!(
            TenantScope::authorize(session(Role::Admin, Some(1)), &TenantContext::Suspended(tenant(1, "acme"))),
            Err(AuthError::Forbidden(_))
        ));
    }
}
