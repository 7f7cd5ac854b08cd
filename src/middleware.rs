use axum::{
    extract::{Request, State},
    http::{header, uri::PathAndQuery, HeaderValue, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::auth::session_from_headers;
use crate::handlers::ApiError;
use crate::rewrite::{self, tenant_path, Action, Route};
use crate::tenancy::{ResolutionError, TenantContext, TENANT_HEADER};
use crate::AppState;

/// Tenant routing middleware. Runs before route matching, resolves the
/// tenant once, and hands it to handlers as a [`TenantContext`] extension
/// plus the `x-tenant-slug` header.
pub async fn tenant_routing(State(state): State<Arc<AppState>>, mut req: Request, next: Next) -> Response {
    // Only this middleware may set the tenant header
    req.headers_mut().remove(TENANT_HEADER);

    let host = request_host(&req);
    let path = req.uri().path().to_string();
    let has_session = session_from_headers(req.headers(), &state.config.jwt_secret).is_some();

    let (slug, action) = match rewrite::route(&state.config.tenancy, &host, &path, has_session) {
        Route::Asset => return next.run(req).await,
        Route::Root(action) => {
            req.extensions_mut().insert(TenantContext::Root);
            return apply(req, next, action).await;
        }
        Route::Tenant { slug, action } => (slug, action),
    };

    let ctx = match state.resolver.context_for_slug(&slug).await {
        Ok(ctx) => ctx,
        Err(ResolutionError::NotFound(_)) => {
            tracing::debug!("No tenant for host {} ({})", host, slug);
            return ApiError::not_found("Hostel").into_response();
        }
        Err(e) => {
            tracing::error!("Tenant resolution failed for {}: {}", slug, e);
            return ApiError::internal("tenant resolution failed").into_response();
        }
    };

    // A suspended hostel only shows its notice page; the API still sees the
    // context so login can report the suspension
    let action = match &ctx {
        TenantContext::Suspended(_) if !path.starts_with("/api/") && path != "/api" => {
            Action::Rewrite(tenant_path(&slug, "/suspended"))
        }
        _ => action,
    };

    if let Ok(value) = HeaderValue::from_str(&slug) {
        req.headers_mut().insert(TENANT_HEADER, value);
    }
    req.extensions_mut().insert(ctx);

    apply(req, next, action).await
}

async fn apply(mut req: Request, next: Next, action: Action) -> Response {
    match action {
        Action::PassThrough => next.run(req).await,
        Action::Redirect(location) => Redirect::temporary(&location).into_response(),
        Action::Rewrite(path) => {
            if let Err(e) = set_path(&mut req, &path) {
                tracing::warn!("Could not rewrite {} to {}: {}", req.uri(), path, e);
                return StatusCode::BAD_REQUEST.into_response();
            }
            next.run(req).await
        }
    }
}

/// `Host` header, falling back to the URI authority (HTTP/2)
fn request_host(req: &Request) -> String {
    req.headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default()
        .to_string()
}

fn set_path(req: &mut Request, path: &str) -> anyhow::Result<()> {
    let path_and_query = match req.uri().query() {
        Some(q) => format!("{}?{}", path, q),
        None => path.to_string(),
    };
    let mut parts = req.uri().clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse::<PathAndQuery>()?);
    *req.uri_mut() = Uri::from_parts(parts)?;
    Ok(())
}
