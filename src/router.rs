use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::Layer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::tenant_routing;
use crate::AppState;

/// Build the application router with all routes.
///
/// Tenant routing wraps the whole inner router so path rewrites happen
/// before route matching; rewritten tenant pages land on the fallback.
pub fn build(state: Arc<AppState>) -> Router {
    let frontend_dir = state.config.frontend_dir.clone();

    let app = Router::new()
        .route("/api/health", get(handlers::healthcheck))
        // Auth routes
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/session", get(handlers::auth::current_session))
        // Tenant routes
        .route("/api/tenant", get(handlers::tenants::current_tenant))
        .route("/api/tenants/lookup/:slug", get(handlers::tenants::lookup_tenant))
        // Registration routes
        .route("/api/registrations", post(handlers::registrations::submit_registration))
        .route("/api/registrations/check/:slug", get(handlers::registrations::check_subdomain))
        // Superadmin routes
        .route("/api/admin/registrations", get(handlers::registrations::list_registrations))
        .route("/api/admin/registrations/:id", get(handlers::registrations::get_registration))
        .route("/api/admin/registrations/:id/approve", post(handlers::registrations::approve_registration))
        .route("/api/admin/registrations/:id/reject", post(handlers::registrations::reject_registration))
        .route("/api/admin/tenants", get(handlers::tenants::list_tenants))
        .route("/api/admin/tenants/:id/suspend", post(handlers::tenants::suspend_tenant))
        .route("/api/admin/tenants/:id/activate", post(handlers::tenants::activate_tenant))
        .route("/api/admin/activity", get(handlers::activity::list_all_activity))
        // Notification routes
        .route("/api/notifications", get(handlers::notifications::list_notifications))
        .route("/api/notifications/:id/read", post(handlers::notifications::mark_notification_read))
        // Tenant-scoped routes
        .route("/api/activity", get(handlers::activity::list_activity))
        .route(
            "/api/rooms",
            get(handlers::rooms::list_rooms).post(handlers::rooms::create_room),
        )
        .route(
            "/api/rooms/:id",
            get(handlers::rooms::get_room)
                .put(handlers::rooms::update_room)
                .delete(handlers::rooms::delete_room),
        )
        .route(
            "/api/students",
            get(handlers::students::list_students).post(handlers::students::create_student),
        )
        .route(
            "/api/students/:id",
            get(handlers::students::get_student).delete(handlers::students::delete_student),
        )
        // Root-domain pages
        .route("/", get(handlers::pages::landing))
        .route("/login", get(handlers::pages::login_page))
        .route("/register", get(handlers::pages::register_page))
        .route("/superadmin", get(handlers::pages::superadmin_console))
        .route("/superadmin/*rest", get(handlers::pages::superadmin_console))
        // Static files (frontend)
        .nest_service("/assets", ServeDir::new(format!("{}/assets", frontend_dir)))
        .fallback(handlers::pages::tenant_page)
        .with_state(state.clone());

    let routed = from_fn_with_state(state, tenant_routing).layer(app);

    Router::new()
        .fallback_service(routed)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
