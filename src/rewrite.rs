//! Host + path → routing decision, evaluated once per request.
//!
//! Branches run in a fixed order and the first match wins. Asset paths are
//! checked before anything else so they never touch tenant logic.

use crate::config::TenancyConfig;
use crate::tenancy::{parse_host, HostTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Framework asset; not tenant related
    Asset,
    /// Public marketing surface on the root domain
    Root(Action),
    /// Request for a tenant subdomain
    Tenant { slug: String, action: Action },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    PassThrough,
    Redirect(String),
    Rewrite(String),
}

/// Decide what to do with a request. `has_session` is whether a valid
/// session token accompanied it.
pub fn route(cfg: &TenancyConfig, host: &str, path: &str, has_session: bool) -> Route {
    // 1. Framework assets
    if is_asset_path(cfg, path) {
        return Route::Asset;
    }

    // 2-3. Root domain, including hosts with no usable subdomain
    let slug = match parse_host(host, cfg) {
        HostTarget::Root => return Route::Root(root_action(cfg, path)),
        HostTarget::Tenant(slug) => slug,
    };

    let action = tenant_action(cfg, &slug, path, has_session);
    Route::Tenant { slug, action }
}

fn root_action(cfg: &TenancyConfig, path: &str) -> Action {
    if is_api_path(path) || is_root_public(cfg, path) {
        Action::PassThrough
    } else {
        Action::Redirect("/".to_string())
    }
}

fn tenant_action(cfg: &TenancyConfig, slug: &str, path: &str, has_session: bool) -> Action {
    // 4. Already rewritten
    if has_prefix_segment(path, slug) {
        return Action::PassThrough;
    }

    // 5. API and public files skip the session gate
    if is_api_path(path) || is_public_file(path) {
        return Action::PassThrough;
    }

    // 6. Session gate
    let is_public = cfg.public_routes.iter().any(|r| has_prefix_segment(path, r.trim_start_matches('/')));
    if !has_session && !is_public && !cfg.is_demo(slug) {
        return Action::Redirect("/login".to_string());
    }
    if has_session && has_prefix_segment(path, "login") {
        return Action::Redirect("/".to_string());
    }

    // 7. Internal tenant path
    Action::Rewrite(tenant_path(slug, path))
}

/// `/{slug}{path}`, keeping the root as `/{slug}/`
pub fn tenant_path(slug: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("/{}{}", slug, path)
    } else {
        format!("/{}/{}", slug, path)
    }
}

/// True when `path` is `/{segment}` or starts with `/{segment}/`
fn has_prefix_segment(path: &str, segment: &str) -> bool {
    match path.strip_prefix('/').and_then(|p| p.strip_prefix(segment)) {
        Some(rest) => !segment.is_empty() && (rest.is_empty() || rest.starts_with('/')),
        None => false,
    }
}

fn is_asset_path(cfg: &TenancyConfig, path: &str) -> bool {
    cfg.asset_prefixes.iter().any(|p| path.starts_with(p.as_str()))
}

fn is_api_path(path: &str) -> bool {
    has_prefix_segment(path, "api")
}

fn is_root_public(cfg: &TenancyConfig, path: &str) -> bool {
    cfg.root_public_paths.iter().any(|p| {
        if p == "/" {
            path == "/"
        } else {
            has_prefix_segment(path, p.trim_start_matches('/'))
        }
    })
}

/// A file name in the last segment (`/logo.png`, `/robots.txt`)
fn is_public_file(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|last| last.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> TenancyConfig {
        TenancyConfig::default()
    }

    fn tenant(slug: &str, action: Action) -> Route {
        Route::Tenant { slug: slug.to_string(), action }
    }

    fn rewrite(p: &str) -> Action {
        Action::Rewrite(p.to_string())
    }

    fn redirect(p: &str) -> Action {
        Action::Redirect(p.to_string())
    }

    #[test]
    fn test_assets_bypass_everything() {
        assert_eq!(route(&cfg(), "acme.hostelhub.app", "/assets/app.js", false), Route::Asset);
        assert_eq!(route(&cfg(), "localhost", "/favicon.ico", false), Route::Asset);
    }

    #[test]
    fn test_root_domain_surface() {
        let c = cfg();
        assert_eq!(route(&c, "hostelhub.app", "/", false), Route::Root(Action::PassThrough));
        assert_eq!(route(&c, "hostelhub.app", "/register", false), Route::Root(Action::PassThrough));
        assert_eq!(route(&c, "hostelhub.app", "/superadmin/tenants", true), Route::Root(Action::PassThrough));
        assert_eq!(route(&c, "www.hostelhub.app", "/api/tenants/lookup/acme", false), Route::Root(Action::PassThrough));
        assert_eq!(route(&c, "localhost:3000", "/rooms", false), Route::Root(redirect("/")));
        assert_eq!(route(&c, "hostelhub.app", "/loginx", false), Route::Root(redirect("/")));
    }

    #[test]
    fn test_bare_host_treated_as_root() {
        assert_eq!(route(&cfg(), "intranet", "/rooms", false), Route::Root(redirect("/")));
        assert_eq!(route(&cfg(), "", "/", false), Route::Root(Action::PassThrough));
    }

    #[test]
    fn test_already_prefixed_passes_through() {
        assert_eq!(route(&cfg(), "acme.hostelhub.app", "/acme/rooms", false), tenant("acme", Action::PassThrough));
        assert_eq!(route(&cfg(), "acme.hostelhub.app", "/acme", true), tenant("acme", Action::PassThrough));
        // A different tenant's prefix is just a path under this tenant
        assert_eq!(route(&cfg(), "acme.hostelhub.app", "/other/rooms", true), tenant("acme", rewrite("/acme/other/rooms")));
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let c = cfg();
        let first = match route(&c, "acme.hostelhub.app", "/rooms", true) {
            Route::Tenant { action: Action::Rewrite(p), .. } => p,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(first, "/acme/rooms");
        assert_eq!(route(&c, "acme.hostelhub.app", &first, true), tenant("acme", Action::PassThrough));
    }

    #[test]
    fn test_api_and_files_skip_session_gate() {
        let c = cfg();
        assert_eq!(route(&c, "acme.hostelhub.app", "/api/rooms", false), tenant("acme", Action::PassThrough));
        assert_eq!(route(&c, "acme.hostelhub.app", "/logo.png", false), tenant("acme", Action::PassThrough));
    }

    #[test]
    fn test_session_gate() {
        let c = cfg();
        assert_eq!(route(&c, "acme.hostelhub.app", "/", false), tenant("acme", redirect("/login")));
        assert_eq!(route(&c, "acme.hostelhub.app", "/rooms", false), tenant("acme", redirect("/login")));
        assert_eq!(route(&c, "acme.hostelhub.app", "/login", false), tenant("acme", rewrite("/acme/login")));
        assert_eq!(route(&c, "acme.hostelhub.app", "/register/step-2", false), tenant("acme", rewrite("/acme/register/step-2")));
        assert_eq!(route(&c, "acme.hostelhub.app", "/login", true), tenant("acme", redirect("/")));
        assert_eq!(route(&c, "acme.hostelhub.app", "/", true), tenant("acme", rewrite("/acme/")));
    }

    #[test]
    fn test_demo_allows_anonymous_entry() {
        assert_eq!(route(&cfg(), "demo.hostelhub.app", "/rooms", false), tenant("demo", rewrite("/demo/rooms")));
    }

    #[test]
    fn test_prefix_segment_matching() {
        assert!(has_prefix_segment("/api", "api"));
        assert!(has_prefix_segment("/api/x", "api"));
        assert!(!has_prefix_segment("/apix", "api"));
        assert!(!has_prefix_segment("/x", ""));
    }
}
