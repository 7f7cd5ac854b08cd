use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
    pub listen_addr: String,
    pub frontend_dir: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub superadmin_email: String,
    pub superadmin_password: String,
    pub login_max_failures: usize,
    pub login_window_secs: u64,
    pub tenancy: TenancyConfig,
}

/// Host and slug rules for tenant routing, loaded once at startup
#[derive(Debug, Clone)]
pub struct TenancyConfig {
    /// Production apex, e.g. `hostelhub.app`
    pub apex_domain: String,
    /// Hosts (or leftmost labels) that serve the public marketing surface
    pub root_hosts: Vec<String>,
    /// Slugs that can never be registered
    pub reserved_slugs: Vec<String>,
    /// Slug of the pre-seeded demonstration tenant
    pub demo_slug: String,
    /// Subdomain paths reachable without a session (prefix match)
    pub public_routes: Vec<String>,
    /// Paths the root domain serves; anything else redirects to `/`
    pub root_public_paths: Vec<String>,
    /// Framework asset prefixes that bypass routing entirely
    pub asset_prefixes: Vec<String>,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            apex_domain: "hostelhub.app".to_string(),
            root_hosts: strings(&["localhost", "127.0.0.1", "www", "hostelhub.app"]),
            reserved_slugs: strings(&[
                "www", "api", "admin", "app", "dashboard", "login", "signup", "register",
            ]),
            demo_slug: "demo".to_string(),
            public_routes: strings(&["/login", "/register"]),
            root_public_paths: strings(&["/", "/login", "/register", "/superadmin"]),
            asset_prefixes: strings(&["/assets/", "/_internal/", "/favicon.ico"]),
        }
    }
}

impl TenancyConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let apex_domain = get_env("APEX_DOMAIN", &defaults.apex_domain).to_ascii_lowercase();

        let mut root_hosts = env_list("ROOT_HOSTS").unwrap_or(defaults.root_hosts);
        if !root_hosts.contains(&apex_domain) {
            root_hosts.push(apex_domain.clone());
        }

        Self {
            apex_domain,
            root_hosts,
            reserved_slugs: env_list("RESERVED_SLUGS").unwrap_or(defaults.reserved_slugs),
            demo_slug: get_env("DEMO_SLUG", &defaults.demo_slug).to_ascii_lowercase(),
            ..defaults
        }
    }

    pub fn is_reserved(&self, slug: &str) -> bool {
        self.reserved_slugs.iter().any(|r| r == slug)
    }

    pub fn is_demo(&self, slug: &str) -> bool {
        !self.demo_slug.is_empty() && self.demo_slug == slug
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            db_path: get_env("DB_PATH", "/data/hostelhub.db"),
            db_max_connections: get_env("DB_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(5),
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            frontend_dir: get_env("FRONTEND_DIR", "/app/frontend"),
            jwt_secret: get_env("JWT_SECRET", ""),
            session_ttl_hours: get_env("SESSION_TTL_HOURS", "24").parse().unwrap_or(24),
            bcrypt_cost: get_env("BCRYPT_COST", "12")
                .parse()
                .unwrap_or(bcrypt::DEFAULT_COST),
            superadmin_email: get_env("SUPERADMIN_EMAIL", "root@hostelhub.app"),
            superadmin_password: get_env("SUPERADMIN_PASSWORD", ""),
            login_max_failures: get_env("LOGIN_MAX_FAILURES", "5").parse().unwrap_or(5),
            login_window_secs: get_env("LOGIN_WINDOW_SECS", "300").parse().unwrap_or(300),
            tenancy: TenancyConfig::from_env(),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Comma-separated list; unset or blank means "use the default"
fn env_list(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    let items: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
