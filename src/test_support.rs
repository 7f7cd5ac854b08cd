//! Shared fixtures for unit and router tests.

use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::access::{AccessGate, LoginThrottle};
use crate::config::{Config, TenancyConfig};
use crate::db::Store;
use crate::models::{NewUser, Role, User};
use crate::tenancy::TenantResolver;
use crate::AppState;

pub const TEST_SECRET: &str = "test-secret";

/// In-memory store on a single connection, so every query sees the same database
pub async fn test_store() -> Store {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    Store::from_pool(pool).await.expect("migrations")
}

pub fn test_config() -> Config {
    Config {
        db_path: ":memory:".to_string(),
        db_max_connections: 1,
        listen_addr: "127.0.0.1:0".to_string(),
        frontend_dir: "frontend".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        session_ttl_hours: 1,
        bcrypt_cost: 4,
        superadmin_email: "root@hostelhub.app".to_string(),
        superadmin_password: "rootpass".to_string(),
        login_max_failures: 5,
        login_window_secs: 300,
        tenancy: TenancyConfig::default(),
    }
}

pub fn hash(password: &str) -> String {
    bcrypt::hash(password, 4).expect("bcrypt")
}

pub async fn superadmin(store: &Store, email: &str, password: &str) -> User {
    store
        .create_user(&NewUser {
            email: email.to_string(),
            name: "Root".to_string(),
            password_hash: hash(password),
            role: Role::Superadmin,
            tenant_id: None,
        })
        .await
        .expect("create superadmin")
}

pub async fn tenant_admin(store: &Store, tenant_id: i64, email: &str, password: &str) -> User {
    store
        .create_user(&NewUser {
            email: email.to_string(),
            name: "Admin".to_string(),
            password_hash: hash(password),
            role: Role::Admin,
            tenant_id: Some(tenant_id),
        })
        .await
        .expect("create admin")
}

/// Full application state over a fresh store, seeded like a real start
pub async fn test_state() -> Arc<AppState> {
    let config = test_config();
    let store = test_store().await;
    let demo = store.seed(&config).await.expect("seed");

    let resolver = TenantResolver::new(store.clone(), demo);
    let throttle = Arc::new(LoginThrottle::new(
        config.login_max_failures,
        Duration::from_secs(config.login_window_secs),
    ));
    let gate = AccessGate::new(store.clone(), resolver.clone(), throttle, config.bcrypt_cost).expect("gate");

    Arc::new(AppState {
        store,
        config,
        resolver,
        gate,
    })
}
