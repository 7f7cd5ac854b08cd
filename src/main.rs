mod access;
mod auth;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod rewrite;
mod router;
mod tenancy;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use access::{AccessGate, LoginThrottle};
use config::Config;
use db::Store;
use tenancy::TenantResolver;

/// Application state shared across handlers
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub resolver: TenantResolver,
    pub gate: AccessGate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostel_gateway=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut cfg = Config::load();
    if cfg.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET not set - generating random secret (tokens will be invalidated on restart)");
        cfg.jwt_secret = uuid::Uuid::new_v4().to_string();
    }
    tracing::info!("Starting HostelHub gateway");
    tracing::info!("Database: {}", cfg.db_path);
    tracing::info!("Apex domain: {}", cfg.tenancy.apex_domain);
    tracing::info!("Listen: {}", cfg.listen_addr);

    // Initialize database
    let store = Store::with_pool_size(&cfg.db_path, cfg.db_max_connections).await?;
    tracing::info!("Database initialized (pool_size={})", cfg.db_max_connections);

    let demo = store.seed(&cfg).await?;
    if let Some(demo) = &demo {
        tracing::info!("Demo tenant pinned: {} (id={})", demo.subdomain, demo.id);
    }

    let resolver = TenantResolver::new(store.clone(), demo);
    let throttle = Arc::new(LoginThrottle::new(
        cfg.login_max_failures,
        Duration::from_secs(cfg.login_window_secs),
    ));
    let gate = AccessGate::new(store.clone(), resolver.clone(), throttle.clone(), cfg.bcrypt_cost)?;

    // Evict throttle keys whose failures have refilled
    {
        let period = Duration::from_secs(cfg.login_window_secs.max(60));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                throttle.sweep();
            }
        });
    }

    let state = Arc::new(AppState {
        store,
        config: cfg.clone(),
        resolver,
        gate,
    });

    // Build router
    let app = router::build(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("HostelHub listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HostelHub shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
