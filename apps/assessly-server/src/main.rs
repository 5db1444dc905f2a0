use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use assessly_api::{build_router, AppState};
use assessly_infrastructure::{create_pool, postgres_repositories, run_migrations};
use assessly_shared::config::AppConfig;
use assessly_shared::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Configuration first: the log format and level live in it
    let config = AppConfig::load().context("Failed to load configuration")?;
    let _log_guard = init_telemetry(&config.logging).context("Failed to initialize telemetry")?;

    info!(
        "{} v{} starting (env: {})",
        config.app.name,
        env!("CARGO_PKG_VERSION"),
        config.app.env
    );
    if config.supabase.service_role_key.is_some() {
        info!("Supabase service role key: present");
    } else {
        info!("Supabase service role key: absent");
    }
    if config.is_production() && config.app.cors_origins.iter().any(|o| o == "*") {
        warn!("CORS allows any origin in production");
    }

    // Connect to Database
    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;

    if config.database.run_migrations {
        run_migrations(&pool).await.context("Failed to run migrations")?;
    } else {
        info!("Skipping migrations (database.run_migrations = false)");
    }

    // Bind address
    let host: IpAddr = config
        .app
        .host
        .parse()
        .with_context(|| format!("Invalid app.host: {}", config.app.host))?;
    let addr = SocketAddr::from((host, config.app.port));

    // Create App State
    let repos = postgres_repositories(&pool);
    let state = AppState::new(config, repos, Arc::new(pool.clone()))?;
    if state.config.features.rate_limit {
        state.rate_limiter.clone().start_cleanup_task();
    }
    let app = build_router(state);

    // Start server
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
