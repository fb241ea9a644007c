use recipe_library::{
    api,
    session::{
        start_cleanup_task, CleanupConfig, InMemorySessionStore, RedisSessionStore, SessionStore,
    },
    users::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository},
    AppState, AuthService, Config, TokenService,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_library=debug,api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(port = config.port, "Starting recipe library server");

    let session_store: Arc<dyn SessionStore + Send + Sync> = match &config.redis_url {
        Some(url) => {
            let store = RedisSessionStore::connect(url).await?;
            info!("Connected to Redis session store");
            Arc::new(store)
        }
        None => {
            warn!("REDIS_URL not set, sessions are kept in memory and lost on restart");
            let store = Arc::new(InMemorySessionStore::new());
            tokio::spawn(start_cleanup_task(store.clone(), CleanupConfig::default()));
            store
        }
    };

    let user_repository: Arc<dyn UserRepository + Send + Sync> = match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url).await?;
            info!("Connected to PostgreSQL");
            Arc::new(PostgresUserRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, user accounts are kept in memory");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let tokens = TokenService::new(config.access_secret.clone(), config.refresh_secret.clone())
        .with_lifetimes(config.access_token_lifetime, config.refresh_token_lifetime);
    let auth_service = Arc::new(AuthService::new(
        tokens,
        session_store,
        config.store_timeout,
    ));

    let app_state = AppState::new(auth_service, user_repository);
    let app = api::build_router(app_state);

    for endpoint in api::registered_endpoints() {
        info!(endpoint = %endpoint, "Registered endpoint");
    }

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
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
