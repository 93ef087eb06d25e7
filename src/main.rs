use bookmarks_api::{auth::TokenConfig, build_router, AppConfig, AppError, AppState, Database};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookmarks_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Bookmarks API exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    info!("Starting bookmarks API");

    let config = AppConfig::from_env()?;

    let database = Database::connect(&config.database_url, config.database_max_connections).await?;
    database.migrate().await?;

    let token_config = TokenConfig::new(&config.jwt_secret, config.token_expiration_minutes);
    let app_state = AppState::with_database(&database, token_config);
    let app = build_router(app_state, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| {
            error!(error = %e, bind_addr = %config.bind_addr, "Failed to bind listener");
            AppError::Internal
        })?;
    info!("Server running on http://{}", config.bind_addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Release the pool whether or not the server stopped cleanly
    database.close().await;

    served.map_err(|e| {
        error!(error = %e, "Server error");
        AppError::Internal
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, draining connections");
}
