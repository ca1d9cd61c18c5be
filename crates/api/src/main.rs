use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scope3_api::config::ServerConfig;
use scope3_api::router::build_app_router;
use scope3_api::{background, notifications, state, statements};

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scope3_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = scope3_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    scope3_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    scope3_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(scope3_events::EventBus::default());
    tracing::info!("Event bus created");

    // Spawn notification router (routes events to domains, optionally by email).
    let mailer = match scope3_events::EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(host = %email_config.smtp_host, "Email delivery enabled");
            Some(scope3_events::EmailDelivery::new(email_config))
        }
        None => {
            tracing::info!("SMTP_HOST not set, email delivery disabled");
            None
        }
    };
    let notification_router = notifications::NotificationRouter::new(pool.clone(), mailer);
    let router_handle = tokio::spawn(notification_router.run(event_bus.subscribe()));

    // --- Statement renderer ---
    let renderer = statements::renderer_from_env();

    // --- Background tasks ---
    let sweep_cancel = tokio_util::sync::CancellationToken::new();

    let expire_handle = tokio::spawn(background::expiration::run_expire_loop(
        pool.clone(),
        Arc::clone(&event_bus),
        config.ledger.clone(),
        sweep_cancel.clone(),
    ));
    let warn_handle = tokio::spawn(background::expiration::run_warn_loop(
        pool.clone(),
        Arc::clone(&event_bus),
        config.ledger.clone(),
        sweep_cancel.clone(),
    ));
    let retry_handle = tokio::spawn(background::statement_retry::run(
        pool.clone(),
        Arc::clone(&renderer),
        config.ledger.statement_retry_interval_secs,
        sweep_cancel.clone(),
    ));

    tracing::info!("Background tasks started (expire sweep, warn sweep, statement retry)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        statements: renderer,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop background sweeps.
    sweep_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), expire_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), warn_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), retry_handle).await;
    tracing::info!("Background tasks stopped");

    // Drop the event bus sender to close the broadcast channel.
    // This signals the notification router to shut down.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), router_handle).await;
    tracing::info!("Notification router shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
