//! `tigersafe-api` -- notification trigger server.
//!
//! # Environment variables
//!
//! | Variable                         | Required | Description                                  |
//! |----------------------------------|----------|----------------------------------------------|
//! | `DATABASE_URL`                   | yes      | Postgres holding `users` and `announcements` |
//! | `FCM_PROJECT_ID`                 | no       | Enables FCM delivery                         |
//! | `GOOGLE_APPLICATION_CREDENTIALS` | no       | Service account key for FCM tokens           |
//! | `LOG_FORMAT`                     | no       | `json` for JSON log lines                    |
//!
//! See [`ServerConfig::from_env`] for the HTTP settings.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use tigersafe_api::config::ServerConfig;
use tigersafe_api::router::build_app_router;
use tigersafe_api::state::AppState;
use tigersafe_api::telemetry;
use tigersafe_events::{
    AnnouncementListener, DeliveryProvider, FcmConfig, FcmDelivery, LogDelivery,
    NotificationService, PgDirectory,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    telemetry::init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = tigersafe_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    tigersafe_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    tigersafe_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Push delivery ---
    let provider: Arc<dyn DeliveryProvider> = match FcmConfig::from_env() {
        Some(fcm) => {
            tracing::info!(project_id = %fcm.project_id, "FCM push delivery enabled");
            Arc::new(
                FcmDelivery::with_default_credentials(fcm)
                    .await
                    .expect("Failed to set up FCM delivery"),
            )
        }
        None => {
            tracing::warn!("FCM_PROJECT_ID not set, using dry-run delivery");
            Arc::new(LogDelivery)
        }
    };

    // --- Notification service ---
    let directory = Arc::new(PgDirectory::new(pool.clone()));
    let notifier = Arc::new(NotificationService::new(directory, provider));

    // Spawn the announcement listener (data-creation trigger).
    let listener_cancel = CancellationToken::new();
    let listener = AnnouncementListener::connect(pool.clone(), Arc::clone(&notifier))
        .await
        .expect("Failed to subscribe to announcement notifications");
    let listener_handle = tokio::spawn(listener.run(listener_cancel.clone()));
    tracing::info!("Announcement listener spawned");

    // --- App state ---
    let background = TaskTracker::new();
    let state = AppState {
        config: Arc::new(config.clone()),
        notifier,
        background: background.clone(),
    };

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

    listener_cancel.cancel();
    background.close();

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    let drained = tokio::time::timeout(drain, async {
        let (listener_result, ()) = tokio::join!(listener_handle, background.wait());
        listener_result
    })
    .await;

    match drained {
        Ok(Ok(())) => tracing::info!("Background broadcasts drained"),
        Ok(Err(e)) => tracing::error!(error = %e, "Announcement listener task panicked"),
        Err(_) => tracing::warn!(
            pending = background.len(),
            "Background broadcasts did not drain in time"
        ),
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
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
