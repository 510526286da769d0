use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hearth_api::background;
use hearth_api::config::ServerConfig;
use hearth_api::notifications::NotificationRouter;
use hearth_api::router::build_app_router;
use hearth_api::state::AppState;
use hearth_events::{PushSender, WebPushSender};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearth_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = hearth_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    hearth_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    hearth_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // --- Web Push ---
    let push: Option<Arc<dyn PushSender>> = match &config.vapid {
        Some(vapid) => match WebPushSender::new(vapid) {
            Ok(sender) => {
                tracing::info!("Web Push enabled");
                Some(Arc::new(sender))
            }
            Err(e) => {
                tracing::error!(error = %e, "Invalid VAPID configuration, Web Push disabled");
                None
            }
        },
        None => {
            tracing::info!("VAPID keys not configured, Web Push disabled");
            None
        }
    };

    // --- Event bus ---
    let event_bus = Arc::new(hearth_events::EventBus::default());

    let notification_router = NotificationRouter::new(pool.clone(), push);
    let router_handle = tokio::spawn(notification_router.run(event_bus.subscribe()));

    // --- Background jobs ---
    let jobs_cancel = CancellationToken::new();

    let reminders_handle = tokio::spawn(background::receivable_reminders::run(
        pool.clone(),
        Arc::clone(&event_bus),
        Duration::from_secs(config.receivable_check_interval_secs),
        jobs_cancel.clone(),
    ));
    let cleanup_handle = tokio::spawn(background::session_cleanup::run(
        pool.clone(),
        jobs_cancel.clone(),
    ));

    tracing::info!(
        "Event services started (notification router, receivable reminders, session cleanup)"
    );

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
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

    jobs_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), reminders_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), cleanup_handle).await;
    tracing::info!("Background jobs stopped");

    // Dropping the last sender closes the channel and stops the router.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), router_handle).await;
    tracing::info!("Notification router shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
