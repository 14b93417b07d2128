//! ShipTrack server — logistics tracking with live shipment updates.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use shiptrack_core::config::AppConfig;
use shiptrack_core::error::AppError;
use shiptrack_service::events::UpdatePublisher;

#[tokio::main]
async fn main() {
    let env = std::env::var("SHIPTRACK_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ShipTrack v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db_pool = shiptrack_database::connection::create_pool(&config.database).await?;

    shiptrack_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let user_repo = Arc::new(
        shiptrack_database::repositories::user::UserRepository::new(db_pool.clone()),
    );
    let shipment_repo = Arc::new(
        shiptrack_database::repositories::shipment::ShipmentRepository::new(db_pool.clone()),
    );

    // ── Step 3: Auth components ──────────────────────────────────
    let password_hasher = Arc::new(shiptrack_auth::password::hasher::PasswordHasher::new());
    let jwt_encoder = Arc::new(shiptrack_auth::jwt::encoder::JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(shiptrack_auth::jwt::decoder::JwtDecoder::new(&config.auth));

    // ── Step 4: Carrier client ───────────────────────────────────
    let carrier = Arc::new(shiptrack_carrier::client::CarrierClient::new(
        &config.carrier,
    )?);

    // ── Step 5: Realtime engine ──────────────────────────────────
    tracing::info!("Initializing realtime engine...");
    let authenticator = shiptrack_realtime::connection::authenticator::ConnectionAuthenticator::new(
        Arc::clone(&jwt_decoder),
    );
    let realtime_engine = Arc::new(shiptrack_realtime::server::RealtimeEngine::new(
        config.realtime.clone(),
        authenticator,
    ));

    let publisher: Arc<dyn UpdatePublisher> = Arc::new(
        shiptrack_realtime::broadcast::broadcaster::UpdateBroadcaster::new(
            realtime_engine.manager(),
        ),
    );

    // ── Step 6: Services ─────────────────────────────────────────
    let account_service = Arc::new(shiptrack_service::account::service::AccountService::new(
        Arc::clone(&user_repo),
        Arc::clone(&password_hasher),
        Arc::clone(&jwt_encoder),
    ));
    let shipment_service = Arc::new(shiptrack_service::shipment::service::ShipmentService::new(
        Arc::clone(&shipment_repo),
        Arc::clone(&carrier),
        Arc::clone(&publisher),
    ));
    let tracking_service = Arc::new(shiptrack_service::tracking::service::TrackingService::new(
        Arc::clone(&shipment_repo),
        Arc::clone(&carrier),
        Arc::clone(&publisher),
    ));
    let assistant_service = Arc::new(shiptrack_service::assistant::service::AssistantService::new(
        &config.assistant,
        Arc::clone(&shipment_repo),
    )?);

    // ── Step 7: Shutdown channel + keepalive loop ────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ping_handle = realtime_engine.spawn_ping_task(shutdown_rx.clone());

    // ── Step 8: Background refresh worker ────────────────────────
    let mut scheduler = if config.worker.enabled {
        tracing::info!("Starting background refresh worker...");
        let refresh_job = shiptrack_worker::jobs::refresh::RefreshJob::new(
            Arc::clone(&tracking_service),
            &config.worker,
        );
        let scheduler =
            shiptrack_worker::scheduler::RefreshScheduler::new(&config.worker, refresh_job).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background refresh worker disabled");
        None
    };

    // ── Step 9: Build and start HTTP server ──────────────────────
    let app_state = shiptrack_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
        jwt_decoder: Arc::clone(&jwt_decoder),
        realtime: Arc::clone(&realtime_engine),
        account_service,
        shipment_service,
        tracking_service,
        assistant_service,
    };

    let app = shiptrack_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("ShipTrack server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 10: Stop background tasks ───────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    realtime_engine.shutdown();
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), ping_handle).await;

    tracing::info!("ShipTrack server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
