use parley_config::{Config, PortFileInfo};
use parley_server::{AppState, ServerError, Services, build_router, logger, spawn_sweeper};

use std::path::PathBuf;
use std::time::Duration;

use log::{error, info, warn};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // .env is optional; real environment variables win
    let _ = dotenvy::dotenv();

    // Load and validate configuration
    let config = Config::load()?;
    config.validate()?;

    // Construct log file path if configured
    let log_file_path: Option<PathBuf> = if let Some(ref filename) = config.logging.file {
        let log_dir = Config::config_dir()?.join(&config.logging.dir);
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| ServerError::io(format!("creating {}", log_dir.display()), e))?;
        Some(log_dir.join(filename))
    } else {
        None
    };

    // Initialize logger (before any other logging)
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting parley-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics {
            message: e.to_string(),
        })?;

    let mut services = Services::from_config(&config)?;
    services.prometheus = Some(prometheus);

    let app_state = AppState::new(&config, services)?;
    let shutdown = app_state.shutdown.clone();

    let sweeper = spawn_sweeper(
        app_state.otp.clone(),
        app_state.sessions.clone(),
        Duration::from_secs(config.auth.cleanup_interval_secs),
        shutdown.subscribe_guard(),
    );

    let app = build_router(app_state);

    // Create TCP listener
    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| ServerError::io(format!("binding {bind_addr}"), e))?;

    // Get actual bound address (important when port is 0 / auto-assigned)
    let actual_addr = listener
        .local_addr()
        .map_err(|e| ServerError::io("reading bound address", e))?;
    info!("Server listening on {}", actual_addr);

    // Write port discovery file for CLI auto-discovery
    match PortFileInfo::write(actual_addr.port(), &config.server.host) {
        Ok(path) => info!("Port file written: {}", path.display()),
        Err(e) => warn!(
            "Failed to write port file (CLI auto-discovery may not work): {}",
            e
        ),
    }

    // Spawn signal handler for graceful shutdown
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                shutdown_for_signal.shutdown();
            }
            Err(e) => {
                error!("Failed to listen for SIGINT: {}", e);
            }
        }
    });

    // Start server with graceful shutdown
    info!("Server ready to accept connections");
    let mut guard = shutdown.subscribe_guard();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            guard.wait().await;
            info!("Graceful shutdown complete");
        })
        .await
        .map_err(|e| ServerError::io("serving", e))?;

    if let Err(e) = sweeper.await {
        warn!("Sweeper task ended abnormally: {}", e);
    }

    // Clean up port discovery file
    if let Err(e) = PortFileInfo::remove() {
        warn!("Failed to remove port file: {}", e);
    }

    Ok(())
}
