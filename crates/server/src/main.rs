use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warmup_core::{
    load_config, validate_config, Config, ConfigError, ImageFetcher, JsonProfileStore,
    ProfileStore, QueueRunner, RunController, StatusStore, StockImageFetcher, WebDriverAutomation,
};

use warmup_server::{create_router, AppState};

/// How long shutdown waits for the active task to reach a checkpoint.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("WARMUP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(_)) => {
            warn!("No configuration file at {:?}, using defaults", config_path);
            Config::default()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load config from {:?}", config_path))
        }
    };

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Profiles file: {:?}", config.profiles.path);
    info!("WebDriver endpoint: {}", config.driver.webdriver_url);

    let profiles: Arc<dyn ProfileStore> = Arc::new(JsonProfileStore::new(&config.profiles.path));
    let status = Arc::new(StatusStore::new(config.runner.log_capacity));

    // Image fetcher is only needed for the image post step
    let images: Option<Arc<dyn ImageFetcher>> = match &config.images {
        Some(images_config) => {
            let fetcher = StockImageFetcher::new(images_config)
                .context("Failed to create stock image fetcher")?;
            info!("Stock image fetcher initialized");
            Some(Arc::new(fetcher))
        }
        None => {
            info!("No image providers configured, image posts will be skipped");
            None
        }
    };

    let driver = Arc::new(
        WebDriverAutomation::new(config.driver.clone(), images)
            .context("Failed to create WebDriver client")?,
    );

    let runner = Arc::new(QueueRunner::new(
        config.runner.clone(),
        driver,
        Arc::clone(&profiles),
        Arc::clone(&status),
    ));
    let controller: Arc<dyn RunController> = runner;

    let state = Arc::new(AppState::new(config.clone(), profiles, controller));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    drain_run(&status).await;

    Ok(())
}

/// Ask an active run to stop and wait, bounded, until it has.
async fn drain_run(status: &StatusStore) {
    if !status.is_running() {
        return;
    }
    status.request_stop();
    info!("Waiting for the active task to stop...");

    let waited = tokio::time::timeout(SHUTDOWN_GRACE, async {
        while status.is_running() {
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    })
    .await;

    match waited {
        Ok(()) => info!("Run stopped"),
        Err(_) => warn!(
            "Run still active after {}s, exiting anyway",
            SHUTDOWN_GRACE.as_secs()
        ),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
