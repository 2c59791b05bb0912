use canopy::config::AppConfig;
use canopy::http::{router, AppState};
use canopy::lifecycle::{setup_tracing, Platform};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    // .env is optional
    dotenvy::dotenv().ok();
    setup_tracing();

    let config = AppConfig::from_env().map_err(|e| e.to_string())?;
    let platform = Platform::start(&config).map_err(|e| e.to_string())?;

    let state = AppState::new(platform.services.clone(), &config.admin_key);
    let app = router(state, config.max_body_bytes);
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {e}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
        })
        .await;
    if let Err(e) = served {
        error!(error = %e, "Server error");
    }

    // The router and its state are gone once serve returns.
    platform.shutdown().await?;
    info!("Bye");
    Ok(())
}
