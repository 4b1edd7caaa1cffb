use std::sync::Arc;

use pixkit::models::{AppConfig, Environment};
use pixkit::services::cleanup::sweep;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(environment: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pixkit=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match environment {
        Environment::Production => registry
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new("pixkit".into(), std::io::stdout))
            .init(),
        Environment::Development => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.environment);

    let state = pixkit::build_state(config, None).await?;
    sweep(state.storage.as_ref()).await;

    let listener = TcpListener::bind(&state.config.bind_addr).await?;
    info!("Server starting at http://{}", listener.local_addr()?);

    let app = pixkit::router(Arc::clone(&state));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweep(state.storage.as_ref()).await;
    Ok(())
}
