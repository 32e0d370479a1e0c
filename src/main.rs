use pressplay_backend::api::AppState;
use pressplay_backend::build_router;
use pressplay_backend::config::Config;
use pressplay_backend::services::{SupabaseClient, TokenVerifier};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config before tracing: the optional file layer needs the log path
    let config = Config::from_env()?;

    let file_layer = match &config.download_log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pressplay_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    tracing::info!("Configuration loaded");

    let supabase = SupabaseClient::new(&config);
    let verifier = TokenVerifier::new(&config);

    let state = Arc::new(AppState {
        config: config.clone(),
        supabase,
        verifier,
    });

    let app = build_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
