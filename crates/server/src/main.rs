use anyhow::Context;
use img2txt_core::Config;
use img2txt_server::{create_app, AppState};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os("IMG2TXT_CONFIG").map(std::path::PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new("img2txt-server".into(), std::io::stdout))
        .init();

    let state = AppState::from_config(&config);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Web UI listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
