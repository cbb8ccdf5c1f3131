use anyhow::Context;
use clap::Parser;
use marks_recorder::core::ConfigProvider;
use marks_recorder::utils::{logger, validation::Validate};
use marks_recorder::{AppState, CliConfig, Settings};
use tokio::net::TcpListener;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let settings = Settings::resolve(&cli).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load config file '{}'", path),
        None => "Failed to resolve settings".to_string(),
    })?;

    // 初始化日誌
    if settings.json_logs() {
        logger::init_json_logger(settings.log_level());
    } else {
        logger::init_cli_logger(settings.log_level());
    }

    tracing::info!("Starting marks-recorder");
    tracing::debug!("Settings: {:?}", settings);

    // 驗證配置
    settings.validate().context("Configuration validation failed")?;

    if let Some(keep) = settings.keep_latest() {
        tracing::info!("Keeping the newest {} exports per format", keep);
    }

    let bind_address = settings.bind_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    let state = AppState::from_config(&settings);
    marks_recorder::serve(listener, state, shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
