use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use paisa::api::{AppState, run_http_server};
use paisa::config::{Cli, Command, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(settings) => serve(settings).await,
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    init_tracing(settings.log_json);
    settings
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid settings")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = settings.port,
        explanations = settings.gemini_api_key.is_some(),
        "starting paisa"
    );

    let state = AppState::from_settings(&settings).context("failed to build HTTP client")?;
    run_http_server(&settings, state)
        .await
        .context("server error")
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "paisa=info,tower_http=info".into());

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
