use anyhow::{Context, Result, bail};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use skill_hub::config::Config;
use skill_hub::session::Hub;
use skill_hub::{repl, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the terminal chat keeps stdout to itself
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    if config.llm.api_key.is_empty() {
        bail!("GEMINI_API_KEY not found in environment or .env file");
    }

    let hub = Hub::from_config(&config)?;
    tracing::info!("main: {} ready on {} transport", config.server.name, config.server.transport);

    match config.server.transport.as_str() {
        "http" => {
            let bind: SocketAddr = config
                .server
                .http_bind
                .parse()
                .with_context(|| format!("Invalid http_bind '{}' (expected host:port)", config.server.http_bind))?;
            server::serve(
                hub,
                bind,
                config.server.bearer_token.clone(),
                Duration::from_secs(config.server.session_idle_secs),
            )
            .await
        }
        _ => {
            repl::run(&hub).await?;
            eprintln!("Goodbye");
            Ok(())
        }
    }
}
