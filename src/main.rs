//! crypto-oracle: HTTP service that turns web-search and CryptoPanic news
//! sentiment into a market regime and default trading guidance.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use crypto_oracle::{config, create_app, AppState, Oracle};

/// Crypto sentiment oracle
#[derive(Parser)]
#[command(name = "crypto-oracle", about = "Crypto news sentiment oracle")]
struct Cli {
    /// Load and validate configuration, print it with secrets masked, then exit.
    #[arg(long)]
    check_config: bool,

    /// Run a single oracle pass, print the snapshot JSON, then exit.
    #[arg(long)]
    once: bool,

    /// Lookback window for `--once` (defaults to DEFAULT_WINDOW).
    #[arg(long, requires = "once")]
    window: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "crypto_oracle=info,llm_client=info,cryptopanic_client=info,tower_http=info".into()
    });

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_json = cli.log_json
        || std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
    init_tracing(log_json);

    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.check_config {
        let rendered = serde_json::to_string_pretty(&cfg.redacted())
            .context("failed to render config")?;
        println!("{rendered}");
        return Ok(());
    }

    info!(
        "Model: {}, default window: {}, domains: {:?}",
        cfg.openai.model, cfg.default_window, cfg.allowed_domains
    );
    info!(
        "CryptoPanic: {} (kind={}, filter={}, window={}m)",
        if cfg.cryptopanic.enabled() { "enabled" } else { "disabled" },
        cfg.cryptopanic.kind,
        cfg.cryptopanic.filter,
        cfg.cryptopanic.window_minutes,
    );

    let cfg = Arc::new(cfg);
    let oracle = Oracle::from_config(Arc::clone(&cfg));

    if cli.once {
        let snapshot = oracle
            .run(cli.window.as_deref())
            .await
            .context("oracle run failed")?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let addr = cfg.server.bind_addr();
    let app = create_app(AppState::new(oracle));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Oracle listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Oracle stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
