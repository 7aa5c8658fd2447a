use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use votelens_app::{build_router, AppState};
use votelens_common::observability::{init_logging, LogConfig};
use votelens_common::AnalysisRequest;
use votelens_config::VotelensConfigLoader;
use votelens_dashboard::{Aggregator, HttpFacetSource};

#[derive(Debug, Parser)]
#[command(name = "votelens", version, about = "Election analytics API")]
struct Cli {
    /// YAML configuration file; skipped when missing.
    #[arg(long, short, env = "VOTELENS_CONFIG", default_value = "votelens.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Overrides `server.bind`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Fetch every facet from a running server and print the merged view.
    Dashboard {
        #[arg(long)]
        query: String,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        time_range: Option<String>,
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        base_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli { config, command } = Cli::parse();
    match command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(&config, bind).await,
        Command::Dashboard {
            query,
            region,
            time_range,
            base_url,
        } => {
            let mut request = AnalysisRequest::for_query(query);
            request.region = region;
            request.time_range = time_range;
            dashboard(request, &base_url).await
        }
    }
}

async fn serve(config_path: &Path, bind: Option<String>) -> Result<()> {
    let cfg = VotelensConfigLoader::new()
        .with_optional_file(config_path)
        .load()
        .context("failed to load configuration")?;
    let log_path = init_logging(LogConfig::default())?;

    let state = AppState::from_config(&cfg).await?;
    let router = build_router(state, &cfg.server);

    let addr = bind.unwrap_or_else(|| cfg.server.bind.clone());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        addr = %addr,
        environment = %cfg.server.environment,
        log = %log_path.display(),
        "server.listening"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("server.shutdown.requested");
                    shutdown.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "server.signal.unavailable"),
            }
        }
    });

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    tracing::info!("server.stopped");
    Ok(())
}

async fn dashboard(request: AnalysisRequest, base_url: &str) -> Result<()> {
    init_logging(LogConfig {
        app_name: "votelens-dashboard",
        emit_stderr: false,
        ..LogConfig::default()
    })?;

    let source = HttpFacetSource::new(base_url)?;
    let state = Aggregator::new(Arc::new(source)).fetch_all(&request).await;
    println!("{}", serde_json::to_string_pretty(&state)?);
    if state.error_count > 0 {
        eprintln!("{} facet(s) failed:", state.error_count);
        for (facet, error) in &state.errors {
            eprintln!("  {facet}: {error}");
        }
    }
    Ok(())
}
