//! erudito - ask questions about your documentation with local models

use anyhow::Result;
use clap::Parser as _;
use erudito_cli::{AppState, Cli, Commands, handlers, serve};
use erudito_core::{EruditoConfig, Error};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "erudito_context=info,erudito_local=info,erudito_cli=info,erudito=info".into()
        }))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = EruditoConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest {
            documentation_path,
            model,
        } => {
            let cancel = cancel_on_ctrl_c();
            let bar = handlers::embedding_progress_bar();
            let result = handlers::ingest(
                &config,
                &documentation_path,
                model.as_deref(),
                handlers::progress_callback(bar.clone()),
                &cancel,
            )
            .await;
            bar.finish_and_clear();
            let report = result.inspect_err(|error| hint_backend(&config, error))?;
            info!(
                "🥒 Vector store saved in {} ({} of {} chunks, {})",
                report.index_dir.display(),
                report.embedded,
                report.total_chunks,
                report.status.as_str()
            );
        }
        Commands::Query {
            question,
            model,
            index,
        } => {
            let answer = handlers::query(&config, &question, model.as_deref(), index.as_deref())
                .await
                .inspect_err(|error| hint_backend(&config, error))?;
            print_output(&answer.text);
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let state = AppState {
                config: Arc::new(config),
                shutdown: cancel_on_ctrl_c(),
            };
            serve(state, &host, port).await?;
        }
        Commands::Config { full } => {
            print_output(&handlers::describe_config(&config, full)?);
        }
    }

    Ok(())
}

/// Token cancelled on the first Ctrl+C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                warn!("Received Ctrl+C, stopping after the current step...");
                trigger.cancel();
            }
            Err(error) => warn!("Failed to install Ctrl+C handler: {error}"),
        }
    });
    token
}

/// Point at the Ollama server when a failure may go away on retry
fn hint_backend(config: &EruditoConfig, error: &Error) {
    if error.is_retryable() {
        warn!(
            "Is Ollama running at {}? Start it with: ollama serve",
            config.ollama.base_url().unwrap_or_else(|_| config.ollama.host.clone())
        );
    }
}

fn print_output(text: &str) {
    // Command results go to stdout so they can be piped
    #[allow(clippy::print_stdout, reason = "Command output")]
    {
        println!("{text}");
    }
}
