use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod error;
mod handler;
mod policy;
mod protocol;
mod secrets;
mod server;

use cli::args::{Cli, Commands, SourceArgs};
use config::{GatewayConfig, Verbosity};
use error::IdpError;
use handler::AuthDecisionHandler;
use protocol::{AuthRequest, AuthResponse};
use secrets::{FileResolver, SecretResolver, SecretsManagerResolver};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Convert CLI flags to verbosity level
    let verbosity = Verbosity::from((cli.quiet, cli.verbose));

    // Set up tracing with verbosity-based filter
    // RUST_LOG env var overrides CLI flags
    let filter = verbosity.as_tracing_filter();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr) // Keep stdout clean for the response JSON
        .init();

    tracing::debug!("Verbosity level: {:?}", verbosity);

    if let Err(err) = run(cli).await {
        display_error(&err);
        std::process::exit(1);
    }
}

/// Execute the dispatched command.
async fn run(cli: Cli) -> Result<(), IdpError> {
    match cli.command {
        Commands::Invoke(args) => {
            let handler = build_handler(&args.source).await?;
            let event = read_event(args.event.as_deref()).await?;

            let response = match AuthRequest::from_slice(&event) {
                Ok(request) => handler.authenticate(&request).await,
                Err(err) => {
                    tracing::warn!("{} - Denying", err);
                    AuthResponse::deny()
                }
            };
            tracing::debug!(denied = response.is_deny(), "Invocation complete");
            println!("{}", response.to_json());
            Ok(())
        }
        Commands::Serve(args) => {
            let handler = build_handler(&args.source).await?;
            server::serve(handler, args.bind).await
        }
    }
}

/// Load the gateway config and pick the secret store.
async fn build_handler(source: &SourceArgs) -> Result<AuthDecisionHandler, IdpError> {
    let config = config::load(source.config.as_deref())?;
    let resolver = build_resolver(source, &config).await?;
    tracing::debug!(resolver = resolver.name(), "Secret resolver ready");
    Ok(AuthDecisionHandler::new(Arc::new(config), resolver))
}

async fn build_resolver(
    source: &SourceArgs,
    config: &GatewayConfig,
) -> Result<Arc<dyn SecretResolver>, IdpError> {
    match &source.secrets_file {
        Some(path) => Ok(Arc::new(FileResolver::load(path)?)),
        None => {
            let region = config.secrets_region()?;
            Ok(Arc::new(SecretsManagerResolver::connect(region).await))
        }
    }
}

/// Read the raw event from a file, or stdin for `None` / `-`.
async fn read_event(path: Option<&Path>) -> Result<Vec<u8>, IdpError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(tokio::fs::read(path).await?),
        _ => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            Ok(buf)
        }
    }
}

/// Display an IdpError with optional suggestion hint to stderr.
fn display_error(err: &IdpError) {
    eprintln!("error: {}", err);
    if let Some(suggestion) = err.suggestion() {
        eprintln!("  hint: {}", suggestion);
    }
}
