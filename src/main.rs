use anyhow::Context;
use clap::Parser;
use irisnet::api::{start_api_server, AppState};
use irisnet::cli::{Cli, Commands};
use irisnet::config::{AppConfig, LoggingConfig};
use irisnet::error::{IrisError, Result};
use irisnet::ml::{IrisClassifier, Trainer};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)?;
    cli.command.apply_overrides(&mut config);
    init_logging(&config.logging);

    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("Invalid configuration: {}", e);
        }
        return Err(IrisError::Validation(errors.join("; ")));
    }

    let result = match &cli.command {
        Commands::Train { .. } => run_train_mode(&config).await,
        Commands::Serve { .. } => run_serve_mode(&config).await,
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

/// Train once and write the final epoch's weights.
async fn run_train_mode(config: &AppConfig) -> Result<()> {
    let trainer = Trainer::new(config.training.clone());
    let outcome = tokio::task::spawn_blocking(move || trainer.train())
        .await
        .map_err(|e| IrisError::Internal(format!("training task failed: {}", e)))??;

    outcome
        .network
        .to_file(&config.model.path)
        .with_context(|| format!("failed to write model artifact {}", config.model.path))?;
    info!("Model written to {}", config.model.path);
    Ok(())
}

/// Load the artifact once and serve predictions until Ctrl+C / SIGTERM.
async fn run_serve_mode(config: &AppConfig) -> Result<()> {
    let classifier = IrisClassifier::load(&config.model.path)?;
    info!(
        "Loaded model {} ({} layers)",
        config.model.path,
        classifier.network().layers.len()
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| IrisError::Validation(format!("invalid listen address: {}", e)))?;

    start_api_server(AppState::new(classifier), addr, shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},irisnet=debug", logging.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
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
