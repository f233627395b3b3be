//! irisnet CLI
//!
//! Commands:
//! - `irisnet train` - Train the classifier and write the model artifact
//! - `irisnet serve` - Serve predictions from a trained artifact

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Iris classifier trainer and prediction server
#[derive(Parser, Debug)]
#[command(name = "irisnet")]
#[command(author, version, about = "Iris flower classifier: trainer and prediction API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml plus $IRISNET_ENV overlay)
    #[arg(short, long, global = true, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train on the bundled Iris dataset and write the model artifact
    Train {
        /// Artifact output path
        #[arg(short, long)]
        output: Option<String>,
        /// Number of training epochs
        #[arg(short, long)]
        epochs: Option<usize>,
        /// Adam learning rate
        #[arg(long)]
        lr: Option<f64>,
        /// Seed for weight init and train/test shuffle
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Serve POST /predict-iris from a trained artifact
    Serve {
        /// Artifact to load
        #[arg(short, long)]
        model: Option<String>,
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Commands {
    /// Fold command-line flags over the loaded configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        match self {
            Commands::Train {
                output,
                epochs,
                lr,
                seed,
            } => {
                if let Some(path) = output {
                    config.model.path = path.clone();
                }
                if let Some(epochs) = epochs {
                    config.training.epochs = *epochs;
                }
                if let Some(lr) = lr {
                    config.training.learning_rate = *lr;
                }
                if let Some(seed) = seed {
                    config.training.seed = *seed;
                }
            }
            Commands::Serve { model, host, port } => {
                if let Some(path) = model {
                    config.model.path = path.clone();
                }
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_flags_override_config() {
        let cli = Cli::parse_from([
            "irisnet", "train", "--epochs", "250", "--lr", "0.01", "--seed", "9", "-o", "out.json",
        ]);
        let mut config = AppConfig::default();
        cli.command.apply_overrides(&mut config);

        assert_eq!(config.training.epochs, 250);
        assert!((config.training.learning_rate - 0.01).abs() < 1e-12);
        assert_eq!(config.training.seed, 9);
        assert_eq!(config.model.path, "out.json");
    }

    #[test]
    fn serve_keeps_defaults_without_flags() {
        let cli = Cli::parse_from(["irisnet", "serve"]);
        assert_eq!(cli.config, "config");

        let mut config = AppConfig::default();
        cli.command.apply_overrides(&mut config);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.model.path, "model.json");
    }

    #[test]
    fn serve_port_and_model_flags() {
        let cli = Cli::parse_from(["irisnet", "serve", "-p", "9000", "--model", "m.json"]);
        let mut config = AppConfig::default();
        cli.command.apply_overrides(&mut config);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.model.path, "m.json");
    }
}
