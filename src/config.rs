use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (default: all interfaces)
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Artifact written by `train` and read by `serve`
    #[serde(default = "default_model_path")]
    pub path: String,
}

fn default_model_path() -> String {
    "model.json".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Full-batch passes over the training split
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// Adam step size
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Width of both hidden layers
    #[serde(default = "default_hidden_dim")]
    pub hidden_dim: usize,
    /// Share of the dataset held out for evaluation (e.g., 0.2 = 20%)
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed for weight initialization and the train/test shuffle
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_epochs() -> usize {
    100
}

fn default_learning_rate() -> f64 {
    0.001
}

fn default_hidden_dim() -> usize {
    50
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    2
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            hidden_dim: default_hidden_dim(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            training: TrainingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", 8000)?
            .set_default("model.path", default_model_path())?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("IRISNET_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (IRISNET_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("IRISNET")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.training.epochs == 0 {
            errors.push("training.epochs must be positive".to_string());
        }

        if !self.training.learning_rate.is_finite() || self.training.learning_rate <= 0.0 {
            errors.push("training.learning_rate must be finite and positive".to_string());
        }

        if self.training.hidden_dim == 0 {
            errors.push("training.hidden_dim must be positive".to_string());
        }

        if self.training.test_fraction <= 0.0 || self.training.test_fraction >= 1.0 {
            errors.push("training.test_fraction must be between 0 and 1".to_string());
        }

        if self.model.path.trim().is_empty() {
            errors.push("model.path must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
