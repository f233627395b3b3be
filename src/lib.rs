pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ml;

pub use config::AppConfig;
pub use domain::{IrisClass, IrisFeatures};
pub use error::{IrisError, Result};
pub use ml::{DenseNetwork, IrisClassifier, Trainer};
