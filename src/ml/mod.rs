//! Iris classifier: bundled dataset, dense network artifact, trainer.
//!
//! Inference is plain CPU math over a small JSON artifact, no tensor
//! runtime required.

pub mod classifier;
pub mod dataset;
pub mod dense;
pub mod trainer;

pub use classifier::IrisClassifier;
pub use dataset::{iris_dataset, train_test_split, Sample, Standardizer};
pub use dense::{argmax, Activation, DenseLayer, DenseNetwork};
pub use trainer::{EpochReport, Trainer, TrainingOutcome};
