//! Iris classifier: a validated 4 -> 3 dense network plus the fixed
//! output-index to label table.

use std::path::Path;

use anyhow::Context;

use crate::domain::{IrisClass, IrisFeatures};
use crate::error::{IrisError, Result};
use crate::ml::dataset::{CLASS_COUNT, FEATURE_COUNT};
use crate::ml::dense::{argmax, DenseNetwork};

#[derive(Debug, Clone)]
pub struct IrisClassifier {
    network: DenseNetwork,
}

impl IrisClassifier {
    /// Wrap a network, rejecting anything that is not 4 inputs -> 3 classes.
    pub fn new(network: DenseNetwork) -> Result<Self> {
        network.validate().map_err(IrisError::Validation)?;
        if network.input_dim != FEATURE_COUNT {
            return Err(IrisError::Model(format!(
                "expected input_dim {FEATURE_COUNT}, artifact has {}",
                network.input_dim
            )));
        }
        if network.output_dim() != CLASS_COUNT {
            return Err(IrisError::Model(format!(
                "expected {CLASS_COUNT} output classes, artifact has {}",
                network.output_dim()
            )));
        }
        Ok(Self { network })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let network = DenseNetwork::from_file(path)
            .with_context(|| format!("failed to load model artifact {}", path.display()))?;
        Self::new(network)
    }

    pub fn network(&self) -> &DenseNetwork {
        &self.network
    }

    /// Class probabilities per record, in input order.
    pub fn predict_proba(&self, records: &[IrisFeatures]) -> Result<Vec<Vec<f64>>> {
        let rows: Vec<Vec<f64>> = records.iter().map(IrisFeatures::to_vec).collect();
        self.network.forward_batch(&rows)
    }

    /// Most likely class per record, in input order.
    pub fn predict(&self, records: &[IrisFeatures]) -> Result<Vec<IrisClass>> {
        self.predict_proba(records)?
            .iter()
            .map(|probs| {
                argmax(probs).and_then(IrisClass::from_index).ok_or_else(|| {
                    IrisError::Internal(format!("no class for output {probs:?}"))
                })
            })
            .collect()
    }
}
