//! Dense neural network inference (CPU-only).
//!
//! Small MLPs are stored as JSON artifacts carrying:
//! - the training-time z-score statistics, applied to every input row
//! - ordered layers with per-layer activation (softmax for class heads)
//! - free-form metadata (class labels, training summary)
//!
//! Shapes are validated on load so a bad artifact fails at startup,
//! not on the first request.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{IrisError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear,
    Relu,
    Tanh,
    Sigmoid,
    Softmax,
}

impl Default for Activation {
    fn default() -> Self {
        Self::Linear
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Weights shape: [out_dim][in_dim]
    pub weights: Vec<Vec<f64>>,
    /// Bias shape: [out_dim]
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    pub fn in_dim(&self) -> usize {
        self.weights.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn out_dim(&self) -> usize {
        self.weights.len()
    }

    /// Affine transform `W·x + b`, before activation.
    pub fn pre_activation(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(x).fold(*b, |acc, (w, v)| acc + w * v))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseNetwork {
    /// Expected input dimension.
    pub input_dim: usize,

    /// Optional z-score normalization.
    #[serde(default)]
    pub input_mean: Option<Vec<f64>>,
    #[serde(default)]
    pub input_std: Option<Vec<f64>>,

    pub layers: Vec<DenseLayer>,

    /// Optional free-form metadata (class labels, training info, etc).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl DenseNetwork {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let model: Self = serde_json::from_str(&content)?;
        model.validate().map_err(IrisError::Validation)?;
        Ok(model)
    }

    /// Write the artifact as pretty-printed JSON, creating parent dirs.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate().map_err(IrisError::Validation)?;
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.input_dim == 0 {
            return Err("input_dim must be > 0".to_string());
        }
        if self.layers.is_empty() {
            return Err("layers must not be empty".to_string());
        }
        if let (Some(mean), Some(std)) = (&self.input_mean, &self.input_std) {
            if mean.len() != self.input_dim {
                return Err(format!(
                    "input_mean length {} != input_dim {}",
                    mean.len(),
                    self.input_dim
                ));
            }
            if std.len() != self.input_dim {
                return Err(format!(
                    "input_std length {} != input_dim {}",
                    std.len(),
                    self.input_dim
                ));
            }
            if mean.iter().any(|v| !v.is_finite()) {
                return Err("input_mean must be finite".to_string());
            }
            if std.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err("input_std must be finite and > 0".to_string());
            }
        } else if self.input_mean.is_some() || self.input_std.is_some() {
            return Err("input_mean and input_std must be provided together".to_string());
        }

        let mut expected_in = self.input_dim;
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.out_dim() == 0 {
                return Err(format!("layer[{idx}] out_dim must be > 0"));
            }
            if layer.bias.len() != layer.out_dim() {
                return Err(format!(
                    "layer[{idx}] bias len {} != out_dim {}",
                    layer.bias.len(),
                    layer.out_dim()
                ));
            }
            for (r, row) in layer.weights.iter().enumerate() {
                if row.len() != expected_in {
                    return Err(format!(
                        "layer[{idx}] weights row {r} len {} != expected in_dim {expected_in}",
                        row.len()
                    ));
                }
                if row.iter().any(|v| !v.is_finite()) {
                    return Err(format!("layer[{idx}] weights contain non-finite values"));
                }
            }
            if layer.bias.iter().any(|v| !v.is_finite()) {
                return Err(format!("layer[{idx}] bias contain non-finite values"));
            }
            expected_in = layer.out_dim();
        }
        Ok(())
    }

    pub fn output_dim(&self) -> usize {
        self.layers.last().map(|l| l.out_dim()).unwrap_or(0)
    }

    /// Apply the stored z-score statistics (identity when absent).
    pub fn normalize(&self, input: &[f64]) -> Vec<f64> {
        match (&self.input_mean, &self.input_std) {
            (Some(mean), Some(std)) => input
                .iter()
                .zip(mean.iter().zip(std))
                .map(|(x, (m, s))| (x - m) / s.max(1e-12))
                .collect(),
            _ => input.to_vec(),
        }
    }

    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_dim {
            return Err(IrisError::Validation(format!(
                "DenseNetwork input dim mismatch: got {}, expected {}",
                input.len(),
                self.input_dim
            )));
        }

        let mut x = self.normalize(input);
        for layer in &self.layers {
            let mut y = layer.pre_activation(&x);
            apply_activation(&mut y, layer.activation);
            x = y;
        }

        Ok(x)
    }

    /// Run `forward` over each row, keeping row order.
    pub fn forward_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.forward(row)).collect()
    }
}

/// Index of the largest value; the first one wins ties.
/// `None` for an empty slice or when any value is NaN.
pub fn argmax(values: &[f64]) -> Option<usize> {
    if values.iter().any(|v| v.is_nan()) {
        return None;
    }
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

pub(crate) fn apply_activation(values: &mut [f64], act: Activation) {
    match act {
        Activation::Linear => {}
        Activation::Relu => values.iter_mut().for_each(|v| *v = v.max(0.0)),
        Activation::Tanh => values.iter_mut().for_each(|v| *v = v.tanh()),
        Activation::Sigmoid => values.iter_mut().for_each(|v| *v = sigmoid(*v)),
        Activation::Softmax => softmax_in_place(values),
    }
}

fn sigmoid(x: f64) -> f64 {
    // Numerically-stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

fn softmax_in_place(values: &mut [f64]) {
    // Shift by the max so exp() cannot overflow.
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    if sum > 0.0 {
        values.iter_mut().for_each(|v| *v /= sum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_class_net() -> DenseNetwork {
        DenseNetwork {
            input_dim: 2,
            input_mean: Some(vec![1.0, 1.0]),
            input_std: Some(vec![2.0, 2.0]),
            layers: vec![DenseLayer {
                weights: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                bias: vec![0.0, 0.0],
                activation: Activation::Softmax,
            }],
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn elementwise_activations() {
        let mut values = vec![-2.0, 0.0, 3.0];
        apply_activation(&mut values, Activation::Relu);
        assert_eq!(values, vec![0.0, 0.0, 3.0]);

        let mut values = vec![-800.0, 0.0, 800.0];
        apply_activation(&mut values, Activation::Sigmoid);
        assert_eq!(values[0], 0.0);
        assert!((values[1] - 0.5).abs() < 1e-12);
        assert_eq!(values[2], 1.0);
    }

    #[test]
    fn softmax_output_is_a_distribution() {
        let net = two_class_net();
        net.validate().unwrap();

        let out = net.forward(&[5.0, 1.0]).unwrap();
        assert_eq!(out.len(), 2);
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(out[0] > out[1]);
        assert_eq!(argmax(&out), Some(0));
    }

    #[test]
    fn softmax_survives_large_logits() {
        let mut logits = vec![1000.0, 999.0, -1000.0];
        apply_activation(&mut logits, Activation::Softmax);
        assert!(logits.iter().all(|v| v.is_finite()));
        assert!((logits.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_uses_stored_statistics() {
        let net = two_class_net();
        assert_eq!(net.normalize(&[3.0, -1.0]), vec![1.0, -1.0]);
    }

    #[test]
    fn forward_rejects_wrong_input_dim() {
        let net = two_class_net();
        assert!(matches!(
            net.forward(&[1.0, 2.0, 3.0]),
            Err(IrisError::Validation(_))
        ));
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn argmax_refuses_nan() {
        assert_eq!(argmax(&[0.1, f64::NAN, 0.2]), None);
        assert_eq!(argmax(&[f64::NAN, f64::NAN]), None);
    }

    #[test]
    fn overflowing_input_yields_no_class() {
        let mut net = two_class_net();
        net.layers[0].weights = vec![vec![4.0, 0.0], vec![-4.0, 0.0]];
        // 4 * (1e308 - 1) / 2 overflows, so the logits are +inf and -inf.
        let out = net.forward(&[1e308, 0.0]).unwrap();
        assert!(out.iter().any(|v| v.is_nan()), "{out:?}");
        assert_eq!(argmax(&out), None);
    }

    #[test]
    fn validates_shapes() {
        let bad = DenseNetwork {
            input_dim: 3,
            input_mean: None,
            input_std: None,
            layers: vec![DenseLayer {
                weights: vec![vec![1.0, 2.0]], // in_dim mismatch
                bias: vec![0.0],
                activation: Activation::Linear,
            }],
            metadata: serde_json::json!({}),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn validates_standardization_pairing() {
        let mut net = two_class_net();
        net.input_std = None;
        assert!(net.validate().is_err());

        let mut net = two_class_net();
        net.input_std = Some(vec![1.0, 0.0]);
        assert!(net.validate().is_err());
    }

    #[test]
    fn file_roundtrip_preserves_outputs() {
        let net = two_class_net();
        let path = std::env::temp_dir()
            .join(format!("irisnet-dense-{}", std::process::id()))
            .join("model.json");

        net.to_file(&path).unwrap();
        let loaded = DenseNetwork::from_file(&path).unwrap();
        assert_eq!(loaded, net);
        assert_eq!(
            loaded.forward(&[2.0, 0.5]).unwrap(),
            net.forward(&[2.0, 0.5]).unwrap()
        );

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
