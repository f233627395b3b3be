//! Full-batch trainer for the dense classifier.
//!
//! Hidden layers use the network's own activations; the head must be
//! softmax and is trained with cross-entropy, so its error term is
//! simply `p - onehot(y)`. Parameters are updated with Adam.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::TrainingConfig;
use crate::domain::IrisClass;
use crate::error::{IrisError, Result};
use crate::ml::dataset::{
    iris_dataset, train_test_split, Sample, Standardizer, CLASS_COUNT, FEATURE_COUNT,
};
use crate::ml::dense::{apply_activation, argmax, Activation, DenseLayer, DenseNetwork};

const ADAM_BETA1: f64 = 0.9;
const ADAM_BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-8;

/// Loss and holdout accuracy after one epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochReport {
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
}

/// Trained network plus its per-epoch history
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub network: DenseNetwork,
    pub history: Vec<EpochReport>,
}

impl TrainingOutcome {
    pub fn final_report(&self) -> Option<EpochReport> {
        self.history.last().copied()
    }
}

/// First and second moment estimates for one layer
#[derive(Debug, Clone)]
struct AdamMoments {
    m_w: Vec<Vec<f64>>,
    v_w: Vec<Vec<f64>>,
    m_b: Vec<f64>,
    v_b: Vec<f64>,
}

impl AdamMoments {
    fn zeros_like(layer: &DenseLayer) -> Self {
        let zeros_w = vec![vec![0.0; layer.in_dim()]; layer.out_dim()];
        Self {
            m_w: zeros_w.clone(),
            v_w: zeros_w,
            m_b: vec![0.0; layer.out_dim()],
            v_b: vec![0.0; layer.out_dim()],
        }
    }
}

/// Per-layer gradient accumulators
#[derive(Debug, Clone)]
struct Gradients {
    w: Vec<Vec<f64>>,
    b: Vec<f64>,
}

impl Gradients {
    fn zeros_like(layer: &DenseLayer) -> Self {
        Self {
            w: vec![vec![0.0; layer.in_dim()]; layer.out_dim()],
            b: vec![0.0; layer.out_dim()],
        }
    }
}

pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Train on the bundled Iris dataset.
    pub fn train(&self) -> Result<TrainingOutcome> {
        self.train_on(&iris_dataset())
    }

    /// Standardize on all of `samples`, split, then run the epoch loop.
    /// The last epoch's weights are returned regardless of accuracy.
    pub fn train_on(&self, samples: &[Sample]) -> Result<TrainingOutcome> {
        if samples.is_empty() {
            return Err(IrisError::Validation("training set is empty".to_string()));
        }
        if let Some(bad) = samples.iter().find(|s| s.label >= CLASS_COUNT) {
            return Err(IrisError::Validation(format!(
                "label {} out of range 0..{CLASS_COUNT}",
                bad.label
            )));
        }

        let rows: Vec<[f64; FEATURE_COUNT]> = samples.iter().map(|s| s.features).collect();
        let scaler = Standardizer::fit(&rows);

        let (train, test) = train_test_split(samples, self.config.test_fraction, self.config.seed);
        if train.is_empty() {
            return Err(IrisError::Validation(
                "test_fraction leaves no training rows".to_string(),
            ));
        }
        info!(
            "Training on {} rows, evaluating on {} rows ({} epochs, lr={}, seed={})",
            train.len(),
            test.len(),
            self.config.epochs,
            self.config.learning_rate,
            self.config.seed
        );

        let train_x: Vec<Vec<f64>> = train
            .iter()
            .map(|s| scaler.transform(&s.features).to_vec())
            .collect();
        let train_y: Vec<usize> = train.iter().map(|s| s.label).collect();
        let test_x: Vec<Vec<f64>> = test
            .iter()
            .map(|s| scaler.transform(&s.features).to_vec())
            .collect();
        let test_y: Vec<usize> = test.iter().map(|s| s.label).collect();

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut layers = vec![
            init_layer(&mut rng, FEATURE_COUNT, self.config.hidden_dim, Activation::Relu),
            init_layer(
                &mut rng,
                self.config.hidden_dim,
                self.config.hidden_dim,
                Activation::Relu,
            ),
            init_layer(&mut rng, self.config.hidden_dim, CLASS_COUNT, Activation::Softmax),
        ];
        check_trainable(&layers)?;
        let mut moments: Vec<AdamMoments> = layers.iter().map(AdamMoments::zeros_like).collect();

        let mut history = Vec::with_capacity(self.config.epochs);
        for epoch in 0..self.config.epochs {
            let (loss, grads) = loss_and_gradients(&layers, &train_x, &train_y);
            adam_step(
                &mut layers,
                &mut moments,
                &grads,
                self.config.learning_rate,
                epoch + 1,
            );

            let accuracy = holdout_accuracy(&layers, &test_x, &test_y);
            info!(epoch, loss, accuracy, "epoch complete");
            history.push(EpochReport {
                epoch,
                loss,
                accuracy,
            });
        }

        let last = history.last().copied();
        if let Some(report) = last {
            info!(
                "[ DONE ] Loss: {:.6} | Accuracy: {:.4}",
                report.loss, report.accuracy
            );
        }

        let network = DenseNetwork {
            input_dim: FEATURE_COUNT,
            input_mean: Some(scaler.mean.clone()),
            input_std: Some(scaler.std.clone()),
            layers,
            metadata: serde_json::json!({
                "classes": IrisClass::labels(),
                "trained_at": Utc::now().to_rfc3339(),
                "epochs": self.config.epochs,
                "learning_rate": self.config.learning_rate,
                "hidden_dim": self.config.hidden_dim,
                "seed": self.config.seed,
                "final_loss": last.map(|r| r.loss),
                "test_accuracy": last.map(|r| r.accuracy),
            }),
        };
        network.validate().map_err(IrisError::Model)?;

        Ok(TrainingOutcome { network, history })
    }
}

/// Backprop treats softmax as the cross-entropy head only: it must be
/// the last layer and appear nowhere else.
fn check_trainable(layers: &[DenseLayer]) -> Result<()> {
    let Some((head, hidden)) = layers.split_last() else {
        return Err(IrisError::Validation("network has no layers".to_string()));
    };
    if let Some(i) = hidden
        .iter()
        .position(|layer| layer.activation == Activation::Softmax)
    {
        return Err(IrisError::Validation(format!(
            "softmax is only trainable as the output layer, found at layer {i}"
        )));
    }
    if head.activation != Activation::Softmax {
        return Err(IrisError::Validation(format!(
            "output layer must be softmax, got {:?}",
            head.activation
        )));
    }
    Ok(())
}

/// Uniform `±1/sqrt(fan_in)` init for weights and biases.
fn init_layer(
    rng: &mut StdRng,
    in_dim: usize,
    out_dim: usize,
    activation: Activation,
) -> DenseLayer {
    let bound = 1.0 / (in_dim as f64).sqrt();
    let weights: Vec<Vec<f64>> = (0..out_dim)
        .map(|_| (0..in_dim).map(|_| rng.gen_range(-bound..bound)).collect())
        .collect();
    let bias: Vec<f64> = (0..out_dim).map(|_| rng.gen_range(-bound..bound)).collect();
    DenseLayer {
        weights,
        bias,
        activation,
    }
}

/// Forward pass keeping every layer's output; `outputs[0]` is the input.
fn forward_cached(layers: &[DenseLayer], input: &[f64]) -> Vec<Vec<f64>> {
    let mut outputs = Vec::with_capacity(layers.len() + 1);
    outputs.push(input.to_vec());
    for layer in layers {
        let prev = outputs.last().map(Vec::as_slice).unwrap_or(input);
        let mut y = layer.pre_activation(prev);
        apply_activation(&mut y, layer.activation);
        outputs.push(y);
    }
    outputs
}

/// Derivative of the activation expressed through its output `y`.
fn activation_derivative(y: f64, act: Activation) -> f64 {
    match act {
        Activation::Linear => 1.0,
        Activation::Relu => {
            if y > 0.0 {
                1.0
            } else {
                0.0
            }
        }
        Activation::Tanh => 1.0 - y * y,
        Activation::Sigmoid => y * (1.0 - y),
        // Head only (see check_trainable); its delta is p - y.
        Activation::Softmax => 1.0,
    }
}

/// Mean cross-entropy over the batch and its gradients.
fn loss_and_gradients(
    layers: &[DenseLayer],
    xs: &[Vec<f64>],
    ys: &[usize],
) -> (f64, Vec<Gradients>) {
    let mut grads: Vec<Gradients> = layers.iter().map(Gradients::zeros_like).collect();
    let n = xs.len() as f64;
    let mut loss = 0.0;

    for (x, &y) in xs.iter().zip(ys) {
        let outputs = forward_cached(layers, x);
        let probs = &outputs[layers.len()];
        loss -= probs[y].max(1e-12).ln();

        // Softmax + cross-entropy error term.
        let mut delta: Vec<f64> = probs.clone();
        delta[y] -= 1.0;

        for l in (0..layers.len()).rev() {
            let input = &outputs[l];
            let grad = &mut grads[l];
            for (o, d) in delta.iter().enumerate() {
                grad.b[o] += d;
                for (g, a) in grad.w[o].iter_mut().zip(input) {
                    *g += d * a;
                }
            }

            if l == 0 {
                break;
            }
            let prev_act = layers[l - 1].activation;
            delta = (0..layers[l].in_dim())
                .map(|i| {
                    let back: f64 = layers[l]
                        .weights
                        .iter()
                        .zip(&delta)
                        .map(|(row, d)| row[i] * d)
                        .sum();
                    back * activation_derivative(input[i], prev_act)
                })
                .collect();
        }
    }

    for grad in &mut grads {
        grad.b.iter_mut().for_each(|g| *g /= n);
        grad.w
            .iter_mut()
            .flat_map(|row| row.iter_mut())
            .for_each(|g| *g /= n);
    }

    (loss / n, grads)
}

fn adam_step(
    layers: &mut [DenseLayer],
    moments: &mut [AdamMoments],
    grads: &[Gradients],
    lr: f64,
    step: usize,
) {
    let bias1 = 1.0 - ADAM_BETA1.powi(step as i32);
    let bias2 = 1.0 - ADAM_BETA2.powi(step as i32);

    let update = |param: &mut f64, m: &mut f64, v: &mut f64, g: f64| {
        *m = ADAM_BETA1 * *m + (1.0 - ADAM_BETA1) * g;
        *v = ADAM_BETA2 * *v + (1.0 - ADAM_BETA2) * g * g;
        let m_hat = *m / bias1;
        let v_hat = *v / bias2;
        *param -= lr * m_hat / (v_hat.sqrt() + ADAM_EPSILON);
    };

    for ((layer, mom), grad) in layers.iter_mut().zip(moments.iter_mut()).zip(grads) {
        for (o, row) in layer.weights.iter_mut().enumerate() {
            for (i, w) in row.iter_mut().enumerate() {
                update(w, &mut mom.m_w[o][i], &mut mom.v_w[o][i], grad.w[o][i]);
            }
        }
        for (o, b) in layer.bias.iter_mut().enumerate() {
            update(b, &mut mom.m_b[o], &mut mom.v_b[o], grad.b[o]);
        }
    }
    debug!("adam step {} applied", step);
}

/// Share of rows whose argmax matches the label (0.0 for an empty set).
fn holdout_accuracy(layers: &[DenseLayer], xs: &[Vec<f64>], ys: &[usize]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let correct = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| {
            let outputs = forward_cached(layers, x);
            argmax(&outputs[layers.len()]) == Some(**y)
        })
        .count();
    correct as f64 / xs.len() as f64
}
