//! Bundled Iris dataset and preprocessing.
//!
//! Fisher's 150 measurements (sepal length, sepal width, petal length,
//! petal width in cm) with class indices 0 = setosa, 1 = versicolour,
//! 2 = virginica.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

pub const FEATURE_COUNT: usize = 4;
pub const CLASS_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub features: [f64; FEATURE_COUNT],
    pub label: usize,
}

#[rustfmt::skip]
const IRIS: [([f64; FEATURE_COUNT], usize); 150] = [
    ([5.1, 3.5, 1.4, 0.2], 0), ([4.9, 3.0, 1.4, 0.2], 0), ([4.7, 3.2, 1.3, 0.2], 0),
    ([4.6, 3.1, 1.5, 0.2], 0), ([5.0, 3.6, 1.4, 0.2], 0), ([5.4, 3.9, 1.7, 0.4], 0),
    ([4.6, 3.4, 1.4, 0.3], 0), ([5.0, 3.4, 1.5, 0.2], 0), ([4.4, 2.9, 1.4, 0.2], 0),
    ([4.9, 3.1, 1.5, 0.1], 0), ([5.4, 3.7, 1.5, 0.2], 0), ([4.8, 3.4, 1.6, 0.2], 0),
    ([4.8, 3.0, 1.4, 0.1], 0), ([4.3, 3.0, 1.1, 0.1], 0), ([5.8, 4.0, 1.2, 0.2], 0),
    ([5.7, 4.4, 1.5, 0.4], 0), ([5.4, 3.9, 1.3, 0.4], 0), ([5.1, 3.5, 1.4, 0.3], 0),
    ([5.7, 3.8, 1.7, 0.3], 0), ([5.1, 3.8, 1.5, 0.3], 0), ([5.4, 3.4, 1.7, 0.2], 0),
    ([5.1, 3.7, 1.5, 0.4], 0), ([4.6, 3.6, 1.0, 0.2], 0), ([5.1, 3.3, 1.7, 0.5], 0),
    ([4.8, 3.4, 1.9, 0.2], 0), ([5.0, 3.0, 1.6, 0.2], 0), ([5.0, 3.4, 1.6, 0.4], 0),
    ([5.2, 3.5, 1.5, 0.2], 0), ([5.2, 3.4, 1.4, 0.2], 0), ([4.7, 3.2, 1.6, 0.2], 0),
    ([4.8, 3.1, 1.6, 0.2], 0), ([5.4, 3.4, 1.5, 0.4], 0), ([5.2, 4.1, 1.5, 0.1], 0),
    ([5.5, 4.2, 1.4, 0.2], 0), ([4.9, 3.1, 1.5, 0.2], 0), ([5.0, 3.2, 1.2, 0.2], 0),
    ([5.5, 3.5, 1.3, 0.2], 0), ([4.9, 3.6, 1.4, 0.1], 0), ([4.4, 3.0, 1.3, 0.2], 0),
    ([5.1, 3.4, 1.5, 0.2], 0), ([5.0, 3.5, 1.3, 0.3], 0), ([4.5, 2.3, 1.3, 0.3], 0),
    ([4.4, 3.2, 1.3, 0.2], 0), ([5.0, 3.5, 1.6, 0.6], 0), ([5.1, 3.8, 1.9, 0.4], 0),
    ([4.8, 3.0, 1.4, 0.3], 0), ([5.1, 3.8, 1.6, 0.2], 0), ([4.6, 3.2, 1.4, 0.2], 0),
    ([5.3, 3.7, 1.5, 0.2], 0), ([5.0, 3.3, 1.4, 0.2], 0),
    ([7.0, 3.2, 4.7, 1.4], 1), ([6.4, 3.2, 4.5, 1.5], 1), ([6.9, 3.1, 4.9, 1.5], 1),
    ([5.5, 2.3, 4.0, 1.3], 1), ([6.5, 2.8, 4.6, 1.5], 1), ([5.7, 2.8, 4.5, 1.3], 1),
    ([6.3, 3.3, 4.7, 1.6], 1), ([4.9, 2.4, 3.3, 1.0], 1), ([6.6, 2.9, 4.6, 1.3], 1),
    ([5.2, 2.7, 3.9, 1.4], 1), ([5.0, 2.0, 3.5, 1.0], 1), ([5.9, 3.0, 4.2, 1.5], 1),
    ([6.0, 2.2, 4.0, 1.0], 1), ([6.1, 2.9, 4.7, 1.4], 1), ([5.6, 2.9, 3.6, 1.3], 1),
    ([6.7, 3.1, 4.4, 1.4], 1), ([5.6, 3.0, 4.5, 1.5], 1), ([5.8, 2.7, 4.1, 1.0], 1),
    ([6.2, 2.2, 4.5, 1.5], 1), ([5.6, 2.5, 3.9, 1.1], 1), ([5.9, 3.2, 4.8, 1.8], 1),
    ([6.1, 2.8, 4.0, 1.3], 1), ([6.3, 2.5, 4.9, 1.5], 1), ([6.1, 2.8, 4.7, 1.2], 1),
    ([6.4, 2.9, 4.3, 1.3], 1), ([6.6, 3.0, 4.4, 1.4], 1), ([6.8, 2.8, 4.8, 1.4], 1),
    ([6.7, 3.0, 5.0, 1.7], 1), ([6.0, 2.9, 4.5, 1.5], 1), ([5.7, 2.6, 3.5, 1.0], 1),
    ([5.5, 2.4, 3.8, 1.1], 1), ([5.5, 2.4, 3.7, 1.0], 1), ([5.8, 2.7, 3.9, 1.2], 1),
    ([6.0, 2.7, 5.1, 1.6], 1), ([5.4, 3.0, 4.5, 1.5], 1), ([6.0, 3.4, 4.5, 1.6], 1),
    ([6.7, 3.1, 4.7, 1.5], 1), ([6.3, 2.3, 4.4, 1.3], 1), ([5.6, 3.0, 4.1, 1.3], 1),
    ([5.5, 2.5, 4.0, 1.3], 1), ([5.5, 2.6, 4.4, 1.2], 1), ([6.1, 3.0, 4.6, 1.4], 1),
    ([5.8, 2.6, 4.0, 1.2], 1), ([5.0, 2.3, 3.3, 1.0], 1), ([5.6, 2.7, 4.2, 1.3], 1),
    ([5.7, 3.0, 4.2, 1.2], 1), ([5.7, 2.9, 4.2, 1.3], 1), ([6.2, 2.9, 4.3, 1.3], 1),
    ([5.1, 2.5, 3.0, 1.1], 1), ([5.7, 2.8, 4.1, 1.3], 1),
    ([6.3, 3.3, 6.0, 2.5], 2), ([5.8, 2.7, 5.1, 1.9], 2), ([7.1, 3.0, 5.9, 2.1], 2),
    ([6.3, 2.9, 5.6, 1.8], 2), ([6.5, 3.0, 5.8, 2.2], 2), ([7.6, 3.0, 6.6, 2.1], 2),
    ([4.9, 2.5, 4.5, 1.7], 2), ([7.3, 2.9, 6.3, 1.8], 2), ([6.7, 2.5, 5.8, 1.8], 2),
    ([7.2, 3.6, 6.1, 2.5], 2), ([6.5, 3.2, 5.1, 2.0], 2), ([6.4, 2.7, 5.3, 1.9], 2),
    ([6.8, 3.0, 5.5, 2.1], 2), ([5.7, 2.5, 5.0, 2.0], 2), ([5.8, 2.8, 5.1, 2.4], 2),
    ([6.4, 3.2, 5.3, 2.3], 2), ([6.5, 3.0, 5.5, 1.8], 2), ([7.7, 3.8, 6.7, 2.2], 2),
    ([7.7, 2.6, 6.9, 2.3], 2), ([6.0, 2.2, 5.0, 1.5], 2), ([6.9, 3.2, 5.7, 2.3], 2),
    ([5.6, 2.8, 4.9, 2.0], 2), ([7.7, 2.8, 6.7, 2.0], 2), ([6.3, 2.7, 4.9, 1.8], 2),
    ([6.7, 3.3, 5.7, 2.1], 2), ([7.2, 3.2, 6.0, 1.8], 2), ([6.2, 2.8, 4.8, 1.8], 2),
    ([6.1, 3.0, 4.9, 1.8], 2), ([6.4, 2.8, 5.6, 2.1], 2), ([7.2, 3.0, 5.8, 1.6], 2),
    ([7.4, 2.8, 6.1, 1.9], 2), ([7.9, 3.8, 6.4, 2.0], 2), ([6.4, 2.8, 5.6, 2.2], 2),
    ([6.3, 2.8, 5.1, 1.5], 2), ([6.1, 2.6, 5.6, 1.4], 2), ([7.7, 3.0, 6.1, 2.3], 2),
    ([6.3, 3.4, 5.6, 2.4], 2), ([6.4, 3.1, 5.5, 1.8], 2), ([6.0, 3.0, 4.8, 1.8], 2),
    ([6.9, 3.1, 5.4, 2.1], 2), ([6.7, 3.1, 5.6, 2.4], 2), ([6.9, 3.1, 5.1, 2.3], 2),
    ([5.8, 2.7, 5.1, 1.9], 2), ([6.8, 3.2, 5.9, 2.3], 2), ([6.7, 3.3, 5.7, 2.5], 2),
    ([6.7, 3.0, 5.2, 2.3], 2), ([6.3, 2.5, 5.0, 1.9], 2), ([6.5, 3.0, 5.2, 2.0], 2),
    ([6.2, 3.4, 5.4, 2.3], 2), ([5.9, 3.0, 5.1, 1.8], 2),
];

/// The full 150-row dataset in its canonical order.
pub fn iris_dataset() -> Vec<Sample> {
    IRIS.iter()
        .map(|&(features, label)| Sample { features, label })
        .collect()
}

/// Per-feature z-score statistics (population std, ddof = 0).
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Standardizer {
    /// Fit on `rows`. A constant column gets std 1.0 so it maps to zero
    /// instead of dividing by zero.
    pub fn fit(rows: &[[f64; FEATURE_COUNT]]) -> Self {
        let n = rows.len().max(1) as f64;
        let mut mean = vec![0.0; FEATURE_COUNT];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; FEATURE_COUNT];
        for row in rows {
            for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }
        let std = var
            .into_iter()
            .map(|v| {
                let s = (v / n).sqrt();
                if s > 0.0 {
                    s
                } else {
                    1.0
                }
            })
            .collect();

        Self { mean, std }
    }

    pub fn transform(&self, row: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = *row;
        for ((x, m), s) in out.iter_mut().zip(&self.mean).zip(&self.std) {
            *x = (*x - m) / s;
        }
        out
    }
}

/// Shuffle with a seeded RNG and hold out `round(n * test_fraction)` rows.
/// Returns `(train, test)`.
pub fn train_test_split(
    samples: &[Sample],
    test_fraction: f64,
    seed: u64,
) -> (Vec<Sample>, Vec<Sample>) {
    let mut shuffled = samples.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let test_len = ((samples.len() as f64) * test_fraction).round() as usize;
    let test_len = test_len.min(samples.len());
    let test = shuffled.split_off(samples.len() - test_len);
    (shuffled, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_is_balanced() {
        let data = iris_dataset();
        assert_eq!(data.len(), 150);
        for class in 0..CLASS_COUNT {
            assert_eq!(data.iter().filter(|s| s.label == class).count(), 50);
        }
    }

    #[test]
    fn standardized_features_have_zero_mean_unit_variance() {
        let rows: Vec<_> = iris_dataset().iter().map(|s| s.features).collect();
        let scaler = Standardizer::fit(&rows);
        let scaled: Vec<_> = rows.iter().map(|r| scaler.transform(r)).collect();

        for f in 0..FEATURE_COUNT {
            let mean = scaled.iter().map(|r| r[f]).sum::<f64>() / 150.0;
            let var = scaled.iter().map(|r| (r[f] - mean).powi(2)).sum::<f64>() / 150.0;
            assert!(mean.abs() < 1e-9, "feature {f} mean {mean}");
            assert!((var - 1.0).abs() < 1e-9, "feature {f} var {var}");
        }
    }

    #[test]
    fn constant_column_does_not_divide_by_zero() {
        let rows = [[1.0, 2.0, 3.0, 4.0], [1.0, 4.0, 3.0, 4.0]];
        let scaler = Standardizer::fit(&rows);
        assert_eq!(scaler.std[0], 1.0);
        let out = scaler.transform(&rows[0]);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], -1.0);
    }

    #[test]
    fn split_is_eighty_twenty_and_seeded() {
        let data = iris_dataset();
        let (train, test) = train_test_split(&data, 0.2, 2);
        assert_eq!(train.len(), 120);
        assert_eq!(test.len(), 30);

        let (train_again, test_again) = train_test_split(&data, 0.2, 2);
        assert_eq!(train, train_again);
        assert_eq!(test, test_again);
    }
}
