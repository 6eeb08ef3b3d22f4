use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::data::dataset::TrainingSet;
use crate::data::preprocessing::NormalizationStats;
use crate::error::TrainingError;
use crate::features::FEATURE_COUNT;
use crate::model::layers::{binary_cross_entropy, correct_count};
use crate::model::network::RainNetwork;
use crate::model::optimizer::Adam;
use crate::training::history::TrainingHistory;

/// A network together with the stats its inputs were normalized with.
///
/// The two are only meaningful as a pair and are persisted as one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub network: RainNetwork,
    pub stats: NormalizationStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Fixes weight initialization and shuffling; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            epochs: 30,
            batch_size: 32,
            learning_rate: 0.001,
            seed: None,
        }
    }
}

/// Normalizes a balanced training set and trains a fresh network on it.
pub fn train_model(
    set: &TrainingSet,
    options: &TrainingOptions,
) -> Result<(TrainedModel, TrainingHistory), TrainingError> {
    if set.is_empty() {
        return Err(TrainingError::EmptyTrainingSet);
    }

    let x = set.feature_matrix();
    let stats = NormalizationStats::fit(&x)?;
    tracing::info!(mean = ?stats.mean, std = ?stats.std, "Normalization stats fitted");

    let x_normalized = stats.apply_batch(&x);
    let (network, history) = train_network(&x_normalized, &set.labels(), options)?;

    Ok((TrainedModel { network, stats }, history))
}

/// Mini-batch Adam on binary cross-entropy, reshuffling every epoch.
pub fn train_network(
    x_normalized: &Array2<f64>,
    labels: &Array1<f64>,
    options: &TrainingOptions,
) -> Result<(RainNetwork, TrainingHistory), TrainingError> {
    let n = x_normalized.nrows();
    if n == 0 || labels.is_empty() {
        return Err(TrainingError::EmptyTrainingSet);
    }
    if x_normalized.ncols() != FEATURE_COUNT {
        return Err(TrainingError::ShapeMismatch {
            expected: FEATURE_COUNT,
            actual: x_normalized.ncols(),
        });
    }
    if labels.len() != n {
        return Err(TrainingError::LabelCountMismatch {
            rows: n,
            labels: labels.len(),
        });
    }

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut nn = RainNetwork::new(&mut rng);
    let mut adam = Adam::new(options.learning_rate);
    let mut history = TrainingHistory::default();
    let mut order: Vec<usize> = (0..n).collect();
    let batch_size = options.batch_size.max(1);

    tracing::info!(
        examples = n,
        epochs = options.epochs,
        batch_size,
        learning_rate = adam.lr(),
        "Starting training"
    );

    for epoch in 1..=options.epochs {
        order.shuffle(&mut rng);

        let mut loss_sum = 0.0;
        let mut correct = 0;
        for batch in order.chunks(batch_size) {
            let xb = x_normalized.select(Axis(0), batch);
            let yb = labels.select(Axis(0), batch).insert_axis(Axis(1));

            let (grads, output) = nn.backward(&xb, &yb);
            loss_sum += binary_cross_entropy(&yb, &output) * batch.len() as f64;
            correct += correct_count(&yb, &output);

            adam.step(&mut nn.parameters_mut(), &grads);
        }

        let loss = loss_sum / n as f64;
        let accuracy = correct as f64 / n as f64;
        if !loss.is_finite() {
            return Err(TrainingError::Diverged { epoch });
        }

        tracing::info!(epoch, loss, accuracy, "Epoch complete");
        history.record(epoch, loss, accuracy);
    }

    Ok((nn, history))
}
