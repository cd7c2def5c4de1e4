// src/modeling/trainer.rs
//
// Randomized hyperparameter search over the forest grid, scored by k-fold
// cross-validated MAE on the training split. Every run persists a
// candidate model, whatever its quality; acceptance is the champion
// selector's job.

use anyhow::{Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::artifacts;
use crate::config::PipelineConfig;
use crate::features::{gather, split, FeatureBundle, ImputedFrame};
use crate::modeling::metrics;
use crate::modeling::pipeline::{ForestParams, PricePipeline};

pub const SEARCH_ITERATIONS: usize = 50;
pub const SEARCH_SEED: u64 = 0;
pub const CV_FOLDS: usize = 5;

const N_TREES_GRID: [usize; 6] = [5, 10, 50, 100, 300, 500];
const MAX_DEPTH_GRID: [Option<u16>; 4] = [Some(10), Some(20), Some(30), None];
const MIN_SAMPLES_SPLIT_GRID: [usize; 3] = [2, 5, 10];
const MIN_SAMPLES_LEAF_GRID: [usize; 3] = [1, 2, 4];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub best_params: ForestParams,
    pub cv_mae: f64,
    pub train_mae: f64,
    pub test_mae: f64,
    pub train_r2: f64,
    pub test_r2: f64,
}

/// The full hyperparameter grid, in a fixed enumeration order.
fn candidate_grid() -> Vec<ForestParams> {
    let mut grid = Vec::new();
    for &n_trees in &N_TREES_GRID {
        for &max_depth in &MAX_DEPTH_GRID {
            for &min_samples_split in &MIN_SAMPLES_SPLIT_GRID {
                for &min_samples_leaf in &MIN_SAMPLES_LEAF_GRID {
                    grid.push(ForestParams {
                        n_trees,
                        max_depth,
                        min_samples_split,
                        min_samples_leaf,
                    });
                }
            }
        }
    }
    grid
}

/// Samples the configurations to evaluate: the grid shuffled with a fixed
/// seed, truncated to the iteration budget (sampling without replacement).
fn sampled_configurations() -> Vec<ForestParams> {
    let mut grid = candidate_grid();
    let mut rng = StdRng::seed_from_u64(SEARCH_SEED);
    grid.shuffle(&mut rng);
    grid.truncate(SEARCH_ITERATIONS);
    grid
}

/// Mean cross-validated MAE for one configuration.
fn cross_val_mae(
    x: &ImputedFrame,
    y: &[f64],
    params: &ForestParams,
    folds: &[Vec<usize>],
) -> Result<f64> {
    let mut fold_maes = Vec::with_capacity(folds.len());
    for val_idx in folds {
        let in_val: std::collections::HashSet<usize> = val_idx.iter().copied().collect();
        let train_idx: Vec<usize> = (0..y.len()).filter(|i| !in_val.contains(i)).collect();

        let mut pipeline = PricePipeline::with_params(params.clone());
        pipeline.fit(&x.take(&train_idx), &gather(y, &train_idx))?;
        let predictions = pipeline.predict(&x.take(val_idx))?;
        fold_maes.push(metrics::mean_absolute_error(&gather(y, val_idx), &predictions));
    }
    Ok(metrics::mean(&fold_maes))
}

/// Runs the search, refits the winner on the full training split, logs the
/// held-out metrics and persists the candidate model blob.
pub fn train_candidate(cfg: &PipelineConfig) -> Result<TrainingReport> {
    let bundle: FeatureBundle = artifacts::load_json(&cfg.bundle_path())
        .context("Feature bundle not found; run feature engineering first")?;
    anyhow::ensure!(
        bundle.y_train.len() >= CV_FOLDS,
        "Not enough training rows ({}) for {}-fold cross-validation",
        bundle.y_train.len(),
        CV_FOLDS
    );

    let folds = split::kfold_indices(bundle.y_train.len(), CV_FOLDS);
    let mut best: Option<(ForestParams, f64)> = None;
    for (iteration, params) in sampled_configurations().into_iter().enumerate() {
        let score = cross_val_mae(&bundle.x_train, &bundle.y_train, &params, &folds)?;
        debug!(
            "Search iteration {}: {:?} -> CV MAE {:.4}",
            iteration + 1,
            params,
            score
        );
        // Strict comparison keeps the first best found.
        let improved = best.as_ref().map_or(true, |(_, b)| score < *b);
        if improved {
            best = Some((params, score));
        }
    }
    let (best_params, cv_mae) =
        best.context("Hyperparameter search produced no candidates")?;
    info!("Best parameters: {:?} (CV MAE {:.4})", best_params, cv_mae);

    let mut pipeline = PricePipeline::with_params(best_params.clone());
    pipeline.fit(&bundle.x_train, &bundle.y_train)?;

    let train_predictions = pipeline.predict(&bundle.x_train)?;
    let test_predictions = pipeline.predict(&bundle.x_test)?;
    let report = TrainingReport {
        best_params,
        cv_mae,
        train_mae: metrics::mean_absolute_error(&bundle.y_train, &train_predictions),
        test_mae: metrics::mean_absolute_error(&bundle.y_test, &test_predictions),
        train_r2: metrics::r2_score(&bundle.y_train, &train_predictions),
        test_r2: metrics::r2_score(&bundle.y_test, &test_predictions),
    };
    info!(
        "MAE train {:.2}, test {:.2}; R2 train {:.2}, test {:.2}",
        report.train_mae, report.test_mae, report.train_r2, report.test_r2
    );

    artifacts::save_json(&cfg.candidate_model_path(), &pipeline)?;
    info!(
        "Candidate model saved to {}",
        cfg.candidate_model_path().display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};

    #[test]
    fn test_grid_has_full_cartesian_product() {
        assert_eq!(candidate_grid().len(), 6 * 4 * 3 * 3);
    }

    #[test]
    fn test_sampling_is_deterministic_and_without_replacement() {
        let a = sampled_configurations();
        let b = sampled_configurations();
        assert_eq!(a, b);
        assert_eq!(a.len(), SEARCH_ITERATIONS);

        let unique: std::collections::HashSet<String> =
            a.iter().map(|p| format!("{p:?}")).collect();
        assert_eq!(unique.len(), a.len());
    }

    #[test]
    fn test_cross_val_mae_on_learnable_data() {
        let n = 30;
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        let mut target = Vec::new();
        for i in 0..n {
            let mut num = vec![0.0; NUMERIC_COLUMNS.len()];
            num[0] = i as f64;
            numeric.push(num);
            categorical.push(vec!["x".to_string(); CATEGORICAL_COLUMNS.len()]);
            target.push(i as f64 * 2.0);
        }
        let frame = ImputedFrame {
            numeric,
            categorical,
        };

        let folds = split::kfold_indices(n, 3);
        let params = ForestParams {
            n_trees: 10,
            max_depth: Some(5),
            ..ForestParams::default()
        };
        let score = cross_val_mae(&frame, &target, &params, &folds).unwrap();
        assert!(score.is_finite());
        assert!(score >= 0.0);
    }
}
