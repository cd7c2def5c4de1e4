// src/modeling/pipeline.rs
//
// The preprocessing+model pipeline persisted between stages: min-max
// scaling for numeric columns, one-hot encoding for categorical columns,
// feeding a random-forest regressor. The whole pipeline serializes to one
// JSON blob so the trainer, the champion selector and the serving form all
// move the same object around.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::features::ImputedFrame;

pub type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Seed for the forest itself, so refits on identical data are identical.
const FOREST_SEED: u64 = 999;

/// Random-forest hyperparameters covered by the search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl ForestParams {
    fn to_smartcore(&self) -> RandomForestRegressorParameters {
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.n_trees as _)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_seed(FOREST_SEED);
        match self.max_depth {
            Some(depth) => params.with_max_depth(depth),
            None => params,
        }
    }
}

/// Per-column min/max scaling fit on the training split. Constant columns
/// scale to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    mins: Vec<f64>,
    maxs: Vec<f64>,
}

impl MinMaxScaler {
    pub fn fit(&mut self, rows: &[Vec<f64>]) {
        self.mins.clear();
        self.maxs.clear();
        let cols = rows.first().map_or(0, Vec::len);
        for col in 0..cols {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for row in rows {
                min = min.min(row[col]);
                max = max.max(row[col]);
            }
            self.mins.push(min);
            self.maxs.push(max);
        }
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .enumerate()
            .map(|(col, &v)| {
                let range = self.maxs[col] - self.mins[col];
                if range == 0.0 {
                    0.0
                } else {
                    (v - self.mins[col]) / range
                }
            })
            .collect()
    }
}

/// Per-column one-hot encoding over the training vocabulary. A value
/// outside the vocabulary encodes to an all-zero block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit(&mut self, rows: &[Vec<String>]) {
        self.categories.clear();
        let cols = rows.first().map_or(0, Vec::len);
        for col in 0..cols {
            let mut values: Vec<String> = rows.iter().map(|row| row[col].clone()).collect();
            values.sort();
            values.dedup();
            self.categories.push(values);
        }
    }

    pub fn transform_row(&self, row: &[String]) -> Vec<f64> {
        let mut encoded = Vec::new();
        for (col, vocab) in self.categories.iter().enumerate() {
            let hit = vocab.binary_search_by(|c| c.as_str().cmp(row[col].as_str())).ok();
            for idx in 0..vocab.len() {
                encoded.push(if hit == Some(idx) { 1.0 } else { 0.0 });
            }
        }
        encoded
    }
}

/// Preprocessing + regressor as one unit. `fit` learns the scaler and
/// encoder from the training frame before fitting the forest; `predict`
/// reuses the fitted preprocessing on any frame.
#[derive(Serialize, Deserialize)]
pub struct PricePipeline {
    pub params: ForestParams,
    scaler: MinMaxScaler,
    encoder: OneHotEncoder,
    forest: Option<Forest>,
}

impl PricePipeline {
    /// The unfitted template packaged by feature engineering.
    pub fn template() -> Self {
        Self::with_params(ForestParams::default())
    }

    pub fn with_params(params: ForestParams) -> Self {
        Self {
            params,
            scaler: MinMaxScaler::default(),
            encoder: OneHotEncoder::default(),
            forest: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.forest.is_some()
    }

    pub fn fit(&mut self, x: &ImputedFrame, y: &[f64]) -> Result<()> {
        anyhow::ensure!(!x.is_empty(), "Cannot fit pipeline on an empty frame");
        anyhow::ensure!(x.len() == y.len(), "Feature/target row count mismatch");

        self.scaler.fit(&x.numeric);
        self.encoder.fit(&x.categorical);

        let matrix = self.design_matrix(x);
        let dense = DenseMatrix::from_2d_vec(&matrix);
        let forest = RandomForestRegressor::fit(&dense, &y.to_vec(), self.params.to_smartcore())
            .map_err(|e| anyhow!("Random forest training failed: {e}"))?;
        self.forest = Some(forest);
        Ok(())
    }

    pub fn predict(&self, x: &ImputedFrame) -> Result<Vec<f64>> {
        let forest = self
            .forest
            .as_ref()
            .context("Pipeline has not been fitted")?;
        anyhow::ensure!(!x.is_empty(), "Cannot predict on an empty frame");

        let matrix = self.design_matrix(x);
        let dense = DenseMatrix::from_2d_vec(&matrix);
        forest
            .predict(&dense)
            .map_err(|e| anyhow!("Random forest prediction failed: {e}"))
    }

    fn design_matrix(&self, x: &ImputedFrame) -> Vec<Vec<f64>> {
        x.numeric
            .iter()
            .zip(x.categorical.iter())
            .map(|(num, cat)| {
                let mut row = self.scaler.transform_row(num);
                row.extend(self.encoder.transform_row(cat));
                row
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};

    fn toy_frame(n: usize) -> (ImputedFrame, Vec<f64>) {
        // Price tracks the first numeric column so the forest has signal.
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        let mut target = Vec::new();
        for i in 0..n {
            let size = 30.0 + (i % 10) as f64 * 10.0;
            let mut num = vec![0.0; NUMERIC_COLUMNS.len()];
            num[0] = size;
            num[1] = size / 2.0;
            numeric.push(num);

            let city = if i % 2 == 0 { "Jakarta" } else { "Bogor" };
            let mut cat = vec!["x".to_string(); CATEGORICAL_COLUMNS.len()];
            cat[0] = city.to_string();
            categorical.push(cat);

            target.push(size * 10.0 + if i % 2 == 0 { 100.0 } else { 0.0 });
        }
        (
            ImputedFrame {
                numeric,
                categorical,
            },
            target,
        )
    }

    #[test]
    fn test_scaler_maps_training_range_to_unit_interval() {
        let mut scaler = MinMaxScaler::default();
        scaler.fit(&[vec![10.0, 5.0], vec![20.0, 5.0]]);
        assert_eq!(scaler.transform_row(&[10.0, 5.0]), vec![0.0, 0.0]);
        assert_eq!(scaler.transform_row(&[20.0, 5.0]), vec![1.0, 0.0]);
        assert_eq!(scaler.transform_row(&[15.0, 5.0]), vec![0.5, 0.0]);
    }

    #[test]
    fn test_one_hot_encoding_blocks() {
        let mut encoder = OneHotEncoder::default();
        encoder.fit(&[
            vec!["Jakarta".to_string(), "SHM".to_string()],
            vec!["Bogor".to_string(), "HGB".to_string()],
        ]);
        assert_eq!(
            encoder.transform_row(&["Jakarta".to_string(), "HGB".to_string()]),
            vec![0.0, 1.0, 1.0, 0.0]
        );
        // Unknown category encodes to an all-zero block.
        assert_eq!(
            encoder.transform_row(&["Depok".to_string(), "SHM".to_string()]),
            vec![0.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_pipeline_fit_predict_round_trip() {
        let (frame, target) = toy_frame(40);
        let mut pipeline = PricePipeline::with_params(ForestParams {
            n_trees: 20,
            max_depth: Some(10),
            ..ForestParams::default()
        });
        pipeline.fit(&frame, &target).unwrap();
        assert!(pipeline.is_fitted());

        let predictions = pipeline.predict(&frame).unwrap();
        assert_eq!(predictions.len(), frame.len());
        assert!(predictions.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_pipeline_serializes_and_predicts_after_reload() {
        let (frame, target) = toy_frame(30);
        let mut pipeline = PricePipeline::with_params(ForestParams {
            n_trees: 10,
            ..ForestParams::default()
        });
        pipeline.fit(&frame, &target).unwrap();
        let before = pipeline.predict(&frame).unwrap();

        let blob = serde_json::to_vec(&pipeline).unwrap();
        let reloaded: PricePipeline = serde_json::from_slice(&blob).unwrap();
        let after = reloaded.predict(&frame).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_unfitted_pipeline_refuses_to_predict() {
        let (frame, _) = toy_frame(5);
        let pipeline = PricePipeline::template();
        assert!(pipeline.predict(&frame).is_err());
    }
}
