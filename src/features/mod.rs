// src/features/mod.rs
//
// Column selection, train/test split and imputation: turns the cleaned
// CSV into the serialized feature bundle the trainer consumes.

pub mod encoder;
pub mod imputer;
pub mod split;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::artifacts;
use crate::config::PipelineConfig;
use crate::models::CleanedListing;
use crate::modeling::pipeline::PricePipeline;

/// Numeric feature columns, in matrix order.
pub const NUMERIC_COLUMNS: [&str; 12] = [
    "land_size_m2",
    "building_size_m2",
    "road_width",
    "maid_bedroom",
    "maid_bathroom",
    "kitchen",
    "floor_level",
    "bedroom",
    "bathroom",
    "garage",
    "carport",
    "voltage_watt",
];

/// Categorical feature columns, in matrix order.
pub const CATEGORICAL_COLUMNS: [&str; 7] = [
    "city",
    "property_type",
    "certificate",
    "furniture",
    "house_facing",
    "water_source",
    "property_condition",
];

pub const TARGET_COLUMN: &str = "price_mio";

/// Held-out fraction and split seed for feature engineering.
pub const TEST_FRACTION: f64 = 0.10;
pub const SPLIT_SEED: u64 = 999;

/// A column-ordered view of the selected feature columns, with missing
/// values still present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    pub numeric: Vec<Vec<Option<f64>>>,
    pub categorical: Vec<Vec<Option<String>>>,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.numeric.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty()
    }

    pub fn take(&self, indices: &[usize]) -> FeatureFrame {
        FeatureFrame {
            numeric: indices.iter().map(|&i| self.numeric[i].clone()).collect(),
            categorical: indices
                .iter()
                .map(|&i| self.categorical[i].clone())
                .collect(),
        }
    }
}

/// A feature frame after imputation: every cell populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImputedFrame {
    pub numeric: Vec<Vec<f64>>,
    pub categorical: Vec<Vec<String>>,
}

impl ImputedFrame {
    pub fn len(&self) -> usize {
        self.numeric.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty()
    }

    pub fn take(&self, indices: &[usize]) -> ImputedFrame {
        ImputedFrame {
            numeric: indices.iter().map(|&i| self.numeric[i].clone()).collect(),
            categorical: indices
                .iter()
                .map(|&i| self.categorical[i].clone())
                .collect(),
        }
    }
}

/// Gathers target values for a set of row indices.
pub fn gather(values: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&i| values[i]).collect()
}

/// Everything the trainer needs, persisted between stages as one blob:
/// imputed splits, targets, and the unfitted preprocessing+model pipeline.
#[derive(Serialize, Deserialize)]
pub struct FeatureBundle {
    pub x_train: ImputedFrame,
    pub x_test: ImputedFrame,
    pub y_train: Vec<f64>,
    pub y_test: Vec<f64>,
    pub pipeline: PricePipeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSummary {
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Reads the cleaned CSV and selects the feature columns plus the target.
/// Rows without a usable target are skipped.
pub fn read_and_filter(path: &Path) -> Result<(FeatureFrame, Vec<f64>)> {
    let listings: Vec<CleanedListing> = artifacts::read_csv(path)
        .context("Cleaned data not found; run the cleaner first")?;

    let mut frame = FeatureFrame::default();
    let mut target = Vec::new();
    for listing in &listings {
        let price = match listing.price_mio {
            Some(price) if price.is_finite() => price,
            _ => continue,
        };
        frame.numeric.push(numeric_values(listing));
        frame.categorical.push(categorical_values(listing));
        target.push(price);
    }
    Ok((frame, target))
}

fn numeric_values(listing: &CleanedListing) -> Vec<Option<f64>> {
    vec![
        listing.land_size_m2,
        listing.building_size_m2,
        listing.road_width,
        listing.maid_bedroom,
        listing.maid_bathroom,
        listing.kitchen,
        listing.floor_level,
        listing.bedroom,
        listing.bathroom,
        listing.garage,
        listing.carport,
        listing.voltage_watt,
    ]
}

fn categorical_values(listing: &CleanedListing) -> Vec<Option<String>> {
    vec![
        Some(listing.city.clone()),
        listing.property_type.clone(),
        listing.certificate.clone(),
        listing.furniture.clone(),
        listing.house_facing.clone(),
        listing.water_source.clone(),
        listing.property_condition.clone(),
    ]
}

/// Runs the feature-engineering stage end to end and writes the bundle.
pub fn engineer_features(cfg: &PipelineConfig) -> Result<FeatureSummary> {
    let (frame, target) = read_and_filter(&cfg.cleaned_path())?;
    anyhow::ensure!(!frame.is_empty(), "No cleaned rows available for training");

    let (train_idx, test_idx) = split::train_test_indices(frame.len(), TEST_FRACTION, SPLIT_SEED);
    let x_train = frame.take(&train_idx);
    let x_test = frame.take(&test_idx);
    let y_train = gather(&target, &train_idx);
    let y_test = gather(&target, &test_idx);

    let (x_train_imputed, x_test_imputed) = imputer::impute_with_knn(&x_train, &x_test)?;

    let bundle = FeatureBundle {
        x_train: x_train_imputed,
        x_test: x_test_imputed,
        y_train,
        y_test,
        pipeline: PricePipeline::template(),
    };
    artifacts::save_json(&cfg.bundle_path(), &bundle)?;

    let summary = FeatureSummary {
        rows: frame.len(),
        train_rows: bundle.y_train.len(),
        test_rows: bundle.y_test.len(),
    };
    info!(
        "Feature engineering completed: {} rows ({} train / {} test), bundle at {}",
        summary.rows,
        summary.train_rows,
        summary.test_rows,
        cfg.bundle_path().display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_take_selects_rows() {
        let frame = FeatureFrame {
            numeric: vec![
                vec![Some(1.0); NUMERIC_COLUMNS.len()],
                vec![Some(2.0); NUMERIC_COLUMNS.len()],
                vec![Some(3.0); NUMERIC_COLUMNS.len()],
            ],
            categorical: vec![
                vec![Some("a".to_string()); CATEGORICAL_COLUMNS.len()],
                vec![Some("b".to_string()); CATEGORICAL_COLUMNS.len()],
                vec![Some("c".to_string()); CATEGORICAL_COLUMNS.len()],
            ],
        };
        let taken = frame.take(&[2, 0]);
        assert_eq!(taken.len(), 2);
        assert_eq!(taken.numeric[0][0], Some(3.0));
        assert_eq!(taken.categorical[1][0].as_deref(), Some("a"));
    }

    #[test]
    fn test_feature_extraction_follows_column_order() {
        let listing = CleanedListing {
            city: "Jakarta".to_string(),
            land_size_m2: Some(90.0),
            voltage_watt: Some(2200.0),
            property_condition: Some("New".to_string()),
            ..CleanedListing::default()
        };
        let numeric = numeric_values(&listing);
        assert_eq!(numeric.len(), NUMERIC_COLUMNS.len());
        assert_eq!(numeric[0], Some(90.0));
        assert_eq!(numeric[11], Some(2200.0));

        let categorical = categorical_values(&listing);
        assert_eq!(categorical.len(), CATEGORICAL_COLUMNS.len());
        assert_eq!(categorical[0].as_deref(), Some("Jakarta"));
        assert_eq!(categorical[6].as_deref(), Some("New"));
    }
}
