// src/features/imputer.rs
//
// Mixed-type missing-value imputation: numeric columns are median-filled,
// categorical columns are label-encoded (missing entries taking the first
// class), and a k-nearest-neighbor imputer fit on the training matrix
// fills whatever is left in both splits. Categorical codes are decoded
// back to strings afterwards.

use anyhow::{Context, Result};
use log::debug;
use ndarray::{Array2, ArrayView1};

use super::encoder::LabelEncoder;
use super::{FeatureFrame, ImputedFrame, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};

pub const KNN_NEIGHBORS: usize = 5;

/// Nearest-neighbor imputer over a fully numeric matrix with NaN holes.
/// Distances are nan-aware euclidean: squared differences over mutually
/// observed coordinates, scaled up by the fraction of missing coordinates.
#[derive(Debug, Clone, Default)]
pub struct KnnImputer {
    k: usize,
    train: Option<Array2<f64>>,
}

impl KnnImputer {
    pub fn new(k: usize) -> Self {
        Self { k, train: None }
    }

    pub fn fit(&mut self, x: &Array2<f64>) {
        self.train = Some(x.clone());
    }

    /// Fills every NaN cell from the k nearest training rows that observe
    /// that column; falls back to the training column mean when no
    /// neighbor observes it.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let train = self
            .train
            .as_ref()
            .context("KNN imputer has not been fitted")?;

        let mut out = x.clone();
        for row_idx in 0..x.nrows() {
            let row = x.row(row_idx);
            if !row.iter().any(|v| v.is_nan()) {
                continue;
            }

            let mut distances: Vec<(usize, f64)> = (0..train.nrows())
                .filter_map(|t| nan_euclidean(row, train.row(t)).map(|d| (t, d)))
                .collect();
            distances.sort_by(|a, b| a.1.total_cmp(&b.1));

            for (col_idx, value) in row.iter().enumerate() {
                if !value.is_nan() {
                    continue;
                }
                let neighbor_values: Vec<f64> = distances
                    .iter()
                    .map(|&(t, _)| train[[t, col_idx]])
                    .filter(|v| !v.is_nan())
                    .take(self.k)
                    .collect();
                out[[row_idx, col_idx]] = if neighbor_values.is_empty() {
                    column_mean(train, col_idx).unwrap_or(0.0)
                } else {
                    neighbor_values.iter().sum::<f64>() / neighbor_values.len() as f64
                };
            }
        }
        Ok(out)
    }
}

fn nan_euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut observed = 0usize;
    for (av, bv) in a.iter().zip(b.iter()) {
        if av.is_nan() || bv.is_nan() {
            continue;
        }
        sum += (av - bv) * (av - bv);
        observed += 1;
    }
    if observed == 0 {
        None
    } else {
        Some((sum * a.len() as f64 / observed as f64).sqrt())
    }
}

fn column_mean(x: &Array2<f64>, col: usize) -> Option<f64> {
    let observed: Vec<f64> = x.column(col).iter().copied().filter(|v| !v.is_nan()).collect();
    if observed.is_empty() {
        None
    } else {
        Some(observed.iter().sum::<f64>() / observed.len() as f64)
    }
}

/// Imputes the train and test feature frames together. The label encoders
/// are fit over the union of categories observed in both splits, then the
/// KNN imputer is fit on the training matrix only and applied to both.
pub fn impute_with_knn(
    x_train: &FeatureFrame,
    x_test: &FeatureFrame,
) -> Result<(ImputedFrame, ImputedFrame)> {
    let encoders = fit_encoders(x_train, x_test);

    let train_matrix = prepare_matrix(x_train, &encoders);
    let test_matrix = prepare_matrix(x_test, &encoders);

    let mut imputer = KnnImputer::new(KNN_NEIGHBORS);
    imputer.fit(&train_matrix);
    let train_filled = imputer.transform(&train_matrix)?;
    let test_filled = imputer.transform(&test_matrix)?;

    Ok((
        decode_matrix(&train_filled, &encoders),
        decode_matrix(&test_filled, &encoders),
    ))
}

fn fit_encoders(x_train: &FeatureFrame, x_test: &FeatureFrame) -> Vec<LabelEncoder> {
    (0..CATEGORICAL_COLUMNS.len())
        .map(|col| {
            let values = x_train
                .categorical
                .iter()
                .chain(x_test.categorical.iter())
                .filter_map(|row| row[col].as_deref());
            let encoder = LabelEncoder::fit(values);
            if encoder.is_empty() {
                debug!(
                    "Categorical column {} has no observed values in either split",
                    CATEGORICAL_COLUMNS[col]
                );
            }
            encoder
        })
        .collect()
}

/// Builds the joint numeric + encoded-categorical matrix. Numeric holes
/// take the column median of the frame itself; categorical holes take the
/// encoder's first class. Columns with nothing observed stay NaN for the
/// KNN pass.
fn prepare_matrix(frame: &FeatureFrame, encoders: &[LabelEncoder]) -> Array2<f64> {
    let rows = frame.len();
    let cols = NUMERIC_COLUMNS.len() + CATEGORICAL_COLUMNS.len();
    let medians: Vec<Option<f64>> = (0..NUMERIC_COLUMNS.len())
        .map(|col| {
            let mut observed: Vec<f64> = frame
                .numeric
                .iter()
                .filter_map(|row| row[col])
                .filter(|v| !v.is_nan())
                .collect();
            median(&mut observed)
        })
        .collect();

    let mut matrix = Array2::from_elem((rows, cols), f64::NAN);
    for (row_idx, (num_row, cat_row)) in
        frame.numeric.iter().zip(frame.categorical.iter()).enumerate()
    {
        for (col, value) in num_row.iter().enumerate() {
            let filled = value.filter(|v| !v.is_nan()).or(medians[col]);
            if let Some(v) = filled {
                matrix[[row_idx, col]] = v;
            }
        }
        for (col, value) in cat_row.iter().enumerate() {
            let encoder = &encoders[col];
            let code = match value.as_deref() {
                Some(v) => encoder.encode(v),
                None => encoder.first_class().and_then(|c| encoder.encode(c)),
            };
            if let Some(code) = code {
                matrix[[row_idx, NUMERIC_COLUMNS.len() + col]] = code;
            }
        }
    }
    matrix
}

fn decode_matrix(matrix: &Array2<f64>, encoders: &[LabelEncoder]) -> ImputedFrame {
    let numeric = (0..matrix.nrows())
        .map(|row| {
            (0..NUMERIC_COLUMNS.len())
                .map(|col| matrix[[row, col]])
                .collect()
        })
        .collect();
    let categorical = (0..matrix.nrows())
        .map(|row| {
            encoders
                .iter()
                .enumerate()
                .map(|(col, encoder)| {
                    encoder
                        .decode_rounded(matrix[[row, NUMERIC_COLUMNS.len() + col]])
                        .to_string()
                })
                .collect()
        })
        .collect();
    ImputedFrame {
        numeric,
        categorical,
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn frame(rows: Vec<(Vec<Option<f64>>, Vec<Option<&str>>)>) -> FeatureFrame {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        for (num, cat) in rows {
            let mut num_row = vec![Some(1.0); NUMERIC_COLUMNS.len()];
            for (i, v) in num.into_iter().enumerate() {
                num_row[i] = v;
            }
            let mut cat_row = vec![Some("x".to_string()); CATEGORICAL_COLUMNS.len()];
            for (i, v) in cat.into_iter().enumerate() {
                cat_row[i] = v.map(str::to_string);
            }
            numeric.push(num_row);
            categorical.push(cat_row);
        }
        FeatureFrame {
            numeric,
            categorical,
        }
    }

    #[test]
    fn test_imputed_frames_have_no_missing_values() {
        let x_train = frame(vec![
            (vec![Some(100.0), None], vec![Some("Jakarta"), None]),
            (vec![Some(50.0), Some(40.0)], vec![Some("Bogor"), Some("SHM")]),
            (vec![None, Some(60.0)], vec![Some("Depok"), Some("HGB")]),
        ]);
        let x_test = frame(vec![(vec![None, None], vec![None, Some("SHM")])]);

        let (train, test) = impute_with_knn(&x_train, &x_test).unwrap();

        for row in train.numeric.iter().chain(test.numeric.iter()) {
            assert!(row.iter().all(|v| v.is_finite()));
        }
        for row in train.categorical.iter().chain(test.categorical.iter()) {
            assert!(row.iter().all(|v| !v.is_empty()));
        }
    }

    #[test]
    fn test_decoded_categories_come_from_observed_union() {
        let x_train = frame(vec![
            (vec![Some(1.0)], vec![Some("Jakarta")]),
            (vec![Some(2.0)], vec![Some("Bogor")]),
        ]);
        let x_test = frame(vec![(vec![Some(3.0)], vec![None])]);

        let (train, test) = impute_with_knn(&x_train, &x_test).unwrap();

        let observed: HashSet<&str> = ["Jakarta", "Bogor", "x"].into_iter().collect();
        for row in train.categorical.iter().chain(test.categorical.iter()) {
            assert!(observed.contains(row[0].as_str()));
        }
    }

    #[test]
    fn test_observed_values_are_preserved() {
        let x_train = frame(vec![
            (vec![Some(100.0)], vec![Some("Jakarta")]),
            (vec![Some(50.0)], vec![Some("Bogor")]),
        ]);
        let x_test = frame(vec![(vec![Some(77.0)], vec![Some("Bogor")])]);

        let (train, test) = impute_with_knn(&x_train, &x_test).unwrap();
        assert_eq!(train.numeric[0][0], 100.0);
        assert_eq!(train.categorical[0][0], "Jakarta");
        assert_eq!(test.numeric[0][0], 77.0);
        assert_eq!(test.categorical[0][0], "Bogor");
    }

    #[test]
    fn test_knn_imputer_fills_from_nearest_rows() {
        let train = Array2::from_shape_vec(
            (3, 2),
            vec![1.0, 10.0, 1.1, 12.0, 100.0, 500.0],
        )
        .unwrap();
        let mut imputer = KnnImputer::new(2);
        imputer.fit(&train);

        let query = Array2::from_shape_vec((1, 2), vec![1.05, f64::NAN]).unwrap();
        let filled = imputer.transform(&query).unwrap();
        // The two near rows (10.0, 12.0) fill the hole, not the far outlier.
        assert!((filled[[0, 1]] - 11.0).abs() < 1e-9);
    }
}
