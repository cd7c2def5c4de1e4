// src/modeling/selector.rs
//
// Champion-challenger selection over the two model slots. The held-out
// split is re-derived from the warehouse on every run, both models are
// scored by shuffled k-fold evaluation on it, and exactly one slot ends up
// as the incumbent.

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::artifacts;
use crate::cleaning;
use crate::config::PipelineConfig;
use crate::db::PgPool;
use crate::features::{self, gather, imputer, split, ImputedFrame};
use crate::modeling::metrics;
use crate::modeling::pipeline::PricePipeline;
use crate::warehouse;

pub const EVAL_FOLDS: usize = 3;
pub const EVAL_SEED: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalSummary {
    pub mae_mean: f64,
    pub mae_std: f64,
    pub r2_mean: f64,
    pub r2_std: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    PromoteCandidate,
    KeepIncumbent,
}

/// Scores a fitted pipeline with shuffled k-fold evaluation: each fold's
/// rows are predicted and scored independently, then the per-fold metrics
/// are summarized as mean and population standard deviation.
pub fn evaluate(
    pipeline: &PricePipeline,
    x: &ImputedFrame,
    y: &[f64],
    folds: usize,
    seed: u64,
) -> Result<EvalSummary> {
    anyhow::ensure!(
        y.len() >= folds,
        "Not enough held-out rows ({}) for {}-fold evaluation",
        y.len(),
        folds
    );

    let mut mae_scores = Vec::with_capacity(folds);
    let mut r2_scores = Vec::with_capacity(folds);
    for (fold, test_idx) in split::shuffled_kfold_indices(y.len(), folds, seed)
        .iter()
        .enumerate()
    {
        let predictions = pipeline.predict(&x.take(test_idx))?;
        let truth = gather(y, test_idx);
        let mae = metrics::mean_absolute_error(&truth, &predictions);
        let r2 = metrics::r2_score(&truth, &predictions);
        info!("Fold {} - MAE: {:.2}, R2: {:.2}", fold + 1, mae, r2);
        mae_scores.push(mae);
        r2_scores.push(r2);
    }

    Ok(EvalSummary {
        mae_mean: metrics::mean(&mae_scores),
        mae_std: metrics::std_dev(&mae_scores),
        r2_mean: metrics::mean(&r2_scores),
        r2_std: metrics::std_dev(&r2_scores),
    })
}

/// The three-tier transition rule. Lower MAE with non-worse spread wins
/// outright; when the two inequalities disagree, raw MAE decides; a full
/// tie keeps the incumbent.
pub fn decide(candidate: &EvalSummary, incumbent: &EvalSummary) -> Verdict {
    if candidate.mae_mean < incumbent.mae_mean && candidate.mae_std <= incumbent.mae_std {
        Verdict::PromoteCandidate
    } else if incumbent.mae_mean < candidate.mae_mean && incumbent.mae_std <= candidate.mae_std {
        Verdict::KeepIncumbent
    } else if candidate.mae_mean < incumbent.mae_mean {
        Verdict::PromoteCandidate
    } else {
        Verdict::KeepIncumbent
    }
}

/// Runs the full selection stage: re-derives a held-out split from the
/// warehouse, evaluates both slots and persists the winner as incumbent.
pub async fn choose_best_model(pool: &PgPool, cfg: &PipelineConfig) -> Result<Verdict> {
    warehouse::export_listings(pool, cfg).await?;
    cleaning::clean_listings(cfg)?;

    let (frame, target) = features::read_and_filter(&cfg.cleaned_path())?;
    anyhow::ensure!(!frame.is_empty(), "No cleaned rows available for evaluation");

    let (train_idx, test_idx) =
        split::train_test_indices(frame.len(), features::TEST_FRACTION, features::SPLIT_SEED);
    let x_train = frame.take(&train_idx);
    let x_test = frame.take(&test_idx);
    let (_, x_test_imputed) = imputer::impute_with_knn(&x_train, &x_test)?;
    let y_test = gather(&target, &test_idx);

    let candidate: PricePipeline = artifacts::load_json(&cfg.candidate_model_path())
        .context("Candidate model not found; run the trainer first")?;
    let incumbent: PricePipeline = artifacts::load_json(&cfg.champion_model_path())
        .context("Incumbent model not found; seed the slot by copying the candidate blob once")?;

    info!("Evaluating candidate model:");
    let candidate_eval = evaluate(&candidate, &x_test_imputed, &y_test, EVAL_FOLDS, EVAL_SEED)?;
    info!("Evaluating incumbent model:");
    let incumbent_eval = evaluate(&incumbent, &x_test_imputed, &y_test, EVAL_FOLDS, EVAL_SEED)?;

    info!(
        "Candidate - MAE: {:.2} (+/-{:.2}), R2: {:.2} (+/-{:.2})",
        candidate_eval.mae_mean,
        candidate_eval.mae_std,
        candidate_eval.r2_mean,
        candidate_eval.r2_std
    );
    info!(
        "Incumbent - MAE: {:.2} (+/-{:.2}), R2: {:.2} (+/-{:.2})",
        incumbent_eval.mae_mean,
        incumbent_eval.mae_std,
        incumbent_eval.r2_mean,
        incumbent_eval.r2_std
    );

    let verdict = decide(&candidate_eval, &incumbent_eval);
    match verdict {
        Verdict::PromoteCandidate => {
            artifacts::save_json(&cfg.champion_model_path(), &candidate)?;
            info!(
                "Candidate promoted to incumbent at {}",
                cfg.champion_model_path().display()
            );
        }
        Verdict::KeepIncumbent => {
            info!("Incumbent retains its position");
        }
    }
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(mae_mean: f64, mae_std: f64) -> EvalSummary {
        EvalSummary {
            mae_mean,
            mae_std,
            r2_mean: 0.0,
            r2_std: 0.0,
        }
    }

    #[test]
    fn test_clear_winner_is_promoted() {
        // Lower MAE and lower spread.
        assert_eq!(
            decide(&summary(2.0, 0.1), &summary(2.5, 0.2)),
            Verdict::PromoteCandidate
        );
    }

    #[test]
    fn test_clear_incumbent_win_is_kept() {
        assert_eq!(
            decide(&summary(2.5, 0.2), &summary(2.0, 0.1)),
            Verdict::KeepIncumbent
        );
    }

    #[test]
    fn test_disagreeing_tiebreak_falls_back_to_mae() {
        // Candidate has lower MAE but higher spread: raw MAE decides.
        assert_eq!(
            decide(&summary(2.0, 0.3), &summary(2.5, 0.1)),
            Verdict::PromoteCandidate
        );
        assert_eq!(
            decide(&summary(2.5, 0.1), &summary(2.0, 0.3)),
            Verdict::KeepIncumbent
        );
    }

    #[test]
    fn test_full_tie_keeps_incumbent() {
        assert_eq!(
            decide(&summary(2.0, 0.1), &summary(2.0, 0.1)),
            Verdict::KeepIncumbent
        );
    }

    #[test]
    fn test_equal_mae_different_std_keeps_incumbent() {
        // Neither strict MAE inequality holds, so tier three decides on
        // MAE alone and the tie favors the incumbent.
        assert_eq!(
            decide(&summary(2.0, 0.05), &summary(2.0, 0.5)),
            Verdict::KeepIncumbent
        );
    }
}
