// src/results.rs

use anyhow::Result;
use chrono::NaiveDateTime;
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::modeling::selector::Verdict;
use crate::modeling::trainer::TrainingReport;

/// Per-run accounting written out as a JSON report next to the data files.
#[derive(Debug, Serialize)]
pub struct PipelineStats {
    pub run_id: String,
    pub run_timestamp: NaiveDateTime,
    pub description: Option<String>,
    pub links_collected: usize,
    pub listings_scraped: usize,
    pub rows_synced: u64,
    pub rows_cleaned: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub training: Option<TrainingReport>,
    pub selection: Option<Verdict>,
    pub phase_seconds: BTreeMap<String, f64>,
    pub total_seconds: f64,
}

impl PipelineStats {
    pub fn new(run_id: String, run_timestamp: NaiveDateTime, description: Option<String>) -> Self {
        Self {
            run_id,
            run_timestamp,
            description,
            links_collected: 0,
            listings_scraped: 0,
            rows_synced: 0,
            rows_cleaned: 0,
            train_rows: 0,
            test_rows: 0,
            training: None,
            selection: None,
            phase_seconds: BTreeMap::new(),
            total_seconds: 0.0,
        }
    }

    pub fn record_phase(&mut self, name: &str, elapsed: Duration) {
        self.phase_seconds
            .insert(name.to_string(), elapsed.as_secs_f64());
    }
}

pub fn generate_report(cfg: &PipelineConfig, stats: &PipelineStats) -> Result<PathBuf> {
    let path = cfg.report_path(&stats.run_id);
    crate::artifacts::save_json(&path, stats)?;
    info!("Run report written to {}", path.display());
    Ok(path)
}
