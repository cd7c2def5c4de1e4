// src/main.rs
use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use std::time::Instant;
use uuid::Uuid;

use house_prediction_lib::{
    cleaning, config,
    config::PipelineConfig,
    db::{self, PgPool},
    features, modeling, results, scrape, warehouse,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    info!("Starting house price prediction pipeline");
    let start_time = Instant::now();

    config::try_load_dotenv();
    let cfg = PipelineConfig::from_env();
    std::fs::create_dir_all(&cfg.data_dir)
        .with_context(|| format!("Failed to create {}", cfg.data_dir.display()))?;

    let pool = db::connect()
        .await
        .context("Failed to connect to database")?;
    info!("Successfully connected to the database");

    let mut stats = run_pipeline(&pool, &cfg).await?;
    stats.total_seconds = start_time.elapsed().as_secs_f64();
    info!(
        "Pipeline completed in {:.2?}. Collected: {} links, {} listings scraped, {} rows cleaned, {} train / {} test rows",
        start_time.elapsed(),
        stats.links_collected,
        stats.listings_scraped,
        stats.rows_cleaned,
        stats.train_rows,
        stats.test_rows
    );

    results::generate_report(&cfg, &stats)?;
    Ok(())
}

async fn run_pipeline(pool: &PgPool, cfg: &PipelineConfig) -> Result<results::PipelineStats> {
    let run_id = Uuid::new_v4().to_string();
    let run_timestamp = Utc::now().naive_utc();
    let description = Some("Monthly batch run".to_string());
    let mut stats = results::PipelineStats::new(run_id, run_timestamp, description);

    info!("Pipeline started. Progress: [0/7] phases (0%)");

    // Phase 1: Link collection
    let phase_start = Instant::now();
    stats.links_collected = scrape::links::collect_links(cfg).await?;
    stats.record_phase("link_collection", phase_start.elapsed());
    info!(
        "Collected {} links in {:.2?}. Pipeline progress: [1/7] phases",
        stats.links_collected,
        phase_start.elapsed()
    );

    // Phase 2: Content fetching and extraction
    let phase_start = Instant::now();
    stats.listings_scraped = scrape::listings::scrape_listings(cfg).await?;
    stats.record_phase("content_fetching", phase_start.elapsed());
    info!(
        "Scraped {} listings in {:.2?}. Pipeline progress: [2/7] phases",
        stats.listings_scraped,
        phase_start.elapsed()
    );

    // Phase 3: Warehouse sync
    let phase_start = Instant::now();
    let (synced, _exported) = warehouse::sync_from_csv(pool, cfg).await?;
    stats.rows_synced = synced;
    stats.record_phase("warehouse_sync", phase_start.elapsed());
    info!(
        "Synced {} rows in {:.2?}. Pipeline progress: [3/7] phases",
        synced,
        phase_start.elapsed()
    );

    // Phase 4: Cleaning
    let phase_start = Instant::now();
    let cleaning_summary = cleaning::clean_listings(cfg)?;
    stats.rows_cleaned = cleaning_summary.output_rows;
    stats.record_phase("cleaning", phase_start.elapsed());
    info!(
        "Cleaned {} rows in {:.2?}. Pipeline progress: [4/7] phases",
        cleaning_summary.output_rows,
        phase_start.elapsed()
    );

    // Phase 5: Feature engineering
    let phase_start = Instant::now();
    let feature_summary = features::engineer_features(cfg)?;
    stats.train_rows = feature_summary.train_rows;
    stats.test_rows = feature_summary.test_rows;
    stats.record_phase("feature_engineering", phase_start.elapsed());
    info!(
        "Engineered features for {} rows in {:.2?}. Pipeline progress: [5/7] phases",
        feature_summary.rows,
        phase_start.elapsed()
    );

    // Phase 6: Model training
    let phase_start = Instant::now();
    let report = modeling::trainer::train_candidate(cfg)?;
    stats.record_phase("training", phase_start.elapsed());
    info!(
        "Trained candidate (test MAE {:.2}) in {:.2?}. Pipeline progress: [6/7] phases",
        report.test_mae,
        phase_start.elapsed()
    );
    stats.training = Some(report);

    // Phase 7: Champion selection
    let phase_start = Instant::now();
    let verdict = modeling::selector::choose_best_model(pool, cfg).await?;
    stats.selection = Some(verdict);
    stats.record_phase("champion_selection", phase_start.elapsed());
    info!(
        "Champion selection finished ({:?}) in {:.2?}. Pipeline progress: [7/7] phases",
        verdict,
        phase_start.elapsed()
    );

    Ok(stats)
}
