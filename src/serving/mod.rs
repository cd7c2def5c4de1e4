// src/serving/mod.rs
//
// The interactive price-estimate form. Stateless: every submission loads
// the incumbent model blob fresh, builds a single-row feature frame and
// renders one prediction (or a degradation message).

use anyhow::{Context, Result};
use askama::Template;
use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Form, Router,
};
use log::{error, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;

use crate::artifacts;
use crate::config::PipelineConfig;
use crate::features::ImputedFrame;
use crate::modeling::pipeline::PricePipeline;

#[derive(Clone)]
pub struct AppState {
    pub model_path: PathBuf,
}

/// The 19 feature fields a user fills in, mirroring the model's columns.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictForm {
    pub land_size_m2: f64,
    pub building_size_m2: f64,
    pub road_width: f64,
    pub bedroom: f64,
    pub bathroom: f64,
    pub carport: f64,
    pub kitchen: f64,
    pub city: String,
    pub property_type: String,
    pub certificate: String,
    pub water_source: String,
    pub furniture: String,
    pub house_facing: String,
    pub maid_bedroom: f64,
    pub property_condition: String,
    pub floor_level: f64,
    pub garage: f64,
    pub maid_bathroom: f64,
    pub voltage_watt: f64,
}

#[derive(Template)]
#[template(path = "form.html")]
struct FormTemplate {
    result: Option<String>,
    error: Option<String>,
}

/// Builds the single-row feature frame in the model's column order.
pub fn input_frame(input: &PredictForm) -> ImputedFrame {
    ImputedFrame {
        numeric: vec![vec![
            input.land_size_m2,
            input.building_size_m2,
            input.road_width,
            input.maid_bedroom,
            input.maid_bathroom,
            input.kitchen,
            input.floor_level,
            input.bedroom,
            input.bathroom,
            input.garage,
            input.carport,
            input.voltage_watt,
        ]],
        categorical: vec![vec![
            input.city.clone(),
            input.property_type.clone(),
            input.certificate.clone(),
            input.furniture.clone(),
            input.house_facing.clone(),
            input.water_source.clone(),
            input.property_condition.clone(),
        ]],
    }
}

/// Loads the incumbent model and predicts one price in millions.
pub fn predict_price(model_path: &Path, input: &PredictForm) -> Result<f64> {
    let pipeline: PricePipeline = artifacts::load_json(model_path)?;
    let predictions = pipeline.predict(&input_frame(input))?;
    predictions
        .first()
        .copied()
        .context("Model returned no prediction")
}

async fn show_form() -> Html<String> {
    render(&FormTemplate {
        result: None,
        error: None,
    })
}

async fn predict(State(state): State<AppState>, Form(input): Form<PredictForm>) -> Html<String> {
    if !state.model_path.exists() {
        return render(&FormTemplate {
            result: None,
            error: Some(
                "Model file not found. Please ensure the model file exists.".to_string(),
            ),
        });
    }

    match predict_price(&state.model_path, &input) {
        Ok(price) => render(&FormTemplate {
            result: Some(format!("Predicted Price: Rp {price:.2} Million")),
            error: None,
        }),
        Err(e) => {
            error!("Prediction failed: {:#}", e);
            render(&FormTemplate {
                result: None,
                error: Some("An error occurred while predicting. Please try again.".to_string()),
            })
        }
    }
}

fn render(template: &FormTemplate) -> Html<String> {
    match template.render() {
        Ok(body) => Html(body),
        Err(e) => {
            error!("Template rendering failed: {}", e);
            Html("<h1>Internal error</h1>".to_string())
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form))
        .route("/predict", post(predict))
        .with_state(state)
}

/// Binds the form server and runs until shutdown.
pub async fn serve(cfg: &PipelineConfig) -> Result<()> {
    let state = AppState {
        model_path: cfg.champion_model_path(),
    };
    let listener = TcpListener::bind(&cfg.serve_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.serve_addr))?;
    info!("Serving prediction form on http://{}", cfg.serve_addr);
    axum::serve(listener, router(state))
        .await
        .context("Form server terminated")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
    use crate::modeling::pipeline::{ForestParams, PricePipeline};

    fn sample_form() -> PredictForm {
        PredictForm {
            land_size_m2: 90.0,
            building_size_m2: 45.0,
            road_width: 5.0,
            bedroom: 3.0,
            bathroom: 2.0,
            carport: 1.0,
            kitchen: 1.0,
            city: "Depok".to_string(),
            property_type: "Rumah Tipe 45".to_string(),
            certificate: "SHM".to_string(),
            water_source: "PAM/PDAM".to_string(),
            furniture: "Unfurnished".to_string(),
            house_facing: "North".to_string(),
            maid_bedroom: 0.0,
            property_condition: "Well Maintained".to_string(),
            floor_level: 1.0,
            garage: 0.0,
            maid_bathroom: 0.0,
            voltage_watt: 2200.0,
        }
    }

    #[test]
    fn test_input_frame_follows_feature_column_order() {
        let frame = input_frame(&sample_form());
        assert_eq!(frame.numeric[0].len(), NUMERIC_COLUMNS.len());
        assert_eq!(frame.categorical[0].len(), CATEGORICAL_COLUMNS.len());
        // land_size, building_size, road_width lead the numeric block.
        assert_eq!(&frame.numeric[0][..3], &[90.0, 45.0, 5.0]);
        // voltage_watt closes it.
        assert_eq!(frame.numeric[0][11], 2200.0);
        assert_eq!(frame.categorical[0][0], "Depok");
        assert_eq!(frame.categorical[0][6], "Well Maintained");
    }

    #[test]
    fn test_predict_price_with_persisted_model() {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        let mut target = Vec::new();
        for i in 0..20 {
            let mut num = vec![0.0; NUMERIC_COLUMNS.len()];
            num[0] = 50.0 + i as f64 * 5.0;
            numeric.push(num);
            categorical.push(vec!["x".to_string(); CATEGORICAL_COLUMNS.len()]);
            target.push(1000.0 + i as f64 * 50.0);
        }
        let frame = ImputedFrame {
            numeric,
            categorical,
        };
        let mut pipeline = PricePipeline::with_params(ForestParams {
            n_trees: 10,
            ..ForestParams::default()
        });
        pipeline.fit(&frame, &target).unwrap();

        let dir = std::env::temp_dir().join("house_prediction_serving_test");
        let model_path = dir.join("best_model_ever.json");
        artifacts::save_json(&model_path, &pipeline).unwrap();

        let price = predict_price(&model_path, &sample_form()).unwrap();
        assert!(price.is_finite());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_predict_price_missing_model_errors() {
        let missing = std::env::temp_dir().join("house_prediction_no_such_model.json");
        assert!(predict_price(&missing, &sample_form()).is_err());
    }
}
