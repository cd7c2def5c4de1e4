// src/cleaning/mod.rs
//
// Rule-based normalization of raw listings into canonical categories.
// The whole stage degrades instead of failing: text the rules cannot place
// becomes a missing value for the imputer, and only listings outside the
// model domain (non-metro, non-house) are dropped.

pub mod certificate;
pub mod city;
pub mod condition;
pub mod property_type;
pub mod road_width;
pub mod water_source;

use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::HashSet;

use crate::artifacts;
use crate::config::PipelineConfig;
use crate::models::{CleanedListing, RawListing};
use property_type::TypeOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleaningSummary {
    pub input_rows: usize,
    pub deduped_rows: usize,
    pub output_rows: usize,
}

/// Runs the full cleaning stage: reads the scraped CSV, de-duplicates by
/// URL, normalizes every rule-bearing field and writes `data_cleaned.csv`.
pub fn clean_listings(cfg: &PipelineConfig) -> Result<CleaningSummary> {
    let raw: Vec<RawListing> = artifacts::read_csv(&cfg.scraped_path())
        .context("Scraped listings not found; run the warehouse sync first")?;
    let input_rows = raw.len();

    let deduped = dedupe_by_url(raw);
    let deduped_rows = deduped.len();

    let cleaned: Vec<CleanedListing> = deduped.into_iter().filter_map(clean_one).collect();
    let output_rows = cleaned.len();

    artifacts::write_csv(&cfg.cleaned_path(), &cleaned)?;
    info!(
        "Cleaned {} listings ({} after URL dedup, {} scraped) into {}",
        output_rows,
        deduped_rows,
        input_rows,
        cfg.cleaned_path().display()
    );

    Ok(CleaningSummary {
        input_rows,
        deduped_rows,
        output_rows,
    })
}

/// Keeps the first occurrence of every URL.
pub fn dedupe_by_url(listings: Vec<RawListing>) -> Vec<RawListing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| seen.insert(listing.url.clone()))
        .collect()
}

/// Cleans a single listing. Returns `None` when the listing falls outside
/// the model domain: no recognizable metro, or a non-house property type.
pub fn clean_one(raw: RawListing) -> Option<CleanedListing> {
    let metro = city::classify(
        raw.city.as_deref(),
        raw.address.as_deref(),
        raw.title.as_deref(),
    );
    let metro = match metro {
        Some(metro) => metro,
        None => {
            debug!("Dropping {}: no metro match", raw.url);
            return None;
        }
    };

    let property_type = match property_type::classify(
        raw.property_type.as_deref(),
        raw.title.as_deref(),
        raw.description.as_deref(),
        raw.building_size_m2,
    ) {
        TypeOutcome::House(tier) => Some(tier.to_string()),
        TypeOutcome::Unknown => None,
        TypeOutcome::Excluded => {
            debug!("Dropping {}: not a house listing", raw.url);
            return None;
        }
    };

    Some(CleanedListing {
        url: raw.url,
        title: raw.title,
        description: raw.description.clone(),
        price_mio: raw.price.map(|p| p / 1_000_000.0),
        address: raw.address,
        city: metro.as_str().to_string(),
        land_size_m2: raw.land_size_m2,
        building_size_m2: raw.building_size_m2,
        bedroom: raw.bedroom,
        bathroom: raw.bathroom,
        garage: raw.garage,
        carport: raw.carport,
        property_type,
        certificate: certificate::classify(raw.certificate.as_deref())
            .map(|c| c.as_str().to_string()),
        voltage_watt: raw.voltage_watt,
        maid_bedroom: raw.maid_bedroom,
        maid_bathroom: raw.maid_bathroom,
        kitchen: raw.kitchen,
        dining_room: raw.dining_room,
        living_room: raw.living_room,
        furniture: raw.furniture,
        building_material: raw.building_material,
        floor_material: raw.floor_material,
        floor_level: raw.floor_level,
        house_facing: raw.house_facing,
        concept_and_style: raw.concept_and_style,
        view: raw.view,
        internet_access: raw.internet_access,
        road_width: road_width::convert(raw.road_width.as_deref()),
        year_built: raw.year_built,
        year_renovated: raw.year_renovated,
        water_source: water_source::classify(
            raw.water_source.as_deref(),
            raw.description.as_deref(),
        )
        .map(|w| w.as_str().to_string()),
        corner_property: raw.corner_property,
        property_condition: condition::classify(raw.property_condition.as_deref())
            .map(|c| c.as_str().to_string()),
        ad_type: raw.ad_type,
        ad_id: raw.ad_id,
    })
}
