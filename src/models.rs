// src/models.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of `link_properties.csv`, as produced by the link collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingLink {
    pub property_title: String,
    pub property_url: String,
}

/// A listing as extracted from a rendered page, one row of
/// `Property_Scraping.csv` and of `house_prediction_table`.
///
/// Every field except the URL comes out of the language-model extraction
/// step and is therefore unvalidated: numbers may be absent, strings may be
/// filler like "Not Specified". Cleaning re-derives canonical values from
/// this record and never mutates it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub land_size_m2: Option<f64>,
    pub building_size_m2: Option<f64>,
    pub bedroom: Option<f64>,
    pub bathroom: Option<f64>,
    pub garage: Option<f64>,
    pub carport: Option<f64>,
    pub property_type: Option<String>,
    pub certificate: Option<String>,
    pub voltage_watt: Option<f64>,
    pub maid_bedroom: Option<f64>,
    pub maid_bathroom: Option<f64>,
    pub kitchen: Option<f64>,
    pub dining_room: Option<f64>,
    pub living_room: Option<f64>,
    pub furniture: Option<String>,
    pub building_material: Option<String>,
    pub floor_material: Option<String>,
    pub floor_level: Option<f64>,
    pub house_facing: Option<String>,
    pub concept_and_style: Option<String>,
    pub view: Option<String>,
    pub internet_access: Option<String>,
    pub road_width: Option<String>,
    pub year_built: Option<f64>,
    pub year_renovated: Option<f64>,
    pub water_source: Option<String>,
    pub corner_property: Option<bool>,
    pub property_condition: Option<String>,
    pub ad_type: Option<String>,
    pub ad_id: Option<String>,
}

impl RawListing {
    /// Builds a listing from the JSON object returned by the extraction
    /// model. The reply is untrusted: numeric fields may arrive as strings,
    /// strings may be empty, and any field may be null or missing. Anything
    /// that does not parse degrades to `None`.
    pub fn from_extracted(value: &Value, url: &str) -> Self {
        Self {
            url: url.to_string(),
            title: text_field(value, "title"),
            description: text_field(value, "description"),
            price: number_field(value, "price"),
            address: text_field(value, "address"),
            city: text_field(value, "city"),
            land_size_m2: number_field(value, "land_size_m2"),
            building_size_m2: number_field(value, "building_size_m2"),
            bedroom: number_field(value, "bedroom"),
            bathroom: number_field(value, "bathroom"),
            garage: number_field(value, "garage"),
            carport: number_field(value, "carport"),
            property_type: text_field(value, "property_type"),
            certificate: text_field(value, "certificate"),
            voltage_watt: number_field(value, "voltage_watt"),
            maid_bedroom: number_field(value, "maid_bedroom"),
            maid_bathroom: number_field(value, "maid_bathroom"),
            kitchen: number_field(value, "kitchen"),
            dining_room: number_field(value, "dining_room"),
            living_room: number_field(value, "living_room"),
            furniture: text_field(value, "furniture"),
            building_material: text_field(value, "building_material"),
            floor_material: text_field(value, "floor_material"),
            floor_level: number_field(value, "floor_level"),
            house_facing: text_field(value, "house_facing"),
            concept_and_style: text_field(value, "concept_and_style"),
            view: text_field(value, "view"),
            internet_access: text_field(value, "internet_access"),
            road_width: text_field(value, "road_width"),
            year_built: number_field(value, "year_built"),
            year_renovated: number_field(value, "year_renovated"),
            water_source: text_field(value, "water_source"),
            corner_property: bool_field(value, "corner_property"),
            property_condition: text_field(value, "property_condition"),
            ad_type: text_field(value, "ad_type"),
            ad_id: text_field(value, "ad_id"),
        }
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn bool_field(value: &Value, key: &str) -> Option<bool> {
    match value.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "ya" => Some(true),
            "false" | "no" | "tidak" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A raw listing after the cleaning stage, one row of `data_cleaned.csv`.
///
/// `price_mio` is the price rescaled to millions, `city` is one of the five
/// canonical metro names, `road_width` has been converted to meters, and the
/// remaining normalized fields carry canonical category labels (or stay
/// missing for the imputer to fill).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedListing {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_mio: Option<f64>,
    pub address: Option<String>,
    pub city: String,
    pub land_size_m2: Option<f64>,
    pub building_size_m2: Option<f64>,
    pub bedroom: Option<f64>,
    pub bathroom: Option<f64>,
    pub garage: Option<f64>,
    pub carport: Option<f64>,
    pub property_type: Option<String>,
    pub certificate: Option<String>,
    pub voltage_watt: Option<f64>,
    pub maid_bedroom: Option<f64>,
    pub maid_bathroom: Option<f64>,
    pub kitchen: Option<f64>,
    pub dining_room: Option<f64>,
    pub living_room: Option<f64>,
    pub furniture: Option<String>,
    pub building_material: Option<String>,
    pub floor_material: Option<String>,
    pub floor_level: Option<f64>,
    pub house_facing: Option<String>,
    pub concept_and_style: Option<String>,
    pub view: Option<String>,
    pub internet_access: Option<String>,
    pub road_width: Option<f64>,
    pub year_built: Option<f64>,
    pub year_renovated: Option<f64>,
    pub water_source: Option<String>,
    pub corner_property: Option<bool>,
    pub property_condition: Option<String>,
    pub ad_type: Option<String>,
    pub ad_id: Option<String>,
}

/// The five metro areas the model covers. Listings outside these are
/// dropped during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metro {
    Jakarta,
    Bogor,
    Depok,
    Tangerang,
    Bekasi,
}

impl Metro {
    /// Match priority order: the first keyword found in a text wins.
    pub const ALL: [Metro; 5] = [
        Metro::Jakarta,
        Metro::Bogor,
        Metro::Depok,
        Metro::Tangerang,
        Metro::Bekasi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metro::Jakarta => "Jakarta",
            Metro::Bogor => "Bogor",
            Metro::Depok => "Depok",
            Metro::Tangerang => "Tangerang",
            Metro::Bekasi => "Bekasi",
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Metro::Jakarta => "jakarta",
            Metro::Bogor => "bogor",
            Metro::Depok => "depok",
            Metro::Tangerang => "tangerang",
            Metro::Bekasi => "bekasi",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Certificate {
    Shm,
    Hgb,
    Other,
}

impl Certificate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Certificate::Shm => "SHM",
            Certificate::Hgb => "HGB",
            Certificate::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Renovated,
    New,
    NeedRenovation,
    WellMaintained,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Renovated => "Renovated",
            Condition::New => "New",
            Condition::NeedRenovation => "Need Renovation",
            Condition::WellMaintained => "Well Maintained",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterSource {
    PamPdam,
    SumberAir,
    Gabungan,
}

impl WaterSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterSource::PamPdam => "PAM/PDAM",
            WaterSource::SumberAir => "Sumber Air",
            WaterSource::Gabungan => "Gabungan",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracted_listing_parses_lenient_values() {
        let value = json!({
            "title": "Rumah Minimalis",
            "price": "1500000000",
            "land_size_m2": 90,
            "building_size_m2": null,
            "voltage_watt": "Not Specified",
            "corner_property": "true",
            "certificate": "SHM - Sertifikat Hak Milik"
        });
        let listing = RawListing::from_extracted(&value, "https://example.com/p/1");

        assert_eq!(listing.url, "https://example.com/p/1");
        assert_eq!(listing.title.as_deref(), Some("Rumah Minimalis"));
        assert_eq!(listing.price, Some(1_500_000_000.0));
        assert_eq!(listing.land_size_m2, Some(90.0));
        assert_eq!(listing.building_size_m2, None);
        assert_eq!(listing.voltage_watt, None);
        assert_eq!(listing.corner_property, Some(true));
        assert_eq!(
            listing.certificate.as_deref(),
            Some("SHM - Sertifikat Hak Milik")
        );
    }

    #[test]
    fn test_extracted_listing_missing_fields_stay_missing() {
        let listing = RawListing::from_extracted(&json!({}), "https://example.com/p/2");
        assert_eq!(listing.price, None);
        assert_eq!(listing.title, None);
        assert_eq!(listing.corner_property, None);
    }
}
