// src/cleaning/water_source.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::WaterSource;

static PAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:pam|pdam|air pam|air pdam|pln pam|aetra|water treatment|palyja)\b")
        .unwrap()
});
static GROUND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:sumur|jet pump|jetpump|sumur bor|air sumur|bor|tanah|air tanah|filter|osmosis|reverse osmosis|sistem filter|pompa|submersible pump|water pump|mata air|air alami|wtp|jetpam|air jet pum|air ready|langsung dari sumbernya|air bagus|sumber air)\b",
    )
    .unwrap()
});
static MIXED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:pdam\s?\+?\s?sumur|pam\s?\+?\s?tanah|air jetpump)\b").unwrap());

/// Buckets a water-source description into PAM/PDAM, Sumber Air or
/// Gabungan. When the field itself is missing the listing description is
/// scanned instead; unmatched text stays missing.
pub fn classify(value: Option<&str>, description: Option<&str>) -> Option<WaterSource> {
    match value {
        Some(text) => match_source(text),
        None => description.and_then(match_source),
    }
}

fn match_source(text: &str) -> Option<WaterSource> {
    let lowered = text.to_lowercase();
    let lowered = lowered.trim();
    if PAM_RE.is_match(lowered) {
        Some(WaterSource::PamPdam)
    } else if GROUND_RE.is_match(lowered) {
        Some(WaterSource::SumberAir)
    } else if MIXED_RE.is_match(lowered) {
        Some(WaterSource::Gabungan)
    } else {
        None
    }
}
