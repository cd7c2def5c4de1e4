// src/cleaning/city.rs

use crate::models::Metro;

/// Resolves the canonical metro for a listing, checking the city field
/// first, then the address, then the listing title. Free-text city values
/// like "Cilandak, Jakarta Selatan, DKI Jakarta" carry the metro in their
/// second comma-separated segment, so that segment is preferred when
/// present. Listings that match none of the five metros fall outside the
/// modeled area and are dropped by the caller.
pub fn classify(
    city: Option<&str>,
    address: Option<&str>,
    title: Option<&str>,
) -> Option<Metro> {
    let city_text = city.map(second_segment);
    for field in [city_text, address, title] {
        if let Some(text) = field {
            if let Some(metro) = find_metro(text) {
                return Some(metro);
            }
        }
    }
    None
}

/// "Cilandak, Jakarta Selatan, DKI Jakarta" -> "Jakarta Selatan".
/// Values without a ", " separator are returned unchanged.
fn second_segment(value: &str) -> &str {
    match value.split_once(", ") {
        Some((_, rest)) => rest.split(", ").next().unwrap_or(rest),
        None => value,
    }
}

fn find_metro(text: &str) -> Option<Metro> {
    let lowered = text.to_lowercase();
    Metro::ALL
        .into_iter()
        .find(|metro| lowered.contains(metro.keyword()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_second_segment_wins() {
        assert_eq!(
            classify(Some("Cilandak, Jakarta Selatan, DKI Jakarta"), None, None),
            Some(Metro::Jakarta)
        );
        assert_eq!(
            classify(Some("Sawangan, Depok"), None, None),
            Some(Metro::Depok)
        );
    }

    #[test]
    fn test_plain_city_value_matches_directly() {
        assert_eq!(classify(Some("BEKASI"), None, None), Some(Metro::Bekasi));
    }

    #[test]
    fn test_address_fallback_when_city_missing() {
        assert_eq!(
            classify(None, Some("Jl. Margonda Raya, Depok"), None),
            Some(Metro::Depok)
        );
    }

    #[test]
    fn test_title_fallback_last() {
        assert_eq!(
            classify(None, None, Some("Rumah murah di Tangerang Selatan")),
            Some(Metro::Tangerang)
        );
    }

    #[test]
    fn test_city_field_has_priority_over_address() {
        assert_eq!(
            classify(Some("Kota Bogor"), Some("dekat stasiun Jakarta"), None),
            Some(Metro::Bogor)
        );
    }

    #[test]
    fn test_unmatched_text_yields_none() {
        assert_eq!(classify(Some("Bandung"), Some("Surabaya"), Some("Rumah")), None);
        assert_eq!(classify(None, None, None), None);
    }
}
