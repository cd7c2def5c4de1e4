// src/cleaning/property_type.rs

/// Keyword groups checked in order; the first group with a hit wins.
const HOUSE_KEYWORDS: [&str; 3] = ["rumah", "house", "mansion"];
const RENTAL_KEYWORDS: [&str; 6] = [
    "apartment",
    "apartmen",
    "apartement",
    "apartemen",
    "kos",
    "kost",
];
const COMMERCIAL_KEYWORDS: [&str; 8] = [
    "pabrik",
    "kantor",
    "office",
    "ruko",
    "ruang usaha",
    "kios",
    "kiosk",
    "gudang",
];
const LAND_KEYWORDS: [&str; 4] = ["tanah", "lahan", "kavling", "gedung"];

pub const UNKNOWN_SIZE_TIER: &str = "Rumah Tipe Tidak Diketahui";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    House,
    Rental,
    Commercial,
    Land,
}

/// Outcome of property-type normalization for a single listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOutcome {
    /// A house, re-bucketed into a size tier label.
    House(&'static str),
    /// No keyword group matched anywhere; the field stays missing and is
    /// imputed downstream.
    Unknown,
    /// Rental unit, commercial space or land: outside the model domain,
    /// the listing is dropped.
    Excluded,
}

/// Classifies a listing by checking the property_type field, then the
/// title, then the description. House rows are tiered by building size.
pub fn classify(
    property_type: Option<&str>,
    title: Option<&str>,
    description: Option<&str>,
    building_size_m2: Option<f64>,
) -> TypeOutcome {
    let category = [property_type, title, description]
        .into_iter()
        .flatten()
        .find_map(match_category);

    match category {
        None => TypeOutcome::Unknown,
        Some(Category::House) => TypeOutcome::House(size_tier(building_size_m2)),
        Some(_) => TypeOutcome::Excluded,
    }
}

fn match_category(text: &str) -> Option<Category> {
    let lowered = text.to_lowercase();
    let lowered = lowered.trim();
    let groups = [
        (Category::House, HOUSE_KEYWORDS.as_slice()),
        (Category::Rental, RENTAL_KEYWORDS.as_slice()),
        (Category::Commercial, COMMERCIAL_KEYWORDS.as_slice()),
        (Category::Land, LAND_KEYWORDS.as_slice()),
    ];
    for (category, keywords) in groups {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return Some(category);
        }
    }
    None
}

/// Buckets a house into one of the 8 fixed size tiers.
pub fn size_tier(building_size_m2: Option<f64>) -> &'static str {
    let size = match building_size_m2 {
        Some(size) => size,
        None => return UNKNOWN_SIZE_TIER,
    };
    if size <= 21.0 {
        "Rumah Tipe 21"
    } else if size <= 36.0 {
        "Rumah Tipe 36"
    } else if size <= 45.0 {
        "Rumah Tipe 45"
    } else if size <= 54.0 {
        "Rumah Tipe 54"
    } else if size <= 60.0 {
        "Rumah Tipe 60"
    } else if size <= 70.0 {
        "Rumah Tipe 70"
    } else if size <= 120.0 {
        "Rumah Tipe 120"
    } else {
        "Rumah Tipe >120"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_house_is_tiered_by_building_size() {
        assert_eq!(
            classify(Some("Rumah minimalis 2 lantai"), None, None, Some(40.0)),
            TypeOutcome::House("Rumah Tipe 45")
        );
        assert_eq!(
            classify(Some("rumah"), None, None, Some(21.0)),
            TypeOutcome::House("Rumah Tipe 21")
        );
        assert_eq!(
            classify(Some("rumah"), None, None, Some(500.0)),
            TypeOutcome::House("Rumah Tipe >120")
        );
        assert_eq!(
            classify(Some("rumah"), None, None, None),
            TypeOutcome::House(UNKNOWN_SIZE_TIER)
        );
    }

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        assert_eq!(size_tier(Some(36.0)), "Rumah Tipe 36");
        assert_eq!(size_tier(Some(36.1)), "Rumah Tipe 45");
        assert_eq!(size_tier(Some(120.0)), "Rumah Tipe 120");
        assert_eq!(size_tier(Some(120.5)), "Rumah Tipe >120");
    }

    #[test]
    fn test_non_house_categories_are_excluded() {
        assert_eq!(
            classify(Some("Apartemen studio"), None, None, Some(30.0)),
            TypeOutcome::Excluded
        );
        assert_eq!(
            classify(Some("Ruko 3 lantai"), None, None, None),
            TypeOutcome::Excluded
        );
        assert_eq!(
            classify(Some("Tanah kavling siap bangun"), None, None, None),
            TypeOutcome::Excluded
        );
    }

    #[test]
    fn test_title_and_description_fallback() {
        assert_eq!(
            classify(None, Some("Dijual House Mewah"), None, Some(100.0)),
            TypeOutcome::House("Rumah Tipe 120")
        );
        assert_eq!(
            classify(None, None, Some("gudang luas dekat tol"), None),
            TypeOutcome::Excluded
        );
    }

    #[test]
    fn test_unmatched_text_stays_unknown() {
        assert_eq!(classify(Some("villa"), None, None, None), TypeOutcome::Unknown);
        assert_eq!(classify(None, None, None, Some(40.0)), TypeOutcome::Unknown);
    }

    #[test]
    fn test_house_group_wins_over_land_group() {
        // "rumah" and "tanah" both present: the house group is checked first.
        assert_eq!(
            classify(Some("rumah dengan tanah luas"), None, None, Some(50.0)),
            TypeOutcome::House("Rumah Tipe 54")
        );
    }
}
