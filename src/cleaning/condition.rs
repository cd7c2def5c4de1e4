// src/cleaning/condition.rs

use crate::models::Condition;

// Checked in order; "baru renovasi" must land in the renovated bucket even
// though "baru" alone marks a new unit.
const RENOVATED_KEYWORDS: [&str; 9] = [
    "renov",
    "full renov",
    "renovasi",
    "renoved",
    "renovasi baru",
    "baru renovasi",
    "finished",
    "selesai renovasi",
    "proses finishing",
];
const NEW_KEYWORDS: [&str; 9] = [
    "new",
    "brand new",
    "baru",
    "unit baru",
    "first time",
    "primery",
    "full baru",
    "baru selesai",
    "unit baru gress",
];
const NEED_RENOVATION_KEYWORDS: [&str; 7] = [
    "butuh renovasi",
    "harus renovasi",
    "setengah jadi",
    "perlu renovasi",
    "perlu perawatan",
    "lama",
    "tua",
];
const WELL_MAINTAINED_KEYWORDS: [&str; 12] = [
    "terawat",
    "siap huni",
    "bersih",
    "rapi",
    "kokoh",
    "bagus",
    "layak huni",
    "ready to move",
    "well maintained",
    "layak",
    "baik",
    "well",
];

/// Maps a free-text condition to one of four canonical buckets; unmatched
/// text stays missing for the imputer.
pub fn classify(value: Option<&str>) -> Option<Condition> {
    let lowered = value?.to_lowercase();
    let groups = [
        (Condition::Renovated, RENOVATED_KEYWORDS.as_slice()),
        (Condition::New, NEW_KEYWORDS.as_slice()),
        (Condition::NeedRenovation, NEED_RENOVATION_KEYWORDS.as_slice()),
        (Condition::WellMaintained, WELL_MAINTAINED_KEYWORDS.as_slice()),
    ];
    for (condition, keywords) in groups {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return Some(condition);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_buckets() {
        assert_eq!(classify(Some("Full Renovasi 2023")), Some(Condition::Renovated));
        assert_eq!(classify(Some("unit baru gress")), Some(Condition::New));
        assert_eq!(
            classify(Some("perlu perawatan ringan")),
            Some(Condition::NeedRenovation)
        );
        assert_eq!(classify(Some("siap huni")), Some(Condition::WellMaintained));
    }

    #[test]
    fn test_renovated_wins_over_new() {
        assert_eq!(classify(Some("baru renovasi")), Some(Condition::Renovated));
    }

    #[test]
    fn test_unmatched_or_missing_stays_missing() {
        assert_eq!(classify(Some("strategis")), None);
        assert_eq!(classify(None), None);
    }
}
