// src/cleaning/road_width.rs

use once_cell::sync::Lazy;
use regex::Regex;

static METER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+\.?\d*)\s?(meter|mtr)").unwrap());

// Car-count idioms mapped to meter estimates, checked in order. Earlier
// entries shadow later ones ("lebih dari 4 mobil" resolves at the 4-car
// entry, "super lebar" at the generic "lebar" entry), matching the
// long-standing behavior of the rule table.
const ONE_CAR: [&str; 4] = ["1 mobil", "1mobil", "1 mbl", "1 arah mobil"];
const TWO_CAR: [&str; 11] = [
    "2 mobil",
    "2 mobil lega",
    "2-3 mobil",
    "2 mobil pas",
    "2 mbl",
    "akses jalan 2 mobil",
    "2 mobil 2 arah",
    "row jalan 2 mobil",
    "2.5 mobil",
    "2mob",
    "2row",
];
const THREE_CAR: [&str; 7] = [
    "3 mobil",
    "3 row",
    "3 mbl",
    "jalan 3 mobil",
    "row jalan 3 mobil",
    "3 mobil lebih",
    "3mob",
];
const FOUR_CAR: [&str; 2] = ["4 mobil", "4 mbl"];
const MANY_CAR: [&str; 5] = ["5 mobil", "6 mobil", "7 mobil", "8 mobil", "lebih dari 4 mobil"];
const WIDE_ACCESS: [&str; 4] = ["lebar", "besar", "akses jalan", "jalan besar"];

/// Converts a free-text road width to a meter estimate. An explicit
/// "N meter"/"N mtr" mention wins; otherwise car-count idioms map to fixed
/// widths. Unmapped text yields missing, never an error.
pub fn convert(value: Option<&str>) -> Option<f64> {
    let lowered = value?.to_lowercase();

    if lowered.contains("meter") || lowered.contains("mtr") {
        if let Some(caps) = METER_RE.captures(&lowered) {
            if let Ok(width) = caps[1].parse::<f64>() {
                return Some(width);
            }
        }
    }

    let idioms: [(&[&str], f64); 6] = [
        (ONE_CAR.as_slice(), 2.5),
        (TWO_CAR.as_slice(), 5.0),
        (THREE_CAR.as_slice(), 7.5),
        (FOUR_CAR.as_slice(), 10.0),
        (MANY_CAR.as_slice(), 12.0),
        (WIDE_ACCESS.as_slice(), 5.0),
    ];
    for (keywords, width) in idioms {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return Some(width);
        }
    }

    if lowered.contains("super lebar") {
        return Some(15.0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_meter_value_is_captured() {
        assert_eq!(convert(Some("6 meter")), Some(6.0));
        assert_eq!(convert(Some("Lebar jalan 3.5 mtr")), Some(3.5));
        assert_eq!(convert(Some("10meter")), Some(10.0));
    }

    #[test]
    fn test_meter_path_is_idempotent() {
        // A value that already went through conversion re-parses to itself.
        let first = convert(Some("7.5 meter")).unwrap();
        let second = convert(Some(&format!("{first} meter"))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_car_count_idioms() {
        assert_eq!(convert(Some("muat 1 mobil")), Some(2.5));
        assert_eq!(convert(Some("2 mobil pas")), Some(5.0));
        assert_eq!(convert(Some("row jalan 3 mobil")), Some(7.5));
        assert_eq!(convert(Some("4 mobil")), Some(10.0));
        assert_eq!(convert(Some("5 mobil")), Some(12.0));
    }

    #[test]
    fn test_two_three_idiom_lands_in_two_car_bucket() {
        assert_eq!(convert(Some("2-3 mobil")), Some(5.0));
    }

    #[test]
    fn test_wide_access_idioms() {
        assert_eq!(convert(Some("jalan besar")), Some(5.0));
        assert_eq!(convert(Some("akses jalan luas")), Some(5.0));
        // The generic "lebar" entry shadows "super lebar".
        assert_eq!(convert(Some("super lebar")), Some(5.0));
    }

    #[test]
    fn test_unmapped_text_yields_missing() {
        assert_eq!(convert(Some("jalan kampung")), None);
        assert_eq!(convert(None), None);
    }
}
