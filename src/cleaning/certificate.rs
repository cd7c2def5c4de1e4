// src/cleaning/certificate.rs

use crate::models::Certificate;

/// Collapses free-text certificate values to SHM, HGB or Other. The
/// acronyms are matched case-sensitively, as they are written in listings.
/// Missing stays missing.
pub fn classify(value: Option<&str>) -> Option<Certificate> {
    let value = value?;
    if value.contains("SHM") {
        Some(Certificate::Shm)
    } else if value.contains("HGB") {
        Some(Certificate::Hgb)
    } else {
        Some(Certificate::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_acronyms() {
        assert_eq!(
            classify(Some("SHM - Sertifikat Hak Milik")),
            Some(Certificate::Shm)
        );
        assert_eq!(
            classify(Some("HGB - Hak Guna Bangunan")),
            Some(Certificate::Hgb)
        );
    }

    #[test]
    fn test_unrecognized_certificate_becomes_other() {
        assert_eq!(classify(Some("Girik")), Some(Certificate::Other));
        assert_eq!(classify(Some("Not Specified")), Some(Certificate::Other));
    }

    #[test]
    fn test_missing_certificate_stays_missing() {
        assert_eq!(classify(None), None);
    }
}
