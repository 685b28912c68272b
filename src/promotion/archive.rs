//! Archive naming
//!
//! The previous production service survives a replacement under a
//! deterministic archive name so it can be found again, marked deprecated,
//! and unprotected. The name must be identifier-safe: no spaces.

/// `ARCHIVED_<target name>_<datestamp>`, with any stray spaces collapsed to
/// underscores.
pub fn archive_name(target_name: &str, datestamp: &str) -> String {
    format!("ARCHIVED_{}_{}", target_name, datestamp).replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_name_is_deterministic() {
        assert_eq!(
            archive_name("Vector_Tiles", "20260825_0905"),
            "ARCHIVED_Vector_Tiles_20260825_0905"
        );
        assert_eq!(
            archive_name("Vector_Tiles", "20260825_0905"),
            archive_name("Vector_Tiles", "20260825_0905"),
        );
    }

    #[test]
    fn test_archive_name_never_contains_spaces() {
        let name = archive_name("Contour 40", "20260825 0905");
        assert!(!name.contains(' '));
        assert_eq!(name, "ARCHIVED_Contour_40_20260825_0905");
    }
}
