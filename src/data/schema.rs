use thiserror::Error;

// ---------------------------------------------------------------------------
// Canonical schema – single source of truth for column resolution
// ---------------------------------------------------------------------------

/// Candidate header spellings per canonical field.
///
/// Source files come in two flavours: the original Korean export
/// (학교명, 학교급, …) and re-exported English variants. The loader probes
/// the candidates in order and binds the first match; the rest of the crate
/// only ever sees the canonical field.
pub mod columns {
    pub const NAME: &[&str] = &["학교명", "name", "school_name"];
    pub const LEVEL: &[&str] = &["학교급", "level", "school_level"];
    pub const FOUNDER_TYPE: &[&str] = &["설립별", "founder_type", "founder"];
    pub const REGION: &[&str] = &["시군명", "시군", "region"];
    pub const SUBREGION: &[&str] = &["읍면동", "subregion", "district"];
    pub const STUDENT_COUNT: &[&str] = &["학생수", "student_count", "students"];
    pub const CLASS_COUNT: &[&str] = &["학급수", "class_count", "classes"];
    // Optional columns – absence disables only their own filter.
    pub const STATUS: &[&str] = &["신설휴원", "status"];
    pub const YEAR: &[&str] = &["연도", "년도", "year", "YEAR"];
}

// ---------------------------------------------------------------------------
// Status vocabulary
// ---------------------------------------------------------------------------

/// Bucket label for rows whose status (or other grouping key) is missing.
pub const UNSPECIFIED: &str = "unspecified";

/// Substring markers identifying newly-opened institutions. A status cell
/// may carry qualifiers ("신설(3월)", "newly-opened"), so matching is
/// case-insensitive containment, never equality.
pub const NEW_MARKERS: &[&str] = &["신설", "new"];

/// Substring markers identifying suspended institutions.
pub const SUSPENDED_MARKERS: &[&str] = &["휴원", "suspend"];

/// True when a status value carries any of the given markers.
pub fn status_matches(status: &str, markers: &[&str]) -> bool {
    let status = status.to_lowercase();
    markers.iter().any(|m| status.contains(&m.to_lowercase()))
}

// ---------------------------------------------------------------------------
// Load-time errors
// ---------------------------------------------------------------------------

/// A required column that could not be resolved against the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    /// Canonical field name.
    pub field: &'static str,
    /// Spellings that were probed, in order.
    pub candidates: &'static [&'static str],
}

impl std::fmt::Display for MissingColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' (tried {:?})", self.field, self.candidates)
    }
}

/// Errors surfaced by the loader. Schema problems name every missing
/// required column; they are never collapsed into an empty dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("required column(s) missing from dataset: {}", format_missing(.0))]
    MissingColumns(Vec<MissingColumn>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_missing(missing: &[MissingColumn]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_match_substrings_case_insensitively() {
        assert!(status_matches("신설(3월)", NEW_MARKERS));
        assert!(status_matches("Newly-Opened", NEW_MARKERS));
        assert!(status_matches("휴원", SUSPENDED_MARKERS));
        assert!(status_matches("suspended", SUSPENDED_MARKERS));
        assert!(!status_matches("정상", NEW_MARKERS));
    }

    #[test]
    fn missing_columns_are_listed_individually() {
        let err = LoadError::MissingColumns(vec![
            MissingColumn {
                field: "region",
                candidates: columns::REGION,
            },
            MissingColumn {
                field: "student_count",
                candidates: columns::STUDENT_COUNT,
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("'region'"));
        assert!(msg.contains("'student_count'"));
    }
}
