use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::schema::UNSPECIFIED;

// ---------------------------------------------------------------------------
// Institution – one row of the dataset
// ---------------------------------------------------------------------------

/// A single educational institution (one row of the source table).
///
/// Every field except the counts is free-form text from the source; numeric
/// fields hold `None` when the source cell was empty or failed lenient
/// coercion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    /// Display/search key. Rows without a name survive loading but are
    /// skipped by the name filter.
    pub name: Option<String>,
    /// School level / grade tier (e.g. elementary, middle).
    pub level: Option<String>,
    /// Founding type (public, private, …).
    pub founder_type: Option<String>,
    /// Top-level administrative area.
    pub region: Option<String>,
    /// Sub-area within the region.
    pub subregion: Option<String>,
    pub student_count: Option<u32>,
    pub class_count: Option<u32>,
    /// Open/closed status; absent on most rows and in some dataset variants.
    pub status: Option<String>,
    /// Present only in some dataset variants.
    pub year: Option<i32>,
}

impl Institution {
    /// Status value with the missing case folded into the explicit
    /// "unspecified" bucket, so it stays filterable and countable.
    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or(UNSPECIFIED)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Loaded once, read-only thereafter; may be shared
/// across sessions behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All institutions, in source row order.
    pub rows: Vec<Institution>,
    /// Whether the optional status column was present in the source.
    pub has_status: bool,
    /// Whether the optional year column was present in the source.
    pub has_year: bool,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Observed school levels, sorted.
    pub fn levels(&self) -> BTreeSet<String> {
        self.observed(|r| r.level.as_deref())
    }

    /// Observed founding types, sorted.
    pub fn founder_types(&self) -> BTreeSet<String> {
        self.observed(|r| r.founder_type.as_deref())
    }

    /// Observed regions, sorted.
    pub fn regions(&self) -> BTreeSet<String> {
        self.observed(|r| r.region.as_deref())
    }

    /// Subregion options, constrained to subregions co-occurring with the
    /// selected regions. An empty region selection means no constraint, so
    /// every observed subregion is offered.
    pub fn subregions(&self, selected_regions: &BTreeSet<String>) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter(|r| {
                selected_regions.is_empty()
                    || r.region
                        .as_ref()
                        .is_some_and(|reg| selected_regions.contains(reg))
            })
            .filter_map(|r| r.subregion.clone())
            .collect()
    }

    /// Status options: observed values plus the explicit "unspecified"
    /// bucket. Empty when the source had no status column.
    pub fn statuses(&self) -> BTreeSet<String> {
        if !self.has_status {
            return BTreeSet::new();
        }
        let mut out: BTreeSet<String> = self.observed(|r| r.status.as_deref());
        out.insert(UNSPECIFIED.to_string());
        out
    }

    /// Observed years, ascending. Empty when the source had no year column.
    pub fn years(&self) -> Vec<i32> {
        if !self.has_year {
            return Vec::new();
        }
        let set: BTreeSet<i32> = self.rows.iter().filter_map(|r| r.year).collect();
        set.into_iter().collect()
    }

    fn observed<'a, F>(&'a self, get: F) -> BTreeSet<String>
    where
        F: Fn(&'a Institution) -> Option<&'a str>,
    {
        self.rows
            .iter()
            .filter_map(|r| get(r).map(str::to_string))
            .collect()
    }
}
