use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{Dataset, Institution};

// ---------------------------------------------------------------------------
// Filter criteria: the entire external control surface
// ---------------------------------------------------------------------------

/// User-selected filter state, one field per filterable dimension.
///
/// Set-membership semantics: an **empty selection imposes no constraint**
/// (show all). Treating an empty selection as "match nothing" would blank
/// the dashboard as soon as a user deselects the last value, so that policy
/// is not used anywhere in this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub levels: BTreeSet<String>,
    pub founder_types: BTreeSet<String>,
    pub regions: BTreeSet<String>,
    pub subregions: BTreeSet<String>,
    /// Matched against [`Institution::status_label`], so selecting the
    /// "unspecified" bucket keeps rows with no status.
    pub statuses: BTreeSet<String>,
    /// Case-insensitive substring match on the name; empty = no constraint.
    pub name_query: String,
    /// Inclusive bounds. Rows whose count failed coercion fail an active
    /// range.
    pub student_range: Option<(u32, u32)>,
    /// Inclusive bounds, as above.
    pub class_range: Option<(u32, u32)>,
    /// Exact match; ignored when the dataset has no year column.
    pub year: Option<i32>,
}

impl FilterCriteria {
    /// True when no dimension constrains anything.
    pub fn is_unconstrained(&self) -> bool {
        self == &FilterCriteria::default()
    }
}

// ---------------------------------------------------------------------------
// Predicate evaluation
// ---------------------------------------------------------------------------

fn in_selection(selection: &BTreeSet<String>, value: Option<&str>) -> bool {
    if selection.is_empty() {
        return true;
    }
    value.is_some_and(|v| selection.contains(v))
}

fn in_range(range: Option<(u32, u32)>, value: Option<u32>) -> bool {
    match range {
        None => true,
        Some((lo, hi)) => value.is_some_and(|v| v >= lo && v <= hi),
    }
}

fn matches(row: &Institution, criteria: &FilterCriteria, dataset: &Dataset) -> bool {
    if !in_selection(&criteria.levels, row.level.as_deref()) {
        return false;
    }
    if !in_selection(&criteria.founder_types, row.founder_type.as_deref()) {
        return false;
    }
    if !in_selection(&criteria.regions, row.region.as_deref()) {
        return false;
    }
    if !in_selection(&criteria.subregions, row.subregion.as_deref()) {
        return false;
    }
    // Missing status participates as the explicit "unspecified" bucket. A
    // dataset without a status column disables this dimension entirely.
    if dataset.has_status && !in_selection(&criteria.statuses, Some(row.status_label())) {
        return false;
    }
    if !criteria.name_query.is_empty() {
        let query = criteria.name_query.to_lowercase();
        match &row.name {
            Some(name) => {
                if !name.to_lowercase().contains(&query) {
                    return false;
                }
            }
            None => return false,
        }
    }
    if !in_range(criteria.student_range, row.student_count) {
        return false;
    }
    if !in_range(criteria.class_range, row.class_count) {
        return false;
    }
    if dataset.has_year {
        if let Some(year) = criteria.year {
            if row.year != Some(year) {
                return false;
            }
        }
    }
    true
}

/// Indices of rows passing every active filter, in source order.
pub fn filter_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| matches(row, criteria, dataset))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// The subset of rows satisfying the criteria, in source order. A read-only
/// borrow of the dataset; recomputed from scratch on every criteria change.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Apply the criteria to the dataset. Pure: the same inputs always
    /// produce the same view.
    pub fn apply(dataset: &'a Dataset, criteria: &FilterCriteria) -> Self {
        let indices = filter_indices(dataset, criteria);
        log::debug!("filter kept {}/{} rows", indices.len(), dataset.len());
        FilteredView { dataset, indices }
    }

    /// Rebuild a view from previously computed indices.
    pub fn from_indices(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        FilteredView { dataset, indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Rows in source order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Institution> + '_ {
        self.indices.iter().map(|&i| &self.dataset.rows[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Institution;

    fn dataset() -> Dataset {
        let mk = |name: &str, level: &str, region: &str, students: Option<u32>| Institution {
            name: Some(name.to_string()),
            level: Some(level.to_string()),
            region: Some(region.to_string()),
            student_count: students,
            ..Institution::default()
        };
        Dataset {
            rows: vec![
                mk("Cheonan Central", "elementary", "X", Some(100)),
                mk("Hongseong Middle", "middle", "X", Some(200)),
                mk("Boryeong Elem", "elementary", "Y", None),
            ],
            ..Dataset::default()
        }
    }

    #[test]
    fn empty_criteria_keep_everything() {
        let ds = dataset();
        let view = FilteredView::apply(&ds, &FilterCriteria::default());
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn set_filters_and_compose() {
        let ds = dataset();
        let criteria = FilterCriteria {
            regions: BTreeSet::from(["X".to_string()]),
            levels: BTreeSet::from(["elementary".to_string()]),
            ..FilterCriteria::default()
        };
        let view = FilteredView::apply(&ds, &criteria);
        assert_eq!(view.indices(), &[0]);
    }

    #[test]
    fn name_query_is_case_insensitive_containment() {
        let ds = dataset();
        let criteria = FilterCriteria {
            name_query: "hongseong".to_string(),
            ..FilterCriteria::default()
        };
        let view = FilteredView::apply(&ds, &criteria);
        assert_eq!(view.indices(), &[1]);
    }

    #[test]
    fn active_range_excludes_rows_with_missing_counts() {
        let ds = dataset();
        let criteria = FilterCriteria {
            student_range: Some((0, 1000)),
            ..FilterCriteria::default()
        };
        let view = FilteredView::apply(&ds, &criteria);
        // Row 2 has no student count and fails the active range.
        assert_eq!(view.indices(), &[0, 1]);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let ds = dataset();
        let criteria = FilterCriteria {
            student_range: Some((100, 200)),
            ..FilterCriteria::default()
        };
        let view = FilteredView::apply(&ds, &criteria);
        assert_eq!(view.indices(), &[0, 1]);
    }

    #[test]
    fn unspecified_status_is_selectable() {
        let mut ds = dataset();
        ds.has_status = true;
        ds.rows[0].status = Some("신설".to_string());
        let criteria = FilterCriteria {
            statuses: BTreeSet::from(["unspecified".to_string()]),
            ..FilterCriteria::default()
        };
        let view = FilteredView::apply(&ds, &criteria);
        assert_eq!(view.indices(), &[1, 2]);
    }

    #[test]
    fn status_filter_ignored_without_status_column() {
        let ds = dataset();
        let criteria = FilterCriteria {
            statuses: BTreeSet::from(["신설".to_string()]),
            ..FilterCriteria::default()
        };
        let view = FilteredView::apply(&ds, &criteria);
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn year_filter_ignored_without_year_column() {
        let ds = dataset();
        let criteria = FilterCriteria {
            year: Some(2024),
            ..FilterCriteria::default()
        };
        let view = FilteredView::apply(&ds, &criteria);
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn year_filter_is_exact_match_when_present() {
        let mut ds = dataset();
        ds.has_year = true;
        ds.rows[0].year = Some(2023);
        ds.rows[1].year = Some(2024);
        let criteria = FilterCriteria {
            year: Some(2024),
            ..FilterCriteria::default()
        };
        let view = FilteredView::apply(&ds, &criteria);
        assert_eq!(view.indices(), &[1]);
    }
}
