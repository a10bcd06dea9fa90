use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::FilteredView;
use super::model::Institution;
use super::schema::{status_matches, NEW_MARKERS, SUSPENDED_MARKERS, UNSPECIFIED};

/// Ranking length for the top-institution tables.
pub const TOP_INSTITUTIONS: usize = 10;

/// Presentation-side truncation for the "top regions" bar chart.
pub const TOP_REGIONS: usize = 15;

// ---------------------------------------------------------------------------
// Result types: chart-ready series keyed by semantic names
// ---------------------------------------------------------------------------

/// Headline metrics over the filtered view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub institutions: usize,
    pub total_students: u64,
    pub total_classes: u64,
    /// `total_students / total_classes`, 0.0 when there are no classes.
    pub avg_students_per_class: f64,
    pub newly_opened: usize,
    pub suspended: usize,
}

/// Per-region student/class totals, for the region bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionTotals {
    pub region: String,
    pub students: u64,
    pub classes: u64,
}

/// One entry of a top-N ranking table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedInstitution {
    pub name: String,
    pub value: u64,
    pub level: String,
    pub region: String,
}

/// Region × level student totals, zero-filled over the full cross product of
/// observed values so a heatmap renderer never sees gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PivotTable {
    /// Row labels, sorted.
    pub regions: Vec<String>,
    /// Column labels, sorted.
    pub levels: Vec<String>,
    /// `cells[region_idx][level_idx]` = summed student count.
    pub cells: Vec<Vec<u64>>,
}

impl PivotTable {
    /// Cell lookup by label; `None` only for labels not in the table.
    pub fn get(&self, region: &str, level: &str) -> Option<u64> {
        let r = self.regions.iter().position(|x| x == region)?;
        let l = self.levels.iter().position(|x| x == level)?;
        Some(self.cells[r][l])
    }
}

/// Everything the presentation layer needs, recomputed in full from the
/// filtered view on every criteria change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub kpis: Kpis,
    /// founder_type → summed student count.
    pub founder_share: BTreeMap<String, u64>,
    /// status (including "unspecified") → institution count.
    pub status_counts: BTreeMap<String, usize>,
    /// Descending by student total; covers every region in the view.
    pub region_totals: Vec<RegionTotals>,
    pub pivot: PivotTable,
    pub top_by_students: Vec<RankedInstitution>,
    pub top_by_classes: Vec<RankedInstitution>,
}

impl AggregateSummary {
    /// First [`TOP_REGIONS`] entries of the full region aggregate. Pure
    /// presentation truncation; the aggregate itself always covers every
    /// region.
    pub fn top_regions(&self) -> &[RegionTotals] {
        let n = self.region_totals.len().min(TOP_REGIONS);
        &self.region_totals[..n]
    }
}

// ---------------------------------------------------------------------------
// Summarization
// ---------------------------------------------------------------------------

fn group_label(value: Option<&str>) -> String {
    value.unwrap_or(UNSPECIFIED).to_string()
}

fn ranked(row: &Institution, value: u64) -> RankedInstitution {
    RankedInstitution {
        name: group_label(row.name.as_deref()),
        value,
        level: group_label(row.level.as_deref()),
        region: group_label(row.region.as_deref()),
    }
}

/// Rank rows descending by a metric, ties broken by source order (stable
/// sort), `min(TOP_INSTITUTIONS, rows)` entries. Missing metrics count as
/// zero.
fn top_by<F>(view: &FilteredView<'_>, metric: F) -> Vec<RankedInstitution>
where
    F: Fn(&Institution) -> Option<u32>,
{
    let mut rows: Vec<&Institution> = view.iter().collect();
    rows.sort_by_key(|r| std::cmp::Reverse(metric(r).unwrap_or(0)));
    rows.truncate(TOP_INSTITUTIONS);
    rows.into_iter()
        .map(|r| ranked(r, u64::from(metric(r).unwrap_or(0))))
        .collect()
}

/// Compute every aggregate from the filtered view.
///
/// Total: never fails, including on the empty view (zero KPIs, empty
/// mappings and rankings). Missing counts contribute zero to sums; missing
/// grouping keys land in the explicit "unspecified" bucket so grouped totals
/// always reconcile with the ungrouped KPIs.
pub fn summarize(view: &FilteredView<'_>) -> AggregateSummary {
    let mut kpis = Kpis {
        institutions: view.len(),
        ..Kpis::default()
    };
    let mut founder_share: BTreeMap<String, u64> = BTreeMap::new();
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_region: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    let mut pivot_cells: BTreeMap<(String, String), u64> = BTreeMap::new();

    for row in view.iter() {
        let students = u64::from(row.student_count.unwrap_or(0));
        let classes = u64::from(row.class_count.unwrap_or(0));
        kpis.total_students += students;
        kpis.total_classes += classes;

        let status = row.status_label();
        if status_matches(status, NEW_MARKERS) {
            kpis.newly_opened += 1;
        }
        if status_matches(status, SUSPENDED_MARKERS) {
            kpis.suspended += 1;
        }

        *founder_share
            .entry(group_label(row.founder_type.as_deref()))
            .or_insert(0) += students;
        *status_counts.entry(status.to_string()).or_insert(0) += 1;

        let region = group_label(row.region.as_deref());
        let entry = by_region.entry(region.clone()).or_insert((0, 0));
        entry.0 += students;
        entry.1 += classes;

        let level = group_label(row.level.as_deref());
        *pivot_cells.entry((region, level)).or_insert(0) += students;
    }

    kpis.avg_students_per_class = if kpis.total_classes == 0 {
        0.0
    } else {
        kpis.total_students as f64 / kpis.total_classes as f64
    };

    let mut region_totals: Vec<RegionTotals> = by_region
        .into_iter()
        .map(|(region, (students, classes))| RegionTotals {
            region,
            students,
            classes,
        })
        .collect();
    region_totals.sort_by_key(|r| std::cmp::Reverse(r.students));

    AggregateSummary {
        kpis,
        founder_share,
        status_counts,
        region_totals,
        pivot: build_pivot(&pivot_cells),
        top_by_students: top_by(view, |r| r.student_count),
        top_by_classes: top_by(view, |r| r.class_count),
    }
}

/// Zero-fill the sparse (region, level) sums over the full cross product of
/// observed labels.
fn build_pivot(cells: &BTreeMap<(String, String), u64>) -> PivotTable {
    let regions: Vec<String> = {
        let mut v: Vec<String> = cells.keys().map(|(r, _)| r.clone()).collect();
        v.sort();
        v.dedup();
        v
    };
    let levels: Vec<String> = {
        let mut v: Vec<String> = cells.keys().map(|(_, l)| l.clone()).collect();
        v.sort();
        v.dedup();
        v
    };

    let grid = regions
        .iter()
        .map(|region| {
            levels
                .iter()
                .map(|level| {
                    cells
                        .get(&(region.clone(), level.clone()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    PivotTable {
        regions,
        levels,
        cells: grid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterCriteria, FilteredView};
    use crate::data::model::Dataset;

    fn mk(
        name: &str,
        level: &str,
        founder: &str,
        region: &str,
        students: u32,
        classes: u32,
        status: Option<&str>,
    ) -> Institution {
        Institution {
            name: Some(name.to_string()),
            level: Some(level.to_string()),
            founder_type: Some(founder.to_string()),
            region: Some(region.to_string()),
            student_count: Some(students),
            class_count: Some(classes),
            status: status.map(str::to_string),
            ..Institution::default()
        }
    }

    fn view(ds: &Dataset) -> FilteredView<'_> {
        FilteredView::apply(ds, &FilterCriteria::default())
    }

    #[test]
    fn empty_view_yields_zero_kpis_and_empty_series() {
        let ds = Dataset::default();
        let summary = summarize(&view(&ds));
        assert_eq!(summary.kpis, Kpis::default());
        assert!(summary.founder_share.is_empty());
        assert!(summary.status_counts.is_empty());
        assert!(summary.region_totals.is_empty());
        assert!(summary.pivot.regions.is_empty());
        assert!(summary.top_by_students.is_empty());
    }

    #[test]
    fn zero_classes_reports_zero_average() {
        let ds = Dataset {
            rows: vec![mk("A", "elementary", "public", "X", 100, 0, None)],
            ..Dataset::default()
        };
        let summary = summarize(&view(&ds));
        assert_eq!(summary.kpis.avg_students_per_class, 0.0);
    }

    #[test]
    fn missing_grouping_keys_bucket_as_unspecified_and_reconcile() {
        let mut nameless = mk("A", "elementary", "public", "X", 100, 4, None);
        nameless.founder_type = None;
        nameless.region = None;
        let ds = Dataset {
            rows: vec![nameless, mk("B", "middle", "private", "X", 200, 5, None)],
            ..Dataset::default()
        };
        let summary = summarize(&view(&ds));

        assert_eq!(summary.founder_share[UNSPECIFIED], 100);
        let grouped: u64 = summary.region_totals.iter().map(|r| r.students).sum();
        assert_eq!(grouped, summary.kpis.total_students);
    }

    #[test]
    fn status_counts_cover_every_row() {
        let ds = Dataset {
            rows: vec![
                mk("A", "e", "pub", "X", 1, 1, Some("신설")),
                mk("B", "e", "pub", "X", 1, 1, None),
                mk("C", "e", "pub", "X", 1, 1, None),
            ],
            has_status: true,
            ..Dataset::default()
        };
        let summary = summarize(&view(&ds));
        assert_eq!(summary.status_counts["신설"], 1);
        assert_eq!(summary.status_counts[UNSPECIFIED], 2);
        assert_eq!(summary.kpis.newly_opened, 1);
        assert_eq!(summary.kpis.suspended, 0);
    }

    #[test]
    fn pivot_is_zero_filled_over_cross_product() {
        let ds = Dataset {
            rows: vec![
                mk("A", "elementary", "pub", "X", 100, 4, None),
                mk("B", "middle", "pub", "Y", 200, 5, None),
            ],
            ..Dataset::default()
        };
        let summary = summarize(&view(&ds));
        assert_eq!(summary.pivot.get("X", "elementary"), Some(100));
        assert_eq!(summary.pivot.get("X", "middle"), Some(0));
        assert_eq!(summary.pivot.get("Y", "elementary"), Some(0));
        assert_eq!(summary.pivot.get("Y", "middle"), Some(200));
    }

    #[test]
    fn rankings_break_ties_by_source_order() {
        let ds = Dataset {
            rows: vec![
                mk("First", "e", "pub", "X", 100, 1, None),
                mk("Second", "e", "pub", "X", 100, 2, None),
                mk("Third", "e", "pub", "X", 300, 3, None),
            ],
            ..Dataset::default()
        };
        let summary = summarize(&view(&ds));
        let names: Vec<&str> = summary
            .top_by_students
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["Third", "First", "Second"]);
    }

    #[test]
    fn rankings_cap_at_ten_entries() {
        let rows: Vec<Institution> = (0..25)
            .map(|i| mk(&format!("S{i}"), "e", "pub", "X", i, 1, None))
            .collect();
        let ds = Dataset {
            rows,
            ..Dataset::default()
        };
        let summary = summarize(&view(&ds));
        assert_eq!(summary.top_by_students.len(), TOP_INSTITUTIONS);
        assert_eq!(summary.top_by_students[0].name, "S24");
    }

    #[test]
    fn region_totals_sorted_descending_and_truncated_for_presentation() {
        let rows: Vec<Institution> = (0..20)
            .map(|i| mk(&format!("S{i}"), "e", "pub", &format!("R{i:02}"), i, 1, None))
            .collect();
        let ds = Dataset {
            rows,
            ..Dataset::default()
        };
        let summary = summarize(&view(&ds));
        assert_eq!(summary.region_totals.len(), 20);
        assert_eq!(summary.top_regions().len(), TOP_REGIONS);
        assert_eq!(summary.region_totals[0].region, "R19");
        assert!(summary
            .region_totals
            .windows(2)
            .all(|w| w[0].students >= w[1].students));
    }
}
