use std::collections::BTreeSet;
use std::sync::Arc;

use crate::data::aggregate::{summarize, AggregateSummary};
use crate::data::filter::{filter_indices, FilterCriteria, FilteredView};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// A set-membership filter dimension, for the toggle/clear helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Level,
    FounderType,
    Region,
    Subregion,
    Status,
}

/// One user session: shared read-only dataset, owned criteria, and the
/// derived view/summary.
///
/// The dataset is behind an `Arc` so many sessions can share one copy;
/// criteria and derived state are per-session and never shared. Every
/// criteria change triggers one full synchronous recomputation, so derived
/// state is always a pure function of `(dataset, criteria)`.
pub struct Session {
    dataset: Arc<Dataset>,

    /// Current filter selections.
    criteria: FilterCriteria,

    /// Indices of rows passing the current criteria (cached).
    visible: Vec<usize>,

    /// Aggregates over the visible rows (cached).
    summary: AggregateSummary,
}

impl Session {
    /// Start a session with unconstrained criteria (everything visible).
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let mut session = Session {
            dataset,
            criteria: FilterCriteria::default(),
            visible: Vec::new(),
            summary: AggregateSummary::default(),
        };
        session.recompute();
        session
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Rows passing the current criteria, in source order.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::from_indices(&self.dataset, self.visible.clone())
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn summary(&self) -> &AggregateSummary {
        &self.summary
    }

    /// Replace the criteria wholesale and recompute.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.recompute();
    }

    /// Mutate the criteria in place and recompute once afterwards.
    pub fn update_criteria(&mut self, f: impl FnOnce(&mut FilterCriteria)) {
        f(&mut self.criteria);
        self.recompute();
    }

    /// Restore unconstrained criteria.
    pub fn reset(&mut self) {
        self.set_criteria(FilterCriteria::default());
    }

    /// Toggle a single value in a set-membership dimension.
    pub fn toggle(&mut self, dimension: Dimension, value: &str) {
        let selection = self.selection_mut(dimension);
        if !selection.remove(value) {
            selection.insert(value.to_string());
        }
        self.recompute();
    }

    /// Clear a set-membership dimension (back to "no constraint").
    pub fn clear(&mut self, dimension: Dimension) {
        self.selection_mut(dimension).clear();
        self.recompute();
    }

    /// Candidate values to offer for a dimension. The subregion pool depends
    /// on the currently selected regions.
    pub fn options(&self, dimension: Dimension) -> BTreeSet<String> {
        match dimension {
            Dimension::Level => self.dataset.levels(),
            Dimension::FounderType => self.dataset.founder_types(),
            Dimension::Region => self.dataset.regions(),
            Dimension::Subregion => self.dataset.subregions(&self.criteria.regions),
            Dimension::Status => self.dataset.statuses(),
        }
    }

    fn selection_mut(&mut self, dimension: Dimension) -> &mut BTreeSet<String> {
        match dimension {
            Dimension::Level => &mut self.criteria.levels,
            Dimension::FounderType => &mut self.criteria.founder_types,
            Dimension::Region => &mut self.criteria.regions,
            Dimension::Subregion => &mut self.criteria.subregions,
            Dimension::Status => &mut self.criteria.statuses,
        }
    }

    fn recompute(&mut self) {
        self.visible = filter_indices(&self.dataset, &self.criteria);
        let view = FilteredView::from_indices(&self.dataset, self.visible.clone());
        self.summary = summarize(&view);
        log::debug!(
            "session recomputed: {}/{} rows visible",
            self.visible.len(),
            self.dataset.len()
        );
    }
}
