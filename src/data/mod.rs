/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///      .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  probe headers → canonical schema → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Institution>, option pools
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  criteria predicates → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, shares, pivot, rankings
///   └───────────┘
/// ```
///
/// Everything downstream of the loader is a pure function of
/// `(Dataset, FilterCriteria)`; no module here holds session state.

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
