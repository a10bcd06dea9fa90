//! Filter-and-aggregation core for an educational-institution dashboard.
//!
//! The crate loads a CSV of institutions (school level, founding type,
//! region, student/class counts, open/closed status), applies user-selected
//! filter criteria, and computes the chart-ready aggregates a presentation
//! layer renders: KPIs, founder-type shares, status counts, per-region
//! totals, a region × level pivot, and top-10 rankings.
//!
//! Rendering, theming, and layout are external concerns; this crate only
//! hands over read-only structures.

pub mod data;
pub mod state;

pub use data::aggregate::{summarize, AggregateSummary};
pub use data::filter::{FilterCriteria, FilteredView};
pub use data::loader::{load_csv, load_csv_reader};
pub use data::model::{Dataset, Institution};
pub use data::schema::LoadError;
pub use state::{Dimension, Session};
