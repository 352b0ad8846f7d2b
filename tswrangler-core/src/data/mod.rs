//! Combining independently indexed series.

pub mod align;
pub mod collection;
pub mod table;

pub use align::{AlignError, AlignmentWarning, SeriesAligner};
pub use collection::{namespaced, NamedSeriesCollection};
pub use table::{AlignedTable, ColumnSource, EmptyReason, Intersection};
