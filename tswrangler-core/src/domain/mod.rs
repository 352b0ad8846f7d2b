//! Domain types: the validated date-indexed series and its records.

pub mod series;

pub use series::{Observation, Series, SeriesSummary, ValidationError};
