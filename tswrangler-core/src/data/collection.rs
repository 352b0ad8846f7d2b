//! NamedSeriesCollection — an ordered set of series keyed by unique name.

use super::align::AlignError;
use crate::domain::{Observation, Series};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Named series ready for combination.
///
/// Insertion order is kept and drives column order in aligned output. On
/// insert each series' fields are namespaced as `<field>_<name>` so columns
/// from different series can never collide.
#[derive(Debug, Clone, Default)]
pub struct NamedSeriesCollection {
    series: IndexMap<String, Series>,
    /// namespaced column -> owning series name
    columns: HashMap<String, String>,
}

impl NamedSeriesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, series)` pairs, failing on the first bad entry.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, AlignError>
    where
        I: IntoIterator<Item = (S, Series)>,
        S: Into<String>,
    {
        let mut collection = Self::new();
        for (name, series) in pairs {
            collection.insert(name, series)?;
        }
        Ok(collection)
    }

    /// Add a validated series under `name`.
    pub fn insert(&mut self, name: impl Into<String>, series: Series) -> Result<(), AlignError> {
        let name = name.into();
        if name.is_empty() {
            return Err(AlignError::EmptyName);
        }
        if self.series.contains_key(&name) {
            return Err(AlignError::DuplicateName { name });
        }
        series
            .validate()
            .map_err(|source| AlignError::Validation {
                series: name.clone(),
                source,
            })?;

        let renamed: Vec<String> = series
            .fields()
            .iter()
            .map(|f| namespaced(f, &name))
            .collect();
        for column in &renamed {
            if let Some(owner) = self.columns.get(column) {
                return Err(AlignError::ColumnCollision {
                    column: column.clone(),
                    first: owner.clone(),
                    second: name,
                });
            }
        }
        for column in &renamed {
            self.columns.insert(column.clone(), name.clone());
        }
        let series = series.with_fields(renamed);
        self.series.insert(name, series);
        Ok(())
    }

    /// Validate raw observations and add them under `name`.
    ///
    /// Validation failures name the offending series.
    pub fn insert_raw(
        &mut self,
        name: impl Into<String>,
        fields: Vec<String>,
        observations: Vec<Observation>,
    ) -> Result<(), AlignError> {
        let name = name.into();
        let series = Series::new(fields, observations).map_err(|source| AlignError::Validation {
            series: name.clone(),
            source,
        })?;
        self.insert(name, series)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// The namespaced series stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.series.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Column name for `field` of series `name`.
pub fn namespaced(field: &str, name: &str) -> String {
    format!("{field}_{name}")
}
