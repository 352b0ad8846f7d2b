//! Dataset fingerprinting — deterministic content hashes of series.
//!
//! The digest covers field names, dates and every value (nulls included), so
//! two series hash equal exactly when they hold the same data.

use crate::data::AlignedTable;
use crate::domain::Series;
use serde::{Deserialize, Serialize};
use std::fmt;

/// BLAKE3 hex digest of a series' content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Series {
    pub fn fingerprint(&self) -> DatasetHash {
        let mut hasher = blake3::Hasher::new();
        for field in self.fields() {
            hasher.update(field.as_bytes());
            hasher.update(&[0]);
        }
        for obs in self.observations() {
            hasher.update(obs.date.to_string().as_bytes());
            for value in &obs.values {
                match value {
                    Some(v) => {
                        hasher.update(&[1]);
                        hasher.update(&v.to_le_bytes());
                    }
                    None => {
                        hasher.update(&[0]);
                    }
                }
            }
        }
        DatasetHash(hasher.finalize().to_hex().to_string())
    }
}

impl AlignedTable {
    pub fn fingerprint(&self) -> DatasetHash {
        self.series().fingerprint()
    }
}
