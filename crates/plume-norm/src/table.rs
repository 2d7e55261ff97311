//! Per-quantity statistics table.

use indexmap::IndexMap;
use plume_core::NormStats;
use serde::{Deserialize, Serialize};

use crate::error::{check_usable, NormError};

/// Dataset statistics keyed by quantity id (e.g. `"Temperature [C]"`).
///
/// Insertion order is kept so serialized tables list quantities in the
/// order they were fitted. Every entry is checked on insert: a table
/// never holds a zero or non-finite standard deviation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormTable {
    entries: IndexMap<String, NormStats>,
}

impl NormTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record statistics for `quantity`.
    ///
    /// Re-inserting an identical pair is a no-op; a different pair is
    /// a [`NormError::Conflict`].
    pub fn insert(&mut self, quantity: impl Into<String>, stats: NormStats) -> Result<(), NormError> {
        let quantity = quantity.into();
        check_usable(&quantity, stats.mean, stats.std)?;
        match self.entries.get(&quantity) {
            Some(existing) if *existing == stats => Ok(()),
            Some(_) => Err(NormError::Conflict { quantity }),
            None => {
                self.entries.insert(quantity, stats);
                Ok(())
            }
        }
    }

    /// Statistics for `quantity`, if recorded.
    pub fn get(&self, quantity: &str) -> Option<NormStats> {
        self.entries.get(quantity).copied()
    }

    /// Statistics for `quantity`, or [`NormError::UnknownQuantity`].
    pub fn require(&self, quantity: &str) -> Result<NormStats, NormError> {
        self.get(quantity).ok_or_else(|| NormError::UnknownQuantity {
            quantity: quantity.to_string(),
        })
    }

    /// Whether `quantity` has statistics.
    pub fn contains(&self, quantity: &str) -> bool {
        self.entries.contains_key(quantity)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NormStats)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of quantities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-check every entry; useful after deserializing.
    pub fn validate(&self) -> Result<(), NormError> {
        for (quantity, stats) in &self.entries {
            check_usable(quantity, stats.mean, stats.std)?;
        }
        Ok(())
    }

    /// Build a table, failing on the first unusable or conflicting entry.
    pub fn try_from_entries<K: Into<String>>(
        entries: impl IntoIterator<Item = (K, NormStats)>,
    ) -> Result<Self, NormError> {
        let mut table = Self::new();
        for (k, s) in entries {
            table.insert(k, s)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_require() {
        let mut t = NormTable::new();
        t.insert("Temperature [C]", NormStats::new(20.0, 5.0)).unwrap();
        assert_eq!(t.require("Temperature [C]").unwrap(), NormStats::new(20.0, 5.0));
        assert!(matches!(
            t.require("Pressure [Pa]"),
            Err(NormError::UnknownQuantity { .. })
        ));
    }

    #[test]
    fn reinsert_same_is_idempotent_but_different_conflicts() {
        let mut t = NormTable::new();
        t.insert("q", NormStats::new(1.0, 2.0)).unwrap();
        t.insert("q", NormStats::new(1.0, 2.0)).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(
            t.insert("q", NormStats::new(1.0, 3.0)),
            Err(NormError::Conflict { quantity: "q".into() })
        );
    }

    #[test]
    fn zero_std_never_stored() {
        let mut t = NormTable::new();
        assert!(matches!(
            t.insert("Material_ID", NormStats::new(1.0, 0.0)),
            Err(NormError::ZeroStd { .. })
        ));
        assert!(t.is_empty());
    }

    #[test]
    fn keeps_insertion_order() {
        let t = NormTable::try_from_entries([
            ("b", NormStats::new(0.0, 1.0)),
            ("a", NormStats::new(0.0, 1.0)),
        ])
        .unwrap();
        let keys: Vec<&str> = t.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
    }
}
