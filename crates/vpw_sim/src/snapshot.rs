//! Point-in-time captures of a model's readable signals.

use std::collections::BTreeMap;
use std::ops::Index;

use serde::Serialize;
use vpw_common::SignalValue;

/// An immutable name-to-value capture taken by `update` or `tick`.
///
/// A snapshot owns its values; later simulation steps never change it.
/// Serializes as a plain JSON object ordered by port name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    values: BTreeMap<String, SignalValue>,
}

impl Snapshot {
    pub(crate) fn insert(&mut self, name: &str, value: SignalValue) {
        self.values.insert(name.to_string(), value);
    }

    /// Returns the value of a signal, if the snapshot covers it.
    pub fn get(&self, name: &str) -> Option<&SignalValue> {
        self.values.get(name)
    }

    /// Returns `true` if the snapshot covers the named signal.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates signals in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignalValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of signals captured.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a snapshot of a model with no readable signals.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Unwraps the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, SignalValue> {
        self.values
    }
}

impl<S: Into<String>> FromIterator<(S, SignalValue)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (S, SignalValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Index<&str> for Snapshot {
    type Output = SignalValue;

    /// Panics if the signal is not in the snapshot.
    fn index(&self, name: &str) -> &SignalValue {
        match self.values.get(name) {
            Some(v) => v,
            None => panic!("signal '{name}' is not in the snapshot"),
        }
    }
}
