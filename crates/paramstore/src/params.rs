//! The parameter map exchanged with parameter sources.

use indexmap::IndexMap;

/// Parameter names mapped to their retrieved values.
///
/// The loader creates the map with every bound parameter name and no values.
/// A [`ParameterSource`](crate::ParameterSource) fills in the values; the
/// loader then reads them back when assigning fields. Names keep the order in
/// which fields declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: IndexMap<String, Option<String>>,
}

impl ParameterMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map with the given names and no values.
    ///
    /// Repeated names share one entry.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = names.into_iter().map(|name| (name.into(), None)).collect();
        Self { entries }
    }

    /// Returns the requested names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the names that have no value yet.
    pub fn unset_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name.as_str())
    }

    /// Returns true if `name` was requested.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the value for `name`, if one has been set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(Option::as_deref)
    }

    /// Sets the value for `name`.
    ///
    /// Returns false and leaves the map unchanged if `name` was not requested.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.entries.get_mut(name) {
            Some(slot) => {
                *slot = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// Returns the number of requested names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no names were requested.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
