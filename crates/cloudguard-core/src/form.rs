//! Builder for form-encoded request parameters.
//!
//! Every CloudGuard request is a single `application/x-www-form-urlencoded` POST.
//! Keys are unique and later writes replace earlier ones, which is what lets the
//! dispatcher stamp reserved fields over anything a caller supplied.

use std::collections::BTreeMap;
use std::fmt::Display;

/// Builder for assembling form parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormParams {
    pairs: BTreeMap<String, String>,
}

impl FormParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pairs: BTreeMap::new(),
        }
    }

    /// Set a key, replacing any previous value.
    pub fn set<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Display,
    {
        self.pairs.insert(key.into(), value.to_string());
    }

    /// Set a key when the value is present.
    pub fn set_opt<T>(&mut self, key: impl Into<String>, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    /// Set using a mapping function when the value is present.
    pub fn set_opt_with<T, F>(&mut self, key: impl Into<String>, value: Option<T>, mut map: F)
    where
        F: FnMut(T) -> String,
    {
        if let Some(value) = value {
            self.pairs.insert(key.into(), map(value));
        }
    }

    /// Chainable form of [`FormParams::set`].
    #[must_use]
    pub fn with<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: Display,
    {
        self.set(key, value);
        self
    }

    /// Copy every pair from `other`, overwriting on collision.
    pub fn extend(&mut self, other: Self) {
        self.pairs.extend(other.pairs);
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    /// Iterate over the parameter names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.keys().map(String::as_str)
    }

    /// Return the collected key/value pairs, sorted by key.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs.into_iter().collect()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
