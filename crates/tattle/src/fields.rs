// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;

use crate::Value;

/// The key/value fields attached to a single event.
///
/// Keys are unique and iterate in sorted order, so sinks render fields deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Fields {
    map: BTreeMap<Cow<'static, str>, Value>,
}

impl Fields {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, replacing and returning any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Option<Value> {
        self.map.insert(key.into(), value.into())
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over the fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.map.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Copies every field of `other` into `self`; keys present in both take the value from `other`.
    pub fn overlay(&mut self, other: &Self) {
        self.map.extend(other.map.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Builds the fields of one event: a fresh copy of `inherited` with `own` laid over it.
    #[must_use]
    pub fn layered(inherited: &Self, own: &Self) -> Self {
        let mut merged = inherited.clone();
        merged.overlay(own);
        merged
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<Cow<'static, str>>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Fields
where
    K: Into<Cow<'static, str>>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for Fields {
    type Item = (Cow<'static, str>, Value);
    type IntoIter = btree_map::IntoIter<Cow<'static, str>, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

/// Builds [`Fields`] from `key => value` pairs.
///
/// ```rust
/// let fields = tattle::fields! { "key" => "value", "attempt" => 3 };
///
/// assert_eq!(fields.len(), 2);
/// assert_eq!(tattle::fields! {}.len(), 0);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert($key, $value);
        )+
        fields
    }};
}
