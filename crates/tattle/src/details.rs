// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

use crate::{Fields, Value};

/// Ordered key/value metadata attached to an error when it is created.
///
/// Unlike [`Fields`], a detail set keeps insertion order and may repeat a key. When it is
/// turned into fields the last occurrence of a key wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Details {
    entries: Vec<(Cow<'static, str>, Value)>,
}

impl Details {
    /// Creates an empty detail set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a detail set from an alternating `key, value, key, value, ...` list.
    ///
    /// Keys are rendered with their display form. A trailing key without a value is kept
    /// with a [`Value::Null`] value.
    ///
    /// ```rust
    /// use tattle::{Details, Value};
    ///
    /// let details = Details::from_key_values([Value::from("key"), Value::from(1_u8), Value::from("dangling")]);
    /// let fields = details.to_fields();
    ///
    /// assert_eq!(fields.get("key"), Some(&Value::from(1_u8)));
    /// assert_eq!(fields.get("dangling"), Some(&Value::Null));
    /// ```
    pub fn from_key_values<I>(key_values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut key_values = key_values.into_iter().map(Into::into);
        let mut details = Self::new();

        while let Some(key) = key_values.next() {
            let value = key_values.next().unwrap_or(Value::Null);
            details.push(key_string(key), value);
        }

        details
    }

    /// Appends a detail.
    pub fn push(&mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Appends every detail of `other`, after the existing ones.
    pub fn append(&mut self, other: &Self) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Returns the number of entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Converts the detail set to event fields; the last occurrence of a repeated key wins.
    #[must_use]
    pub fn to_fields(&self) -> Fields {
        self.entries.iter().cloned().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Details
where
    K: Into<Cow<'static, str>>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn key_string(key: Value) -> Cow<'static, str> {
    match key {
        Value::Str(s) => s,
        other => Cow::Owned(other.to_string()),
    }
}
