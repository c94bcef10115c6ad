//! Node properties.
//!
//! [`Properties`] is an insertion-ordered map from [`QualifiedName`] to a
//! non-empty list of [`PropertyValue`]s. Writing a name a second time
//! replaces the earlier values in place.

use std::fmt;

use indexmap::IndexMap;

use crate::name::QualifiedName;

/// A single property value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyValue {
    /// Text taken from the document.
    String(String),
    /// A decoded name, such as a node type.
    Name(QualifiedName),
}

impl PropertyValue {
    /// Returns the string payload, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the name payload, if this is a name value.
    #[must_use]
    pub fn as_name(&self) -> Option<&QualifiedName> {
        match self {
            Self::Name(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Name(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<QualifiedName> for PropertyValue {
    fn from(value: QualifiedName) -> Self {
        Self::Name(value)
    }
}

/// The properties of one node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Properties {
    entries: IndexMap<QualifiedName, Vec<PropertyValue>>,
}

impl Properties {
    /// Creates an empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a single-valued property.
    pub fn set(&mut self, name: QualifiedName, value: impl Into<PropertyValue>) {
        self.entries.insert(name, vec![value.into()]);
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: QualifiedName, value: impl Into<PropertyValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns all values of a property.
    #[must_use]
    pub fn get(&self, name: &QualifiedName) -> Option<&[PropertyValue]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Returns the first value of a property.
    #[must_use]
    pub fn first(&self, name: &QualifiedName) -> Option<&PropertyValue> {
        self.entries.get(name).and_then(|v| v.first())
    }

    /// Returns `true` if the property is present.
    #[must_use]
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&QualifiedName, &[PropertyValue])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies every property of `other` into `self`, `other` winning on clashes.
    pub fn merge(&mut self, other: Properties) {
        for (name, values) in other.entries {
            self.entries.insert(name, values);
        }
    }
}

impl FromIterator<(QualifiedName, PropertyValue)> for Properties {
    fn from_iter<T: IntoIterator<Item = (QualifiedName, PropertyValue)>>(iter: T) -> Self {
        let mut props = Self::new();
        for (name, value) in iter {
            props.set(name, value);
        }
        props
    }
}
