//! Qualified names, paths, and name decoding.
//!
//! A [`QualifiedName`] is a `(namespace URI, local name)` pair compared
//! structurally. Node addresses are [`Path`]s made of `(name, index)`
//! segments, where the index is the 1-based same-name-sibling rank.

mod codec;
mod path;
mod resolver;

pub use codec::{IdentityDecoder, TextDecoder, XmlNameCodec};
pub use path::{Path, PathSegment};
pub use resolver::{resolve_name, ResolvedName};

use std::fmt;

use thiserror::Error;

use crate::namespace::NamespaceRegistry;
use crate::util::qname::split_qname;

/// Errors produced when parsing a name from its string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name (or its local part) is empty.
    #[error("name is empty")]
    Empty,
    /// The prefix is not bound in the namespace registry.
    #[error("namespace prefix '{0}' is not registered")]
    UnknownPrefix(String),
    /// The text does not follow any accepted name form.
    #[error("malformed name '{0}'")]
    Malformed(String),
}

/// A namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    namespace: String,
    local: String,
}

impl QualifiedName {
    /// Creates a name in the given namespace (empty string for none).
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Creates a name with no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(String::new(), local)
    }

    /// Returns the namespace URI, empty if the name has none.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the local part of the name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Parses a name from `{uri}local`, `prefix:local`, or `local` form.
    ///
    /// Prefixes are looked up in `registry`; an unprefixed name lands in the
    /// registry's default namespace. The text is used verbatim, no escape
    /// decoding is applied.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] if the text is empty, malformed, or uses a prefix
    /// the registry doesn't know.
    pub fn parse(text: &str, registry: &dyn NamespaceRegistry) -> Result<Self, NameError> {
        if text.is_empty() {
            return Err(NameError::Empty);
        }
        if let Some(rest) = text.strip_prefix('{') {
            let Some(close) = rest.find('}') else {
                return Err(NameError::Malformed(text.to_string()));
            };
            let local = &rest[close + 1..];
            if local.is_empty() {
                return Err(NameError::Empty);
            }
            return Ok(Self::new(&rest[..close], local));
        }
        match split_qname(text) {
            (Some(prefix), local) => {
                if local.is_empty() {
                    return Err(NameError::Empty);
                }
                let uri = registry
                    .namespace_for_prefix(prefix)
                    .ok_or_else(|| NameError::UnknownPrefix(prefix.to_string()))?;
                Ok(Self::new(uri, local))
            }
            (None, local) => Ok(Self::new(registry.default_namespace_uri(), local)),
        }
    }

    /// Formats the name using the registry's prefix for its namespace.
    ///
    /// Falls back to `{uri}local` when the namespace has no prefix.
    #[must_use]
    pub fn to_prefixed(&self, registry: &dyn NamespaceRegistry) -> String {
        if self.namespace.is_empty() {
            return self.local.clone();
        }
        match registry.prefix_for_namespace(&self.namespace) {
            Some("") => self.local.clone(),
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::namespace::MemoryNamespaceRegistry;
    use pretty_assertions::assert_eq;

    fn registry() -> MemoryNamespaceRegistry {
        let mut reg = MemoryNamespaceRegistry::new();
        reg.register("c", "http://default.namespace.com");
        reg
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(
            QualifiedName::new("urn:a", "x"),
            QualifiedName::new(String::from("urn:a"), String::from("x"))
        );
        assert_ne!(QualifiedName::new("urn:a", "x"), QualifiedName::local("x"));
    }

    #[test]
    fn test_parse_prefixed() {
        let name = QualifiedName::parse("c:Hybrid", &registry()).unwrap();
        assert_eq!(name, QualifiedName::new("http://default.namespace.com", "Hybrid"));
    }

    #[test]
    fn test_parse_unprefixed_uses_default_namespace() {
        let name = QualifiedName::parse("Toyota Prius", &registry()).unwrap();
        assert_eq!(name, QualifiedName::local("Toyota Prius"));
    }

    #[test]
    fn test_parse_expanded_form() {
        let name = QualifiedName::parse("{urn:x}thing", &registry()).unwrap();
        assert_eq!(name.namespace(), "urn:x");
        assert_eq!(name.local_name(), "thing");
    }

    #[test]
    fn test_parse_errors() {
        let reg = registry();
        assert_eq!(QualifiedName::parse("", &reg), Err(NameError::Empty));
        assert_eq!(QualifiedName::parse("c:", &reg), Err(NameError::Empty));
        assert_eq!(
            QualifiedName::parse("zz:car", &reg),
            Err(NameError::UnknownPrefix("zz".to_string()))
        );
        assert_eq!(
            QualifiedName::parse("{urn:x", &reg),
            Err(NameError::Malformed("{urn:x".to_string()))
        );
    }

    #[test]
    fn test_display_and_prefixed_forms() {
        let reg = registry();
        let name = QualifiedName::new("http://default.namespace.com", "maker");
        assert_eq!(name.to_string(), "{http://default.namespace.com}maker");
        assert_eq!(name.to_prefixed(&reg), "c:maker");
        assert_eq!(QualifiedName::local("car").to_prefixed(&reg), "car");
        assert_eq!(
            QualifiedName::new("urn:unknown", "x").to_prefixed(&reg),
            "{urn:unknown}x"
        );
    }
}
