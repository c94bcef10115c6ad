//! Turns raw `(uri, local name, qualified name)` triples into [`QualifiedName`]s.

use crate::name::{QualifiedName, TextDecoder};
use crate::util::qname::split_qname;

/// The outcome of resolving a raw name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedName {
    /// The name carried its own namespace (or an explicit prefix).
    Qualified(QualifiedName),
    /// The name had neither a URI nor a prefix; the caller picks the namespace.
    Unscoped(String),
}

impl ResolvedName {
    /// Completes the name, placing an unscoped name in `namespace`.
    #[must_use]
    pub fn in_namespace(self, namespace: &str) -> QualifiedName {
        match self {
            Self::Qualified(name) => name,
            Self::Unscoped(local) => QualifiedName::new(namespace, local),
        }
    }

    /// Returns the decoded local part.
    #[must_use]
    pub fn local_name(&self) -> &str {
        match self {
            Self::Qualified(name) => name.local_name(),
            Self::Unscoped(local) => local,
        }
    }
}

/// Resolves a raw element or attribute name.
///
/// The local part is run through `decoder`. When `local_name` is empty the
/// local part is taken from `qualified_name`.
#[must_use]
pub fn resolve_name(
    uri: &str,
    local_name: &str,
    qualified_name: &str,
    decoder: &dyn TextDecoder,
) -> ResolvedName {
    let (prefix, qname_local) = split_qname(qualified_name);
    let raw_local = if local_name.is_empty() {
        qname_local
    } else {
        local_name
    };
    let local = decoder.decode(raw_local);
    if uri.is_empty() && prefix.is_none() {
        ResolvedName::Unscoped(local)
    } else {
        ResolvedName::Qualified(QualifiedName::new(uri, local))
    }
}
