//! Namespace registry and namespace scope tracking.
//!
//! The [`NamespaceRegistry`] is the persistent prefix/URI table the
//! projected content is written against. It is passed to the projectors
//! explicitly; newly observed namespaces are added with
//! [`register_observed`]. [`NamespaceScope`] is the per-run stack of URIs
//! that unprefixed attributes inherit from their enclosing element.

use indexmap::IndexMap;

use crate::lexicon;

/// The well-known XML namespace URI, pre-bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A prefix/URI table.
pub trait NamespaceRegistry {
    /// Returns the URI bound to `prefix`.
    fn namespace_for_prefix(&self, prefix: &str) -> Option<&str>;

    /// Returns the prefix bound to `uri`.
    fn prefix_for_namespace(&self, uri: &str) -> Option<&str>;

    /// Binds `prefix` to `uri`, replacing any earlier binding of either.
    fn register(&mut self, prefix: &str, uri: &str);

    /// Returns the URI that unprefixed names belong to.
    fn default_namespace_uri(&self) -> &str {
        self.namespace_for_prefix("").unwrap_or("")
    }

    /// Returns `true` if `uri` has a prefix.
    fn is_registered_namespace(&self, uri: &str) -> bool {
        self.prefix_for_namespace(uri).is_some()
    }

    /// Returns the first unused prefix of the form `ns001`, `ns002`, ...
    fn generate_prefix(&self) -> String {
        let mut counter = 1u32;
        loop {
            let candidate = format!("ns{counter:03}");
            if self.namespace_for_prefix(&candidate).is_none() {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// An in-memory [`NamespaceRegistry`].
#[derive(Debug, Clone, Default)]
pub struct MemoryNamespaceRegistry {
    by_prefix: IndexMap<String, String>,
    by_uri: IndexMap<String, String>,
}

impl MemoryNamespaceRegistry {
    /// Creates an empty registry. The default namespace is the empty URI.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the `xml`, `jcr`, `nt`, and synthetic node
    /// namespaces bound.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("xml", XML_NAMESPACE);
        registry.register(lexicon::jcr::PREFIX, lexicon::jcr::NAMESPACE);
        registry.register(lexicon::nt::PREFIX, lexicon::nt::NAMESPACE);
        registry.register(lexicon::xml::PREFIX, lexicon::xml::NAMESPACE);
        registry.register(lexicon::dtd::PREFIX, lexicon::dtd::NAMESPACE);
        registry
    }

    /// Returns the bindings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_prefix.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_prefix.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_prefix.is_empty()
    }
}

impl NamespaceRegistry for MemoryNamespaceRegistry {
    fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.by_prefix.get(prefix).map(String::as_str)
    }

    fn prefix_for_namespace(&self, uri: &str) -> Option<&str> {
        self.by_uri.get(uri).map(String::as_str)
    }

    fn register(&mut self, prefix: &str, uri: &str) {
        if let Some(old_uri) = self.by_prefix.shift_remove(prefix) {
            self.by_uri.shift_remove(&old_uri);
        }
        if let Some(old_prefix) = self.by_uri.shift_remove(uri) {
            self.by_prefix.shift_remove(&old_prefix);
        }
        self.by_prefix.insert(prefix.to_string(), uri.to_string());
        self.by_uri.insert(uri.to_string(), prefix.to_string());
    }
}

/// Registers a namespace seen in a document if the registry doesn't know it.
///
/// The document's own prefix is used when it is free; otherwise a generated
/// prefix is chosen. Returns the prefix a new binding was made under, or
/// `None` if `uri` was empty or already registered.
pub fn register_observed(
    registry: &mut dyn NamespaceRegistry,
    prefix: Option<&str>,
    uri: &str,
) -> Option<String> {
    if uri.is_empty() || registry.is_registered_namespace(uri) {
        return None;
    }
    let chosen = match prefix {
        Some(p) if !p.is_empty() && registry.namespace_for_prefix(p).is_none() => p.to_string(),
        _ => registry.generate_prefix(),
    };
    registry.register(&chosen, uri);
    log::debug!("registered namespace {chosen} -> {uri}");
    Some(chosen)
}

/// The namespace URI in effect at each open element.
///
/// The stack depth always equals the element nesting depth.
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    stack: Vec<String>,
}

impl NamespaceScope {
    /// Creates an empty scope stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters an element. An empty `uri` inherits the enclosing scope.
    pub fn enter(&mut self, uri: &str) {
        let effective = if uri.is_empty() {
            self.current().to_string()
        } else {
            uri.to_string()
        };
        self.stack.push(effective);
    }

    /// Leaves the innermost element, returning its URI.
    pub fn exit(&mut self) -> Option<String> {
        self.stack.pop()
    }

    /// Returns the innermost URI, or `""` outside any element.
    #[must_use]
    pub fn current(&self) -> &str {
        self.stack.last().map_or("", String::as_str)
    }

    /// Returns the number of open scopes.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_replaces_both_directions() {
        let mut reg = MemoryNamespaceRegistry::new();
        reg.register("a", "urn:1");
        reg.register("a", "urn:2");
        assert_eq!(reg.namespace_for_prefix("a"), Some("urn:2"));
        assert_eq!(reg.prefix_for_namespace("urn:1"), None);
        reg.register("b", "urn:2");
        assert_eq!(reg.namespace_for_prefix("a"), None);
        assert_eq!(reg.prefix_for_namespace("urn:2"), Some("b"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_defaults() {
        let reg = MemoryNamespaceRegistry::with_defaults();
        assert_eq!(reg.namespace_for_prefix("jcr"), Some(lexicon::jcr::NAMESPACE));
        assert_eq!(reg.namespace_for_prefix("xml"), Some(XML_NAMESPACE));
        assert_eq!(reg.default_namespace_uri(), "");
    }

    #[test]
    fn test_register_observed_uses_document_prefix() {
        let mut reg = MemoryNamespaceRegistry::new();
        let chosen = register_observed(&mut reg, Some("c"), "http://default.namespace.com");
        assert_eq!(chosen.as_deref(), Some("c"));
        assert_eq!(register_observed(&mut reg, Some("c"), "http://default.namespace.com"), None);
    }

    #[test]
    fn test_register_observed_generates_on_conflict() {
        let mut reg = MemoryNamespaceRegistry::new();
        reg.register("c", "urn:taken");
        let chosen = register_observed(&mut reg, Some("c"), "urn:new");
        assert_eq!(chosen.as_deref(), Some("ns001"));
        let chosen = register_observed(&mut reg, None, "urn:other");
        assert_eq!(chosen.as_deref(), Some("ns002"));
        assert_eq!(reg.namespace_for_prefix("c"), Some("urn:taken"));
    }

    #[test]
    fn test_register_observed_ignores_empty_uri() {
        let mut reg = MemoryNamespaceRegistry::new();
        assert_eq!(register_observed(&mut reg, Some("x"), ""), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_scope_inherits_on_empty_uri() {
        let mut scope = NamespaceScope::new();
        assert_eq!(scope.current(), "");
        scope.enter("urn:c");
        scope.enter("");
        assert_eq!(scope.current(), "urn:c");
        assert_eq!(scope.depth(), 2);
        scope.enter("urn:d");
        assert_eq!(scope.current(), "urn:d");
        scope.exit();
        assert_eq!(scope.current(), "urn:c");
        scope.exit();
        scope.exit();
        assert_eq!(scope.depth(), 0);
        assert_eq!(scope.exit(), None);
    }
}
