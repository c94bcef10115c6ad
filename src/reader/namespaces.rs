//! In-document prefix bindings.

use crate::namespace::XML_NAMESPACE;

/// Tracks `xmlns` declarations as elements open and close.
///
/// Each frame holds the `(prefix, uri)` pairs declared on one element; a
/// `None` prefix is the default namespace.
#[derive(Debug)]
pub(crate) struct PrefixBindings {
    stack: Vec<Vec<(Option<String>, String)>>,
}

impl PrefixBindings {
    /// Creates the bindings with the `xml` prefix pre-bound.
    pub(crate) fn new() -> Self {
        let initial = vec![(Some("xml".to_string()), XML_NAMESPACE.to_string())];
        Self {
            stack: vec![initial],
        }
    }

    pub(crate) fn push_scope(&mut self) {
        self.stack.push(Vec::new());
    }

    pub(crate) fn pop_scope(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Binds a prefix in the innermost scope.
    pub(crate) fn bind(&mut self, prefix: Option<&str>, uri: &str) {
        if let Some(frame) = self.stack.last_mut() {
            frame.push((prefix.map(str::to_string), uri.to_string()));
        }
    }

    /// Resolves a prefix, innermost binding first. `xmlns=""` undeclares
    /// the default namespace.
    pub(crate) fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        for frame in self.stack.iter().rev() {
            for (bound, uri) in frame.iter().rev() {
                if bound.as_deref() == prefix {
                    return (!uri.is_empty()).then_some(uri.as_str());
                }
            }
        }
        None
    }
}
