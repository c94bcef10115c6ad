//! Same-name-sibling indexing.

use std::collections::HashMap;

use crate::name::QualifiedName;

/// A stack of per-parent occurrence counters.
///
/// The bottom map belongs to the projection root and is never popped.
/// Memory is bounded by nesting depth, since each map is dropped when its
/// parent closes.
#[derive(Debug, Clone)]
pub struct SiblingIndexer {
    stack: Vec<HashMap<QualifiedName, u32>>,
}

impl Default for SiblingIndexer {
    fn default() -> Self {
        Self::new()
    }
}

impl SiblingIndexer {
    /// Creates an indexer with only the root scope open.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec![HashMap::new()],
        }
    }

    /// Returns the 1-based index for the next child called `name` in the
    /// innermost scope.
    pub fn next_index(&mut self, name: &QualifiedName) -> u32 {
        let Some(counts) = self.stack.last_mut() else {
            return 1;
        };
        let count = counts.entry(name.clone()).or_insert(0);
        *count += 1;
        *count
    }

    /// Opens a scope for the children of the node just indexed.
    pub fn enter_scope(&mut self) {
        self.stack.push(HashMap::new());
    }

    /// Closes the innermost scope. Returns `false` if only the root scope
    /// was open, in which case nothing is popped.
    pub fn exit_scope(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        true
    }
}
