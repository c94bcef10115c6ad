//! Paths of `(name, same-name-sibling index)` segments.

use std::fmt;

use crate::name::{NameError, QualifiedName};
use crate::namespace::NamespaceRegistry;

/// One step from a parent node to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    name: QualifiedName,
    index: u32,
}

impl PathSegment {
    /// Creates a segment. `index` is the 1-based same-name-sibling rank.
    #[must_use]
    pub fn new(name: QualifiedName, index: u32) -> Self {
        Self { name, index }
    }

    /// Returns the segment's name.
    #[must_use]
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Returns the 1-based same-name-sibling index.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == 1 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}[{}]", self.name, self.index)
        }
    }
}

/// A node address. The empty path denotes the projection root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Returns the empty (root) path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from its segments.
    #[must_use]
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Returns `true` for the empty path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segments from the root downwards.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the last segment, or `None` for the root.
    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    /// Lengthens the path in place.
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Shortens the path in place, returning the removed segment.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Returns the parent path, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Parses `a/b[2]/c:d` style paths, resolving prefixes through `registry`.
    ///
    /// A leading `/` is optional; `""` and `"/"` are the root. Segments without
    /// an explicit `[n]` get index 1.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] if a segment name can't be parsed or an index is
    /// not a positive integer.
    pub fn parse(text: &str, registry: &dyn NamespaceRegistry) -> Result<Self, NameError> {
        let trimmed = text.strip_prefix('/').unwrap_or(text);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for raw in trimmed.split('/') {
            let (name_text, index) = match raw.strip_suffix(']').and_then(|s| s.rsplit_once('[')) {
                Some((name, digits)) => {
                    let index = digits
                        .parse::<u32>()
                        .ok()
                        .filter(|i| *i > 0)
                        .ok_or_else(|| NameError::Malformed(raw.to_string()))?;
                    (name, index)
                }
                None => (raw, 1),
            };
            segments.push(PathSegment::new(
                QualifiedName::parse(name_text, registry)?,
                index,
            ));
        }
        Ok(Self { segments })
    }

    /// Formats the path with registry prefixes, the form used by `parse`.
    #[must_use]
    pub fn to_prefixed(&self, registry: &dyn NamespaceRegistry) -> String {
        let mut out = String::from("/");
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('/');
            }
            out.push_str(&segment.name.to_prefixed(registry));
            if segment.index != 1 {
                out.push_str(&format!("[{}]", segment.index));
            }
        }
        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
