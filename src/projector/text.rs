//! Coalescing of character data between structural siblings.

use crate::util::text::normalize_whitespace;

/// How consecutive character callbacks are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextJoin {
    /// Append each run directly to the previous one.
    #[default]
    Concatenate,
    /// Put a single space before every run that follows buffered text,
    /// except before an entity reference.
    SpaceSeparated,
}

#[derive(Debug, Clone)]
struct Reference {
    name: String,
    written: bool,
}

/// Buffers the text of one logical run until a structural event flushes it.
///
/// Entity references are kept as `&name;` markup instead of their
/// replacement text.
#[derive(Debug, Clone, Default)]
pub struct TextAccumulator {
    join: TextJoin,
    buffer: Option<String>,
    references: Vec<Reference>,
}

impl TextAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new(join: TextJoin) -> Self {
        Self {
            join,
            buffer: None,
            references: Vec::new(),
        }
    }

    /// Marks the start of an entity reference.
    pub fn start_entity(&mut self, name: &str) {
        self.references.push(Reference {
            name: name.to_string(),
            written: false,
        });
    }

    /// Marks the end of the innermost entity reference.
    pub fn end_entity(&mut self) {
        self.references.pop();
    }

    /// Adds one character callback.
    pub fn characters(&mut self, text: &str) {
        let buffer = self.buffer.get_or_insert_with(String::new);
        if let Some(outer) = self.references.first_mut() {
            if !outer.written {
                outer.written = true;
                buffer.push('&');
                buffer.push_str(&outer.name);
                buffer.push(';');
            }
            return;
        }
        if self.join == TextJoin::SpaceSeparated && !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(text);
    }

    /// Returns `true` if text is buffered.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.buffer.is_some()
    }

    /// Ends the run, returning its normalized text. Whitespace-only runs
    /// yield `None`.
    pub fn take(&mut self) -> Option<String> {
        let raw = self.buffer.take()?;
        let normalized = normalize_whitespace(&raw);
        if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        }
    }
}
