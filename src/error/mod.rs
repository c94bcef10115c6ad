//! Error types and problem reporting for sequencing runs.
//!
//! Malformed input reported by the event source is recorded as a
//! [`Problem`] in a [`Problems`] collector. Recoverable problems let the run
//! continue; a fatal problem, a cancellation, or a failing destination stops
//! it with a [`SequenceError`].

use std::fmt;

use thiserror::Error;

use crate::name::Path;

/// Severity level for a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemSeverity {
    /// A non-fatal issue that doesn't affect the projected content.
    Warning,
    /// A recoverable error: the document is malformed but processing continues.
    Error,
    /// An unrecoverable error: the run stops.
    Fatal,
}

impl fmt::Display for ProblemSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal error"),
        }
    }
}

/// Source location within an XML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl SourceLocation {
    /// Computes the line and column of `byte_offset` within `input`.
    #[must_use]
    pub fn at(input: &str, byte_offset: usize) -> Self {
        let offset = byte_offset.min(input.len());
        let mut line = 1u32;
        let mut column = 1u32;
        for ch in input[..offset].chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            line,
            column,
            byte_offset: offset,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A single problem reported while sequencing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// The severity of this problem.
    pub severity: ProblemSeverity,
    /// Human-readable message.
    pub message: String,
    /// Where in the source the problem occurred.
    pub location: SourceLocation,
}

impl Problem {
    /// Creates a problem with the given severity.
    pub fn new(severity: ProblemSeverity, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            severity,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.severity, self.message, self.location)
    }
}

/// Collects the problems reported during one sequencing run.
#[derive(Debug, Clone, Default)]
pub struct Problems {
    entries: Vec<Problem>,
}

impl Problems {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem, logging it at the matching level.
    pub fn add(&mut self, problem: Problem) {
        match problem.severity {
            ProblemSeverity::Warning | ProblemSeverity::Error => log::warn!("{problem}"),
            ProblemSeverity::Fatal => log::error!("{problem}"),
        }
        self.entries.push(problem);
    }

    /// Returns all recorded problems in report order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Problem> {
        self.entries.iter()
    }

    /// Returns `true` if any error or fatal problem was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|p| p.severity != ProblemSeverity::Warning)
    }

    /// Returns the number of recorded problems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Problems {
    type Item = &'a Problem;
    type IntoIter = std::slice::Iter<'a, Problem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Errors raised by a [`Destination`](crate::destination::Destination).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DestinationError {
    /// Properties were written to a path that was never created.
    #[error("no node exists at {0}")]
    UnknownNode(Path),
    /// The destination refused the write.
    #[error("write to {path} rejected: {reason}")]
    Rejected {
        /// The path that was being written.
        path: Path,
        /// Why the destination refused it.
        reason: String,
    },
}

/// The error type returned when a sequencing run stops early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The caller's cancellation token was set.
    #[error("sequencing was cancelled")]
    Cancelled,
    /// The event source reported a fatal problem.
    #[error("fatal problem in document: {0}")]
    Fatal(Problem),
    /// A required collaborator was not supplied at construction.
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),
    /// The destination failed to apply a write.
    #[error(transparent)]
    Destination(#[from] DestinationError),
    /// An end event arrived with no open scope to close.
    #[error("end event without a matching start")]
    UnbalancedEnd,
    /// An event was delivered after the run had already stopped.
    #[error("event delivered after the run was terminated")]
    Terminated,
}

impl SequenceError {
    /// Returns `true` if the run stopped because the caller cancelled it.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
