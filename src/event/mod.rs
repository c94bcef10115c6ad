//! The push-style event vocabulary consumed by the projectors.
//!
//! An event source (such as [`crate::reader::sequence_str`]) delivers
//! [`ContentEvent`]s in document order to a [`ContentHandler`]. Events
//! borrow their text from the source, so a handler that needs to keep any
//! of it must copy.
//!
//! # Examples
//!
//! ```
//! use xml_sequencer::error::SequenceError;
//! use xml_sequencer::event::{ContentEvent, ContentHandler};
//! use xml_sequencer::reader::sequence_str;
//!
//! struct ElementCounter {
//!     count: usize,
//! }
//!
//! impl ContentHandler for ElementCounter {
//!     fn handle(&mut self, event: ContentEvent<'_>) -> Result<(), SequenceError> {
//!         if let ContentEvent::StartElement { .. } = event {
//!             self.count += 1;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut counter = ElementCounter { count: 0 };
//! sequence_str("<root><a/><b/></root>", &mut counter).unwrap();
//! assert_eq!(counter.count, 3);
//! ```

use crate::error::{SequenceError, SourceLocation};

/// An attribute on an element-start event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Namespace URI, empty if the attribute is unprefixed.
    pub uri: &'a str,
    /// Local part of the name.
    pub local_name: &'a str,
    /// Name as written in the document, including any prefix.
    pub qualified_name: &'a str,
    /// Attribute value with references expanded.
    pub value: &'a str,
}

impl<'a> Attribute<'a> {
    /// Creates an attribute with no namespace.
    #[must_use]
    pub fn local(name: &'a str, value: &'a str) -> Self {
        Self {
            uri: "",
            local_name: name,
            qualified_name: name,
            value,
        }
    }

    /// Returns the prefix from the qualified name, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&'a str> {
        crate::util::qname::split_qname(self.qualified_name).0
    }
}

/// One parsing event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentEvent<'a> {
    /// Before any other event.
    StartDocument,
    /// After every other event.
    EndDocument,
    /// An element start tag.
    StartElement {
        /// Namespace URI, empty if none is in scope.
        uri: &'a str,
        /// Local part of the tag name.
        local_name: &'a str,
        /// Tag name as written.
        qualified_name: &'a str,
        /// Attributes in document order, namespace declarations excluded.
        attributes: &'a [Attribute<'a>],
    },
    /// An element end tag (or the end of an empty-element tag).
    EndElement {
        /// Namespace URI, empty if none is in scope.
        uri: &'a str,
        /// Local part of the tag name.
        local_name: &'a str,
        /// Tag name as written.
        qualified_name: &'a str,
    },
    /// Character data outside character-data blocks.
    Characters(&'a str),
    /// A comment's text.
    Comment(&'a str),
    /// A processing instruction.
    ProcessingInstruction {
        /// The instruction target.
        target: &'a str,
        /// Everything after the target, if present.
        data: Option<&'a str>,
    },
    /// Start of a `<![CDATA[` block.
    StartCdata,
    /// Raw text inside a character-data block.
    CdataCharacters(&'a str),
    /// End of a character-data block.
    EndCdata,
    /// Start of an entity reference; the replacement text follows as
    /// [`Characters`](Self::Characters).
    StartEntity(&'a str),
    /// End of an entity reference.
    EndEntity(&'a str),
    /// Start of the document type declaration.
    StartDtd {
        /// The declared root element name.
        name: &'a str,
        /// Public identifier, if any.
        public_id: Option<&'a str>,
        /// System identifier, if any.
        system_id: Option<&'a str>,
    },
    /// End of the document type declaration.
    EndDtd,
    /// An internal entity declaration. Parameter entities are named `%name`.
    InternalEntityDecl {
        /// The entity name.
        name: &'a str,
        /// The replacement text.
        value: &'a str,
    },
    /// An external entity declaration. Parameter entities are named `%name`.
    ExternalEntityDecl {
        /// The entity name.
        name: &'a str,
        /// Public identifier, if any.
        public_id: Option<&'a str>,
        /// System identifier, if any.
        system_id: Option<&'a str>,
    },
    /// A namespace prefix came into scope. Fires before the element start
    /// that declares it; an empty prefix is the default namespace.
    StartPrefixMapping {
        /// The bound prefix.
        prefix: &'a str,
        /// The bound URI.
        uri: &'a str,
    },
    /// A non-fatal issue.
    Warning {
        /// What went wrong.
        message: &'a str,
        /// Where.
        location: SourceLocation,
    },
    /// A recoverable error.
    Error {
        /// What went wrong.
        message: &'a str,
        /// Where.
        location: SourceLocation,
    },
    /// An unrecoverable error; the source stops after delivering it.
    FatalError {
        /// What went wrong.
        message: &'a str,
        /// Where.
        location: SourceLocation,
    },
}

impl ContentEvent<'_> {
    /// Returns a short name for the event, used in log output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartDocument => "start-document",
            Self::EndDocument => "end-document",
            Self::StartElement { .. } => "start-element",
            Self::EndElement { .. } => "end-element",
            Self::Characters(_) => "characters",
            Self::Comment(_) => "comment",
            Self::ProcessingInstruction { .. } => "processing-instruction",
            Self::StartCdata => "start-cdata",
            Self::CdataCharacters(_) => "cdata-characters",
            Self::EndCdata => "end-cdata",
            Self::StartEntity(_) => "start-entity",
            Self::EndEntity(_) => "end-entity",
            Self::StartDtd { .. } => "start-dtd",
            Self::EndDtd => "end-dtd",
            Self::InternalEntityDecl { .. } => "internal-entity-decl",
            Self::ExternalEntityDecl { .. } => "external-entity-decl",
            Self::StartPrefixMapping { .. } => "start-prefix-mapping",
            Self::Warning { .. } => "warning",
            Self::Error { .. } => "error",
            Self::FatalError { .. } => "fatal-error",
        }
    }
}

/// Receives events in document order.
///
/// Returning an error tells the event source to stop delivering events and
/// pass the error to its caller.
pub trait ContentHandler {
    /// Handles one event.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError`] when the run must stop.
    fn handle(&mut self, event: ContentEvent<'_>) -> Result<(), SequenceError>;
}

impl<H: ContentHandler + ?Sized> ContentHandler for &mut H {
    fn handle(&mut self, event: ContentEvent<'_>) -> Result<(), SequenceError> {
        (**self).handle(event)
    }
}

/// Feeds a sequence of events to `handler`, stopping at the first error.
///
/// # Errors
///
/// Returns the first error the handler reports.
pub fn replay<'a, I>(handler: &mut dyn ContentHandler, events: I) -> Result<(), SequenceError>
where
    I: IntoIterator<Item = ContentEvent<'a>>,
{
    for event in events {
        handler.handle(event)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Kinds(Vec<&'static str>);

    impl ContentHandler for Kinds {
        fn handle(&mut self, event: ContentEvent<'_>) -> Result<(), SequenceError> {
            if matches!(event, ContentEvent::Comment("stop")) {
                return Err(SequenceError::Terminated);
            }
            self.0.push(event.kind());
            Ok(())
        }
    }

    #[test]
    fn test_replay_stops_at_first_error() {
        let mut kinds = Kinds(Vec::new());
        let result = replay(
            &mut kinds,
            [
                ContentEvent::StartDocument,
                ContentEvent::Characters("x"),
                ContentEvent::Comment("stop"),
                ContentEvent::EndDocument,
            ],
        );
        assert_eq!(result, Err(SequenceError::Terminated));
        assert_eq!(kinds.0, vec!["start-document", "characters"]);
    }

    #[test]
    fn test_attribute_prefix() {
        let attr = Attribute {
            uri: "urn:j",
            local_name: "name",
            qualified_name: "jcr:name",
            value: "Prius",
        };
        assert_eq!(attr.prefix(), Some("jcr"));
        assert_eq!(Attribute::local("maker", "Toyota").prefix(), None);
    }

    #[test]
    fn test_handler_through_mut_reference() {
        let mut kinds = Kinds(Vec::new());
        let mut by_ref = &mut kinds;
        by_ref.handle(ContentEvent::EndDtd).unwrap();
        assert_eq!(kinds.0, vec!["end-dtd"]);
    }
}
