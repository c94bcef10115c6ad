//! Projection of content events into path-addressed nodes.
//!
//! Two projectors are provided:
//!
//! - [`ElementProjector`] maps each element to one node and each attribute
//!   to one property. Comments, processing instructions and text are not
//!   represented.
//! - [`DocumentProjector`] also keeps comments, processing instructions,
//!   character-data blocks, text runs and DTD entity declarations as
//!   synthetic nodes, in document order.
//!
//! Both are built by [`ProjectorBuilder`], which takes the run's
//! collaborators, and are driven through
//! [`ContentHandler`](crate::event::ContentHandler).
//!
//! # Examples
//!
//! ```
//! use xml_sequencer::destination::MemoryDestination;
//! use xml_sequencer::namespace::MemoryNamespaceRegistry;
//! use xml_sequencer::projector::{ElementOptions, ProjectorBuilder};
//! use xml_sequencer::reader::sequence_str;
//!
//! let mut destination = MemoryDestination::new();
//! let mut registry = MemoryNamespaceRegistry::with_defaults();
//! let mut projector = ProjectorBuilder::new()
//!     .destination(&mut destination)
//!     .registry(&mut registry)
//!     .build_element(ElementOptions::default())
//!     .unwrap();
//! sequence_str("<cars><car/><car/></cars>", &mut projector).unwrap();
//! drop(projector);
//!
//! let paths: Vec<String> = destination.records().iter().map(|r| r.path.to_string()).collect();
//! assert_eq!(paths, ["/cars", "/cars/car", "/cars/car[2]"]);
//! ```

mod document;
mod element;
mod siblings;
mod text;

pub use document::DocumentProjector;
pub use element::ElementProjector;
pub use siblings::SiblingIndexer;
pub use text::{TextAccumulator, TextJoin};

use std::sync::Arc;

use crate::destination::Destination;
use crate::error::{Problem, ProblemSeverity, Problems, SequenceError, SourceLocation};
use crate::event::Attribute;
use crate::lexicon;
use crate::monitor::{CancellationToken, ProgressMonitor, ProgressTracker};
use crate::name::{resolve_name, Path, QualifiedName, TextDecoder, XmlNameCodec};
use crate::namespace::{register_observed, NamespaceRegistry, NamespaceScope};
use crate::property::PropertyValue;
use crate::util::qname::split_qname;

/// How an attribute without a prefix gets its namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeScoping {
    /// Use the registry's default namespace.
    #[default]
    UseDefaultNamespace,
    /// Use the namespace of the enclosing element.
    InheritElementNamespace,
}

/// Options for [`ElementProjector`].
///
/// # Examples
///
/// ```
/// use xml_sequencer::lexicon::jcr;
/// use xml_sequencer::projector::{AttributeScoping, ElementOptions};
///
/// let opts = ElementOptions::default()
///     .skip_root(true)
///     .name_attribute(Some(jcr::name()))
///     .attribute_scoping(AttributeScoping::InheritElementNamespace);
/// assert!(opts.skip_root);
/// ```
#[derive(Clone)]
pub struct ElementOptions {
    /// Do not project the outermost element; its children attach to `base_path`.
    pub skip_root: bool,
    /// Where the projected tree is attached.
    pub base_path: Path,
    /// Decoder applied to element and attribute names.
    pub decoder: Arc<dyn TextDecoder>,
    /// An attribute whose value names the node instead of the tag.
    pub name_attribute: Option<QualifiedName>,
    /// The property that receives the node's type.
    pub type_attribute: Option<QualifiedName>,
    /// The type written when no other type is known.
    pub type_attribute_value: Option<QualifiedName>,
    /// Namespace policy for unprefixed attributes.
    pub attribute_scoping: AttributeScoping,
}

impl std::fmt::Debug for ElementOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementOptions")
            .field("skip_root", &self.skip_root)
            .field("base_path", &self.base_path)
            .field("decoder", &"...")
            .field("name_attribute", &self.name_attribute)
            .field("type_attribute", &self.type_attribute)
            .field("type_attribute_value", &self.type_attribute_value)
            .field("attribute_scoping", &self.attribute_scoping)
            .finish()
    }
}

impl Default for ElementOptions {
    fn default() -> Self {
        Self {
            skip_root: false,
            base_path: Path::root(),
            decoder: Arc::new(XmlNameCodec),
            name_attribute: None,
            type_attribute: None,
            type_attribute_value: None,
            attribute_scoping: AttributeScoping::UseDefaultNamespace,
        }
    }
}

impl ElementOptions {
    /// Skips or keeps the outermost element.
    #[must_use]
    pub fn skip_root(mut self, yes: bool) -> Self {
        self.skip_root = yes;
        self
    }

    /// Sets the attachment path.
    #[must_use]
    pub fn base_path(mut self, path: Path) -> Self {
        self.base_path = path;
        self
    }

    /// Sets the name decoder.
    #[must_use]
    pub fn decoder(mut self, decoder: Arc<dyn TextDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Sets the name-bearing attribute.
    #[must_use]
    pub fn name_attribute(mut self, name: Option<QualifiedName>) -> Self {
        self.name_attribute = name;
        self
    }

    /// Sets the type property.
    #[must_use]
    pub fn type_attribute(mut self, name: Option<QualifiedName>) -> Self {
        self.type_attribute = name;
        self
    }

    /// Sets the fallback type value.
    #[must_use]
    pub fn type_attribute_value(mut self, value: Option<QualifiedName>) -> Self {
        self.type_attribute_value = value;
        self
    }

    /// Sets the attribute scoping policy.
    #[must_use]
    pub fn attribute_scoping(mut self, scoping: AttributeScoping) -> Self {
        self.attribute_scoping = scoping;
        self
    }
}

/// Options for [`DocumentProjector`].
#[derive(Clone)]
pub struct DocumentOptions {
    /// Path of the document node.
    pub base_path: Path,
    /// Decoder applied to element and attribute names.
    pub decoder: Arc<dyn TextDecoder>,
    /// An attribute whose value names the node instead of the tag.
    pub name_attribute: Option<QualifiedName>,
    /// Type marker for element nodes without an explicit type attribute.
    pub default_primary_type: QualifiedName,
    /// Namespace policy for unprefixed attributes.
    pub attribute_scoping: AttributeScoping,
    /// How consecutive character callbacks are joined.
    pub text_join: TextJoin,
}

impl std::fmt::Debug for DocumentOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentOptions")
            .field("base_path", &self.base_path)
            .field("decoder", &"...")
            .field("name_attribute", &self.name_attribute)
            .field("default_primary_type", &self.default_primary_type)
            .field("attribute_scoping", &self.attribute_scoping)
            .field("text_join", &self.text_join)
            .finish()
    }
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            base_path: Path::root(),
            decoder: Arc::new(XmlNameCodec),
            name_attribute: Some(lexicon::jcr::name()),
            default_primary_type: lexicon::nt::unstructured(),
            attribute_scoping: AttributeScoping::InheritElementNamespace,
            text_join: TextJoin::Concatenate,
        }
    }
}

impl DocumentOptions {
    /// Sets the document node path.
    #[must_use]
    pub fn base_path(mut self, path: Path) -> Self {
        self.base_path = path;
        self
    }

    /// Sets the name decoder.
    #[must_use]
    pub fn decoder(mut self, decoder: Arc<dyn TextDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Sets the name-bearing attribute.
    #[must_use]
    pub fn name_attribute(mut self, name: Option<QualifiedName>) -> Self {
        self.name_attribute = name;
        self
    }

    /// Sets the default element type marker.
    #[must_use]
    pub fn default_primary_type(mut self, name: QualifiedName) -> Self {
        self.default_primary_type = name;
        self
    }

    /// Sets the attribute scoping policy.
    #[must_use]
    pub fn attribute_scoping(mut self, scoping: AttributeScoping) -> Self {
        self.attribute_scoping = scoping;
        self
    }

    /// Sets the text join mode.
    #[must_use]
    pub fn text_join(mut self, join: TextJoin) -> Self {
        self.text_join = join;
        self
    }
}

/// Collects a run's collaborators and builds a projector.
///
/// The destination and namespace registry are required; cancellation and
/// progress reporting are optional.
#[derive(Default)]
pub struct ProjectorBuilder<'a> {
    destination: Option<&'a mut dyn Destination>,
    registry: Option<&'a mut dyn NamespaceRegistry>,
    cancellation: Option<CancellationToken>,
    progress: Option<&'a mut dyn ProgressMonitor>,
}

impl<'a> ProjectorBuilder<'a> {
    /// Creates a builder with no collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the write sink.
    #[must_use]
    pub fn destination(mut self, destination: &'a mut dyn Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Sets the namespace registry.
    #[must_use]
    pub fn registry(mut self, registry: &'a mut dyn NamespaceRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the cancellation token polled before every event.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Sets the progress sink.
    #[must_use]
    pub fn progress(mut self, monitor: &'a mut dyn ProgressMonitor) -> Self {
        self.progress = Some(monitor);
        self
    }

    /// Builds a name-preserving projector.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::MissingCollaborator`] if the destination or
    /// registry was not supplied.
    pub fn build_element(self, options: ElementOptions) -> Result<ElementProjector<'a>, SequenceError> {
        let parts = self.into_parts()?;
        Ok(ElementProjector::new(parts, options))
    }

    /// Builds a content-preserving projector.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::MissingCollaborator`] if the destination or
    /// registry was not supplied.
    pub fn build_document(self, options: DocumentOptions) -> Result<DocumentProjector<'a>, SequenceError> {
        let parts = self.into_parts()?;
        Ok(DocumentProjector::new(parts, options))
    }

    fn into_parts(self) -> Result<Collaborators<'a>, SequenceError> {
        let destination = self
            .destination
            .ok_or(SequenceError::MissingCollaborator("destination"))?;
        let registry = self
            .registry
            .ok_or(SequenceError::MissingCollaborator("namespace registry"))?;
        Ok(Collaborators {
            destination,
            registry,
            control: RunControl {
                cancellation: self.cancellation,
                progress: self.progress,
                tracker: ProgressTracker::new(),
                problems: Problems::new(),
                terminated: false,
            },
        })
    }
}

pub(crate) struct Collaborators<'a> {
    pub(crate) destination: &'a mut dyn Destination,
    pub(crate) registry: &'a mut dyn NamespaceRegistry,
    pub(crate) control: RunControl<'a>,
}

/// Per-run bookkeeping shared by both projectors: cancellation polling,
/// progress ticks, the problem collector and the terminated flag.
pub(crate) struct RunControl<'a> {
    cancellation: Option<CancellationToken>,
    progress: Option<&'a mut dyn ProgressMonitor>,
    tracker: ProgressTracker,
    problems: Problems,
    terminated: bool,
}

impl RunControl<'_> {
    /// Called before an event is processed.
    pub(crate) fn begin(&mut self) -> Result<(), SequenceError> {
        if self.terminated {
            return Err(SequenceError::Terminated);
        }
        if self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled) {
            self.terminated = true;
            log::info!("sequencing cancelled");
            return Err(SequenceError::Cancelled);
        }
        Ok(())
    }

    /// Called with the outcome of an event.
    pub(crate) fn finish(&mut self, outcome: Result<(), SequenceError>) -> Result<(), SequenceError> {
        match outcome {
            Ok(()) => {
                let tick = self.tracker.advance();
                if let Some(progress) = self.progress.as_mut() {
                    progress.worked(tick);
                }
                Ok(())
            }
            Err(err) => {
                self.terminated = true;
                Err(err)
            }
        }
    }

    /// Records a problem reported by the event source. Fatal problems stop
    /// the run.
    pub(crate) fn report(
        &mut self,
        severity: ProblemSeverity,
        message: &str,
        location: SourceLocation,
    ) -> Result<(), SequenceError> {
        let problem = Problem::new(severity, message, location);
        self.problems.add(problem.clone());
        if severity == ProblemSeverity::Fatal {
            return Err(SequenceError::Fatal(problem));
        }
        Ok(())
    }

    pub(crate) fn problems(&self) -> &Problems {
        &self.problems
    }

    pub(crate) fn into_problems(self) -> Problems {
        self.problems
    }
}

/// Resolves an attribute's name under the scoping policy. `scope` must
/// already include the attribute's element.
pub(crate) fn attribute_name(
    attribute: &Attribute<'_>,
    decoder: &dyn TextDecoder,
    scoping: AttributeScoping,
    scope: &NamespaceScope,
    registry: &dyn NamespaceRegistry,
) -> QualifiedName {
    let resolved = resolve_name(
        attribute.uri,
        attribute.local_name,
        attribute.qualified_name,
        decoder,
    );
    let namespace = match scoping {
        AttributeScoping::UseDefaultNamespace => registry.default_namespace_uri(),
        AttributeScoping::InheritElementNamespace => scope.current(),
    };
    resolved.in_namespace(namespace)
}

/// Registers the namespaces used by an element and its attributes.
pub(crate) fn register_element_namespaces(
    registry: &mut dyn NamespaceRegistry,
    uri: &str,
    qualified_name: &str,
    attributes: &[Attribute<'_>],
) {
    register_observed(registry, split_qname(qualified_name).0, uri);
    for attribute in attributes {
        register_observed(registry, attribute.prefix(), attribute.uri);
    }
}

/// Parses an attribute value as a name, keeping it as text if it isn't one.
pub(crate) fn name_value(text: &str, registry: &dyn NamespaceRegistry) -> PropertyValue {
    match QualifiedName::parse(text, registry) {
        Ok(name) => PropertyValue::Name(name),
        Err(_) => PropertyValue::String(text.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::destination::MemoryDestination;
    use crate::namespace::MemoryNamespaceRegistry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_destination_is_rejected() {
        let mut registry = MemoryNamespaceRegistry::new();
        let err = ProjectorBuilder::new()
            .registry(&mut registry)
            .build_element(ElementOptions::default())
            .err();
        assert_eq!(err, Some(SequenceError::MissingCollaborator("destination")));
    }

    #[test]
    fn test_missing_registry_is_rejected() {
        let mut destination = MemoryDestination::new();
        let err = ProjectorBuilder::new()
            .destination(&mut destination)
            .build_document(DocumentOptions::default())
            .err();
        assert_eq!(
            err,
            Some(SequenceError::MissingCollaborator("namespace registry"))
        );
    }

    #[test]
    fn test_option_defaults() {
        let element = ElementOptions::default();
        assert!(!element.skip_root);
        assert_eq!(element.attribute_scoping, AttributeScoping::UseDefaultNamespace);
        let document = DocumentOptions::default();
        assert_eq!(document.name_attribute, Some(lexicon::jcr::name()));
        assert_eq!(document.default_primary_type, lexicon::nt::unstructured());
        assert_eq!(document.text_join, TextJoin::Concatenate);
    }

    #[test]
    fn test_attribute_name_scoping() {
        let mut registry = MemoryNamespaceRegistry::new();
        registry.register("", "urn:default");
        let mut scope = NamespaceScope::new();
        scope.enter("urn:c");
        let attr = Attribute::local("maker", "Toyota");
        let inherited = attribute_name(
            &attr,
            &XmlNameCodec,
            AttributeScoping::InheritElementNamespace,
            &scope,
            &registry,
        );
        assert_eq!(inherited, QualifiedName::new("urn:c", "maker"));
        let defaulted = attribute_name(
            &attr,
            &XmlNameCodec,
            AttributeScoping::UseDefaultNamespace,
            &scope,
            &registry,
        );
        assert_eq!(defaulted, QualifiedName::new("urn:default", "maker"));
    }

    #[test]
    fn test_name_value_falls_back_to_text() {
        let registry = MemoryNamespaceRegistry::with_defaults();
        assert_eq!(
            name_value("nt:unstructured", &registry),
            PropertyValue::Name(lexicon::nt::unstructured())
        );
        assert_eq!(
            name_value("zz:thing", &registry),
            PropertyValue::String("zz:thing".to_string())
        );
    }

    #[test]
    fn test_options_debug_hides_decoder() {
        let text = format!("{:?}", ElementOptions::default());
        assert!(text.contains("decoder: \"...\""));
    }
}
