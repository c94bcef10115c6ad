//! The name-preserving projector: one node per element, one property per
//! attribute.

use std::sync::Arc;

use crate::destination::Destination;
use crate::error::{ProblemSeverity, Problems, SequenceError, SourceLocation};
use crate::event::{Attribute, ContentEvent, ContentHandler};
use crate::name::{resolve_name, Path, PathSegment, QualifiedName};
use crate::namespace::{register_observed, NamespaceRegistry, NamespaceScope};
use crate::projector::{
    attribute_name, name_value, register_element_namespaces, Collaborators, ElementOptions,
    RunControl, SiblingIndexer,
};
use crate::property::{Properties, PropertyValue};

/// Projects elements to nodes as soon as their start tag is seen.
///
/// Text, comments, processing instructions and DTD events are ignored.
/// The destination is submitted exactly once, at document end.
pub struct ElementProjector<'a> {
    destination: &'a mut dyn Destination,
    registry: &'a mut dyn NamespaceRegistry,
    control: RunControl<'a>,
    options: ElementOptions,
    path: Path,
    siblings: SiblingIndexer,
    scope: NamespaceScope,
    /// One entry per open element; `false` for a skipped root.
    open: Vec<bool>,
    skip_next: bool,
    created: usize,
}

impl<'a> ElementProjector<'a> {
    pub(crate) fn new(parts: Collaborators<'a>, options: ElementOptions) -> Self {
        Self {
            destination: parts.destination,
            registry: parts.registry,
            control: parts.control,
            path: options.base_path.clone(),
            skip_next: options.skip_root,
            options,
            siblings: SiblingIndexer::new(),
            scope: NamespaceScope::new(),
            open: Vec::new(),
            created: 0,
        }
    }

    /// Returns the problems reported so far.
    #[must_use]
    pub fn problems(&self) -> &Problems {
        self.control.problems()
    }

    /// Consumes the projector, returning the problems reported during the run.
    #[must_use]
    pub fn into_problems(self) -> Problems {
        self.control.into_problems()
    }

    /// Returns the number of nodes created in the current document.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Returns the path of the innermost open node.
    #[must_use]
    pub fn current_path(&self) -> &Path {
        &self.path
    }

    fn reset(&mut self) {
        self.path = self.options.base_path.clone();
        self.siblings = SiblingIndexer::new();
        self.scope = NamespaceScope::new();
        self.open.clear();
        self.skip_next = self.options.skip_root;
        self.created = 0;
    }

    fn dispatch(&mut self, event: ContentEvent<'_>) -> Result<(), SequenceError> {
        match event {
            ContentEvent::StartDocument => {
                self.reset();
                Ok(())
            }
            ContentEvent::EndDocument => {
                self.destination.submit()?;
                log::info!("projected {} element nodes", self.created);
                Ok(())
            }
            ContentEvent::StartPrefixMapping { prefix, uri } => {
                let prefix = (!prefix.is_empty()).then_some(prefix);
                register_observed(self.registry, prefix, uri);
                Ok(())
            }
            ContentEvent::StartElement {
                uri,
                local_name,
                qualified_name,
                attributes,
            } => self.start_element(uri, local_name, qualified_name, attributes),
            ContentEvent::EndElement { .. } => self.end_element(),
            ContentEvent::Warning { message, location } => {
                self.control.report(ProblemSeverity::Warning, message, location)
            }
            ContentEvent::Error { message, location } => {
                self.control.report(ProblemSeverity::Error, message, location)
            }
            ContentEvent::FatalError { message, location } => {
                self.control.report(ProblemSeverity::Fatal, message, location)
            }
            _ => Ok(()),
        }
    }

    fn start_element(
        &mut self,
        uri: &str,
        local_name: &str,
        qualified_name: &str,
        attributes: &[Attribute<'_>],
    ) -> Result<(), SequenceError> {
        self.scope.enter(uri);
        if self.skip_next {
            self.skip_next = false;
            self.open.push(false);
            return Ok(());
        }
        register_element_namespaces(self.registry, uri, qualified_name, attributes);

        let decoder = Arc::clone(&self.options.decoder);
        let tag_name = resolve_name(uri, local_name, qualified_name, decoder.as_ref())
            .in_namespace(self.registry.default_namespace_uri());

        let mut node_name: Option<QualifiedName> = None;
        let mut type_value: Option<PropertyValue> = None;
        let mut properties = Properties::new();
        for attribute in attributes {
            let name = attribute_name(
                attribute,
                decoder.as_ref(),
                self.options.attribute_scoping,
                &self.scope,
                &*self.registry,
            );
            if node_name.is_none() && self.options.name_attribute.as_ref() == Some(&name) {
                match QualifiedName::parse(attribute.value, &*self.registry) {
                    Ok(parsed) => node_name = Some(parsed),
                    Err(err) => {
                        let message = format!(
                            "cannot use '{}' as a node name ({err}); using the element name",
                            attribute.value
                        );
                        self.control
                            .report(ProblemSeverity::Warning, &message, SourceLocation::default())?;
                    }
                }
                continue;
            }
            if type_value.is_none() && self.options.type_attribute.as_ref() == Some(&name) {
                type_value = Some(name_value(attribute.value, &*self.registry));
                continue;
            }
            properties.set(name, attribute.value);
        }

        let named_by_attribute = node_name.is_some();
        let node_name = node_name.unwrap_or_else(|| tag_name.clone());
        if let Some(type_attribute) = &self.options.type_attribute {
            if type_value.is_none() && named_by_attribute {
                type_value = Some(PropertyValue::Name(tag_name));
            }
            if type_value.is_none() {
                type_value = self
                    .options
                    .type_attribute_value
                    .clone()
                    .map(PropertyValue::Name);
            }
            if let Some(value) = type_value {
                properties.set(type_attribute.clone(), value);
            }
        }

        let index = self.siblings.next_index(&node_name);
        self.siblings.enter_scope();
        self.path.push(PathSegment::new(node_name, index));
        self.open.push(true);
        log::debug!("creating {}", self.path);
        self.destination.create(&self.path, properties)?;
        self.created += 1;
        Ok(())
    }

    fn end_element(&mut self) -> Result<(), SequenceError> {
        let projected = self.open.pop().ok_or(SequenceError::UnbalancedEnd)?;
        self.scope.exit();
        if projected {
            self.siblings.exit_scope();
            self.path.pop();
        }
        Ok(())
    }
}

impl ContentHandler for ElementProjector<'_> {
    fn handle(&mut self, event: ContentEvent<'_>) -> Result<(), SequenceError> {
        self.control.begin()?;
        let outcome = self.dispatch(event);
        self.control.finish(outcome)
    }
}
