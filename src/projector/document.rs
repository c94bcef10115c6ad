//! The content-preserving projector.
//!
//! Besides elements, this projector keeps everything a document says that
//! can be represented as a node: comments, processing instructions,
//! character-data blocks, coalesced text and entity declarations all become
//! synthetic children of the node that was open when they were seen. Each
//! synthetic kind has its own reserved name, so synthetic siblings never
//! shift the indices of element siblings.
//!
//! The document node itself (at the configured base path) is held back
//! until its first child is created or the document ends, so facts from the
//! DTD can be written with it.

use std::sync::Arc;

use crate::destination::Destination;
use crate::error::{ProblemSeverity, Problems, SequenceError, SourceLocation};
use crate::event::{Attribute, ContentEvent, ContentHandler};
use crate::lexicon::{dtd, jcr, xml};
use crate::name::{resolve_name, Path, PathSegment, QualifiedName};
use crate::namespace::{register_observed, NamespaceRegistry, NamespaceScope};
use crate::projector::{
    attribute_name, name_value, register_element_namespaces, Collaborators, DocumentOptions,
    RunControl, SiblingIndexer, TextAccumulator,
};
use crate::property::{Properties, PropertyValue};

#[derive(Debug)]
enum DocumentNode {
    Pending(Properties),
    Emitted,
}

/// Projects a whole document, including non-element markup.
pub struct DocumentProjector<'a> {
    destination: &'a mut dyn Destination,
    registry: &'a mut dyn NamespaceRegistry,
    control: RunControl<'a>,
    options: DocumentOptions,
    path: Path,
    siblings: SiblingIndexer,
    scope: NamespaceScope,
    text: TextAccumulator,
    /// `Some` while inside a character-data block.
    cdata: Option<String>,
    document: DocumentNode,
    created: usize,
}

impl<'a> DocumentProjector<'a> {
    pub(crate) fn new(parts: Collaborators<'a>, options: DocumentOptions) -> Self {
        Self {
            destination: parts.destination,
            registry: parts.registry,
            control: parts.control,
            path: options.base_path.clone(),
            text: TextAccumulator::new(options.text_join),
            options,
            siblings: SiblingIndexer::new(),
            scope: NamespaceScope::new(),
            cdata: None,
            document: DocumentNode::Pending(document_properties()),
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

    /// Returns the number of nodes created in the current document,
    /// including the document node.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Returns `true` while inside a character-data block.
    #[must_use]
    pub fn in_cdata(&self) -> bool {
        self.cdata.is_some()
    }

    fn reset(&mut self) {
        self.path = self.options.base_path.clone();
        self.siblings = SiblingIndexer::new();
        self.scope = NamespaceScope::new();
        self.text = TextAccumulator::new(self.options.text_join);
        self.cdata = None;
        self.document = DocumentNode::Pending(document_properties());
        self.created = 0;
    }

    fn dispatch(&mut self, event: ContentEvent<'_>) -> Result<(), SequenceError> {
        match event {
            ContentEvent::StartDocument => {
                self.reset();
                Ok(())
            }
            ContentEvent::EndDocument => self.end_document(),
            ContentEvent::StartDtd {
                name,
                public_id,
                system_id,
            } => self.start_dtd(name, public_id, system_id),
            ContentEvent::EndDtd => Ok(()),
            ContentEvent::InternalEntityDecl { name, value } => {
                self.flush_text()?;
                let properties = Properties::new()
                    .with(jcr::primary_type(), dtd::entity())
                    .with(dtd::name_property(), name)
                    .with(dtd::value(), value);
                self.create_synthetic(dtd::entity(), properties)
            }
            ContentEvent::ExternalEntityDecl {
                name,
                public_id,
                system_id,
            } => {
                self.flush_text()?;
                let mut properties = Properties::new()
                    .with(jcr::primary_type(), dtd::entity())
                    .with(dtd::name_property(), name);
                if let Some(id) = public_id {
                    properties.set(dtd::public_id(), id);
                }
                if let Some(id) = system_id {
                    properties.set(dtd::system_id(), id);
                }
                self.create_synthetic(dtd::entity(), properties)
            }
            ContentEvent::Comment(text) => {
                self.flush_text()?;
                let properties = Properties::new()
                    .with(jcr::primary_type(), xml::comment())
                    .with(xml::comment_content(), text.trim());
                self.create_synthetic(xml::comment(), properties)
            }
            ContentEvent::ProcessingInstruction { target, data } => {
                self.flush_text()?;
                let mut properties = Properties::new()
                    .with(jcr::primary_type(), xml::processing_instruction())
                    .with(xml::target(), target.trim());
                if let Some(data) = data {
                    properties.set(xml::processing_instruction_content(), data.trim());
                }
                self.create_synthetic(xml::processing_instruction(), properties)
            }
            ContentEvent::StartCdata => {
                self.flush_text()?;
                self.cdata = Some(String::new());
                Ok(())
            }
            ContentEvent::CdataCharacters(text) => {
                match self.cdata.as_mut() {
                    Some(block) => block.push_str(text),
                    None => self.text.characters(text),
                }
                Ok(())
            }
            ContentEvent::EndCdata => {
                let block = self.cdata.take().ok_or(SequenceError::UnbalancedEnd)?;
                let properties = Properties::new()
                    .with(jcr::primary_type(), xml::cdata())
                    .with(xml::cdata_content(), block);
                self.create_synthetic(xml::cdata(), properties)
            }
            ContentEvent::StartEntity(name) => {
                if self.cdata.is_none() {
                    self.text.start_entity(name);
                }
                Ok(())
            }
            ContentEvent::EndEntity(_) => {
                if self.cdata.is_none() {
                    self.text.end_entity();
                }
                Ok(())
            }
            ContentEvent::Characters(text) => {
                match self.cdata.as_mut() {
                    Some(block) => block.push_str(text),
                    None => self.text.characters(text),
                }
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
        }
    }

    fn start_dtd(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<(), SequenceError> {
        let mut properties = Properties::new().with(dtd::name_property(), name);
        if let Some(id) = public_id {
            properties.set(dtd::public_id(), id);
        }
        if let Some(id) = system_id {
            properties.set(dtd::system_id(), id);
        }
        match &mut self.document {
            DocumentNode::Pending(pending) => pending.merge(properties),
            DocumentNode::Emitted => {
                self.destination
                    .set_properties(&self.options.base_path, properties)?;
            }
        }
        Ok(())
    }

    fn start_element(
        &mut self,
        uri: &str,
        local_name: &str,
        qualified_name: &str,
        attributes: &[Attribute<'_>],
    ) -> Result<(), SequenceError> {
        self.flush_text()?;
        self.emit_document()?;
        register_element_namespaces(self.registry, uri, qualified_name, attributes);

        let decoder = Arc::clone(&self.options.decoder);
        let tag_name = resolve_name(uri, local_name, qualified_name, decoder.as_ref())
            .in_namespace(self.registry.default_namespace_uri());
        self.scope.enter(uri);

        let mut node_name: Option<QualifiedName> = None;
        let mut primary_type: Option<PropertyValue> = None;
        let mut attribute_properties = Properties::new();
        for attribute in attributes {
            let name = attribute_name(
                attribute,
                decoder.as_ref(),
                self.options.attribute_scoping,
                &self.scope,
                &*self.registry,
            );
            if self.options.name_attribute.as_ref() == Some(&name) {
                if node_name.is_none() {
                    match QualifiedName::parse(attribute.value, &*self.registry) {
                        Ok(parsed) => node_name = Some(parsed),
                        Err(err) => {
                            let message = format!(
                                "cannot use '{}' as a node name ({err}); using the element name",
                                attribute.value
                            );
                            self.control.report(
                                ProblemSeverity::Warning,
                                &message,
                                SourceLocation::default(),
                            )?;
                        }
                    }
                }
                continue;
            }
            if name == jcr::primary_type() {
                primary_type = Some(name_value(attribute.value, &*self.registry));
                continue;
            }
            attribute_properties.set(name, attribute.value);
        }

        let node_name = node_name.unwrap_or(tag_name);
        let primary_type = primary_type
            .unwrap_or_else(|| PropertyValue::Name(self.options.default_primary_type.clone()));
        let mut properties = Properties::new().with(jcr::primary_type(), primary_type);
        properties.merge(attribute_properties);

        let index = self.siblings.next_index(&node_name);
        self.siblings.enter_scope();
        self.path.push(PathSegment::new(node_name, index));
        self.create_at_current(properties)
    }

    fn end_element(&mut self) -> Result<(), SequenceError> {
        self.flush_text()?;
        if self.scope.exit().is_none() || !self.siblings.exit_scope() {
            return Err(SequenceError::UnbalancedEnd);
        }
        self.path.pop();
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), SequenceError> {
        self.flush_text()?;
        self.emit_document()?;
        self.destination.submit()?;
        log::info!("projected {} nodes", self.created);
        Ok(())
    }

    /// Writes out the coalesced text run, if any, as a content node.
    fn flush_text(&mut self) -> Result<(), SequenceError> {
        let Some(content) = self.text.take() else {
            return Ok(());
        };
        let properties = Properties::new()
            .with(jcr::primary_type(), xml::element_content())
            .with(xml::element_content(), content);
        self.create_synthetic(xml::element_content(), properties)
    }

    fn emit_document(&mut self) -> Result<(), SequenceError> {
        if let DocumentNode::Pending(properties) =
            std::mem::replace(&mut self.document, DocumentNode::Emitted)
        {
            log::debug!("creating document node {}", self.options.base_path);
            self.destination
                .create(&self.options.base_path, properties)?;
            self.created += 1;
        }
        Ok(())
    }

    /// Creates a childless node of the given kind under the current path.
    fn create_synthetic(&mut self, kind: QualifiedName, properties: Properties) -> Result<(), SequenceError> {
        self.emit_document()?;
        let index = self.siblings.next_index(&kind);
        self.path.push(PathSegment::new(kind, index));
        let outcome = self.create_at_current(properties);
        self.path.pop();
        outcome
    }

    fn create_at_current(&mut self, properties: Properties) -> Result<(), SequenceError> {
        log::debug!("creating {}", self.path);
        self.destination.create(&self.path, properties)?;
        self.created += 1;
        Ok(())
    }
}

fn document_properties() -> Properties {
    Properties::new().with(jcr::primary_type(), xml::document())
}

impl ContentHandler for DocumentProjector<'_> {
    fn handle(&mut self, event: ContentEvent<'_>) -> Result<(), SequenceError> {
        self.control.begin()?;
        let outcome = self.dispatch(event);
        self.control.finish(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::destination::{BatchedDestination, MemoryDestination, NodeRecord};
    use crate::event::replay;
    use crate::monitor::{CancellationToken, RecordingMonitor};
    use crate::namespace::MemoryNamespaceRegistry;
    use crate::projector::{ProjectorBuilder, TextJoin};
    use pretty_assertions::assert_eq;

    fn start<'a>(local: &'a str, attributes: &'a [Attribute<'a>]) -> ContentEvent<'a> {
        ContentEvent::StartElement {
            uri: "",
            local_name: local,
            qualified_name: local,
            attributes,
        }
    }

    fn end(local: &str) -> ContentEvent<'_> {
        ContentEvent::EndElement {
            uri: "",
            local_name: local,
            qualified_name: local,
        }
    }

    fn run_with(options: DocumentOptions, events: Vec<ContentEvent<'_>>) -> Vec<NodeRecord> {
        let mut destination = MemoryDestination::new();
        let mut registry = MemoryNamespaceRegistry::with_defaults();
        {
            let mut projector = ProjectorBuilder::new()
                .destination(&mut destination)
                .registry(&mut registry)
                .build_document(options)
                .unwrap();
            replay(&mut projector, events).unwrap();
        }
        assert_eq!(destination.submit_count(), 1);
        destination.into_records()
    }

    fn run(events: Vec<ContentEvent<'_>>) -> Vec<NodeRecord> {
        run_with(DocumentOptions::default(), events)
    }

    fn describe(records: &[NodeRecord]) -> Vec<String> {
        let registry = MemoryNamespaceRegistry::with_defaults();
        records
            .iter()
            .map(|r| r.path.to_prefixed(&registry))
            .collect()
    }

    fn text_of(record: &NodeRecord) -> Option<&str> {
        record
            .properties
            .first(&xml::element_content())
            .and_then(PropertyValue::as_str)
    }

    #[test]
    fn test_document_node_is_typed() {
        let records = run(vec![ContentEvent::StartDocument, ContentEvent::EndDocument]);
        assert_eq!(records.len(), 1);
        assert!(records[0].path.is_root());
        assert_eq!(
            records[0].properties.first(&jcr::primary_type()),
            Some(&PropertyValue::Name(xml::document()))
        );
    }

    #[test]
    fn test_consecutive_characters_coalesce() {
        let records = run(vec![
            ContentEvent::StartDocument,
            start("p", &[]),
            ContentEvent::Characters("a"),
            ContentEvent::Characters("b"),
            end("p"),
            ContentEvent::EndDocument,
        ]);
        assert_eq!(
            describe(&records),
            vec!["/", "/p", "/p/seqxml:elementContent"]
        );
        assert_eq!(text_of(&records[2]), Some("ab"));
    }

    #[test]
    fn test_comment_splits_text_runs() {
        let records = run(vec![
            ContentEvent::StartDocument,
            start("p", &[]),
            ContentEvent::Characters("a"),
            ContentEvent::Comment(" note "),
            ContentEvent::Characters("b"),
            end("p"),
            ContentEvent::EndDocument,
        ]);
        assert_eq!(
            describe(&records),
            vec![
                "/",
                "/p",
                "/p/seqxml:elementContent",
                "/p/seqxml:comment",
                "/p/seqxml:elementContent[2]",
            ]
        );
        assert_eq!(text_of(&records[2]), Some("a"));
        assert_eq!(
            records[3].properties.first(&xml::comment_content()),
            Some(&PropertyValue::from("note"))
        );
        assert_eq!(text_of(&records[4]), Some("b"));
    }

    #[test]
    fn test_space_separated_join() {
        let records = run_with(
            DocumentOptions::default().text_join(TextJoin::SpaceSeparated),
            vec![
                ContentEvent::StartDocument,
                start("p", &[]),
                ContentEvent::Characters("a"),
                ContentEvent::Characters("b"),
                ContentEvent::StartEntity("amp"),
                ContentEvent::Characters("&"),
                ContentEvent::EndEntity("amp"),
                end("p"),
                ContentEvent::EndDocument,
            ],
        );
        assert_eq!(text_of(&records[2]), Some("a b&amp;"));
    }

    #[test]
    fn test_synthetic_siblings_do_not_shift_element_indices() {
        let records = run(vec![
            ContentEvent::StartDocument,
            start("cars", &[]),
            start("car", &[]),
            end("car"),
            ContentEvent::Comment("between"),
            ContentEvent::ProcessingInstruction {
                target: "render",
                data: Some(" fast "),
            },
            start("car", &[]),
            end("car"),
            end("cars"),
            ContentEvent::EndDocument,
        ]);
        assert_eq!(
            describe(&records),
            vec![
                "/",
                "/cars",
                "/cars/car",
                "/cars/seqxml:comment",
                "/cars/seqxml:processingInstruction",
                "/cars/car[2]",
            ]
        );
        let pi = &records[4].properties;
        assert_eq!(pi.first(&xml::target()), Some(&PropertyValue::from("render")));
        assert_eq!(
            pi.first(&xml::processing_instruction_content()),
            Some(&PropertyValue::from("fast"))
        );
    }

    #[test]
    fn test_cdata_is_kept_verbatim() {
        let records = run(vec![
            ContentEvent::StartDocument,
            start("code", &[]),
            ContentEvent::Characters("before"),
            ContentEvent::StartCdata,
            ContentEvent::CdataCharacters("  if a < b {  "),
            ContentEvent::CdataCharacters("}"),
            ContentEvent::EndCdata,
            end("code"),
            ContentEvent::EndDocument,
        ]);
        assert_eq!(
            describe(&records),
            vec!["/", "/code", "/code/seqxml:elementContent", "/code/seqxml:cData"]
        );
        assert_eq!(
            records[3].properties.first(&xml::cdata_content()),
            Some(&PropertyValue::from("  if a < b {  }"))
        );
    }

    #[test]
    fn test_dtd_facts_land_on_document_node() {
        let records = run(vec![
            ContentEvent::StartDocument,
            ContentEvent::StartDtd {
                name: "book",
                public_id: Some("-//OASIS//DTD DocBook XML V4.4//EN"),
                system_id: Some("http://www.oasis-open.org/docbook/xml/4.4/docbookx.dtd"),
            },
            ContentEvent::ExternalEntityDecl {
                name: "%RH-ENTITIES",
                public_id: None,
                system_id: Some("Common_Config/rh-entities.ent"),
            },
            ContentEvent::InternalEntityDecl {
                name: "versionNumber",
                value: "0.1",
            },
            ContentEvent::EndDtd,
            start("book", &[]),
            end("book"),
            ContentEvent::EndDocument,
        ]);
        assert_eq!(
            describe(&records),
            vec!["/", "/seqdtd:entity", "/seqdtd:entity[2]", "/book"]
        );
        let root = &records[0].properties;
        assert_eq!(root.first(&dtd::name_property()), Some(&PropertyValue::from("book")));
        assert!(root.contains(&dtd::public_id()));

        let external = &records[1].properties;
        assert_eq!(
            external.first(&dtd::name_property()),
            Some(&PropertyValue::from("%RH-ENTITIES"))
        );
        assert_eq!(
            external.first(&dtd::system_id()),
            Some(&PropertyValue::from("Common_Config/rh-entities.ent"))
        );
        assert!(!external.contains(&dtd::value()));
        assert!(!external.contains(&dtd::public_id()));

        let internal = &records[2].properties;
        assert_eq!(internal.first(&dtd::value()), Some(&PropertyValue::from("0.1")));
    }

    #[test]
    fn test_dtd_after_document_node_uses_set_properties() {
        let records = run(vec![
            ContentEvent::StartDocument,
            ContentEvent::Comment("first"),
            ContentEvent::StartDtd {
                name: "late",
                public_id: None,
                system_id: None,
            },
            ContentEvent::EndDtd,
            ContentEvent::EndDocument,
        ]);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].properties.first(&dtd::name_property()),
            Some(&PropertyValue::from("late"))
        );
    }

    #[test]
    fn test_name_and_primary_type_attributes() {
        let attrs = [
            Attribute {
                uri: jcr::NAMESPACE,
                local_name: "name",
                qualified_name: "jcr:name",
                value: "Prius",
            },
            Attribute {
                uri: jcr::NAMESPACE,
                local_name: "primaryType",
                qualified_name: "jcr:primaryType",
                value: "nt:folder",
            },
            Attribute::local("maker", "Toyota"),
        ];
        let records = run(vec![
            ContentEvent::StartDocument,
            start("car", &attrs),
            end("car"),
            ContentEvent::EndDocument,
        ]);
        let car = &records[1];
        assert_eq!(describe(&records), vec!["/", "/Prius"]);
        assert_eq!(
            car.properties.first(&jcr::primary_type()),
            Some(&PropertyValue::Name(QualifiedName::new(
                crate::lexicon::nt::NAMESPACE,
                "folder"
            )))
        );
        assert!(!car.properties.contains(&jcr::name()));
        assert!(car.properties.contains(&QualifiedName::local("maker")));
    }

    #[test]
    fn test_default_primary_type() {
        let records = run(vec![
            ContentEvent::StartDocument,
            start("car", &[]),
            end("car"),
            ContentEvent::EndDocument,
        ]);
        assert_eq!(
            records[1].properties.first(&jcr::primary_type()),
            Some(&PropertyValue::Name(crate::lexicon::nt::unstructured()))
        );
    }

    #[test]
    fn test_attributes_inherit_element_namespace() {
        let attrs = [Attribute::local("maker", "Toyota")];
        let records = run(vec![
            ContentEvent::StartDocument,
            ContentEvent::StartPrefixMapping {
                prefix: "c",
                uri: "urn:cars",
            },
            ContentEvent::StartElement {
                uri: "urn:cars",
                local_name: "Hybrid",
                qualified_name: "c:Hybrid",
                attributes: &[],
            },
            start("car", &attrs),
            end("car"),
            ContentEvent::EndElement {
                uri: "urn:cars",
                local_name: "Hybrid",
                qualified_name: "c:Hybrid",
            },
            ContentEvent::EndDocument,
        ]);
        assert!(records[2]
            .properties
            .contains(&QualifiedName::new("urn:cars", "maker")));
    }

    #[test]
    fn test_batched_and_immediate_agree() {
        let events = || {
            vec![
                ContentEvent::StartDocument,
                ContentEvent::StartDtd {
                    name: "doc",
                    public_id: None,
                    system_id: None,
                },
                ContentEvent::EndDtd,
                start("doc", &[]),
                ContentEvent::Characters("hello"),
                ContentEvent::Comment("c"),
                start("item", &[]),
                end("item"),
                end("doc"),
                ContentEvent::EndDocument,
            ]
        };
        let immediate = run(events());

        let mut batched = BatchedDestination::new(MemoryDestination::new());
        let mut registry = MemoryNamespaceRegistry::with_defaults();
        {
            let mut projector = ProjectorBuilder::new()
                .destination(&mut batched)
                .registry(&mut registry)
                .build_document(DocumentOptions::default())
                .unwrap();
            replay(&mut projector, events()).unwrap();
        }
        assert_eq!(batched.into_inner().into_records(), immediate);
    }

    #[test]
    fn test_cancellation_stops_creation() {
        let token = CancellationToken::new();
        let mut destination = MemoryDestination::new();
        let mut registry = MemoryNamespaceRegistry::with_defaults();
        {
            let mut projector = ProjectorBuilder::new()
                .destination(&mut destination)
                .registry(&mut registry)
                .cancellation(token.clone())
                .build_document(DocumentOptions::default())
                .unwrap();
            projector.handle(ContentEvent::StartDocument).unwrap();
            projector.handle(start("a", &[])).unwrap();
            token.cancel();
            assert_eq!(
                projector.handle(start("b", &[])),
                Err(SequenceError::Cancelled)
            );
            assert_eq!(
                projector.handle(ContentEvent::EndDocument),
                Err(SequenceError::Terminated)
            );
        }
        assert_eq!(destination.len(), 2);
        assert_eq!(destination.submit_count(), 0);
    }

    #[test]
    fn test_progress_reported_per_event() {
        let mut monitor = RecordingMonitor::default();
        let mut destination = MemoryDestination::new();
        let mut registry = MemoryNamespaceRegistry::with_defaults();
        {
            let mut projector = ProjectorBuilder::new()
                .destination(&mut destination)
                .registry(&mut registry)
                .progress(&mut monitor)
                .build_document(DocumentOptions::default())
                .unwrap();
            replay(
                &mut projector,
                vec![
                    ContentEvent::StartDocument,
                    start("a", &[]),
                    end("a"),
                    ContentEvent::EndDocument,
                ],
            )
            .unwrap();
        }
        assert_eq!(monitor.ticks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_each_document_starts_fresh() {
        let mut destination = MemoryDestination::new();
        let mut registry = MemoryNamespaceRegistry::with_defaults();
        {
            let mut projector = ProjectorBuilder::new()
                .destination(&mut destination)
                .registry(&mut registry)
                .build_document(DocumentOptions::default())
                .unwrap();
            replay(
                &mut projector,
                vec![
                    ContentEvent::StartDocument,
                    start("a", &[]),
                    start("c", &[]),
                    end("c"),
                    end("a"),
                    ContentEvent::EndDocument,
                ],
            )
            .unwrap();
            // Abandoned with text pending.
            replay(
                &mut projector,
                vec![
                    ContentEvent::StartDocument,
                    start("b", &[]),
                    ContentEvent::Characters("leftover"),
                ],
            )
            .unwrap();
            // Abandoned inside a character-data block.
            replay(
                &mut projector,
                vec![
                    ContentEvent::StartDocument,
                    start("b", &[]),
                    ContentEvent::StartCdata,
                    ContentEvent::CdataCharacters("half"),
                ],
            )
            .unwrap();
            assert!(projector.in_cdata());
            replay(
                &mut projector,
                vec![
                    ContentEvent::StartDocument,
                    start("a", &[]),
                    start("c", &[]),
                    end("c"),
                    start("c", &[]),
                    end("c"),
                    ContentEvent::Characters("fresh"),
                    end("a"),
                    ContentEvent::EndDocument,
                ],
            )
            .unwrap();
            assert!(!projector.in_cdata());
            assert_eq!(projector.created_count(), 5);
        }
        assert_eq!(destination.submit_count(), 2);
        let records = destination.into_records();
        assert_eq!(
            describe(&records),
            vec!["/", "/a", "/a/c", "/b", "/a/c[2]", "/a/seqxml:elementContent"]
        );
        assert_eq!(text_of(&records[5]), Some("fresh"));
    }

    #[test]
    fn test_unbalanced_cdata_end() {
        let mut destination = MemoryDestination::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let mut projector = ProjectorBuilder::new()
            .destination(&mut destination)
            .registry(&mut registry)
            .build_document(DocumentOptions::default())
            .unwrap();
        assert_eq!(
            projector.handle(ContentEvent::EndCdata),
            Err(SequenceError::UnbalancedEnd)
        );
    }

    #[test]
    fn test_recoverable_error_is_collected() {
        let mut destination = MemoryDestination::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let mut projector = ProjectorBuilder::new()
            .destination(&mut destination)
            .registry(&mut registry)
            .build_document(DocumentOptions::default())
            .unwrap();
        projector
            .handle(ContentEvent::Error {
                message: "attribute value not normalized",
                location: SourceLocation::default(),
            })
            .unwrap();
        assert!(projector.problems().has_errors());
    }
}
