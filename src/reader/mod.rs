//! Event source: turns XML text into [`ContentEvent`]s.
//!
//! [`sequence_str`] tokenizes the input with `xmlparser` in a single pass
//! and delivers events to a [`ContentHandler`] in document order:
//!
//! - namespace declarations are reported as prefix mappings just before the
//!   element that declares them, and are not passed on as attributes;
//! - character references are expanded in place;
//! - references to the predefined entities and to internal entities declared
//!   in the DTD are reported as an entity start, the replacement text, and an
//!   entity end;
//! - references to declared external entities are skipped with a warning;
//! - references to undeclared entities, unbound prefixes, mismatched end
//!   tags and tokenizer errors are reported as fatal errors;
//! - entity expansion is bounded by a per-document count and by the size of
//!   the input, and exceeding either is fatal.
//!
//! Line endings in text, CDATA, comments and processing instructions are
//! normalized to `\n`.
//!
//! Text outside the root element is not reported.

mod namespaces;
mod references;

use std::borrow::Cow;
use std::collections::HashMap;

use xmlparser::{ElementEnd, EntityDefinition, ExternalId, StrSpan, Token, Tokenizer};

use crate::error::{Problem, ProblemSeverity, SequenceError, SourceLocation};
use crate::event::{Attribute, ContentEvent, ContentHandler};
use crate::util::text::normalize_newlines;

use namespaces::PrefixBindings;
use references::{predefined, Chunk, Chunks};

/// Replacement-text expansion stops at this nesting depth.
const MAX_ENTITY_DEPTH: usize = 8;

/// Maximum number of entity expansions per document.
const MAX_ENTITY_EXPANSIONS: usize = 10_000;

/// Replacement text expanded from entities may not exceed this multiple of
/// the input size.
const MAX_AMPLIFICATION: usize = 5;

/// Reads `input` and feeds its events to `handler`.
///
/// # Errors
///
/// Returns the first error the handler reports. If the document is not
/// well-formed, a fatal-error event is delivered first and the error the
/// handler returns for it (or [`SequenceError::Fatal`]) is passed on.
///
/// # Examples
///
/// ```
/// use xml_sequencer::destination::MemoryDestination;
/// use xml_sequencer::namespace::MemoryNamespaceRegistry;
/// use xml_sequencer::projector::{DocumentOptions, ProjectorBuilder};
/// use xml_sequencer::reader::sequence_str;
///
/// let mut destination = MemoryDestination::new();
/// let mut registry = MemoryNamespaceRegistry::with_defaults();
/// let mut projector = ProjectorBuilder::new()
///     .destination(&mut destination)
///     .registry(&mut registry)
///     .build_document(DocumentOptions::default())
///     .unwrap();
/// sequence_str("<note>Hi <!-- there --></note>", &mut projector).unwrap();
/// drop(projector);
/// assert_eq!(destination.len(), 4);
/// ```
pub fn sequence_str(input: &str, handler: &mut dyn ContentHandler) -> Result<(), SequenceError> {
    Reader::new(input, handler).run()
}

#[derive(Debug, Clone, Copy)]
enum Entity<'a> {
    Internal(&'a str),
    External,
}

struct OpenElement<'a> {
    uri: String,
    local_name: &'a str,
    qualified_name: &'a str,
}

struct RawAttribute<'a> {
    prefix: &'a str,
    local_name: &'a str,
    qualified_name: &'a str,
    value: StrSpan<'a>,
}

struct StartTag<'a> {
    prefix: &'a str,
    local_name: &'a str,
    qualified_name: &'a str,
    offset: usize,
    attributes: Vec<RawAttribute<'a>>,
}

struct Reader<'a, 'h> {
    input: &'a str,
    handler: &'h mut dyn ContentHandler,
    bindings: PrefixBindings,
    entities: HashMap<&'a str, Entity<'a>>,
    open: Vec<OpenElement<'a>>,
    start_tag: Option<StartTag<'a>>,
    seen_root: bool,
    expansions: usize,
    expanded_bytes: usize,
}

impl<'a, 'h> Reader<'a, 'h> {
    fn new(input: &'a str, handler: &'h mut dyn ContentHandler) -> Self {
        Self {
            input,
            handler,
            bindings: PrefixBindings::new(),
            entities: HashMap::new(),
            open: Vec::new(),
            start_tag: None,
            seen_root: false,
            expansions: 0,
            expanded_bytes: 0,
        }
    }

    fn run(mut self) -> Result<(), SequenceError> {
        self.emit(ContentEvent::StartDocument)?;
        for token in Tokenizer::from(self.input) {
            match token {
                Ok(token) => self.token(token)?,
                Err(err) => {
                    let pos = err.pos();
                    let location = location_at(self.input, pos.row, pos.col);
                    return Err(self.fatal_at(&err.to_string(), location));
                }
            }
        }
        if let Some(element) = self.open.last() {
            let message = format!("unexpected end of document inside <{}>", element.qualified_name);
            return Err(self.fatal(&message, self.input.len()));
        }
        if !self.seen_root {
            return Err(self.fatal("document has no root element", self.input.len()));
        }
        self.emit(ContentEvent::EndDocument)
    }

    fn emit(&mut self, event: ContentEvent<'_>) -> Result<(), SequenceError> {
        self.handler.handle(event)
    }

    /// Delivers a fatal-error event and returns the error that ends the run.
    fn fatal(&mut self, message: &str, offset: usize) -> SequenceError {
        self.fatal_at(message, SourceLocation::at(self.input, offset))
    }

    fn fatal_at(&mut self, message: &str, location: SourceLocation) -> SequenceError {
        match self.emit(ContentEvent::FatalError { message, location }) {
            Err(err) => err,
            Ok(()) => SequenceError::Fatal(Problem::new(ProblemSeverity::Fatal, message, location)),
        }
    }

    fn warning(&mut self, message: &str, offset: usize) -> Result<(), SequenceError> {
        let location = SourceLocation::at(self.input, offset);
        self.emit(ContentEvent::Warning { message, location })
    }

    fn token(&mut self, token: Token<'a>) -> Result<(), SequenceError> {
        match token {
            Token::Declaration { .. } => Ok(()),
            Token::ProcessingInstruction {
                target, content, ..
            } => {
                let data = content.map(|c| normalize_newlines(c.as_str()));
                self.emit(ContentEvent::ProcessingInstruction {
                    target: target.as_str(),
                    data: data.as_deref(),
                })
            }
            Token::Comment { text, .. } => {
                let text = normalize_newlines(text.as_str());
                self.emit(ContentEvent::Comment(&text))
            }
            Token::DtdStart {
                name, external_id, ..
            } => self.start_dtd(name, external_id),
            Token::EmptyDtd {
                name, external_id, ..
            } => {
                self.start_dtd(name, external_id)?;
                self.emit(ContentEvent::EndDtd)
            }
            Token::EntityDeclaration {
                name,
                definition,
                span,
            } => self.entity_declaration(name, definition, span),
            Token::DtdEnd { .. } => self.emit(ContentEvent::EndDtd),
            Token::ElementStart {
                prefix,
                local,
                span,
            } => {
                if self.seen_root && self.open.is_empty() {
                    return Err(self.fatal("content after the root element", span.start()));
                }
                self.start_tag = Some(StartTag {
                    prefix: prefix.as_str(),
                    local_name: local.as_str(),
                    qualified_name: self.qualified(prefix, local),
                    offset: span.start(),
                    attributes: Vec::new(),
                });
                Ok(())
            }
            Token::Attribute {
                prefix,
                local,
                value,
                ..
            } => {
                let qualified_name = self.qualified(prefix, local);
                if let Some(tag) = self.start_tag.as_mut() {
                    tag.attributes.push(RawAttribute {
                        prefix: prefix.as_str(),
                        local_name: local.as_str(),
                        qualified_name,
                        value,
                    });
                }
                Ok(())
            }
            Token::ElementEnd { end, span } => match end {
                ElementEnd::Open => self.finish_start_tag(),
                ElementEnd::Empty => {
                    self.finish_start_tag()?;
                    self.end_element(None, span.start())
                }
                ElementEnd::Close(prefix, local) => {
                    let qualified_name = self.qualified(prefix, local);
                    self.end_element(Some(qualified_name), span.start())
                }
            },
            Token::Text { text } => {
                if self.open.is_empty() {
                    return Ok(());
                }
                self.text(text.as_str(), text.start())
            }
            Token::Cdata { text, .. } => {
                if self.open.is_empty() {
                    return Ok(());
                }
                let text = normalize_newlines(text.as_str());
                self.emit(ContentEvent::StartCdata)?;
                self.emit(ContentEvent::CdataCharacters(&text))?;
                self.emit(ContentEvent::EndCdata)
            }
        }
    }

    /// Returns the `prefix:local` slice of the input.
    fn qualified(&self, prefix: StrSpan<'a>, local: StrSpan<'a>) -> &'a str {
        if prefix.as_str().is_empty() {
            local.as_str()
        } else {
            self.input
                .get(prefix.start()..local.end())
                .unwrap_or_else(|| local.as_str())
        }
    }

    fn start_dtd(&mut self, name: StrSpan<'a>, external_id: Option<ExternalId<'a>>) -> Result<(), SequenceError> {
        let (public_id, system_id) = split_external_id(external_id);
        self.emit(ContentEvent::StartDtd {
            name: name.as_str(),
            public_id,
            system_id,
        })
    }

    fn entity_declaration(
        &mut self,
        name: StrSpan<'a>,
        definition: EntityDefinition<'a>,
        span: StrSpan<'a>,
    ) -> Result<(), SequenceError> {
        let parameter = is_parameter_entity(span.as_str());
        let reported: Cow<'a, str> = if parameter {
            Cow::Owned(format!("%{}", name.as_str()))
        } else {
            Cow::Borrowed(name.as_str())
        };
        match definition {
            EntityDefinition::EntityValue(value) => {
                if !parameter {
                    self.entities
                        .entry(name.as_str())
                        .or_insert(Entity::Internal(value.as_str()));
                }
                self.emit(ContentEvent::InternalEntityDecl {
                    name: &reported,
                    value: value.as_str(),
                })
            }
            EntityDefinition::ExternalId(id) => {
                if !parameter {
                    self.entities.entry(name.as_str()).or_insert(Entity::External);
                }
                let (public_id, system_id) = split_external_id(Some(id));
                self.emit(ContentEvent::ExternalEntityDecl {
                    name: &reported,
                    public_id,
                    system_id,
                })
            }
        }
    }

    fn finish_start_tag(&mut self) -> Result<(), SequenceError> {
        let Some(tag) = self.start_tag.take() else {
            return Ok(());
        };
        self.seen_root = true;
        self.bindings.push_scope();

        for attr in &tag.attributes {
            let declared = match (attr.prefix, attr.local_name) {
                ("xmlns", prefix) => Some(prefix),
                ("", "xmlns") => Some(""),
                _ => None,
            };
            if let Some(prefix) = declared {
                let uri = attr.value.as_str();
                self.bindings.bind((!prefix.is_empty()).then_some(prefix), uri);
                if !uri.is_empty() {
                    self.emit(ContentEvent::StartPrefixMapping { prefix, uri })?;
                }
            }
        }

        let uri = self.resolve_prefix(tag.prefix, tag.offset)?;
        let mut resolved = Vec::with_capacity(tag.attributes.len());
        for attr in &tag.attributes {
            if attr.prefix == "xmlns" || (attr.prefix.is_empty() && attr.local_name == "xmlns") {
                continue;
            }
            let attr_uri = if attr.prefix.is_empty() {
                String::new()
            } else {
                self.resolve_prefix(attr.prefix, attr.value.start())?
            };
            let value = self.expand_attribute(attr.value)?;
            resolved.push((attr_uri, attr, value));
        }
        let attributes: Vec<Attribute<'_>> = resolved
            .iter()
            .map(|(attr_uri, attr, value)| Attribute {
                uri: attr_uri,
                local_name: attr.local_name,
                qualified_name: attr.qualified_name,
                value,
            })
            .collect();

        self.handler.handle(ContentEvent::StartElement {
            uri: &uri,
            local_name: tag.local_name,
            qualified_name: tag.qualified_name,
            attributes: &attributes,
        })?;
        self.open.push(OpenElement {
            uri,
            local_name: tag.local_name,
            qualified_name: tag.qualified_name,
        });
        Ok(())
    }

    fn resolve_prefix(&mut self, prefix: &str, offset: usize) -> Result<String, SequenceError> {
        let lookup = (!prefix.is_empty()).then_some(prefix);
        match self.bindings.resolve(lookup) {
            Some(uri) => Ok(uri.to_string()),
            None if prefix.is_empty() => Ok(String::new()),
            None => {
                let message = format!("namespace prefix '{prefix}' is not bound");
                Err(self.fatal(&message, offset))
            }
        }
    }

    fn end_element(&mut self, closing: Option<&'a str>, offset: usize) -> Result<(), SequenceError> {
        let Some(element) = self.open.pop() else {
            return Err(self.fatal("end tag without a matching start tag", offset));
        };
        if let Some(name) = closing {
            if name != element.qualified_name {
                let message = format!(
                    "end tag </{name}> does not match start tag <{}>",
                    element.qualified_name
                );
                return Err(self.fatal(&message, offset));
            }
        }
        self.emit(ContentEvent::EndElement {
            uri: &element.uri,
            local_name: element.local_name,
            qualified_name: element.qualified_name,
        })?;
        self.bindings.pop_scope();
        Ok(())
    }

    fn text(&mut self, text: &'a str, offset: usize) -> Result<(), SequenceError> {
        let mut run = String::new();
        let mut chunks = Chunks::new(text);
        loop {
            let at = offset + chunks.offset();
            let Some(chunk) = chunks.next() else {
                break;
            };
            match chunk {
                Chunk::Text(literal) => run.push_str(&normalize_newlines(literal)),
                Chunk::Char(ch) => run.push(ch),
                Chunk::Malformed(start) => {
                    let message = "malformed character or entity reference";
                    return Err(self.fatal(message, offset + start));
                }
                Chunk::Entity(name) => {
                    let replacement = match predefined(name) {
                        Some(value) => Cow::Borrowed(value),
                        None => match self.entities.get(name).copied() {
                            Some(Entity::Internal(value)) => {
                                self.count_expansion(value.len(), at)?;
                                self.expand(value, at, 1)?
                            }
                            Some(Entity::External) => {
                                self.flush_run(&mut run)?;
                                let message = format!("external entity '{name}' is not resolved");
                                self.warning(&message, at)?;
                                continue;
                            }
                            None => {
                                let message = format!("entity '{name}' is not declared");
                                return Err(self.fatal(&message, at));
                            }
                        },
                    };
                    self.flush_run(&mut run)?;
                    self.emit(ContentEvent::StartEntity(name))?;
                    if !replacement.is_empty() {
                        self.emit(ContentEvent::Characters(&replacement))?;
                    }
                    self.emit(ContentEvent::EndEntity(name))?;
                }
            }
        }
        self.flush_run(&mut run)
    }

    fn flush_run(&mut self, run: &mut String) -> Result<(), SequenceError> {
        if run.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(run);
        self.emit(ContentEvent::Characters(&text))
    }

    /// Expands the references inside an entity's replacement text.
    fn expand(&mut self, value: &'a str, offset: usize, depth: usize) -> Result<Cow<'a, str>, SequenceError> {
        if !value.contains('&') {
            return Ok(normalize_newlines(value));
        }
        if depth > MAX_ENTITY_DEPTH {
            return Err(self.fatal("entity references nest too deeply", offset));
        }
        let mut out = String::with_capacity(value.len());
        for chunk in Chunks::new(value) {
            match chunk {
                Chunk::Text(literal) => out.push_str(&normalize_newlines(literal)),
                Chunk::Char(ch) => out.push(ch),
                Chunk::Malformed(_) => {
                    return Err(self.fatal("malformed reference in entity value", offset));
                }
                Chunk::Entity(name) => {
                    if let Some(value) = predefined(name) {
                        out.push_str(value);
                        continue;
                    }
                    match self.entities.get(name).copied() {
                        Some(Entity::Internal(inner)) => {
                            self.count_expansion(inner.len(), offset)?;
                            let expanded = self.expand(inner, offset, depth + 1)?;
                            out.push_str(&expanded);
                        }
                        Some(Entity::External) => {
                            let message = format!("external entity '{name}' is not resolved");
                            self.warning(&message, offset)?;
                        }
                        None => {
                            let message = format!("entity '{name}' is not declared");
                            return Err(self.fatal(&message, offset));
                        }
                    }
                }
            }
        }
        Ok(Cow::Owned(out))
    }

    /// Charges one entity expansion of `len` bytes of replacement text
    /// against the document's limits.
    fn count_expansion(&mut self, len: usize, offset: usize) -> Result<(), SequenceError> {
        self.expansions += 1;
        if self.expansions > MAX_ENTITY_EXPANSIONS {
            let message = format!("entity expansion limit exceeded ({MAX_ENTITY_EXPANSIONS})");
            return Err(self.fatal(&message, offset));
        }
        self.expanded_bytes = self.expanded_bytes.saturating_add(len);
        if self.expanded_bytes > self.input.len().saturating_mul(MAX_AMPLIFICATION) {
            return Err(self.fatal("maximum entity amplification factor exceeded", offset));
        }
        Ok(())
    }

    /// Normalizes an attribute value.
    ///
    /// Literal whitespace and whitespace in entity replacement text become
    /// spaces. Characters written as character references are kept as is.
    fn expand_attribute(&mut self, value: StrSpan<'a>) -> Result<Cow<'a, str>, SequenceError> {
        let raw = value.as_str();
        if !raw.contains(&['&', '\t', '\n', '\r'][..]) {
            return Ok(Cow::Borrowed(raw));
        }
        let offset = value.start();
        let mut out = String::with_capacity(raw.len());
        for chunk in Chunks::new(raw) {
            match chunk {
                Chunk::Text(literal) => push_attribute_text(&mut out, literal),
                Chunk::Char(ch) => out.push(ch),
                Chunk::Malformed(start) => {
                    let message = "malformed character or entity reference";
                    return Err(self.fatal(message, offset + start));
                }
                Chunk::Entity(name) => {
                    if let Some(value) = predefined(name) {
                        out.push_str(value);
                        continue;
                    }
                    match self.entities.get(name).copied() {
                        Some(Entity::Internal(inner)) => {
                            self.count_expansion(inner.len(), offset)?;
                            let expanded = self.expand(inner, offset, 1)?;
                            push_attribute_text(&mut out, &expanded);
                        }
                        Some(Entity::External) => {
                            let message = format!("attribute value refers to external entity '{name}'");
                            return Err(self.fatal(&message, offset));
                        }
                        None => {
                            let message = format!("entity '{name}' is not declared");
                            return Err(self.fatal(&message, offset));
                        }
                    }
                }
            }
        }
        Ok(Cow::Owned(out))
    }
}

fn push_attribute_text(out: &mut String, text: &str) {
    for ch in normalize_newlines(text).chars() {
        out.push(if matches!(ch, '\t' | '\n' | '\r') { ' ' } else { ch });
    }
}

fn split_external_id(id: Option<ExternalId<'_>>) -> (Option<&str>, Option<&str>) {
    match id {
        Some(ExternalId::System(system)) => (None, Some(system.as_str())),
        Some(ExternalId::Public(public, system)) => (Some(public.as_str()), Some(system.as_str())),
        None => (None, None),
    }
}

/// Returns `true` for `<!ENTITY % name ...>` declarations.
fn is_parameter_entity(declaration: &str) -> bool {
    declaration
        .strip_prefix("<!ENTITY")
        .is_some_and(|rest| rest.trim_start().starts_with('%'))
}

/// Converts the tokenizer's 1-based row/column into a [`SourceLocation`].
fn location_at(input: &str, row: u32, col: u32) -> SourceLocation {
    let mut offset = 0;
    for (i, line) in input.split_inclusive('\n').enumerate() {
        if i + 1 == row as usize {
            let column_offset: usize = line
                .chars()
                .take(col.saturating_sub(1) as usize)
                .map(char::len_utf8)
                .sum();
            offset += column_offset;
            break;
        }
        offset += line.len();
    }
    SourceLocation {
        line: row,
        column: col,
        byte_offset: offset.min(input.len()),
    }
}
