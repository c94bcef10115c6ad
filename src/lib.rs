//! # xml-sequencer
//!
//! Projects a stream of XML parse events into a tree of path-addressed nodes
//! in a content store. Two projection strategies are provided:
//!
//! - [`ElementProjector`](projector::ElementProjector) maps each element to a
//!   node whose properties are the element's attributes.
//! - [`DocumentProjector`](projector::DocumentProjector) additionally keeps
//!   text, comments, processing instructions, character-data blocks, entity
//!   references and DTD information as synthetic nodes, so the document's
//!   structure survives the round trip.
//!
//! Events come from [`reader::sequence_str`] or from any other source that
//! drives a [`ContentHandler`](event::ContentHandler). Nodes go to a
//! [`Destination`](destination::Destination).
//!
//! ## Quick Start
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
//! sequence_str(r#"<cars><car maker="Toyota"/></cars>"#, &mut projector).unwrap();
//! drop(projector);
//!
//! let car = destination.records().last().unwrap();
//! assert_eq!(car.path.to_string(), "/cars/car");
//! assert_eq!(car.properties.len(), 1);
//! ```

pub mod destination;
pub mod error;
pub mod event;
pub mod lexicon;
pub mod monitor;
pub mod name;
pub mod namespace;
pub mod projector;
pub mod property;
pub mod reader;
pub mod util;

// Re-export primary types at the crate root for convenience.
pub use error::{Problem, ProblemSeverity, SequenceError};
pub use name::{Path, PathSegment, QualifiedName};
pub use reader::sequence_str;
