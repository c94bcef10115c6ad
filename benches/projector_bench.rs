#![allow(clippy::expect_used)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use std::hint::black_box;
use xml_sequencer::destination::{BatchedDestination, MemoryDestination};
use xml_sequencer::event::{ContentEvent, ContentHandler};
use xml_sequencer::namespace::MemoryNamespaceRegistry;
use xml_sequencer::projector::{DocumentOptions, ElementOptions, ProjectorBuilder};
use xml_sequencer::{sequence_str, SequenceError};

// ---------------------------------------------------------------------------
// Document generators
// ---------------------------------------------------------------------------

/// Generates a catalog with approximately 400 elements and mixed content.
fn make_catalog_xml() -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<catalog>\n");
    for i in 0..100 {
        let _ = writeln!(
            xml,
            "  <book id=\"bk{i}\"><title>Title {i}</title>\
             <!-- entry {i} --><author>Author {i}</author>\
             <price>{}.99</price></book>",
            10 + i
        );
    }
    xml.push_str("</catalog>\n");
    xml
}

/// Generates a document with many namespaced elements and attributes.
fn make_namespace_heavy_xml() -> String {
    let mut xml = String::from(
        "<c:cars xmlns:c=\"http://example.com/cars\" xmlns:m=\"http://example.com/maker\">\n",
    );
    for i in 0..500 {
        let _ = writeln!(
            xml,
            "  <c:car m:maker=\"Maker {i}\" model=\"Model {i}\" year=\"{}\"/>",
            1990 + i % 30
        );
    }
    xml.push_str("</c:cars>\n");
    xml
}

/// Generates a document with entity references in text.
fn make_entity_heavy_xml() -> String {
    let mut xml = String::from(
        "<!DOCTYPE doc [\n<!ENTITY product \"Sequencer\">\n<!ENTITY vendor \"Example &amp; Co\">\n]>\n<doc>\n",
    );
    for i in 0..300 {
        let _ = writeln!(xml, "  <p>Line {i}: &product; by &vendor; &lt;{i}&gt;</p>");
    }
    xml.push_str("</doc>\n");
    xml
}

// ---------------------------------------------------------------------------
// Event source benchmarks
// ---------------------------------------------------------------------------

/// A handler that only counts events, used to measure the reader alone.
struct CountingHandler {
    events: u64,
}

impl ContentHandler for CountingHandler {
    fn handle(&mut self, _event: ContentEvent<'_>) -> Result<(), SequenceError> {
        self.events += 1;
        Ok(())
    }
}

fn bench_read_catalog(c: &mut Criterion) {
    let xml = make_catalog_xml();
    c.bench_function("read_catalog", |b| {
        b.iter(|| {
            let mut handler = CountingHandler { events: 0 };
            sequence_str(black_box(&xml), &mut handler).expect("read failed");
            black_box(handler.events);
        });
    });
}

fn bench_read_entities(c: &mut Criterion) {
    let xml = make_entity_heavy_xml();
    c.bench_function("read_entities", |b| {
        b.iter(|| {
            let mut handler = CountingHandler { events: 0 };
            sequence_str(black_box(&xml), &mut handler).expect("read failed");
            black_box(handler.events);
        });
    });
}

// ---------------------------------------------------------------------------
// Projection benchmarks
// ---------------------------------------------------------------------------

fn project_element(xml: &str) -> usize {
    let mut destination = MemoryDestination::new();
    let mut registry = MemoryNamespaceRegistry::with_defaults();
    let mut projector = ProjectorBuilder::new()
        .destination(&mut destination)
        .registry(&mut registry)
        .build_element(ElementOptions::default())
        .expect("build failed");
    sequence_str(xml, &mut projector).expect("projection failed");
    projector.created_count()
}

fn project_document(xml: &str) -> usize {
    let mut destination = BatchedDestination::new(MemoryDestination::new());
    let mut registry = MemoryNamespaceRegistry::with_defaults();
    let mut projector = ProjectorBuilder::new()
        .destination(&mut destination)
        .registry(&mut registry)
        .build_document(DocumentOptions::default())
        .expect("build failed");
    sequence_str(xml, &mut projector).expect("projection failed");
    projector.created_count()
}

fn bench_element_catalog(c: &mut Criterion) {
    let xml = make_catalog_xml();
    c.bench_function("element_catalog", |b| {
        b.iter(|| black_box(project_element(black_box(&xml))));
    });
}

fn bench_element_namespace_heavy(c: &mut Criterion) {
    let xml = make_namespace_heavy_xml();
    c.bench_function("element_namespace_heavy", |b| {
        b.iter(|| black_box(project_element(black_box(&xml))));
    });
}

fn bench_document_catalog(c: &mut Criterion) {
    let xml = make_catalog_xml();
    c.bench_function("document_catalog", |b| {
        b.iter(|| black_box(project_document(black_box(&xml))));
    });
}

fn bench_document_entities(c: &mut Criterion) {
    let xml = make_entity_heavy_xml();
    c.bench_function("document_entities", |b| {
        b.iter(|| black_box(project_document(black_box(&xml))));
    });
}

// ---------------------------------------------------------------------------
// Criterion groups and main
// ---------------------------------------------------------------------------

criterion_group!(reading, bench_read_catalog, bench_read_entities);

criterion_group!(
    projection,
    bench_element_catalog,
    bench_element_namespace_heavy,
    bench_document_catalog,
    bench_document_entities,
);

criterion_main!(reading, projection);
