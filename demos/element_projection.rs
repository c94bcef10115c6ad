//! Name-preserving projection example.
//!
//! Run with: `cargo run --example element_projection`
#![allow(clippy::expect_used)]

use xml_sequencer::destination::MemoryDestination;
use xml_sequencer::lexicon::jcr;
use xml_sequencer::namespace::MemoryNamespaceRegistry;
use xml_sequencer::projector::{ElementOptions, ProjectorBuilder};
use xml_sequencer::sequence_str;

const CARS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<c:Cars xmlns:c="http://default.namespace.com" xmlns:jcr="http://www.jcp.org/jcr/1.0">
    <c:Hybrid>
        <c:car jcr:name="Toyota Prius" maker="Toyota" model="Prius"/>
        <c:car jcr:name="Nissan Altima" maker="Nissan" model="Altima"/>
    </c:Hybrid>
    <c:Sports>
        <c:car maker="Aston Martin" model="DB9"/>
        <c:car maker="Infiniti" model="G37"/>
    </c:Sports>
</c:Cars>
"#;

fn main() {
    let mut destination = MemoryDestination::new();
    let mut registry = MemoryNamespaceRegistry::with_defaults();
    {
        let options = ElementOptions::default()
            .skip_root(true)
            .name_attribute(Some(jcr::name()));
        let mut projector = ProjectorBuilder::new()
            .destination(&mut destination)
            .registry(&mut registry)
            .build_element(options)
            .expect("projector is fully configured");
        sequence_str(CARS, &mut projector).expect("document is well-formed");
        println!("--- {} nodes ---", projector.created_count());
    }

    for record in destination.records() {
        println!("{}", record.path.to_prefixed(&registry));
        for (name, values) in record.properties.iter() {
            for value in values {
                println!("  {} = {value}", name.to_prefixed(&registry));
            }
        }
    }
}
