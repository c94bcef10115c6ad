//! Content-preserving projection example.
//!
//! Text, comments, processing instructions, character data and DTD entity
//! declarations all become nodes. Writes are batched and only reach the
//! store once the whole document has been read.
//!
//! Run with: `cargo run --example document_projection`
#![allow(clippy::expect_used)]

use xml_sequencer::destination::{BatchedDestination, MemoryDestination};
use xml_sequencer::namespace::MemoryNamespaceRegistry;
use xml_sequencer::projector::{DocumentOptions, ProjectorBuilder};
use xml_sequencer::sequence_str;

const NOTE: &str = r#"<?xml version="1.0"?>
<!DOCTYPE note [
<!ENTITY product "Sequencer">
]>
<?render draft?>
<note>
    <!-- reviewed -->
    <to>Ops</to>
    <body>Ship &product; on Friday.</body>
    <![CDATA[ if a < b { rollback(); } ]]>
</note>
"#;

fn main() {
    let mut destination = BatchedDestination::new(MemoryDestination::new());
    let mut registry = MemoryNamespaceRegistry::with_defaults();
    {
        let mut projector = ProjectorBuilder::new()
            .destination(&mut destination)
            .registry(&mut registry)
            .build_document(DocumentOptions::default())
            .expect("projector is fully configured");
        sequence_str(NOTE, &mut projector).expect("document is well-formed");
        for problem in projector.problems().iter() {
            eprintln!("{problem}");
        }
    }

    let store = destination.into_inner();
    println!("--- {} nodes, {} submit ---", store.len(), store.submit_count());
    for record in store.records() {
        let path = record.path.to_prefixed(&registry);
        let props: Vec<String> = record
            .properties
            .iter()
            .map(|(name, values)| {
                let shown: Vec<String> = values.iter().map(ToString::to_string).collect();
                format!("{}={}", name.to_prefixed(&registry), shown.join(","))
            })
            .collect();
        println!("{path}  {}", props.join("  "));
    }
}
