#![no_main]
use libfuzzer_sys::fuzz_target;
use xml_sequencer::destination::MemoryDestination;
use xml_sequencer::event::{ContentEvent, ContentHandler};
use xml_sequencer::namespace::MemoryNamespaceRegistry;
use xml_sequencer::projector::{DocumentOptions, ElementOptions, ProjectorBuilder};
use xml_sequencer::{sequence_str, SequenceError};

/// Counts the bytes of character data delivered by the reader.
struct CharacterBytes(usize);

impl ContentHandler for CharacterBytes {
    fn handle(&mut self, event: ContentEvent<'_>) -> Result<(), SequenceError> {
        if let ContentEvent::Characters(text) | ContentEvent::CdataCharacters(text) = event {
            self.0 += text.len();
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Entity expansion must stay proportional to the input.
        let mut counter = CharacterBytes(0);
        let _ = sequence_str(s, &mut counter);
        assert!(counter.0 <= s.len() * 6, "{} bytes of text from {} bytes", counter.0, s.len());

        // Both projectors should never panic.
        let mut destination = MemoryDestination::new();
        let mut registry = MemoryNamespaceRegistry::with_defaults();
        if let Ok(mut projector) = ProjectorBuilder::new()
            .destination(&mut destination)
            .registry(&mut registry)
            .build_element(ElementOptions::default())
        {
            let _ = sequence_str(s, &mut projector);
        }

        let mut destination = MemoryDestination::new();
        let mut registry = MemoryNamespaceRegistry::with_defaults();
        if let Ok(mut projector) = ProjectorBuilder::new()
            .destination(&mut destination)
            .registry(&mut registry)
            .build_document(DocumentOptions::default())
        {
            let _ = sequence_str(s, &mut projector);
        }
    }
});
