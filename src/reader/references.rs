//! Character and entity references in text and attribute values.

/// One piece of text, split at references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Chunk<'a> {
    /// Literal text.
    Text(&'a str),
    /// A character reference, already decoded.
    Char(char),
    /// A named entity reference.
    Entity(&'a str),
    /// A `&` that does not start a well-formed reference. The offset is
    /// relative to the scanned text.
    Malformed(usize),
}

/// Splits `text` into literal runs and references.
pub(crate) struct Chunks<'a> {
    rest: &'a str,
    consumed: usize,
}

impl<'a> Chunks<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            rest: text,
            consumed: 0,
        }
    }

    /// Byte offset of the next chunk within the scanned text.
    pub(crate) fn offset(&self) -> usize {
        self.consumed
    }

    fn advance(&mut self, len: usize) {
        self.rest = &self.rest[len..];
        self.consumed += len;
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        let rest = self.rest;
        match rest.find('&') {
            Some(0) => {
                let start = self.consumed;
                let Some(semi) = rest.find(';') else {
                    self.advance(rest.len());
                    return Some(Chunk::Malformed(start));
                };
                let body = &rest[1..semi];
                self.advance(semi + 1);
                if let Some(number) = body.strip_prefix('#') {
                    return Some(match decode_char_ref(number) {
                        Some(ch) => Chunk::Char(ch),
                        None => Chunk::Malformed(start),
                    });
                }
                if is_name(body) {
                    Some(Chunk::Entity(body))
                } else {
                    Some(Chunk::Malformed(start))
                }
            }
            Some(amp) => {
                self.advance(amp);
                Some(Chunk::Text(&rest[..amp]))
            }
            None => {
                self.advance(rest.len());
                Some(Chunk::Text(rest))
            }
        }
    }
}

fn decode_char_ref(number: &str) -> Option<char> {
    let code = match number.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => number.parse::<u32>().ok()?,
    };
    char::from_u32(code).filter(|c| *c != '\0')
}

fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}

/// Replacement text of the five predefined entities.
pub(crate) fn predefined(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    }
}
