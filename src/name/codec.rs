//! Reversible escaping of characters that are not legal in XML names.
//!
//! Element and attribute names may carry `_xHHHH_` tokens, where `HHHH` is
//! the hexadecimal UTF-16 code unit of the escaped character. Decoding turns
//! them back into the original characters; a literal `_x` is protected as
//! `_x005f_x` when encoding.

/// Decodes escaped element and attribute names.
pub trait TextDecoder: Send + Sync {
    /// Returns the decoded form of `text`.
    fn decode(&self, text: &str) -> String;
}

/// A decoder that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityDecoder;

impl TextDecoder for IdentityDecoder {
    fn decode(&self, text: &str) -> String {
        text.to_string()
    }
}

/// The `_xHHHH_` name codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlNameCodec;

/// Length of one `_xHHHH_` token in bytes.
const TOKEN_LEN: usize = 7;

impl XmlNameCodec {
    /// Escapes every character that is not legal in an XML name.
    #[must_use]
    pub fn encode(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '_' && chars.peek() == Some(&'x') {
                out.push_str("_x005f_");
            } else if is_name_char(ch) {
                out.push(ch);
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    out.push_str(&format!("_x{unit:04x}_"));
                }
            }
        }
        out
    }
}

impl TextDecoder for XmlNameCodec {
    fn decode(&self, text: &str) -> String {
        if text.len() < TOKEN_LEN {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut pending_high: Option<u16> = None;
        let mut rest = text;
        while !rest.is_empty() {
            if let Some(unit) = escaped_unit(rest) {
                rest = &rest[TOKEN_LEN..];
                match (pending_high.take(), unit) {
                    (Some(high), 0xDC00..=0xDFFF) => {
                        if let Some(ch) = char::decode_utf16([high, unit]).next().and_then(Result::ok) {
                            out.push(ch);
                        }
                    }
                    (previous, 0xD800..=0xDBFF) => {
                        if let Some(high) = previous {
                            push_token(&mut out, high);
                        }
                        pending_high = Some(unit);
                    }
                    (previous, _) => {
                        if let Some(high) = previous {
                            push_token(&mut out, high);
                        }
                        match char::from_u32(u32::from(unit)) {
                            Some(ch) => out.push(ch),
                            None => push_token(&mut out, unit),
                        }
                    }
                }
                continue;
            }
            if let Some(high) = pending_high.take() {
                push_token(&mut out, high);
            }
            let Some(ch) = rest.chars().next() else {
                break;
            };
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
        if let Some(high) = pending_high {
            push_token(&mut out, high);
        }
        out
    }
}

/// Reads a `_xHHHH_` token at the start of `text`.
fn escaped_unit(text: &str) -> Option<u16> {
    let bytes = text.as_bytes();
    if bytes.len() < TOKEN_LEN || bytes[0] != b'_' || bytes[1] != b'x' || bytes[6] != b'_' {
        return None;
    }
    if !bytes[2..6].iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    u16::from_str_radix(&text[2..6], 16).ok()
}

/// Writes an unpaired surrogate back out in escaped form.
fn push_token(out: &mut String, unit: u16) {
    out.push_str(&format!("_x{unit:04x}_"));
}

fn is_name_char(ch: char) -> bool {
    matches!(ch, '.' | '-' | '_' | ':') || ch.is_alphanumeric()
}
