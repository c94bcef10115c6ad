//! Small string helpers shared by the projectors and the reader.

pub mod qname;
pub mod text;
