//! Well-known names used on projected nodes.
//!
//! The `jcr` and `nt` names follow the content-repository vocabulary. The
//! `seqxml` and `seqdtd` namespaces name the synthetic node kinds and the
//! properties the content-preserving projector writes.

use crate::name::QualifiedName;

/// Content-repository system names.
pub mod jcr {
    use super::QualifiedName;

    /// Namespace URI.
    pub const NAMESPACE: &str = "http://www.jcp.org/jcr/1.0";
    /// Conventional prefix.
    pub const PREFIX: &str = "jcr";

    /// The node type property.
    #[must_use]
    pub fn primary_type() -> QualifiedName {
        QualifiedName::new(NAMESPACE, "primaryType")
    }

    /// The attribute that names a node explicitly.
    #[must_use]
    pub fn name() -> QualifiedName {
        QualifiedName::new(NAMESPACE, "name")
    }
}

/// Content-repository node type names.
pub mod nt {
    use super::QualifiedName;

    /// Namespace URI.
    pub const NAMESPACE: &str = "http://www.jcp.org/jcr/nt/1.0";
    /// Conventional prefix.
    pub const PREFIX: &str = "nt";

    /// The default type for element nodes.
    #[must_use]
    pub fn unstructured() -> QualifiedName {
        QualifiedName::new(NAMESPACE, "unstructured")
    }
}

/// Synthetic node kinds and properties for non-element markup.
pub mod xml {
    use super::QualifiedName;

    /// Namespace URI.
    pub const NAMESPACE: &str = "urn:xml-sequencer:xml:1.0";
    /// Conventional prefix.
    pub const PREFIX: &str = "seqxml";

    fn name(local: &str) -> QualifiedName {
        QualifiedName::new(NAMESPACE, local)
    }

    /// Type marker of the document root node.
    #[must_use]
    pub fn document() -> QualifiedName {
        name("document")
    }

    /// Comment node kind.
    #[must_use]
    pub fn comment() -> QualifiedName {
        name("comment")
    }

    /// Comment text property.
    #[must_use]
    pub fn comment_content() -> QualifiedName {
        name("commentContent")
    }

    /// Coalesced text node kind, also the name of its text property.
    #[must_use]
    pub fn element_content() -> QualifiedName {
        name("elementContent")
    }

    /// Character-data block node kind.
    #[must_use]
    pub fn cdata() -> QualifiedName {
        name("cData")
    }

    /// Character-data block text property.
    #[must_use]
    pub fn cdata_content() -> QualifiedName {
        name("cDataContent")
    }

    /// Processing-instruction node kind.
    #[must_use]
    pub fn processing_instruction() -> QualifiedName {
        name("processingInstruction")
    }

    /// Processing-instruction data property.
    #[must_use]
    pub fn processing_instruction_content() -> QualifiedName {
        name("processingInstructionContent")
    }

    /// Processing-instruction target property.
    #[must_use]
    pub fn target() -> QualifiedName {
        name("target")
    }
}

/// Document-type facts.
pub mod dtd {
    use super::QualifiedName;

    /// Namespace URI.
    pub const NAMESPACE: &str = "urn:xml-sequencer:dtd:1.0";
    /// Conventional prefix.
    pub const PREFIX: &str = "seqdtd";

    fn name(local: &str) -> QualifiedName {
        QualifiedName::new(NAMESPACE, local)
    }

    /// Entity declaration node kind.
    #[must_use]
    pub fn entity() -> QualifiedName {
        name("entity")
    }

    /// Entity or document type name property.
    #[must_use]
    pub fn name_property() -> QualifiedName {
        name("name")
    }

    /// Public identifier property.
    #[must_use]
    pub fn public_id() -> QualifiedName {
        name("publicId")
    }

    /// System identifier property.
    #[must_use]
    pub fn system_id() -> QualifiedName {
        name("systemId")
    }

    /// Internal entity replacement text property.
    #[must_use]
    pub fn value() -> QualifiedName {
        name("value")
    }
}
