//! Error type for document parsing and serialization.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    /// Reader- or writer-level failure from `quick-xml`.
    #[error("xml error: {0}")]
    Parse(#[from] quick_xml::Error),

    /// Malformed markup detail surfaced as text (bad attribute, escape, utf-8).
    #[error("malformed xml: {0}")]
    Malformed(String),

    /// Writer-side I/O failure while serializing.
    #[error("write xml: {0}")]
    Io(#[from] std::io::Error),

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),

    #[error("element <{0}> is never closed")]
    UnclosedElement(String),

    #[error("character data outside the root element")]
    TextOutsideRoot,

    /// `insert_before` was given an anchor that has no parent.
    #[error("anchor node is detached")]
    DetachedAnchor,
}
