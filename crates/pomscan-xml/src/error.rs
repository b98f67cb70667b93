//! Errors for XML tree construction.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("malformed XML at byte {offset}: {message}")]
    Malformed { offset: u64, message: String },

    #[error("document has no root element")]
    NoRoot,

    #[error("unclosed element '{name}' at end of input")]
    UnclosedElement { name: String },

    #[error("content after the root element at byte {offset}")]
    TrailingContent { offset: u64 },
}

pub type Result<T> = std::result::Result<T, XmlError>;
