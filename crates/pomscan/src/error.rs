//! Errors for the pomscan pipeline.
//!
//! Most failure handling in this crate is "skip and annotate": a malformed
//! or unreadable pom.xml is excluded from the batch with a diagnostic, and
//! an unresolved placeholder becomes a per-dependency
//! [`SkipReason`](crate::types::SkipReason). The error enum below covers the
//! genuinely fatal surface: I/O and serialization in the CLI driver.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
