//! Navigable XML node tree with byte-accurate position tracking.
//!
//! Wraps the quick-xml SAX reader and assembles its events into an owned
//! arena tree. Consumers get document-order traversal, named-child lookup,
//! dotted-path text queries, and a source position per node for later
//! in-place text replacement.

pub mod error;
pub mod tree;

pub use error::{Result, XmlError};
pub use tree::{Document, Node, NodeId, Pos};
