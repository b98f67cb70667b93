//! Dependency extraction and cross-file version resolution for
//! multi-module Maven projects.
//!
//! Given the raw text of one or more pom.xml files, this crate extracts
//! every declared dependency coordinate and resolves `${...}` property
//! placeholders across the parent chain: property scopes are merged with
//! child-overrides-parent precedence, parent cycles are guarded, registry
//! URLs are unioned along the chain, and a property-sourced version is
//! re-homed to the file that declared the property.
//!
//! Nothing here talks to a registry; the output is a sanitized, serializable
//! per-file dependency report.

pub mod chain;
pub mod error;
pub mod extract;
pub mod resolve;
pub mod source;
pub mod types;
pub mod validate;
pub mod version;

pub use error::{ExtractError, Result};
pub use pomscan_xml::Pos;
pub use extract::extract_pom;
pub use resolve::{resolve_all, resolve_parents};
pub use source::{ContentSource, FsContentSource, extract_all_pom_files};
pub use types::{
    DATASOURCE, DEFAULT_REGISTRY_URL, PomDependency, PomFile, PropertySource, ResolvedDependency,
    ResolvedPomFile, SkipReason,
};
pub use validate::parse_project;
