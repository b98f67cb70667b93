//! Domain types for Maven/pom.xml dependency extraction.

use pomscan_xml::Pos;
use serde::Serialize;
use std::collections::HashMap;

/// Data-source tag attached to every extracted file.
pub const DATASOURCE: &str = "maven";

/// Registry every dependency starts with before declared repositories and
/// ancestor registries are merged in.
pub const DEFAULT_REGISTRY_URL: &str = "https://repo.maven.apache.org/maven2";

/// Why a dependency was excluded from further automated action. Set at most
/// once, by the resolver, in this priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// `groupId`/`artifactId` still contains an unresolved `${...}`.
    NamePlaceholder,
    /// The version still contains an unresolved `${...}`.
    VersionPlaceholder,
    /// The resolved version fails the validity check.
    NotAVersion,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NamePlaceholder => "name-placeholder",
            Self::VersionPlaceholder => "version-placeholder",
            Self::NotAVersion => "not-a-version",
        })
    }
}

/// One declared dependency coordinate.
///
/// `name` is the canonical `groupId:artifactId` pair and `current_value` the
/// raw version text; both may still contain `${...}` placeholders until the
/// resolver runs. `replace_pos` points at the text a caller would edit to
/// change the version; after whole-value property substitution it is moved
/// to the property declaration itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomDependency {
    pub name: String,
    pub current_value: String,
    pub replace_pos: Pos,
    pub registry_urls: Vec<String>,
    /// Key of the property that supplied the version, once resolved.
    pub group_name: Option<String>,
    /// File that textually owns the resolving property. Resolution-internal;
    /// stripped by the sanitizer.
    pub resolved_from: Option<String>,
    pub skip_reason: Option<SkipReason>,
}

impl PomDependency {
    /// Creates an unresolved coordinate with the default registry. Both
    /// `name` and `current_value` must be non-empty.
    pub fn new(name: String, current_value: String, replace_pos: Pos) -> Self {
        debug_assert!(!name.is_empty() && !current_value.is_empty());
        Self {
            name,
            current_value,
            replace_pos,
            registry_urls: vec![DEFAULT_REGISTRY_URL.to_string()],
            group_name: None,
            resolved_from: None,
            skip_reason: None,
        }
    }
}

/// A property value declared directly in one file. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySource {
    pub value: String,
    pub pos: Pos,
    /// Identifier of the declaring file, when known.
    pub file_id: Option<String>,
}

/// Per-file extraction result, before cross-file resolution.
///
/// `properties` holds only the declarations made directly in this file; the
/// effective scope (parent chain merged in) is rebuilt by the resolver per
/// pass and never persisted. `parent_id` is a weak reference: it may point
/// at a file absent from the batch, in which case the chain walk stops.
#[derive(Debug, Clone)]
pub struct PomFile {
    pub file_id: Option<String>,
    pub deps: Vec<PomDependency>,
    pub properties: HashMap<String, PropertySource>,
    pub repository_urls: Vec<String>,
    pub parent_id: Option<String>,
}

/// Sanitized public shape of a resolved dependency: no resolution
/// bookkeeping, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    pub name: String,
    pub current_value: String,
    pub replace_pos: Pos,
    pub registry_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
}

/// Sanitized per-file result handed to callers.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPomFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub datasource: &'static str,
    pub deps: Vec<ResolvedDependency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}
