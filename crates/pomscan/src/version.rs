//! Maven version validity predicate.
//!
//! Accepts the version shapes Maven actually resolves:
//! - fixed versions: `1.2.3`, `1.2.3-SNAPSHOT`, `1.2.3.RELEASE`
//! - prefix wildcards: `1.2.+`
//! - ranges: `[1.0,2.0]`, `[1.0,)`, `(,2.0]`
//!
//! Anything else — placeholders, empty strings, free text — is invalid and
//! ends up classified as `not-a-version` by the resolver.

use regex::Regex;
use std::sync::LazyLock;

// Standard version: 1.2.3 or 1.2.3-SNAPSHOT or 1.2.3.RELEASE
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)*(?:[.-][A-Za-z0-9]+)*$").unwrap());

// Prefix wildcard: 1.2.+ or 1.+
static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)*\.\+$").unwrap());

// Maven-style range: [1.0,2.0], [1.0,), (,2.0]
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\[\(](\d+(?:\.\d+)*(?:[.-][A-Za-z0-9]+)?)?\s*,\s*(\d+(?:\.\d+)*(?:[.-][A-Za-z0-9]+)?)?[\]\)]$").unwrap()
});

/// Returns true when `version` is something Maven could resolve.
pub fn is_valid(version: &str) -> bool {
    let v = version.trim();
    !v.is_empty() && (VERSION_RE.is_match(v) || PREFIX_RE.is_match(v) || RANGE_RE.is_match(v))
}
