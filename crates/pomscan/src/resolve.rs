//! Cross-file resolution over a batch of extracted pom.xml files.
//!
//! Runs only once the whole batch is available: parent-chain walking needs
//! global visibility of every file identifier. Per file, an effective
//! property scope is layered root-most-last (nearer declarations win),
//! registry URLs are unioned along the chain, placeholders are substituted,
//! and each property-sourced version is re-homed to the file that declared
//! the property.

use crate::chain;
use crate::types::{
    DATASOURCE, PomDependency, PomFile, PropertySource, ResolvedDependency, ResolvedPomFile,
    SkipReason,
};
use crate::version;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{[^}]*\}").unwrap());
static WHOLE_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\{([^}]*)\}$").unwrap());

/// Effective view of one file during resolution: its layered property scope
/// and the registry URLs contributed by every file on its parent chain.
struct FileScope {
    properties: HashMap<String, PropertySource>,
    registry_urls: Vec<String>,
}

/// Resolves the batch and sanitizes the result for external callers.
pub fn resolve_all(files: Vec<PomFile>) -> Vec<ResolvedPomFile> {
    sanitize(resolve_parents(files))
}

/// Cross-file resolution, Steps A-D. Input order is preserved; no file
/// identities are created or dropped, only dependency lists are rewritten.
pub fn resolve_parents(mut files: Vec<PomFile>) -> Vec<PomFile> {
    let index: HashMap<String, usize> = files
        .iter()
        .enumerate()
        .filter_map(|(i, f)| f.file_id.clone().map(|id| (id, i)))
        .collect();

    // Step A: per file, walk the parent chain once and collect its
    // effective property scope plus every registry URL seen along the way.
    let scopes: Vec<FileScope> = files.iter().map(|f| file_scope(f, &files, &index)).collect();

    // Steps B-D: per dependency, union registries, substitute placeholders,
    // then bucket it under the file that owns its resolving property.
    let mut buckets: Vec<Vec<PomDependency>> = vec![Vec::new(); files.len()];
    for (origin, file) in files.iter().enumerate() {
        let scope = &scopes[origin];
        for dep in &file.deps {
            let mut dep = dep.clone();
            dep.registry_urls = union_registries(&dep.registry_urls, &scope.registry_urls);
            apply_props(&mut dep, &scope.properties);

            let target = dep
                .resolved_from
                .as_deref()
                .and_then(|id| index.get(id))
                .copied()
                .unwrap_or(origin);
            buckets[target].push(dep);
        }
    }

    for (file, deps) in files.iter_mut().zip(buckets) {
        file.deps = deps;
    }
    files
}

/// Strips resolution-internal bookkeeping (property scopes, property source
/// files) into the public result shape.
pub fn sanitize(files: Vec<PomFile>) -> Vec<ResolvedPomFile> {
    files
        .into_iter()
        .map(|file| ResolvedPomFile {
            file_id: file.file_id,
            datasource: DATASOURCE,
            deps: file
                .deps
                .into_iter()
                .map(|dep| ResolvedDependency {
                    name: dep.name,
                    current_value: dep.current_value,
                    replace_pos: dep.replace_pos,
                    registry_urls: dep.registry_urls,
                    group_name: dep.group_name,
                    skip_reason: dep.skip_reason,
                })
                .collect(),
            parent_id: file.parent_id,
        })
        .collect()
}

fn file_scope(start: &PomFile, files: &[PomFile], index: &HashMap<String, usize>) -> FileScope {
    let visited = chain::walk(
        start,
        |f| f.file_id.as_deref().unwrap_or(""),
        |f| {
            f.parent_id
                .as_deref()
                .and_then(|id| index.get(id))
                .map(|&i| &files[i])
        },
    );

    let mut properties: HashMap<String, PropertySource> = HashMap::new();
    let mut registry_urls: Vec<String> = Vec::new();
    for file in visited {
        // walk order is self-outward, so the first writer is the nearest
        // declaration and wins over ancestors
        for (key, prop) in &file.properties {
            properties
                .entry(key.clone())
                .or_insert_with(|| prop.clone());
        }
        for dep in &file.deps {
            for url in &dep.registry_urls {
                if !registry_urls.contains(url) {
                    registry_urls.push(url.clone());
                }
            }
        }
    }

    FileScope {
        properties,
        registry_urls,
    }
}

/// Order-preserving union of a dependency's own registry URLs with the
/// chain-accumulated set.
fn union_registries(own: &[String], inherited: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for url in own.iter().chain(inherited) {
        if !merged.contains(url) {
            merged.push(url.clone());
        }
    }
    merged
}

/// Step C: placeholder substitution against one file's merged scope, then
/// terminal classification.
fn apply_props(dep: &mut PomDependency, scope: &HashMap<String, PropertySource>) {
    dep.name = substitute_all(&dep.name, scope);
    for url in &mut dep.registry_urls {
        *url = substitute_all(url, scope);
    }

    // The version substitutes only as an exact whole-string match; a
    // partial placeholder inside a version stays untouched.
    let whole_key = WHOLE_PLACEHOLDER_RE
        .captures(&dep.current_value)
        .map(|caps| caps[1].trim().to_string());
    if let Some(key) = whole_key
        && let Some(prop) = scope.get(&key)
    {
        dep.current_value = prop.value.clone();
        dep.group_name = Some(key);
        // report and edit the version where the property lives, not where
        // the dependency referenced it
        dep.replace_pos = prop.pos;
        dep.resolved_from = prop.file_id.clone();
    }

    dep.skip_reason = if PLACEHOLDER_RE.is_match(&dep.name) {
        Some(SkipReason::NamePlaceholder)
    } else if PLACEHOLDER_RE.is_match(&dep.current_value) {
        Some(SkipReason::VersionPlaceholder)
    } else if !version::is_valid(&dep.current_value) {
        Some(SkipReason::NotAVersion)
    } else {
        None
    };
}

/// Replaces every `${key}` whose trimmed key is in scope; unresolvable
/// placeholders are left as-is.
fn substitute_all(input: &str, scope: &HashMap<String, PropertySource>) -> String {
    PLACEHOLDER_RE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let token = &caps[0];
            let key = token[2..token.len() - 1].trim();
            scope
                .get(key)
                .map_or_else(|| token.to_string(), |prop| prop.value.clone())
        })
        .into_owned()
}
