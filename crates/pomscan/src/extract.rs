//! Single-file extraction: dependencies, properties, repositories, parent
//! linkage.

use crate::types::{PomDependency, PomFile, PropertySource};
use crate::validate::parse_project;
use pomscan_xml::{Document, Node};
use std::collections::HashMap;
use tracing::debug;

/// Extracts one pom.xml into a [`PomFile`], or `None` when the text is not
/// a recognized POM (non-fatal; the caller drops the file from the batch).
///
/// `file_id` is the caller-assigned identifier (normally the file path).
/// When absent, properties carry no owning file and parent linking is
/// skipped entirely.
pub fn extract_pom(content: &str, file_id: Option<&str>) -> Option<PomFile> {
    let doc = parse_project(content)?;

    let mut deps = extract_deps(&doc);
    let properties = extract_properties(&doc, file_id);
    let repository_urls = extract_repositories(&doc);

    // Declared repositories go onto every dependency of this file as-is;
    // deduplication happens during cross-file resolution.
    for dep in &mut deps {
        dep.registry_urls.extend(repository_urls.iter().cloned());
    }

    let parent_id = file_id.and_then(|id| {
        doc.root().child("parent").map(|parent| {
            let relative = parent.child_text("relativePath").unwrap_or("../pom.xml");
            resolve_parent_file(id, relative)
        })
    });

    debug!(
        "extracted {} dependencies from {}",
        deps.len(),
        file_id.unwrap_or("<unnamed>")
    );

    Some(PomFile {
        file_id: file_id.map(str::to_string),
        deps,
        properties,
        repository_urls,
        parent_id,
    })
}

/// Shape predicate: a node declares a dependency when it carries non-empty
/// child texts for all of `groupId`, `artifactId`, and `version`. The
/// surrounding build tooling is loose about where dependency-shaped nodes
/// appear (dependencyManagement, plugins, profiles), so the match is by
/// shape, not by element name.
fn dep_from_node(node: Node<'_>) -> Option<PomDependency> {
    let group_id = node.child_text("groupId")?;
    let artifact_id = node.child_text("artifactId")?;
    let version_node = node.child("version")?;
    let version = version_node.text();
    if version.is_empty() {
        return None;
    }
    Some(PomDependency::new(
        format!("{group_id}:{artifact_id}"),
        version.to_string(),
        version_node.text_pos(),
    ))
}

/// Walks every descendant in document order and collects dependency-shaped
/// nodes. The root is filtered out by identity: a POM's own
/// groupId/artifactId/version would otherwise match the shape predicate.
fn extract_deps(doc: &Document) -> Vec<PomDependency> {
    let root = doc.root();
    let root_id = root.id();
    root.descendants()
        .filter(|node| node.id() != root_id)
        .filter_map(dep_from_node)
        .collect()
}

/// Flat key-value table declared directly inside this file's `properties`
/// element. Entries with an empty value are skipped.
fn extract_properties(
    doc: &Document,
    file_id: Option<&str>,
) -> HashMap<String, PropertySource> {
    let mut properties = HashMap::new();
    let Some(container) = doc.root().child("properties") else {
        return properties;
    };
    for child in container.children() {
        let key = child.name();
        let value = child.text();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        properties.insert(
            key.to_string(),
            PropertySource {
                value: value.to_string(),
                pos: child.text_pos(),
                file_id: file_id.map(str::to_string),
            },
        );
    }
    properties
}

/// Every non-empty `repositories/repository/url` text, in document order,
/// not deduplicated.
fn extract_repositories(doc: &Document) -> Vec<String> {
    let Some(repositories) = doc.root().child("repositories") else {
        return Vec::new();
    };
    repositories
        .children()
        .filter(|node| node.name() == "repository")
        .filter_map(|repo| repo.child_text("url"))
        .map(str::to_string)
        .collect()
}

/// Computes the parent file's identifier from a `relativePath` value.
///
/// When the final path segment already names a POM file (`pom.xml` or
/// `*.pom.xml`) that filename is preserved and only the directory portion
/// joins the current file's directory. Otherwise the relative path points
/// at a directory and that directory's `pom.xml` is implied.
fn resolve_parent_file(file_id: &str, relative_path: &str) -> String {
    let basename = relative_path.rsplit('/').next().unwrap_or(relative_path);
    let (parent_dir, parent_file) = if basename == "pom.xml" || basename.ends_with(".pom.xml") {
        (dirname(relative_path), basename)
    } else {
        (relative_path, "pom.xml")
    };
    normalize_join(&[dirname(file_id), parent_dir, parent_file])
}

/// Directory portion of a slash-separated path; `.` when there is none.
fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

/// Joins slash-separated path fragments and lexically resolves `.` and `..`
/// segments. `..` at the front is kept, since file identifiers may point
/// outside the starting directory.
fn normalize_join(parts: &[&str]) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for part in parts {
        for segment in part.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if matches!(segments.last(), None | Some(&"..")) {
                        segments.push("..");
                    } else {
                        segments.pop();
                    }
                }
                other => segments.push(other),
            }
        }
    }
    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_REGISTRY_URL;

    const POM_HEADER: &str = r#"<project xmlns="http://maven.apache.org/POM/4.0.0">"#;

    fn pom(body: &str) -> String {
        format!("{POM_HEADER}\n{body}\n</project>")
    }

    #[test]
    fn test_extract_simple_dependency() {
        let content = pom(r"
  <dependencies>
    <dependency>
      <groupId>org.apache.commons</groupId>
      <artifactId>commons-lang3</artifactId>
      <version>3.14.0</version>
    </dependency>
  </dependencies>");

        let file = extract_pom(&content, Some("pom.xml")).unwrap();
        assert_eq!(file.deps.len(), 1);
        let dep = &file.deps[0];
        assert_eq!(dep.name, "org.apache.commons:commons-lang3");
        assert_eq!(dep.current_value, "3.14.0");
        assert_eq!(dep.registry_urls, vec![DEFAULT_REGISTRY_URL.to_string()]);
        // replace_pos points at the raw version text
        let at = dep.replace_pos.offset;
        assert_eq!(&content[at..at + 6], "3.14.0");
    }

    #[test]
    fn test_document_order_preserved() {
        let content = pom(r"
  <dependencies>
    <dependency>
      <groupId>b</groupId><artifactId>b</artifactId><version>2</version>
    </dependency>
    <dependency>
      <groupId>a</groupId><artifactId>a</artifactId><version>1</version>
    </dependency>
  </dependencies>
  <build>
    <plugins>
      <plugin>
        <groupId>c</groupId><artifactId>c</artifactId><version>3</version>
      </plugin>
    </plugins>
  </build>");

        let file = extract_pom(&content, Some("pom.xml")).unwrap();
        let names: Vec<_> = file.deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b:b", "a:a", "c:c"]);
    }

    #[test]
    fn test_shape_match_ignores_element_name() {
        // dependencyManagement and odd containers still count: match is by
        // child shape, not by the element being named "dependency"
        let content = pom(r"
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-dependencies</artifactId>
        <version>3.2.0</version>
      </dependency>
    </dependencies>
  </dependencyManagement>");

        let file = extract_pom(&content, Some("pom.xml")).unwrap();
        assert_eq!(file.deps.len(), 1);
        assert_eq!(
            file.deps[0].name,
            "org.springframework.boot:spring-boot-dependencies"
        );
    }

    #[test]
    fn test_root_never_matches_itself() {
        // The project's own coordinates form a dependency shape at the root
        let content = pom(r"
  <groupId>com.example</groupId>
  <artifactId>whole-project</artifactId>
  <version>1.0.0</version>");

        let file = extract_pom(&content, Some("pom.xml")).unwrap();
        assert!(file.deps.is_empty());
    }

    #[test]
    fn test_parent_block_matches_dependency_shape() {
        // a <parent> element carries groupId/artifactId/version children, so
        // the shape predicate reports it like any other coordinate; only the
        // root itself is exempt
        let content = pom(r"
  <parent>
    <groupId>com.example</groupId>
    <artifactId>platform</artifactId>
    <version>1.0.0</version>
  </parent>");

        let file = extract_pom(&content, Some("module/pom.xml")).unwrap();
        assert_eq!(file.deps.len(), 1);
        assert_eq!(file.deps[0].name, "com.example:platform");
        assert_eq!(file.deps[0].current_value, "1.0.0");
    }

    #[test]
    fn test_incomplete_nodes_skipped() {
        let content = pom(r"
  <dependencies>
    <dependency>
      <groupId>no.version</groupId>
      <artifactId>skipped</artifactId>
    </dependency>
    <dependency>
      <artifactId>no-group</artifactId>
      <version>1.0</version>
    </dependency>
  </dependencies>");

        let file = extract_pom(&content, Some("pom.xml")).unwrap();
        assert!(file.deps.is_empty());
    }

    #[test]
    fn test_extract_properties() {
        let content = pom(r"
  <properties>
    <spring.version>6.1.0</spring.version>
    <empty.value>   </empty.value>
    <java.version>17</java.version>
  </properties>");

        let file = extract_pom(&content, Some("parent/pom.xml")).unwrap();
        assert_eq!(file.properties.len(), 2);
        let prop = &file.properties["spring.version"];
        assert_eq!(prop.value, "6.1.0");
        assert_eq!(prop.file_id.as_deref(), Some("parent/pom.xml"));
        let at = prop.pos.offset;
        assert_eq!(&content[at..at + 5], "6.1.0");
        assert!(!file.properties.contains_key("empty.value"));
    }

    #[test]
    fn test_no_properties_element() {
        let file = extract_pom(&pom(""), Some("pom.xml")).unwrap();
        assert!(file.properties.is_empty());
    }

    #[test]
    fn test_repositories_pushed_to_deps_undeduplicated() {
        let content = pom(r"
  <repositories>
    <repository>
      <id>internal</id>
      <url>https://repo.example.com/maven2</url>
    </repository>
    <repository>
      <id>dup</id>
      <url>https://repo.example.com/maven2</url>
    </repository>
    <repository>
      <id>nourl</id>
    </repository>
  </repositories>
  <dependencies>
    <dependency>
      <groupId>g</groupId><artifactId>a</artifactId><version>1.0</version>
    </dependency>
  </dependencies>");

        let file = extract_pom(&content, Some("pom.xml")).unwrap();
        assert_eq!(
            file.repository_urls,
            vec![
                "https://repo.example.com/maven2".to_string(),
                "https://repo.example.com/maven2".to_string(),
            ]
        );
        // default registry first, declared repos appended without dedup
        assert_eq!(file.deps[0].registry_urls.len(), 3);
        assert_eq!(file.deps[0].registry_urls[0], DEFAULT_REGISTRY_URL);
    }

    #[test]
    fn test_parent_default_relative_path() {
        let content = pom(r"
  <parent>
    <groupId>com.example</groupId>
    <artifactId>parent</artifactId>
    <version>1.0</version>
  </parent>");

        let file = extract_pom(&content, Some("module/pom.xml")).unwrap();
        assert_eq!(file.parent_id.as_deref(), Some("pom.xml"));
    }

    #[test]
    fn test_parent_explicit_directory_path() {
        let content = pom(r"
  <parent>
    <groupId>g</groupId><artifactId>p</artifactId><version>1</version>
    <relativePath>../platform</relativePath>
  </parent>");

        let file = extract_pom(&content, Some("services/api/pom.xml")).unwrap();
        assert_eq!(file.parent_id.as_deref(), Some("services/platform/pom.xml"));
    }

    #[test]
    fn test_parent_explicit_pom_filename_preserved() {
        let content = pom(r"
  <parent>
    <groupId>g</groupId><artifactId>p</artifactId><version>1</version>
    <relativePath>../release.pom.xml</relativePath>
  </parent>");

        let file = extract_pom(&content, Some("module/pom.xml")).unwrap();
        assert_eq!(file.parent_id.as_deref(), Some("release.pom.xml"));
    }

    #[test]
    fn test_parent_skipped_without_file_id() {
        let content = pom(r"
  <parent>
    <groupId>g</groupId><artifactId>p</artifactId><version>1</version>
  </parent>");

        let file = extract_pom(&content, None).unwrap();
        assert!(file.parent_id.is_none());
        assert!(file.file_id.is_none());
    }

    #[test]
    fn test_unrecognized_document_is_none() {
        assert!(extract_pom("<project/>", Some("pom.xml")).is_none());
        assert!(extract_pom("garbage", Some("pom.xml")).is_none());
    }

    #[test]
    fn test_resolve_parent_file_rules() {
        // directory-style relative path gets pom.xml appended
        assert_eq!(resolve_parent_file("a/b/pom.xml", ".."), "a/pom.xml");
        assert_eq!(
            resolve_parent_file("a/b/pom.xml", "../sibling"),
            "a/sibling/pom.xml"
        );
        // explicit filenames are preserved
        assert_eq!(resolve_parent_file("a/b/pom.xml", "../pom.xml"), "a/pom.xml");
        assert_eq!(
            resolve_parent_file("a/b/pom.xml", "../custom.pom.xml"),
            "a/custom.pom.xml"
        );
        // relative path with no directory component
        assert_eq!(resolve_parent_file("a/pom.xml", "pom.xml"), "a/pom.xml");
        // walking above the project root keeps the .. prefix
        assert_eq!(resolve_parent_file("pom.xml", "../pom.xml"), "../pom.xml");
    }

    #[test]
    fn test_normalize_join() {
        assert_eq!(normalize_join(&["a/b", "..", "pom.xml"]), "a/pom.xml");
        assert_eq!(normalize_join(&[".", "x", "pom.xml"]), "x/pom.xml");
        assert_eq!(normalize_join(&["..", "..", "x"]), "../../x");
        assert_eq!(normalize_join(&["a", "./b/.", "c"]), "a/b/c");
        assert_eq!(normalize_join(&["."]), ".");
    }
}
