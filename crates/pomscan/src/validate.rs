//! Structural validation of raw descriptor text.

use pomscan_xml::Document;
use tracing::debug;

/// Namespace a recognized POM must declare on its root element.
pub const POM_XMLNS: &str = "http://maven.apache.org/POM/4.0.0";

/// Parses raw text and confirms it is a Maven POM of the expected schema:
/// root element `project` carrying exactly the v4.0.0 namespace.
///
/// Any failure — unparsable markup, another root tag, a namespace
/// mismatch — yields `None`. Nothing propagates: a rejected file is simply
/// excluded from the batch.
pub fn parse_project(content: &str) -> Option<Document> {
    let doc = match Document::parse(content) {
        Ok(doc) => doc,
        Err(err) => {
            debug!("not a well-formed XML document: {err}");
            return None;
        }
    };

    {
        let root = doc.root();
        if root.name() != "project" {
            debug!("root element is '{}', not 'project'", root.name());
            return None;
        }
        if root.attribute("xmlns") != Some(POM_XMLNS) {
            debug!("root namespace is not {POM_XMLNS}");
            return None;
        }
    }

    Some(doc)
}
