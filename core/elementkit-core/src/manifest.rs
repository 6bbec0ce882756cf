//! JSON page manifests describing host nodes and their slotted content.
//!
//! ```json
//! { "elements": [
//!     { "tag": "ek-hero",
//!       "attributes": { "data-theme": "dark" },
//!       "children": [ { "slot": "headline", "kind": "h1", "text": "Welcome" } ] } ] }
//! ```

use std::path::Path;

use fs_err as fs;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::error::{ElementError, Result};
use crate::host::{Document, HostNode, SlotContent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestChild {
    #[serde(default)]
    pub slot: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestElement {
    pub tag: String,
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    #[serde(default)]
    pub children: Vec<ManifestChild>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageManifest {
    #[serde(default)]
    pub elements: Vec<ManifestElement>,
}

impl ManifestElement {
    pub fn to_host(&self) -> HostNode {
        let host = self
            .attributes
            .iter()
            .fold(HostNode::new(&self.tag), |host, (name, value)| {
                host.with_attribute(name, value)
            });
        self.children.iter().fold(host, |host, child| {
            let content = match &child.slot {
                Some(slot) => SlotContent::slotted(slot, &child.kind, &child.text),
                None => SlotContent::new(&child.kind, &child.text),
            };
            host.with_child(content)
        })
    }
}

impl PageManifest {
    pub fn into_document(self) -> Document {
        self.into_document_with(Diagnostics::new())
    }

    pub fn into_document_with(self, diagnostics: Diagnostics) -> Document {
        let mut document = Document::with_diagnostics(diagnostics);
        for element in &self.elements {
            document.insert(element.to_host());
        }
        document
    }
}

pub fn parse_manifest(content: &str) -> Result<PageManifest> {
    serde_json::from_str(content).map_err(|source| ElementError::Json {
        context: "page manifest".to_string(),
        source,
    })
}

pub fn load_manifest(path: &Path) -> Result<PageManifest> {
    if !path.exists() {
        return Err(ElementError::FileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| ElementError::Io {
        context: format!("reading manifest {}", path.display()),
        source,
    })?;
    parse_manifest(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "elements": [
            {
                "tag": "ek-hero",
                "attributes": { "data-theme": "dark", "state": "closed" },
                "children": [
                    { "slot": "headline", "kind": "H1", "text": "Welcome" },
                    { "kind": "p", "text": "loose" }
                ]
            },
            { "tag": "ek-card" }
        ]
    }"#;

    #[test]
    fn test_parse_and_build_document() {
        let manifest = parse_manifest(PAGE).unwrap();
        assert_eq!(manifest.elements.len(), 2);

        let document = manifest.into_document();
        assert!(document.contains_tag("ek-hero"));
        assert!(document.contains_tag("ek-card"));

        let hero = &document.hosts()[0];
        assert_eq!(hero.attribute("data-theme"), Some("dark"));
        assert_eq!(hero.slot("headline").unwrap().kind, "h1");
        assert_eq!(hero.children().len(), 2);
        assert!(hero.diagnostics().same_channel(document.diagnostics()));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = parse_manifest(r#"{"elements": [{"tag": "ek-card", "slots": []}]}"#).unwrap_err();
        assert!(matches!(err, ElementError::Json { .. }));
    }

    #[test]
    fn test_load_manifest_missing_file() {
        let err = load_manifest(Path::new("/definitely/not/a/manifest.json")).unwrap_err();
        assert!(matches!(err, ElementError::FileNotFound(_)));
    }
}
