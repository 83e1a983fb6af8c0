//! The document collaborator: structure types and metadata slots.
//!
//! The engine only needs to read and write plain string values in named
//! metadata slots and to classify nodes. [`DocStruct`] captures exactly that;
//! [`StructNode`] is a serde-backed tree implementing it.

use serde::{Deserialize, Serialize};

/// Name of the structure type that never receives an identifier.
pub const BOUND_BOOK: &str = "boundbook";

/// Classification of a document-tree node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructureType {
    pub name: String,
    #[serde(default)]
    pub anchor: bool,
    #[serde(default)]
    pub topmost: bool,
}

impl StructureType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchor: false,
            topmost: false,
        }
    }

    pub fn anchor(name: impl Into<String>) -> Self {
        Self {
            anchor: true,
            ..Self::new(name)
        }
    }

    pub fn topmost(name: impl Into<String>) -> Self {
        Self {
            topmost: true,
            ..Self::new(name)
        }
    }

    /// Anchor and topmost elements hold at most one identity per work.
    pub fn is_singleton_scoped(&self) -> bool {
        self.anchor || self.topmost
    }
}

/// A node of a structured document as seen by the assigner.
pub trait DocStruct {
    fn structure_type(&self) -> &StructureType;

    /// The first value stored under `slot`, if any.
    fn metadata_value(&self, slot: &str) -> Option<&str>;

    /// Whether the node's type declares `slot`.
    fn allows_metadata(&self, slot: &str) -> bool;

    fn add_metadata(&mut self, slot: &str, value: String);

    fn children_mut(&mut self) -> &mut [Self]
    where
        Self: Sized;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub value: String,
}

/// A logical structure element of a document, serialized as JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructNode {
    #[serde(rename = "type")]
    pub structure: StructureType,
    /// Metadata slots the element type declares.
    #[serde(default, rename = "allowedMetadata")]
    pub allowed_metadata: Vec<String>,
    #[serde(default)]
    pub metadata: Vec<Metadata>,
    #[serde(default)]
    pub children: Vec<StructNode>,
}

impl StructNode {
    pub fn new(structure: StructureType) -> Self {
        Self {
            structure,
            ..Self::default()
        }
    }

    pub fn with_allowed(mut self, slot: impl Into<String>) -> Self {
        self.allowed_metadata.push(slot.into());
        self
    }

    pub fn with_metadata(mut self, slot: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(Metadata {
            name: slot.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_child(mut self, child: StructNode) -> Self {
        self.children.push(child);
        self
    }
}

impl DocStruct for StructNode {
    fn structure_type(&self) -> &StructureType {
        &self.structure
    }

    fn metadata_value(&self, slot: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|m| m.name == slot)
            .map(|m| m.value.as_str())
    }

    fn allows_metadata(&self, slot: &str) -> bool {
        self.allowed_metadata.iter().any(|s| s == slot)
    }

    fn add_metadata(&mut self, slot: &str, value: String) {
        self.metadata.push(Metadata {
            name: slot.to_owned(),
            value,
        });
    }

    fn children_mut(&mut self) -> &mut [Self] {
        &mut self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_scope() {
        assert!(StructureType::anchor("Periodical").is_singleton_scoped());
        assert!(StructureType::topmost("Monograph").is_singleton_scoped());
        assert!(!StructureType::new("Chapter").is_singleton_scoped());
    }

    #[test]
    fn parses_json_tree() {
        let json = r#"{
            "type": { "name": "Monograph", "topmost": true },
            "allowedMetadata": ["_urn", "URN"],
            "metadata": [{ "name": "CatalogIDDigital", "value": "PPN123" }],
            "children": [{ "type": { "name": "Chapter" } }]
        }"#;
        let node: StructNode = serde_json::from_str(json).unwrap();
        assert!(node.structure.topmost);
        assert!(node.allows_metadata("_urn"));
        assert!(!node.allows_metadata("DOI"));
        assert_eq!(node.metadata_value("CatalogIDDigital"), Some("PPN123"));
        assert_eq!(node.children.len(), 1);
        assert!(node.children[0].allowed_metadata.is_empty());
    }

    #[test]
    fn first_value_wins() {
        let mut node = StructNode::new(StructureType::new("Chapter")).with_metadata("_urn", "a");
        node.add_metadata("_urn", "b".into());
        assert_eq!(node.metadata_value("_urn"), Some("a"));
    }
}
