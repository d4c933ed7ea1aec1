//! The atomic unit of matching: [`Node`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::payload::Payload;

/// Enumerated shape of a [`Node`]'s originating structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Object,
    Array,
    Primitive,
    Paragraph,
    Heading,
    ListItem,
    CodeBlock,
    Row,
}

/// Free-form tags carried alongside a node, always including the originating
/// `data_format`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NodeMetadata {
    pub data_format: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// A single semantic node extracted from a payload.
///
/// `path` is a hierarchical locator within the originating payload (e.g.
/// `people[0].name`); the empty string denotes the payload's root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub path: String,
    pub content: Payload,
    pub node_type: NodeType,
    pub metadata: NodeMetadata,
}

impl Node {
    pub fn new(path: impl Into<String>, content: Payload, node_type: NodeType, data_format: &str) -> Self {
        Node {
            path: path.into(),
            content,
            node_type,
            metadata: NodeMetadata {
                data_format: data_format.to_string(),
                tags: BTreeMap::new(),
            },
        }
    }

    /// The canonical projection used for both vector embedding and lexical
    /// indexing: de-indexed path segments followed by a structured rendering
    /// of the content.
    pub fn embedding_text(&self) -> String {
        let path_part = deindex_path(&self.path);
        let content_part = self.content.render();
        if path_part.is_empty() {
            content_part
        } else if content_part.is_empty() {
            path_part
        } else {
            format!("{path_part} {content_part}")
        }
    }
}

/// Strip array-index segments (`[0]`) and turn `.`-separated path segments
/// into a space-joined phrase: `people[0].name` -> `people name`.
pub fn deindex_path(path: &str) -> String {
    let mut out = String::new();
    for raw_segment in path.split('.') {
        let segment: String = raw_segment
            .chars()
            .filter(|c| !(c.is_ascii_digit() || *c == '[' || *c == ']'))
            .collect();
        if segment.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&segment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deindex_strips_array_subscripts() {
        assert_eq!(deindex_path("people[0].name"), "people name");
        assert_eq!(deindex_path("[3]"), "");
        assert_eq!(deindex_path(""), "");
        assert_eq!(deindex_path("a.b[12].c"), "a b c");
    }

    #[test]
    fn embedding_text_joins_path_and_rendered_content() {
        let node = Node::new(
            "people[0].name",
            Payload::Str("Alice".into()),
            NodeType::Primitive,
            "json",
        );
        assert_eq!(node.embedding_text(), "people name Alice");
    }

    #[test]
    fn embedding_text_for_root_object_has_no_path_prefix() {
        let node = Node::new(
            "",
            Payload::Object(vec![("table".into(), Payload::Str("users".into()))]),
            NodeType::Object,
            "json",
        );
        assert_eq!(node.embedding_text(), "table: users");
    }
}
