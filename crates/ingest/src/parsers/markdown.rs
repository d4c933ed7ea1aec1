use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::error::IngestError;
use crate::node::{Node, NodeType};
use crate::parsers::NodeParser;
use crate::payload::Payload;

pub struct MarkdownParser;

impl NodeParser for MarkdownParser {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn priority(&self) -> u8 {
        40
    }

    fn can_parse(&self, payload: &[u8], format_hint: Option<&str>) -> bool {
        if let Some(hint) = format_hint {
            return hint.eq_ignore_ascii_case("markdown") || hint.eq_ignore_ascii_case("md");
        }
        let text = match std::str::from_utf8(payload) {
            Ok(t) => t,
            Err(_) => return false,
        };
        text.lines()
            .any(|l| l.trim_start().starts_with('#') || l.trim_start().starts_with("```"))
    }

    fn parse(&self, payload: &[u8]) -> Result<Vec<Node>, IngestError> {
        let text = std::str::from_utf8(payload)
            .map_err(|e| IngestError::Malformed("markdown".into(), e.to_string()))?;

        let mut nodes = Vec::new();
        let mut idx = 0usize;
        let mut buffer = String::new();
        let mut in_list_item = false;

        macro_rules! flush {
            ($node_type:expr) => {
                if !buffer.trim().is_empty() {
                    nodes.push(Node::new(
                        format!("block[{idx}]"),
                        Payload::Str(buffer.trim().to_string()),
                        $node_type,
                        "markdown",
                    ));
                    idx += 1;
                }
                buffer.clear();
            };
        }

        for event in Parser::new(text) {
            match event {
                Event::Start(Tag::Heading { .. }) => {
                    buffer.clear();
                }
                Event::End(TagEnd::Heading(_)) => {
                    flush!(NodeType::Heading);
                }
                Event::Start(Tag::CodeBlock(_)) => {
                    buffer.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    if !buffer.is_empty() {
                        nodes.push(Node::new(
                            format!("block[{idx}]"),
                            Payload::Str(buffer.clone()),
                            NodeType::CodeBlock,
                            "markdown",
                        ));
                        idx += 1;
                    }
                    buffer.clear();
                }
                Event::Start(Tag::Item) => {
                    in_list_item = true;
                    buffer.clear();
                }
                Event::End(TagEnd::Item) => {
                    flush!(NodeType::ListItem);
                    in_list_item = false;
                }
                Event::Start(Tag::Paragraph) => {
                    if !in_list_item {
                        buffer.clear();
                    }
                }
                Event::End(TagEnd::Paragraph) => {
                    if !in_list_item {
                        flush!(NodeType::Paragraph);
                    }
                }
                Event::Text(t) | Event::Code(t) => buffer.push_str(&t),
                Event::SoftBreak | Event::HardBreak => buffer.push(' '),
                _ => {}
            }
        }

        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_document_order_across_block_types() {
        let text = "# Title\n\nIntro paragraph.\n\n```rust\nfn main() {}\n```\n\n- item one\n- item two\n";
        let nodes = MarkdownParser.parse(text.as_bytes()).expect("parses");
        let types: Vec<NodeType> = nodes.iter().map(|n| n.node_type).collect();
        assert_eq!(
            types,
            vec![
                NodeType::Heading,
                NodeType::Paragraph,
                NodeType::CodeBlock,
                NodeType::ListItem,
                NodeType::ListItem,
            ]
        );
    }

    #[test]
    fn sniffs_on_heading_or_fence_marker() {
        assert!(MarkdownParser.can_parse(b"# Hello", None));
        assert!(!MarkdownParser.can_parse(b"just plain text here", None));
    }
}
