use crate::error::IngestError;
use crate::node::{Node, NodeType};
use crate::parsers::NodeParser;
use crate::payload::Payload;

/// Terminal fallback: splits on blank lines into paragraphs; a paragraph
/// with no blank-line separators is split into sentences. Always succeeds,
/// even on non-UTF-8 input (lossily converted) or empty input (zero nodes).
pub struct PlainTextParser;

impl NodeParser for PlainTextParser {
    fn name(&self) -> &'static str {
        "plaintext"
    }

    fn priority(&self) -> u8 {
        255
    }

    fn can_parse(&self, _payload: &[u8], _format_hint: Option<&str>) -> bool {
        true
    }

    fn parse(&self, payload: &[u8]) -> Result<Vec<Node>, IngestError> {
        let text = String::from_utf8_lossy(payload);
        let paragraphs: Vec<&str> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let mut nodes = Vec::new();
        if paragraphs.len() > 1 {
            for (i, para) in paragraphs.iter().enumerate() {
                nodes.push(Node::new(
                    format!("para[{i}]"),
                    Payload::Str(para.to_string()),
                    NodeType::Paragraph,
                    "text",
                ));
            }
        } else if let Some(single) = paragraphs.first() {
            for (i, sentence) in split_sentences(single).into_iter().enumerate() {
                nodes.push(Node::new(
                    format!("sentence[{i}]"),
                    Payload::Str(sentence),
                    NodeType::Paragraph,
                    "text",
                ));
            }
        }
        Ok(nodes)
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let trimmed = current.trim().to_string();
            if !trimmed.is_empty() {
                sentences.push(trimmed);
            }
            current.clear();
        }
    }
    let remainder = current.trim();
    if !remainder.is_empty() {
        sentences.push(remainder.to_string());
    }
    if sentences.is_empty() {
        vec![]
    } else {
        sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_accepts() {
        assert!(PlainTextParser.can_parse(b"", None));
        assert!(PlainTextParser.can_parse(b"{\"valid\":\"json\"}", None));
    }

    #[test]
    fn splits_blank_line_separated_paragraphs() {
        let nodes = PlainTextParser
            .parse(b"First paragraph.\n\nSecond paragraph here.")
            .expect("always succeeds");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].path, "para[0]");
    }

    #[test]
    fn splits_single_paragraph_into_sentences() {
        let nodes = PlainTextParser
            .parse(b"Hello there. How are you? Fine!")
            .expect("always succeeds");
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn empty_input_yields_zero_nodes_without_error() {
        let nodes = PlainTextParser.parse(b"").expect("always succeeds");
        assert!(nodes.is_empty());
    }
}
