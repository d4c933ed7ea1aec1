//! Node Parser: converts an opaque payload into an ordered list of semantic
//! [`Node`]s.
//!
//! A chain of format parsers is tried in priority order (JSON, YAML, CSV,
//! Markdown, PlainText); the first whose `can_parse` accepts the payload
//! (by hint or by sniffing) handles it. [`PlainTextParser`] is the terminal
//! fallback and always succeeds, so [`parse`] itself never fails — a
//! completely unparseable payload degrades to paragraph/sentence nodes.
//!
//! ```
//! use ingest::parse;
//!
//! let result = parse(br#"{"table":"users","columns":{"id":"uuid"}}"#, Some("json"));
//! assert!(result.success);
//! assert_eq!(result.format_name, "json");
//! assert!(!result.nodes.is_empty());
//! ```

mod error;
mod node;
mod parsers;
mod payload;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use crate::error::IngestError;
pub use crate::node::{deindex_path, Node, NodeMetadata, NodeType};
pub use crate::parsers::{default_chain, CsvParser, JsonParser, MarkdownParser, NodeParser, PlainTextParser, YamlParser};
pub use crate::payload::Payload;

/// Outcome of running the parser chain against a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub nodes: Vec<Node>,
    pub format_name: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Run the default parser chain against `payload`.
///
/// `format_hint`, when given, is tried first against the parser whose
/// `name()` matches (case-insensitively); all parsers still fall back to
/// sniffing if the hint doesn't match any of them.
pub fn parse(payload: &[u8], format_hint: Option<&str>) -> ParseResult {
    parse_with_chain(&default_chain(), payload, format_hint)
}

pub fn parse_with_chain(
    chain: &[Box<dyn NodeParser>],
    payload: &[u8],
    format_hint: Option<&str>,
) -> ParseResult {
    let start = Instant::now();
    let span = tracing::span!(tracing::Level::DEBUG, "ingest::parse", format_hint, payload_len = payload.len());
    let _enter = span.enter();

    for parser in chain {
        if !parser.can_parse(payload, format_hint) {
            continue;
        }
        match parser.parse(payload) {
            Ok(nodes) => {
                info!(
                    parser = parser.name(),
                    node_count = nodes.len(),
                    elapsed_micros = start.elapsed().as_micros() as u64,
                    "ingest parse succeeded"
                );
                return ParseResult {
                    nodes,
                    format_name: parser.name().to_string(),
                    success: true,
                    error: None,
                };
            }
            Err(e) => {
                warn!(parser = parser.name(), error = %e, "ingest parser rejected payload, trying next");
                continue;
            }
        }
    }

    // PlainTextParser is always last in the default chain and always
    // accepts, so this is reachable only with a custom chain that omits it.
    ParseResult {
        nodes: Vec::new(),
        format_name: "none".to_string(),
        success: false,
        error: Some(IngestError::NoParserAccepted.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_by_sniffing() {
        let result = parse(br#"{"table":"users"}"#, None);
        assert!(result.success);
        assert_eq!(result.format_name, "json");
    }

    #[test]
    fn parses_csv_with_hint() {
        let result = parse(b"Name,Role\nAlice,Engineer\nBob,Manager", Some("csv"));
        assert!(result.success);
        assert_eq!(result.format_name, "csv");
        assert_eq!(result.nodes.len(), 2);
    }

    #[test]
    fn falls_back_to_plaintext_for_prose() {
        let result = parse(b"Just some ordinary prose with no structure at all.", None);
        assert!(result.success);
        assert_eq!(result.format_name, "plaintext");
    }

    #[test]
    fn malformed_json_falls_through_to_plaintext() {
        // Looks like JSON (sniff would match "{"), but is not valid JSON,
        // and has no CSV/markdown signal either.
        let result = parse(b"{this is not valid json at all}", None);
        assert!(result.success);
        assert_eq!(result.format_name, "plaintext");
    }
}
