//! The parser chain: a configuration-driven set of values satisfying a small
//! capability trait, dispatched by iteration rather than polymorphism depth.
//!
//! Each [`NodeParser`] is pure: identical input must yield an identical node
//! list and path set. A parser must never panic on malformed input — it
//! returns `Err` and the chain tries the next candidate. [`PlainTextParser`]
//! is the terminal fallback and always accepts.

mod csv;
mod json;
mod markdown;
mod plaintext;
mod yaml;

pub use self::csv::CsvParser;
pub use json::JsonParser;
pub use markdown::MarkdownParser;
pub use plaintext::PlainTextParser;
pub use yaml::YamlParser;

use crate::error::IngestError;
use crate::node::Node;

/// Capability set implemented by every format parser in the chain.
pub trait NodeParser: Send + Sync {
    /// Stable identifier used in `format_name` and error messages.
    fn name(&self) -> &'static str;

    /// Chain priority; lower runs first. Ties broken by registration order.
    fn priority(&self) -> u8;

    /// Cheap, side-effect-free check: would `parse` plausibly accept this
    /// payload? `format_hint`, when given, short-circuits sniffing.
    fn can_parse(&self, payload: &[u8], format_hint: Option<&str>) -> bool;

    /// Decompose `payload` into an ordered node list. Must not panic.
    fn parse(&self, payload: &[u8]) -> Result<Vec<Node>, IngestError>;

    /// Reconstruct a payload of this parser's format from nodes. Only JSON
    /// round-tripping and alternate-serialization emission are required;
    /// a bit-exact inverse is not guaranteed.
    fn reconstruct(&self, _nodes: &[Node]) -> Result<Vec<u8>, IngestError> {
        Err(IngestError::ReconstructUnsupported(self.name().to_string()))
    }
}

/// Build the default parser chain in priority order: JSON, YAML, CSV,
/// Markdown, PlainText.
pub fn default_chain() -> Vec<Box<dyn NodeParser>> {
    let mut chain: Vec<Box<dyn NodeParser>> = vec![
        Box::new(JsonParser),
        Box::new(YamlParser),
        Box::new(CsvParser),
        Box::new(MarkdownParser),
        Box::new(PlainTextParser),
    ];
    chain.sort_by_key(|p| p.priority());
    chain
}
