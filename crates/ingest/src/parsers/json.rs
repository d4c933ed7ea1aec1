use crate::error::IngestError;
use crate::node::{Node, NodeType};
use crate::parsers::NodeParser;
use crate::payload::Payload;

pub struct JsonParser;

impl NodeParser for JsonParser {
    fn name(&self) -> &'static str {
        "json"
    }

    fn priority(&self) -> u8 {
        10
    }

    fn can_parse(&self, payload: &[u8], format_hint: Option<&str>) -> bool {
        if let Some(hint) = format_hint {
            return hint.eq_ignore_ascii_case("json");
        }
        let trimmed = trim_leading(payload);
        (trimmed.starts_with(b"{") || trimmed.starts_with(b"["))
            && serde_json::from_slice::<serde_json::Value>(payload).is_ok()
    }

    fn parse(&self, payload: &[u8]) -> Result<Vec<Node>, IngestError> {
        let value: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| IngestError::Malformed("json".into(), e.to_string()))?;
        let root: Payload = value.into();
        let mut nodes = Vec::new();
        decompose(&root, "", "json", &mut nodes);
        Ok(nodes)
    }

    fn reconstruct(&self, nodes: &[Node]) -> Result<Vec<u8>, IngestError> {
        reconstruct_json(nodes)
    }
}

fn trim_leading(payload: &[u8]) -> &[u8] {
    let mut i = 0;
    while i < payload.len() && payload[i].is_ascii_whitespace() {
        i += 1;
    }
    &payload[i..]
}

/// Recursively walk a parsed value, emitting one node per object/array
/// container plus a primitive node for every leaf, so nested paths like
/// `people[0].name` are individually addressable.
pub(crate) fn decompose(value: &Payload, path: &str, format: &str, out: &mut Vec<Node>) {
    match value {
        Payload::Object(fields) => {
            out.push(Node::new(path, value.clone(), NodeType::Object, format));
            for (key, child) in fields {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                if child.is_container() {
                    decompose(child, &child_path, format, out);
                } else {
                    out.push(Node::new(child_path, child.clone(), NodeType::Primitive, format));
                }
            }
        }
        Payload::Array(items) => {
            out.push(Node::new(path, value.clone(), NodeType::Array, format));
            for (i, item) in items.iter().enumerate() {
                let child_path = format!("{path}[{i}]");
                if item.is_container() {
                    decompose(item, &child_path, format, out);
                } else {
                    out.push(Node::new(child_path, item.clone(), NodeType::Primitive, format));
                }
            }
        }
        other => out.push(Node::new(path, other.clone(), NodeType::Primitive, format)),
    }
}

/// Reconstruct a JSON document from the root node's content (the node at
/// `path == ""`), falling back to a synthetic array of all top-level nodes
/// when no single root node is present.
pub(crate) fn reconstruct_json(nodes: &[Node]) -> Result<Vec<u8>, IngestError> {
    let root = nodes.iter().find(|n| n.path.is_empty());
    let value: serde_json::Value = match root {
        Some(node) => payload_to_json(&node.content),
        None => serde_json::Value::Array(nodes.iter().map(|n| payload_to_json(&n.content)).collect()),
    };
    serde_json::to_vec_pretty(&value).map_err(|e| IngestError::Malformed("json".into(), e.to_string()))
}

fn payload_to_json(p: &Payload) -> serde_json::Value {
    match p {
        Payload::Null => serde_json::Value::Null,
        Payload::Bool(b) => serde_json::Value::Bool(*b),
        Payload::Num(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Payload::Str(s) => serde_json::Value::String(s.clone()),
        Payload::Array(items) => serde_json::Value::Array(items.iter().map(payload_to_json).collect()),
        Payload::Object(fields) => {
            let mut map = serde_json::Map::new();
            for (k, v) in fields {
                map.insert(k.clone(), payload_to_json(v));
            }
            serde_json::Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_of_objects_expands_per_element_path() {
        let payload = br#"{"people":[{"name":"Alice"},{"name":"Bob"}]}"#;
        let nodes = JsonParser.parse(payload).expect("parses");
        let paths: Vec<&str> = nodes.iter().map(|n| n.path.as_str()).collect();
        assert!(paths.contains(&"people[0].name"));
        assert!(paths.contains(&"people[1].name"));
    }

    #[test]
    fn sniffs_json_without_hint() {
        assert!(JsonParser.can_parse(br#"{"a":1}"#, None));
        assert!(!JsonParser.can_parse(b"not json at all", None));
    }

    #[test]
    fn malformed_json_returns_error_not_panic() {
        let err = JsonParser.parse(b"{not json").unwrap_err();
        assert!(matches!(err, IngestError::Malformed(_, _)));
    }

    #[test]
    fn round_trips_root_object() {
        let payload = br#"{"table":"users","columns":{"id":"uuid"}}"#;
        let nodes = JsonParser.parse(payload).expect("parses");
        let rebuilt = JsonParser.reconstruct(&nodes).expect("reconstructs");
        let original: serde_json::Value = serde_json::from_slice(payload).unwrap();
        let got: serde_json::Value = serde_json::from_slice(&rebuilt).unwrap();
        assert_eq!(original, got);
    }
}
