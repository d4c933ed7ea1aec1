use crate::error::IngestError;
use crate::node::Node;
use crate::parsers::json::decompose;
use crate::parsers::NodeParser;
use crate::payload::Payload;

pub struct YamlParser;

impl NodeParser for YamlParser {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn priority(&self) -> u8 {
        20
    }

    fn can_parse(&self, payload: &[u8], format_hint: Option<&str>) -> bool {
        if let Some(hint) = format_hint {
            return hint.eq_ignore_ascii_case("yaml") || hint.eq_ignore_ascii_case("yml");
        }
        // Almost any plain-text scalar parses as valid YAML, so sniffing
        // requires an actual mapping/sequence/document-marker signal —
        // otherwise prose would always misclassify as YAML.
        if !looks_structured(payload) {
            return false;
        }
        serde_yaml::from_slice::<serde_yaml::Value>(payload)
            .map(|v| matches!(v, serde_yaml::Value::Mapping(_) | serde_yaml::Value::Sequence(_)))
            .unwrap_or(false)
    }

    fn parse(&self, payload: &[u8]) -> Result<Vec<Node>, IngestError> {
        let value: serde_yaml::Value = serde_yaml::from_slice(payload)
            .map_err(|e| IngestError::Malformed("yaml".into(), e.to_string()))?;
        let root: Payload = value.into();
        let mut nodes = Vec::new();
        decompose(&root, "", "yaml", &mut nodes);
        Ok(nodes)
    }
}

fn looks_structured(payload: &[u8]) -> bool {
    let text = match std::str::from_utf8(payload) {
        Ok(t) => t,
        Err(_) => return false,
    };
    text.lines().any(|l| {
        let l = l.trim_start();
        l.starts_with("---") || l.starts_with("- ") || (l.contains(':') && !l.starts_with('#'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_mapping_and_sequence() {
        let payload = b"name: roster\nusers:\n  - id: 1\n  - id: 2\n";
        let nodes = YamlParser.parse(payload).expect("parses");
        let paths: Vec<&str> = nodes.iter().map(|n| n.path.as_str()).collect();
        assert!(paths.contains(&"users[0].id"));
        assert!(paths.contains(&"users[1].id"));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = YamlParser.parse(b"a: [unterminated").unwrap_err();
        assert!(matches!(err, IngestError::Malformed(_, _)));
    }
}
