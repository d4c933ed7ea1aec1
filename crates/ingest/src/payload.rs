//! The dynamically-typed value that flows through node decomposition.
//!
//! Publishers send arbitrary structured data with no fixed schema. Rather than
//! carrying raw `serde_json::Value` (and a second, incompatible shape for YAML)
//! through the hot path, every parser converges on this one tagged sum.

use serde::{Deserialize, Serialize};

/// A dynamically-typed value produced by any of the format parsers.
///
/// Object field order is preserved (insertion order), since it feeds directly
/// into [`crate::Node::embedding_text`]'s deterministic rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Array(Vec<Payload>),
    Object(Vec<(String, Payload)>),
}

impl Payload {
    pub fn is_container(&self) -> bool {
        matches!(self, Payload::Object(_) | Payload::Array(_))
    }

    /// Render this value as a single-line structured string for embedding/lexical text.
    ///
    /// Objects render as `key: value | key: value`; arrays as `v1, v2, v3`; primitives
    /// render literally.
    pub fn render(&self) -> String {
        match self {
            Payload::Null => "null".to_string(),
            Payload::Bool(b) => b.to_string(),
            Payload::Num(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Payload::Str(s) => s.clone(),
            Payload::Array(items) => items
                .iter()
                .map(Payload::render)
                .collect::<Vec<_>>()
                .join(", "),
            Payload::Object(fields) => fields
                .iter()
                .map(|(k, v)| format!("{k}: {}", v.render()))
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

impl From<serde_json::Value> for Payload {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Payload::Null,
            serde_json::Value::Bool(b) => Payload::Bool(b),
            serde_json::Value::Number(n) => Payload::Num(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Payload::Str(s),
            serde_json::Value::Array(a) => Payload::Array(a.into_iter().map(Payload::from).collect()),
            serde_json::Value::Object(o) => {
                Payload::Object(o.into_iter().map(|(k, v)| (k, Payload::from(v))).collect())
            }
        }
    }
}

impl From<serde_yaml::Value> for Payload {
    fn from(v: serde_yaml::Value) -> Self {
        match v {
            serde_yaml::Value::Null => Payload::Null,
            serde_yaml::Value::Bool(b) => Payload::Bool(b),
            serde_yaml::Value::Number(n) => Payload::Num(n.as_f64().unwrap_or(0.0)),
            serde_yaml::Value::String(s) => Payload::Str(s),
            serde_yaml::Value::Sequence(a) => Payload::Array(a.into_iter().map(Payload::from).collect()),
            serde_yaml::Value::Mapping(m) => Payload::Object(
                m.into_iter()
                    .map(|(k, v)| (yaml_key_to_string(&k), Payload::from(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(t) => Payload::from(t.value),
        }
    }
}

fn yaml_key_to_string(k: &serde_yaml::Value) -> String {
    match k {
        serde_yaml::Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_object_as_pipe_joined_pairs() {
        let p = Payload::Object(vec![
            ("id".into(), Payload::Str("uuid".into())),
            ("email".into(), Payload::Str("varchar unique".into())),
        ]);
        assert_eq!(p.render(), "id: uuid | email: varchar unique");
    }

    #[test]
    fn renders_array_as_comma_joined() {
        let p = Payload::Array(vec![Payload::Num(1.0), Payload::Num(2.0), Payload::Num(3.0)]);
        assert_eq!(p.render(), "1, 2, 3");
    }

    #[test]
    fn renders_primitive_literally() {
        assert_eq!(Payload::Str("Bob".into()).render(), "Bob");
        assert_eq!(Payload::Bool(true).render(), "true");
    }

    #[test]
    fn json_to_payload_preserves_field_order() {
        let v: serde_json::Value =
            serde_json::from_str(r#"{"z":1,"a":2,"m":3}"#).expect("valid json");
        let p = Payload::from(v);
        match p {
            Payload::Object(fields) => {
                let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["z", "a", "m"]);
            }
            _ => panic!("expected object"),
        }
    }
}
