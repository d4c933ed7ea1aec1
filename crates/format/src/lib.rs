//! Output serializers for delivered envelopes (core spec §6).
//!
//! The default response format is TOON, a compact token-dense textual
//! serialization; JSON is the universally safe fallback when TOON's encoder
//! can't represent a value (§9 open question: TOON is optional, not a hard
//! launch requirement — any encode failure degrades to JSON transparently).

use serde_json::Value;
use thiserror::Error;

mod toon;

/// One of the response formats an [`AgentRegistration`]/ad-hoc query can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
    Toml,
    Csv,
    Xml,
    Markdown,
    Toon,
    Text,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Toon
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "toml" => Ok(OutputFormat::Toml),
            "csv" => Ok(OutputFormat::Csv),
            "xml" => Ok(OutputFormat::Xml),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "toon" => Ok(OutputFormat::Toon),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(FormatError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unknown response format: {0}")]
    UnknownFormat(String),
    #[error("yaml encode failed: {0}")]
    Yaml(String),
    #[error("toml encode failed: {0}")]
    Toml(String),
    #[error("csv encode failed: {0}")]
    Csv(String),
    #[error("xml encode failed: {0}")]
    Xml(String),
    #[error("toon encode failed: {0}")]
    Toon(String),
}

/// Serialize `value` in the requested format. May fail for formats that
/// require a shape the value doesn't have (e.g. CSV/TOON tabular folding
/// over a non-uniform array).
pub fn serialize(value: &Value, format: OutputFormat) -> Result<Vec<u8>, FormatError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_vec_pretty(value).unwrap_or_else(|_| b"null".to_vec())),
        OutputFormat::Yaml => {
            serde_yaml::to_string(value)
                .map(|s| s.into_bytes())
                .map_err(|e| FormatError::Yaml(e.to_string()))
        }
        OutputFormat::Toml => {
            let toml_value: toml::Value = json_to_toml(value)?;
            toml::to_string_pretty(&toml_value)
                .map(|s| s.into_bytes())
                .map_err(|e| FormatError::Toml(e.to_string()))
        }
        OutputFormat::Csv => csv_encode(value),
        OutputFormat::Xml => xml_encode(value),
        OutputFormat::Markdown => Ok(markdown_encode(value).into_bytes()),
        OutputFormat::Toon => toon::encode(value).map(|s| s.into_bytes()),
        OutputFormat::Text => Ok(text_encode(value).into_bytes()),
    }
}

/// Serialize `value` in `format`, always succeeding: any encode error
/// (principally TOON over an unrepresentable shape) degrades transparently
/// to JSON, logging a warning. This is the path the Dispatcher and
/// Orchestrator use for outbound envelopes.
pub fn serialize_safe(value: &Value, format: OutputFormat) -> Vec<u8> {
    match serialize(value, format) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(requested_format = ?format, error = %err, "format encode failed, falling back to json");
            serde_json::to_vec(value).unwrap_or_else(|_| b"null".to_vec())
        }
    }
}

/// The MIME type an HTTP caller should be told a `serialize`d body is in.
/// TOON has no registered media type, so it rides on `text/plain` like the
/// other line-oriented formats this crate emits.
pub fn content_type(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Json => "application/json",
        OutputFormat::Yaml => "application/yaml",
        OutputFormat::Toml => "application/toml",
        OutputFormat::Csv => "text/csv",
        OutputFormat::Xml => "application/xml",
        OutputFormat::Markdown => "text/markdown",
        OutputFormat::Toon | OutputFormat::Text => "text/plain",
    }
}

fn json_to_toml(value: &Value) -> Result<toml::Value, FormatError> {
    serde_json::from_value::<toml::Value>(value.clone()).map_err(|e| FormatError::Toml(e.to_string()))
}

fn csv_encode(value: &Value) -> Result<Vec<u8>, FormatError> {
    let rows = value
        .as_array()
        .ok_or_else(|| FormatError::Csv("csv output requires a top-level array of objects".into()))?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let first = rows[0]
        .as_object()
        .ok_or_else(|| FormatError::Csv("csv rows must be objects".into()))?;
    let columns: Vec<String> = first.keys().cloned().collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&columns)
        .map_err(|e| FormatError::Csv(e.to_string()))?;
    for row in rows {
        let obj = row
            .as_object()
            .ok_or_else(|| FormatError::Csv("csv rows must be objects".into()))?;
        let mut record = Vec::with_capacity(columns.len());
        for col in &columns {
            let cell = obj
                .get(col)
                .map(scalar_to_string)
                .unwrap_or_default();
            record.push(cell);
        }
        writer
            .write_record(&record)
            .map_err(|e| FormatError::Csv(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| FormatError::Csv(e.to_string()))
}

fn xml_encode(value: &Value) -> Result<Vec<u8>, FormatError> {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_xml_node("root", value, &mut out);
    Ok(out.into_bytes())
}

fn write_xml_node(tag: &str, value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            out.push_str(&format!("<{tag}>"));
            for (k, v) in map {
                write_xml_node(&sanitize_tag(k), v, out);
            }
            out.push_str(&format!("</{tag}>"));
        }
        Value::Array(items) => {
            for item in items {
                write_xml_node(tag, item, out);
            }
        }
        other => {
            out.push_str(&format!(
                "<{tag}>{}</{tag}>",
                xml_escape(&scalar_to_string(other))
            ));
        }
    }
}

fn sanitize_tag(tag: &str) -> String {
    let cleaned: String = tag
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() || cleaned.chars().next().unwrap().is_ascii_digit() {
        format!("_{cleaned}")
    } else {
        cleaned
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn markdown_encode(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("- **{k}**: {}", scalar_to_string(v)))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Array(items) => items
            .iter()
            .map(|v| format!("- {}", scalar_to_string(v)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => scalar_to_string(other),
    }
}

fn text_encode(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => scalar_to_string(other),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn parses_known_format_names_case_insensitively() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("toon").unwrap(), OutputFormat::Toon);
        assert!(OutputFormat::from_str("protobuf").is_err());
    }

    #[test]
    fn json_roundtrips() {
        let v = json!({"a": 1, "b": [1,2,3]});
        let bytes = serialize(&v, OutputFormat::Json).unwrap();
        let back: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn csv_requires_array_of_objects() {
        let v = json!({"not": "an array"});
        assert!(serialize(&v, OutputFormat::Csv).is_err());
    }

    #[test]
    fn csv_encodes_uniform_rows() {
        let v = json!([{"name": "Bob", "role": "Manager"}]);
        let bytes = serialize(&v, OutputFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("name,role"));
        assert!(text.contains("Bob,Manager"));
    }

    #[test]
    fn serialize_safe_falls_back_to_json_on_toon_failure() {
        // A mixed-type array of objects with divergent key sets cannot be
        // table-folded by the TOON encoder.
        let v = json!([{"a": 1}, {"b": 2}]);
        let bytes = serialize_safe(&v, OutputFormat::Toon);
        let parsed: Value = serde_json::from_slice(&bytes).expect("falls back to valid json");
        assert_eq!(parsed, v);
    }

    #[test]
    fn toon_encodes_uniform_object_array_as_table() {
        let v = json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]);
        let bytes = serialize(&v, OutputFormat::Toon).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("id"));
        assert!(text.contains("name"));
    }
}
