use crate::error::IngestError;
use crate::node::{Node, NodeType};
use crate::parsers::NodeParser;
use crate::payload::Payload;

pub struct CsvParser;

impl NodeParser for CsvParser {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn priority(&self) -> u8 {
        30
    }

    fn can_parse(&self, payload: &[u8], format_hint: Option<&str>) -> bool {
        if let Some(hint) = format_hint {
            return hint.eq_ignore_ascii_case("csv");
        }
        sniff_csv(payload)
    }

    fn parse(&self, payload: &[u8]) -> Result<Vec<Node>, IngestError> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(payload);
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| IngestError::Malformed("csv".into(), e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut nodes = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| IngestError::Malformed("csv".into(), e.to_string()))?;
            let fields: Vec<(String, Payload)> = headers
                .iter()
                .enumerate()
                .map(|(col, name)| {
                    let value = record.get(col).unwrap_or("").to_string();
                    (name.clone(), Payload::Str(value))
                })
                .collect();
            nodes.push(Node::new(
                format!("[{i}]"),
                Payload::Object(fields),
                NodeType::Row,
                "csv",
            ));
        }
        Ok(nodes)
    }
}

/// Heuristic sniff: at least two lines, a comma on the header line, and a
/// consistent column count between header and first data row.
fn sniff_csv(payload: &[u8]) -> bool {
    let text = match std::str::from_utf8(payload) {
        Ok(t) => t,
        Err(_) => return false,
    };
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = match lines.next() {
        Some(h) => h,
        None => return false,
    };
    if !header.contains(',') {
        return false;
    }
    let header_cols = header.split(',').count();
    match lines.next() {
        Some(first_row) => first_row.split(',').count() == header_cols,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_header_as_keys() {
        let payload = b"Name,Role\nAlice,Engineer\nBob,Manager";
        let nodes = CsvParser.parse(payload).expect("parses");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].path, "[0]");
        match &nodes[1].content {
            Payload::Object(fields) => {
                assert_eq!(fields[0], ("Name".to_string(), Payload::Str("Bob".into())));
                assert_eq!(fields[1], ("Role".to_string(), Payload::Str("Manager".into())));
            }
            other => panic!("expected object row, got {other:?}"),
        }
    }

    #[test]
    fn sniff_rejects_single_line_input() {
        assert!(!sniff_csv(b"just one line, no second row"));
    }

    #[test]
    fn sniff_rejects_non_csv_text() {
        assert!(!sniff_csv(b"# Heading\n\nSome paragraph text."));
    }
}
