//! A small token-dense textual encoder (TOON): objects fold to indented
//! `key: value` lines; uniform arrays-of-objects fold to a header-plus-rows
//! table instead of repeating every key per row. Arrays whose objects don't
//! all share the same key set can't be table-folded and are rejected —
//! callers are expected to fall back to JSON in that case.

use serde_json::{Map, Value};

use crate::FormatError;

pub fn encode(value: &Value) -> Result<String, FormatError> {
    let mut out = String::new();
    write_value(value, 0, &mut out)?;
    Ok(out)
}

fn write_value(value: &Value, indent: usize, out: &mut String) -> Result<(), FormatError> {
    match value {
        Value::Object(map) => write_object(map, indent, out),
        Value::Array(items) => write_array(items, indent, out),
        other => {
            out.push_str(&scalar(other));
            out.push('\n');
            Ok(())
        }
    }
}

fn write_object(map: &Map<String, Value>, indent: usize, out: &mut String) -> Result<(), FormatError> {
    for (key, val) in map {
        match val {
            Value::Object(_) => {
                push_indent(out, indent);
                out.push_str(key);
                out.push_str(":\n");
                write_value(val, indent + 1, out)?;
            }
            Value::Array(items) => {
                push_indent(out, indent);
                if let Some(table) = try_table_fold(items) {
                    out.push_str(key);
                    out.push_str(&format!("[{}]{{{}}}:\n", items.len(), table.columns.join(",")));
                    for row in &table.rows {
                        push_indent(out, indent + 1);
                        out.push_str(&row.join(","));
                        out.push('\n');
                    }
                } else if items.iter().all(|v| !v.is_object() && !v.is_array()) {
                    let cells: Vec<String> = items.iter().map(scalar).collect();
                    out.push_str(key);
                    out.push_str(&format!("[{}]: {}\n", items.len(), cells.join(",")));
                } else {
                    return Err(FormatError::Toon(format!(
                        "array at key '{key}' mixes shapes and cannot be table-folded"
                    )));
                }
            }
            other => {
                push_indent(out, indent);
                out.push_str(key);
                out.push_str(": ");
                out.push_str(&scalar(other));
                out.push('\n');
            }
        }
    }
    Ok(())
}

fn write_array(items: &[Value], indent: usize, out: &mut String) -> Result<(), FormatError> {
    if let Some(table) = try_table_fold(items) {
        push_indent(out, indent);
        out.push_str(&format!("[{}]{{{}}}:\n", items.len(), table.columns.join(",")));
        for row in &table.rows {
            push_indent(out, indent + 1);
            out.push_str(&row.join(","));
            out.push('\n');
        }
        Ok(())
    } else if items.iter().all(|v| !v.is_object() && !v.is_array()) {
        let cells: Vec<String> = items.iter().map(scalar).collect();
        push_indent(out, indent);
        out.push_str(&format!("[{}]: {}\n", items.len(), cells.join(",")));
        Ok(())
    } else {
        Err(FormatError::Toon(
            "top-level array mixes shapes and cannot be table-folded".into(),
        ))
    }
}

struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Folds `items` into a table iff every item is an object and every object
/// has exactly the same key set in the same order as the first.
fn try_table_fold(items: &[Value]) -> Option<Table> {
    if items.is_empty() {
        return None;
    }
    let first = items[0].as_object()?;
    let columns: Vec<String> = first.keys().cloned().collect();
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let obj = item.as_object()?;
        if obj.len() != columns.len() {
            return None;
        }
        let mut row = Vec::with_capacity(columns.len());
        for col in &columns {
            let cell = obj.get(col)?;
            if cell.is_object() || cell.is_array() {
                return None;
            }
            row.push(scalar(cell));
        }
        rows.push(row);
    }
    Some(Table { columns, rows })
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
