//! Minimal nbformat v4 handling.
//!
//! Only the `cells` array is touched; every other key of the notebook is
//! carried through as-is.

use serde::Serialize;
use serde_json::{Value, json};

/// Parse notebook JSON, requiring a `cells` array.
pub(crate) fn parse(path: &str, text: &str) -> Result<Value, String> {
    let notebook: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    if !notebook.get("cells").is_some_and(Value::is_array) {
        return Err(format!("{path} has no `cells` array"));
    }
    Ok(notebook)
}

/// Mutable access to the `cells` array of a parsed notebook.
pub(crate) fn cells_mut(notebook: &mut Value) -> Option<&mut Vec<Value>> {
    notebook.get_mut("cells").and_then(Value::as_array_mut)
}

/// A new markdown cell holding `text`.
pub(crate) fn markdown_cell(text: &str) -> Value {
    json!({
        "cell_type": "markdown",
        "metadata": {},
        "source": text,
    })
}

/// Source text of a markdown cell, or `None` for other cell types.
///
/// nbformat allows `source` as a string or a list of lines.
pub(crate) fn markdown_source(cell: &Value) -> Option<String> {
    if cell.get("cell_type").and_then(Value::as_str) != Some("markdown") {
        return None;
    }
    match cell.get("source")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(lines) => Some(lines.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

/// Serialize a notebook the way nbformat does: one-space indent, sorted keys.
pub(crate) fn write(notebook: &Value) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    notebook.serialize(&mut serializer)?;
    let mut text = String::from_utf8_lossy(&out).into_owned();
    text.push('\n');
    Ok(text)
}
