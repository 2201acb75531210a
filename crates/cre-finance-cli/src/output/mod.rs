pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Row collections a calculator may return, in display priority.
const ROW_COLLECTIONS: [&str; 6] = [
    "tiers",
    "partners",
    "schedule",
    "monthly_breakdown",
    "sensitivity",
    "tranches",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object inside a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Names and rows of every non-empty array of objects in a result.
pub(crate) fn row_collections(result: &Value) -> Vec<(&'static str, &[Value])> {
    let Value::Object(map) = result else {
        return Vec::new();
    };
    ROW_COLLECTIONS
        .iter()
        .filter_map(|&key| match map.get(key) {
            Some(Value::Array(rows)) if rows.iter().any(Value::is_object) => {
                Some((key, rows.as_slice()))
            }
            _ => None,
        })
        .collect()
}

/// Render a JSON leaf as plain text. Decimals arrive as strings.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
