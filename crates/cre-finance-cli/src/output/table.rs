use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell_text, result_of, row_collections};

/// Print a calculation as tables: headline fields first, then one table per
/// row collection (schedule, tiers, partners, ...).
pub fn print_table(value: &Value) {
    let result = result_of(value);

    match result {
        Value::Object(fields) => {
            println!("{}", field_table(fields));
            for (name, rows) in row_collections(result) {
                println!("\n{}:", title(name));
                println!("{}", rows_table(rows));
            }
        }
        Value::Array(rows) => println!("{}", rows_table(rows)),
        other => println!("{}", cell_text(other)),
    }

    if let Some(envelope) = value.as_object() {
        print_footer(envelope);
    }
}

/// Scalar fields as a two-column table; nested collections are skipped.
fn field_table(fields: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        if matches!(val, Value::Array(_) | Value::Object(_)) {
            continue;
        }
        builder.push_record([key.as_str(), &cell_text(val)]);
    }
    Table::from(builder)
}

/// One row per object, columns taken from the first object's keys.
fn rows_table(rows: &[Value]) -> Table {
    let headers: Vec<String> = match rows.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => vec!["value".to_string()],
    };

    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for row in rows {
        let cells: Vec<String> = match row {
            Value::Object(map) => headers
                .iter()
                .map(|h| map.get(h).map(cell_text).unwrap_or_default())
                .collect(),
            other => vec![cell_text(other)],
        };
        builder.push_record(cells);
    }
    Table::from(builder)
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn title(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title() {
        assert_eq!(title("monthly_breakdown"), "Monthly breakdown");
        assert_eq!(title("tiers"), "Tiers");
    }

    #[test]
    fn test_field_table_skips_collections() {
        let result = json!({"total_to_lp": "1424000", "tiers": [{"tier_label": "Residual"}]});
        let rendered = field_table(result.as_object().unwrap()).to_string();
        assert!(rendered.contains("total_to_lp"));
        assert!(!rendered.contains("Residual"));
    }

    #[test]
    fn test_rows_table_uses_first_row_headers() {
        let rows = vec![
            json!({"year": 1, "balance": "9852000"}),
            json!({"year": 2, "balance": "9696000"}),
        ];
        let rendered = rows_table(&rows).to_string();
        assert!(rendered.contains("balance"));
        assert!(rendered.contains("9696000"));
    }
}
