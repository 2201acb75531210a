use serde_json::Value;
use std::io::{self, Write};

use super::{cell_text, result_of, row_collections};

/// Write a calculation as CSV to stdout.
///
/// Results carrying a row collection (schedule, tiers, partners, ...) are
/// written as that collection, one record per row. Everything else becomes
/// `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_csv<W: Write>(writer: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    let result = result_of(value);

    if let Some((_, rows)) = row_collections(result).into_iter().next() {
        write_rows(&mut wtr, rows)?;
    } else if let Value::Object(fields) = result {
        wtr.write_record(["field", "value"])?;
        for (key, val) in fields {
            wtr.write_record([key.as_str(), &cell_text(val)])?;
        }
    } else if let Value::Array(rows) = result {
        write_rows(&mut wtr, rows)?;
    } else {
        wtr.write_record([cell_text(result)])?;
    }

    wtr.flush()?;
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            wtr.write_record([cell_text(row)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(cell_text).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, value).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_scalar_result_is_field_value_pairs() {
        let out = render(&json!({"result": {"dscr": "1.25"}}));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["field,value", "dscr,1.25"]);
    }

    #[test]
    fn test_row_collection_becomes_records() {
        let out = render(&json!({"result": {
            "total_to_lp": "1424000",
            "tiers": [
                {"tier_label": "Return of Capital", "lp_amount": "900000"},
                {"tier_label": "Residual (50/50)", "lp_amount": "460000"}
            ]
        }}));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("tier_label") && lines[0].contains("lp_amount"));
        assert_eq!(lines.len(), 3);
    }
}
