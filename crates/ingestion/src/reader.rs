//! Tabular readers for raw TRACE exports.
//!
//! Both readers produce [`RawTradeMessage`]s; typing happens in
//! [`RawTradeMessage::into_message`].

use crate::schema::{check_columns, unknown_columns, RawTradeMessage};
use std::io::{BufRead, Read};
use trace_core::{Error, Result};
use tracing::debug;

/// Read a headed CSV export. Unknown columns are ignored, missing required
/// columns fail before any row is read.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawTradeMessage>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| Error::csv(format!("read header: {e}")))?
        .clone();
    check_columns(headers.iter())?;
    let ignored = unknown_columns(headers.iter());
    if !ignored.is_empty() {
        debug!(columns = ?ignored, "ignoring unknown columns");
    }

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| Error::csv(format!("row {i}: {e}")))?;
        let mut raw = RawTradeMessage::default();
        for (column, value) in headers.iter().zip(record.iter()) {
            raw.set(column, Some(value.to_string()));
        }
        rows.push(raw);
    }
    Ok(rows)
}

/// Read newline-delimited JSON objects keyed by column name. Blank lines are
/// skipped; numbers are kept in their JSON text form.
pub fn read_json_lines<R: BufRead>(reader: R) -> Result<Vec<RawTradeMessage>> {
    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&line)?;
        check_columns(object.keys().map(String::as_str))
            .map_err(|e| Error::schema(format!("line {}: {e}", i + 1)))?;

        let mut raw = RawTradeMessage::default();
        for (column, value) in object {
            let text = match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                serde_json::Value::Bool(b) => Some(if b { "Y" } else { "N" }.to_string()),
                other => {
                    return Err(Error::schema(format!(
                        "line {}, column `{column}`: unsupported value {other}",
                        i + 1
                    )))
                }
            };
            raw.set(&column, text);
        }
        rows.push(raw);
    }
    Ok(rows)
}
