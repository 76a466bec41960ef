use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{FieldValue, Row, RowSet};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a query result from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "CHARG": "B1", "ANALYTE": "pH", "FINAL": "7.01" }, ...]`
///                or the API envelope `{ "success": true, "data": [...] }`
/// * `.csv`     – header row with field names, one record per row
/// * `.parquet` – flat columns (strings, ints, floats, bools)
pub fn load_file(path: &Path) -> Result<RowSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    log::debug!("{}: {} rows", path.display(), rows.len());
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<RowSet> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

/// Parse a records-oriented JSON result (bare array or `data` envelope).
pub fn parse_json(text: &str) -> Result<RowSet> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = match &root {
        JsonValue::Array(items) => items,
        JsonValue::Object(obj) => {
            if obj.get("success").and_then(JsonValue::as_bool) == Some(false) {
                let message = obj
                    .get("message")
                    .and_then(JsonValue::as_str)
                    .unwrap_or("no message");
                bail!("Result reports failure: {message}");
            }
            obj.get("data")
                .and_then(JsonValue::as_array)
                .context("Expected a 'data' array in the JSON object")?
        }
        _ => bail!("Expected top-level JSON array or object"),
    };

    let rows = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(obj
                .iter()
                .map(|(key, val)| (key.clone(), json_to_field(val)))
                .collect::<Row>())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RowSet::from_rows(rows))
}

fn json_to_field(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV cells stay text (batch numbers like `00123` keep their zeros);
/// empty cells become null. A leading UTF-8 BOM is tolerated.
fn load_csv(path: &Path) -> Result<RowSet> {
    let bytes = std::fs::read(path).context("reading CSV file")?;
    parse_csv(&bytes)
}

pub fn parse_csv(bytes: &[u8]) -> Result<RowSet> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::Reader::from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name.clone(), csv_cell(cell)))
            .collect();
        rows.push(row);
    }

    Ok(RowSet::from_rows(rows))
}

fn csv_cell(s: &str) -> FieldValue {
    if s.trim().is_empty() {
        FieldValue::Null
    } else {
        FieldValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RowSet> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let record: Row = schema
                .fields()
                .iter()
                .enumerate()
                .map(|(col_idx, field)| {
                    (field.name().clone(), extract_field_value(batch.column(col_idx), row))
                })
                .collect();
            rows.push(record);
        }
    }

    Ok(RowSet::from_rows(rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_field_value(col: &Arc<dyn Array>, row: usize) -> FieldValue {
    if col.is_null(row) {
        return FieldValue::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => match any.downcast_ref::<StringArray>() {
            Some(s) => FieldValue::String(s.value(row).to_string()),
            None => FieldValue::Null,
        },
        DataType::LargeUtf8 => FieldValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map_or(FieldValue::Null, |a| FieldValue::Bool(a.value(row))),
        other => FieldValue::String(format!("{other:?}")),
    }
}
