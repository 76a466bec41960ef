//! CSV export of summaries and raw rows.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::analysis::aggregate::SummaryRecord;
use crate::analysis::summary::SummaryCv;
use crate::data::model::{FieldValue, Row};
use crate::error::ReportError;

/// Spreadsheet applications need the BOM to read UTF-8 (Hangul) headers.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// One line per group: `key,count,mean,std_dev,cv,stability,min,max`.
pub fn write_summary_csv<W: Write>(writer: W, records: &[SummaryRecord]) -> Result<(), ReportError> {
    write_records(writer, records)
}

#[derive(Serialize)]
struct SummaryCvLine<'a> {
    variable: &'a str,
    batches: usize,
    cv: String,
    stability: String,
}

/// One line per summary variable: `variable,batches,cv,stability`.
pub fn write_summary_cv_csv<W: Write>(writer: W, items: &[SummaryCv]) -> Result<(), ReportError> {
    let lines: Vec<SummaryCvLine<'_>> = items
        .iter()
        .map(|item| SummaryCvLine {
            variable: &item.variable,
            batches: item.batches,
            cv: format!("{:.2}", item.cv),
            stability: item.stability.to_string(),
        })
        .collect();
    write_records(writer, &lines)
}

fn write_records<W: Write, T: Serialize>(writer: W, records: &[T]) -> Result<(), ReportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Raw rows, one column per entry of `columns` (missing fields are empty).
pub fn write_rows_csv<W: Write>(writer: W, rows: &[Row], columns: &[String]) -> Result<(), ReportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(columns)?;
    for row in rows {
        csv.write_record(columns.iter().map(|c| export_cell(row.get(c))))?;
    }
    csv.flush()?;
    Ok(())
}

/// Cell text as exported:
/// * fractional floats are rounded to 4 decimals
/// * ISO timestamps lose the `T` and fractional seconds
/// * nulls and absent fields are empty
fn export_cell(value: Option<&FieldValue>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.is_null() => String::new(),
        Some(FieldValue::Float(f)) if f.fract() != 0.0 => {
            let rounded = (f * 10_000.0).round() / 10_000.0;
            rounded.to_string()
        }
        Some(FieldValue::String(s)) if looks_like_iso_timestamp(s) => {
            let spaced = s.replacen('T', " ", 1);
            match spaced.split_once('.') {
                Some((whole, _)) => whole.to_string(),
                None => spaced,
            }
        }
        Some(other) => other.to_string(),
    }
}

fn looks_like_iso_timestamp(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 16
        && bytes[10] == b'T'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[7] == b'-'
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Write a CSV file with a UTF-8 BOM. Refuses to write an empty table.
pub fn save_csv<F>(path: &Path, rows: usize, write: F) -> Result<(), ReportError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), ReportError>,
{
    if rows == 0 {
        return Err(ReportError::NothingToExport);
    }
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(UTF8_BOM)?;
    write(&mut out)?;
    out.flush()?;
    log::info!("Exported {rows} rows to {}", path.display());
    Ok(())
}

/// `<prefix>_<YYYYMMDD>_<HHMMSS>.csv`
pub fn default_file_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{prefix}_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate::summarize;
    use crate::analysis::stability::StabilityLabel;
    use chrono::NaiveDate;

    fn to_string(f: impl FnOnce(&mut Vec<u8>) -> Result<(), ReportError>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_summary_csv() {
        let record = summarize("pH", &[7.0, 7.2]).unwrap().to_record();
        let text = to_string(|buf| write_summary_csv(buf, &[record]));
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("key,count,mean,std_dev,cv,stability,min,max"));
        assert_eq!(lines.next(), Some("pH,2,7.100,0.141,1.99,stable,7.000,7.200"));
    }

    #[test]
    fn test_summary_cv_csv() {
        let items = vec![SummaryCv {
            variable: "temp".into(),
            batches: 3,
            cv: 16.456,
            stability: StabilityLabel::Risk,
        }];
        let text = to_string(|buf| write_summary_cv_csv(buf, &items));
        assert_eq!(text, "variable,batches,cv,stability\ntemp,3,16.46,risk\n");
    }

    #[test]
    fn test_rows_csv_cells() {
        let mut row = Row::new()
            .with("time", "2024-03-01T08:15:30.250")
            .with("value", 1.234567)
            .with("count", 3.0)
            .with("note", "a, b");
        row.insert("empty", FieldValue::Null);
        let columns: Vec<String> = ["time", "value", "count", "note", "empty", "missing"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let text = to_string(|buf| write_rows_csv(buf, &[row], &columns));
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("time,value,count,note,empty,missing"));
        assert_eq!(lines.next(), Some("2024-03-01 08:15:30,1.2346,3,\"a, b\",,"));
    }

    #[test]
    fn test_save_csv_writes_bom_and_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let err = save_csv(&path, 0, |_| Ok(())).unwrap_err();
        assert!(matches!(err, ReportError::NothingToExport));
        assert!(!path.exists());

        let record = summarize("pH", &[7.0]).unwrap().to_record();
        save_csv(&path, 1, |out| write_summary_csv(out, &[record])).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        assert!(String::from_utf8_lossy(&bytes).contains(",insufficient-data,"));
    }

    #[test]
    fn test_default_file_name() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();
        assert_eq!(
            default_file_name("LIMS_CV", now),
            "LIMS_CV_20240301_090507.csv"
        );
    }
}
