use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// FieldValue – a single cell of a measurement row
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what the reporting backend emits
/// in its JSON rows (strings for LIMS results, numbers for PIMS statistics).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Null => Ok(()),
        }
    }
}

impl FieldValue {
    /// Text content of a string cell, trimmed. `None` for every other kind.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s.trim()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

// ---------------------------------------------------------------------------
// Row – one record returned by the backend
// ---------------------------------------------------------------------------

/// One flat measurement record. Field order is the order the source emitted
/// it in, which the column orderer relies on for "plain" columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, FieldValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an existing value in place (keeps its position).
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style `insert`, handy for literals in tests and demos.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Non-empty text of a field; numbers are rendered with `Display`.
    pub fn text(&self, name: &str) -> Option<String> {
        let value = self.get(name)?;
        let text = match value.as_text() {
            Some(s) => s.to_string(),
            None if value.is_null() => return None,
            None => value.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

// ---------------------------------------------------------------------------
// RowSet – the complete loaded result
// ---------------------------------------------------------------------------

/// A loaded query result with its column index.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    /// All rows, in source order.
    pub rows: Vec<Row>,
    /// Union of field names, in first-seen order.
    pub column_names: Vec<String>,
}

impl RowSet {
    /// Build the column index from the loaded rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut column_names = Vec::new();
        for row in &rows {
            for name in row.field_names() {
                if seen.insert(name) {
                    column_names.push(name.to_string());
                }
            }
        }
        RowSet { rows, column_names }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
