use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::model::{FieldValue, Row};
use crate::error::ReportError;

/// Environment variable selecting the start-up profile (`lims` or `pims`).
pub const PROFILE_ENV: &str = "LABTREND_PROFILE";

// ---------------------------------------------------------------------------
// RowSchema – which fields carry batch, analyte and result
// ---------------------------------------------------------------------------

/// Field names of a row source. Batch fields are tried in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RowSchema {
    pub batch_fields: Vec<String>,
    pub analyte_field: String,
    pub value_field: String,
    /// Batch label used when none of `batch_fields` is filled.
    pub unknown_batch: String,
}

impl Default for RowSchema {
    fn default() -> Self {
        Self::lims()
    }
}

impl RowSchema {
    pub fn lims() -> Self {
        Self {
            batch_fields: vec!["CHARG".into(), "batchNo".into()],
            analyte_field: "ANALYTE".into(),
            value_field: "FINAL".into(),
            unknown_batch: "Unknown".into(),
        }
    }

    pub fn pims_stats() -> Self {
        Self {
            batch_fields: vec!["배치번호".into(), "batch_no".into()],
            analyte_field: "변수명".into(),
            value_field: "값".into(),
            unknown_batch: "Unknown".into(),
        }
    }

    /// Batch identifier of a row, falling back to `unknown_batch`.
    pub fn batch_of(&self, row: &Row) -> String {
        self.batch_fields
            .iter()
            .find_map(|f| row.text(f))
            .unwrap_or_else(|| self.unknown_batch.clone())
    }

    pub fn analyte_of(&self, row: &Row) -> Option<String> {
        row.text(&self.analyte_field)
    }

    pub fn value_of<'r>(&self, row: &'r Row) -> Option<&'r FieldValue> {
        row.get(&self.value_field)
    }
}

// ---------------------------------------------------------------------------
// ColumnLayout – display/export column vocabulary
// ---------------------------------------------------------------------------

/// Column vocabulary for ordering tables and detecting statistic columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnLayout {
    /// Identifying columns placed first, in this order.
    pub priority_fields: Vec<String>,
    /// Statistic suffixes in canonical order: mean, stddev, p25, p50, p75.
    pub stat_suffixes: Vec<String>,
    /// Joins a variable name and its statistic suffix.
    pub stat_separator: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            priority_fields: ["처리일시", "배치번호", "품목코드", "공정코드", "시작시간", "종료시간"]
                .into_iter()
                .map(String::from)
                .collect(),
            stat_suffixes: ["평균", "표준편차", "25%", "50%", "75%"]
                .into_iter()
                .map(String::from)
                .collect(),
            stat_separator: "_".into(),
        }
    }
}

impl ColumnLayout {
    /// Suffix of the per-batch mean column.
    pub fn mean_suffix(&self) -> Option<&str> {
        self.stat_suffixes.first().map(String::as_str)
    }

    /// Suffix of the per-batch standard deviation column.
    pub fn std_dev_suffix(&self) -> Option<&str> {
        self.stat_suffixes.get(1).map(String::as_str)
    }

    /// Full column name for a variable and one of its statistics.
    pub fn stat_column(&self, base: &str, suffix: &str) -> String {
        format!("{base}{}{suffix}", self.stat_separator)
    }
}

// ---------------------------------------------------------------------------
// Profile – everything that differs between LIMS and PIMS sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub schema: RowSchema,
    pub layout: ColumnLayout,
    /// Identifying columns never offered as chart variables.
    pub id_fields: Vec<String>,
    /// Lower-case name fragments that disqualify a column as a variable.
    pub excluded_markers: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self::lims()
    }
}

impl Profile {
    pub fn lims() -> Self {
        Self {
            name: "LIMS".into(),
            schema: RowSchema::lims(),
            layout: ColumnLayout::default(),
            id_fields: vec!["CHARG".into(), "batchNo".into(), "ANALYTE".into()],
            excluded_markers: vec!["time".into(), "timestamp".into(), "batch".into()],
        }
    }

    pub fn pims_stats() -> Self {
        Self {
            name: "PIMS".into(),
            schema: RowSchema::pims_stats(),
            layout: ColumnLayout::default(),
            id_fields: ["배치번호", "품목코드", "공정코드", "batchNo", "batch"]
                .into_iter()
                .map(String::from)
                .collect(),
            excluded_markers: vec!["time".into(), "timestamp".into(), "batch".into()],
        }
    }

    /// Preset by name (`lims`, `pims`), case-insensitive.
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lims" => Some(Self::lims()),
            "pims" | "pims-stats" | "pims_stats" => Some(Self::pims_stats()),
            _ => None,
        }
    }

    /// Start-up profile from [`PROFILE_ENV`], defaulting to LIMS.
    pub fn from_env() -> Self {
        match std::env::var(PROFILE_ENV) {
            Ok(name) => Self::preset(&name).unwrap_or_else(|| {
                log::warn!("Unknown {PROFILE_ENV} value {name:?}, using LIMS");
                Self::lims()
            }),
            Err(_) => Self::lims(),
        }
    }

    /// Parse a profile from JSON; absent keys keep the LIMS defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ReportError> {
        let profile: Profile = serde_json::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ReportError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<(), ReportError> {
        if self.schema.batch_fields.is_empty() {
            return Err(ReportError::InvalidProfile("batchFields is empty".into()));
        }
        if self.schema.value_field.trim().is_empty() {
            return Err(ReportError::InvalidProfile("valueField is empty".into()));
        }
        if self.layout.stat_separator.is_empty() {
            return Err(ReportError::InvalidProfile("statSeparator is empty".into()));
        }
        Ok(())
    }
}
