use std::collections::BTreeSet;

use crate::analysis::aggregate::SummaryRecord;
use crate::analysis::columns::order_columns;
use crate::analysis::series::{build_cv_series, build_trend_series, cv_groups, ChartSeries};
use crate::analysis::summary::{
    build_column_trend, build_summary_cv_series, stat_columns, summary_cv, SummaryCv,
};
use crate::config::Profile;
use crate::data::filter::{numeric_analytes, summary_variables};
use crate::data::model::RowSet;
use crate::query::StatsQuery;

// ---------------------------------------------------------------------------
// Loaded data shape
// ---------------------------------------------------------------------------

/// How the loaded rows are charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataShape {
    /// One row per measurement (batch, analyte, result).
    Measurements,
    /// One row per batch with `<variable>_<stat>` columns.
    Summary,
}

impl DataShape {
    pub fn detect(rows: &RowSet, profile: &Profile) -> Self {
        let has = |name: &str| rows.column_names.iter().any(|c| c == name);
        if has(&profile.schema.analyte_field) && has(&profile.schema.value_field) {
            DataShape::Measurements
        } else if !stat_columns(&rows.column_names, &profile.layout).is_empty() {
            DataShape::Summary
        } else {
            DataShape::Measurements
        }
    }
}

// ---------------------------------------------------------------------------
// Derived charts
// ---------------------------------------------------------------------------

/// Everything derived from the rows for the current selection.
#[derive(Debug, Clone, Default)]
pub struct ChartSet {
    pub trend_title: String,
    pub trend: ChartSeries,
    pub cv: ChartSeries,
    /// Per-analyte statistics (measurement rows).
    pub summary: Vec<SummaryRecord>,
    /// Per-variable batch-level CV (summary rows).
    pub summary_cv: Vec<SummaryCv>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded rows (None until the user opens a file).
    pub rows: Option<RowSet>,

    /// Field vocabulary of the current source.
    pub profile: Profile,

    pub shape: DataShape,

    /// Chartable analytes or summary columns.
    pub variables: Vec<String>,

    /// Variable shown in the trend chart.
    pub selected: Option<String>,

    /// Table/export column order.
    pub columns: Vec<String>,

    /// Charts for the current selection (cached until rows/selection change).
    pub charts: ChartSet,

    /// Draft of the statistics request for the loaded item.
    pub query: StatsQuery,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_profile(Profile::default())
    }
}

impl AppState {
    pub fn with_profile(profile: Profile) -> Self {
        Self {
            rows: None,
            profile,
            shape: DataShape::Measurements,
            variables: Vec::new(),
            selected: None,
            columns: Vec::new(),
            charts: ChartSet::default(),
            query: StatsQuery::default(),
            status_message: None,
            loading: false,
        }
    }

    /// Ingest newly loaded rows, derive variables, columns and charts.
    pub fn set_rows(&mut self, rows: RowSet) {
        self.rows = Some(rows);
        self.status_message = None;
        self.loading = false;
        self.reindex();
    }

    /// Switch the field vocabulary and re-derive everything.
    pub fn set_profile(&mut self, profile: Profile) {
        log::info!("Switching to profile {}", profile.name);
        self.profile = profile;
        self.reindex();
    }

    /// Choose the variable shown in the trend chart.
    pub fn select_variable(&mut self, variable: String) {
        self.selected = Some(variable);
        self.rebuild_charts();
    }

    /// Batches present in the loaded rows, sorted.
    pub fn batches(&self) -> Vec<String> {
        let Some(rows) = &self.rows else {
            return Vec::new();
        };
        rows.rows
            .iter()
            .map(|r| self.profile.schema.batch_of(r))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn reindex(&mut self) {
        let Some(rows) = &self.rows else {
            self.variables.clear();
            self.columns.clear();
            self.charts = ChartSet::default();
            return;
        };

        self.shape = DataShape::detect(rows, &self.profile);
        self.variables = match self.shape {
            DataShape::Measurements => numeric_analytes(&rows.rows, &self.profile.schema),
            DataShape::Summary => summary_variables(&rows.column_names, &self.profile),
        };
        self.columns = order_columns(&rows.column_names, &self.profile.layout);

        // Keep the current selection when it is still chartable.
        let keep = self
            .selected
            .as_ref()
            .is_some_and(|s| self.variables.contains(s));
        if !keep {
            self.selected = self.variables.first().cloned();
        }

        let batches = self.batches();
        self.query.set_batches(batches);

        log::info!(
            "{} rows, {:?} shape, {} chartable variables",
            rows.len(),
            self.shape,
            self.variables.len()
        );
        self.rebuild_charts();
    }

    /// Recompute charts from the cached rows (no reload).
    pub fn rebuild_charts(&mut self) {
        let Some(rows) = &self.rows else {
            self.charts = ChartSet::default();
            return;
        };
        let schema = &self.profile.schema;
        let layout = &self.profile.layout;
        let selected = self.selected.as_deref();

        self.charts = match self.shape {
            DataShape::Measurements => ChartSet {
                trend_title: selected.map(|a| format!("{a} by batch")).unwrap_or_default(),
                trend: selected
                    .map(|a| build_trend_series(&rows.rows, schema, a))
                    .unwrap_or_default(),
                cv: build_cv_series(&rows.rows, schema),
                summary: cv_groups(&rows.rows, schema)
                    .iter()
                    .map(|g| g.to_record())
                    .collect(),
                summary_cv: Vec::new(),
            },
            DataShape::Summary => ChartSet {
                trend_title: selected.map(|c| format!("{c} by batch")).unwrap_or_default(),
                trend: selected
                    .map(|c| build_column_trend(&rows.rows, schema, c))
                    .unwrap_or_default(),
                cv: build_summary_cv_series(&rows.rows, &rows.column_names, layout),
                summary: Vec::new(),
                summary_cv: summary_cv(&rows.rows, &rows.column_names, layout),
            },
        };
        log::debug!(
            "charts: {} trend points, {} CV bars",
            self.charts.trend.len(),
            self.charts.cv.len()
        );
    }
}
