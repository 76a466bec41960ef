//! Batch trend and CV statistics for LIMS results and process summaries.
//!
//! ```text
//! data::loader ──► RowSet ──► state::AppState ──► ui
//!                               │
//!                               ▼
//!                 analysis (numeric → aggregate → stability
//!                           → series / summary, columns)
//! ```

pub mod analysis;
pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod query;
pub mod state;
pub mod ui;
