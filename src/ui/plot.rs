use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points};

use crate::analysis::series::{cv_axis_max, trend_axis_range, ChartSeries};
use crate::analysis::stability::{MODERATE_CV_LIMIT, STABLE_CV_LIMIT};
use crate::color::{legend_entries, outline_color, stability_color, TREND_COLOR};
use crate::state::{AppState, DataShape};

const CHART_HEIGHT: f32 = 260.0;
/// Rows rendered in the raw table; export writes all of them.
const MAX_TABLE_ROWS: usize = 500;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the trend chart, the CV chart and the summary table.
pub fn charts_view(ui: &mut Ui, state: &AppState) {
    if state.rows.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a query result to view trends  (File → Open…)");
        });
        return;
    }

    let charts = &state.charts;
    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.heading(charts.trend_title.as_str());
        trend_chart(ui, &charts.trend);

        ui.add_space(8.0);
        ui.heading("CV by variable");
        cv_legend(ui);
        cv_chart(ui, &charts.cv);

        ui.add_space(8.0);
        ui.heading("Summary");
        match state.shape {
            DataShape::Measurements => summary_table(ui, state),
            DataShape::Summary => summary_cv_table(ui, state),
        }

        ui.add_space(8.0);
        egui::CollapsingHeader::new("Rows")
            .default_open(false)
            .show(ui, |ui: &mut Ui| rows_table(ui, state));
    });
}

/// Tick labels at integer positions show the category key.
fn category_formatter(keys: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
            return String::new();
        }
        keys.get(idx as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

fn trend_chart(ui: &mut Ui, series: &ChartSeries) {
    if series.is_empty() {
        ui.label("No numeric results for this variable.");
        return;
    }

    let mut plot = Plot::new("trend_plot")
        .height(CHART_HEIGHT)
        .x_axis_label("Batch")
        .y_axis_label("Mean")
        .x_axis_formatter(category_formatter(series.keys.clone()))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);
    if let Some((lo, hi)) = trend_axis_range(&series.values) {
        plot = plot.include_y(lo).include_y(hi);
    }

    let points: Vec<[f64; 2]> = series
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| [i as f64, v])
        .collect();

    plot.show(ui, |plot_ui| {
        plot_ui.line(
            Line::new(PlotPoints::from(points.clone()))
                .color(TREND_COLOR)
                .width(2.0),
        );
        plot_ui.points(Points::new(PlotPoints::from(points)).color(TREND_COLOR).radius(3.5));
    });
}

// ---------------------------------------------------------------------------
// CV
// ---------------------------------------------------------------------------

fn cv_legend(ui: &mut Ui) {
    ui.horizontal(|ui: &mut Ui| {
        for (label, color) in legend_entries() {
            ui.label(RichText::new("■").color(color));
            ui.label(label);
        }
        ui.weak(format!("(limits {STABLE_CV_LIMIT}% / {MODERATE_CV_LIMIT}%)"));
    });
}

fn cv_chart(ui: &mut Ui, series: &ChartSeries) {
    if series.is_empty() {
        ui.label("No variable has enough numeric results for a CV.");
        return;
    }

    let bars: Vec<Bar> = series
        .points()
        .enumerate()
        .map(|(i, (key, cv, color))| {
            Bar::new(i as f64, cv)
                .name(key)
                .width(0.6)
                .fill(color)
                .stroke(Stroke::new(1.0, outline_color(color)))
        })
        .collect();

    Plot::new("cv_plot")
        .height(CHART_HEIGHT)
        .y_axis_label("CV (%)")
        .x_axis_formatter(category_formatter(series.keys.clone()))
        .include_y(0.0)
        .include_y(cv_axis_max(&series.values))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("CV"));
        });
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn summary_table(ui: &mut Ui, state: &AppState) {
    egui::Grid::new("summary_table")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for header in ["Variable", "n", "Mean", "Std dev", "CV %", "Min", "Max", "Stability"] {
                ui.strong(header);
            }
            ui.end_row();
            let colors = &state.charts.cv.colors;
            for (i, r) in state.charts.summary.iter().enumerate() {
                ui.label(r.key.as_str());
                ui.label(r.count.to_string());
                ui.label(r.mean.as_str());
                ui.label(r.std_dev.as_str());
                ui.label(r.cv.as_str());
                ui.label(r.min.as_str());
                ui.label(r.max.as_str());
                let color = colors.get(i).copied().unwrap_or(Color32::GRAY);
                ui.label(RichText::new(r.stability.as_str()).color(color));
                ui.end_row();
            }
        });
}

fn summary_cv_table(ui: &mut Ui, state: &AppState) {
    egui::Grid::new("summary_cv_table")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for header in ["Variable", "Batches", "CV %", "Stability"] {
                ui.strong(header);
            }
            ui.end_row();
            for item in &state.charts.summary_cv {
                ui.label(item.variable.as_str());
                ui.label(item.batches.to_string());
                ui.label(format!("{:.2}", item.cv));
                ui.label(
                    RichText::new(item.stability.to_string()).color(stability_color(item.stability)),
                );
                ui.end_row();
            }
        });
}

fn rows_table(ui: &mut Ui, state: &AppState) {
    let Some(set) = &state.rows else {
        return;
    };
    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        egui::Grid::new("rows_table")
            .striped(true)
            .show(ui, |ui: &mut Ui| {
                for column in &state.columns {
                    ui.strong(column.as_str());
                }
                ui.end_row();
                for row in set.rows.iter().take(MAX_TABLE_ROWS) {
                    for column in &state.columns {
                        ui.label(row.get(column).map(|v| v.to_string()).unwrap_or_default());
                    }
                    ui.end_row();
                }
            });
    });
    if set.len() > MAX_TABLE_ROWS {
        ui.weak(format!("showing {MAX_TABLE_ROWS} of {} rows", set.len()));
    }
}
