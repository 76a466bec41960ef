use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::config::Profile;
use crate::export;
use crate::query::{TimeRange, TimeSelection};
use crate::state::{AppState, DataShape};

// ---------------------------------------------------------------------------
// Left side panel – source, variable and query widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Source");
    ui.separator();

    let current = state.profile.name.clone();
    egui::ComboBox::from_id_salt("profile")
        .selected_text(current.as_str())
        .show_ui(ui, |ui: &mut Ui| {
            for preset in [Profile::lims(), Profile::pims_stats()] {
                if ui
                    .selectable_label(current == preset.name, preset.name.as_str())
                    .clicked()
                {
                    state.set_profile(preset);
                }
            }
        });
    if ui.small_button("Load profile…").clicked() {
        open_profile_dialog(state);
    }

    ui.add_space(8.0);
    ui.heading("Variable");
    ui.separator();

    if state.rows.is_none() {
        ui.label("No data loaded.");
        return;
    }
    if state.variables.is_empty() {
        ui.label("No numeric results to chart.");
    }

    let variables = state.variables.clone();
    let selected = state.selected.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("variable")
        .selected_text(selected.as_str())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for var in &variables {
                if ui.selectable_label(selected == *var, var.as_str()).clicked() {
                    state.select_variable(var.clone());
                }
            }
        });

    ui.add_space(8.0);
    ui.heading("Query");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| query_form(ui, state));
}

fn query_form(ui: &mut Ui, state: &mut AppState) {
    egui::Grid::new("query_fields").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Item code");
        ui.text_edit_singleline(&mut state.query.item_code);
        ui.end_row();
        ui.label("Process");
        ui.text_edit_singleline(&mut state.query.process_code);
        ui.end_row();
    });

    let batches = state.query.batches.clone();
    ui.label(format!("{} batches: {}", batches.len(), batches.join(", ")));

    let mut individual = matches!(state.query.time, TimeSelection::Individual(_));
    ui.horizontal(|ui: &mut Ui| {
        if ui.radio_value(&mut individual, false, "Common").changed() {
            state.query.time.merge();
        }
        let many = batches.len() > 1;
        if ui
            .add_enabled(many, egui::RadioButton::new(individual, "Per batch"))
            .clicked()
            && !individual
        {
            state.query.time.split(&batches);
        }
    });

    match &mut state.query.time {
        TimeSelection::Common(range) => range_editor(ui, "common", range),
        TimeSelection::Individual(ranges) => {
            for (batch, range) in ranges.iter_mut() {
                ui.label(RichText::new(batch.as_str()).strong());
                range_editor(ui, batch, range);
            }
        }
    }

    ui.add_space(4.0);
    if ui.button("Copy request JSON").clicked() {
        match state.query.to_payload() {
            Ok(payload) => {
                ui.ctx().copy_text(payload.to_string());
                state.status_message = None;
            }
            Err(e) => {
                log::warn!("Query is incomplete: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

/// Start/end date pickers; start is the beginning of its day, end the last minute.
fn range_editor(ui: &mut Ui, salt: &str, range: &mut TimeRange) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("From");
        edit_bound(ui, &format!("{salt}_start"), &mut range.start, NaiveTime::MIN);
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("To");
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
        edit_bound(ui, &format!("{salt}_end"), &mut range.end, end_of_day);
    });
}

fn edit_bound(ui: &mut Ui, salt: &str, bound: &mut Option<NaiveDateTime>, time: NaiveTime) {
    match bound {
        Some(t) => {
            let mut date: NaiveDate = t.date();
            ui.add(DatePickerButton::new(&mut date).id_salt(salt));
            *t = date.and_time(t.time());
            if ui.small_button("✕").clicked() {
                *bound = None;
            }
        }
        None => {
            if ui.small_button("Set").clicked() {
                *bound = Some(Local::now().date_naive().and_time(time));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Export summary CSV…").clicked() {
                export_summary_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export rows CSV…").clicked() {
                export_rows_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(rows) = &state.rows {
            ui.label(format!(
                "{} rows, {} variables ({})",
                rows.len(),
                state.variables.len(),
                state.profile.name
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open query result")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_file(&path) {
            Ok(rows) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    rows.len(),
                    rows.column_names
                );
                state.set_rows(rows);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}

fn open_profile_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Load profile")
        .add_filter("JSON", &["json"])
        .pick_file()
    else {
        return;
    };
    match Profile::from_json_file(&path) {
        Ok(profile) => state.set_profile(profile),
        Err(e) => {
            log::error!("Failed to load profile {}: {e}", path.display());
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}

fn save_dialog(title: &str, prefix: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("CSV", &["csv"])
        .set_file_name(export::default_file_name(prefix, Local::now().naive_local()))
        .save_file()
}

fn export_summary_dialog(state: &mut AppState) {
    let prefix = format!("{}_CV", state.profile.name);
    let Some(path) = save_dialog("Export summary", &prefix) else {
        return;
    };
    let charts = &state.charts;
    let result = match state.shape {
        DataShape::Measurements => export::save_csv(&path, charts.summary.len(), |out| {
            export::write_summary_csv(out, &charts.summary)
        }),
        DataShape::Summary => export::save_csv(&path, charts.summary_cv.len(), |out| {
            export::write_summary_cv_csv(out, &charts.summary_cv)
        }),
    };
    report_export(state, result);
}

fn export_rows_dialog(state: &mut AppState) {
    let prefix = format!("{}_rows", state.profile.name);
    let Some(path) = save_dialog("Export rows", &prefix) else {
        return;
    };
    let rows = state
        .rows
        .as_ref()
        .map(|r| r.rows.as_slice())
        .unwrap_or_default();
    let columns = &state.columns;
    let result = export::save_csv(&path, rows.len(), |out| {
        export::write_rows_csv(out, rows, columns)
    });
    report_export(state, result);
}

fn report_export(state: &mut AppState, result: Result<(), crate::error::ReportError>) {
    match result {
        Ok(()) => state.status_message = None,
        Err(e) => {
            log::error!("Export failed: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}
