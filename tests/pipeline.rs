use std::io::Write;

use labtrend::analysis::aggregate::aggregate;
use labtrend::analysis::columns::order_columns;
use labtrend::analysis::numeric::is_numeric;
use labtrend::analysis::series::{build_cv_series, build_trend_series, cv_axis_max, cv_groups};
use labtrend::analysis::stability::StabilityLabel;
use labtrend::color::stability_color;
use labtrend::config::{ColumnLayout, Profile, RowSchema};
use labtrend::data::loader::load_file;
use labtrend::data::model::{Row, RowSet};
use labtrend::export::{save_csv, write_summary_csv};
use labtrend::state::{AppState, DataShape};

fn lims(batch: &str, analyte: &str, value: &str) -> Row {
    Row::new()
        .with("CHARG", batch)
        .with("ANALYTE", analyte)
        .with("FINAL", value)
}

fn mixed_rows() -> Vec<Row> {
    vec![
        lims("B1", "pH", "7.01"),
        lims("B1", "pH", "7.05"),
        lims("B2", "pH", "7.20"),
        lims("B2", "Appearance", "PASS"),
        lims("B3", "Particle size", "90-110"),
        lims("B3", "pH", "-"),
        lims("B3", "Assay", "99.1"),
        lims("B1", "Assay", "98.7"),
        lims("B2", "Assay", ""),
    ]
}

#[test]
fn ph_trend_and_cv() {
    let rows = mixed_rows();
    let schema = RowSchema::lims();

    let trend = build_trend_series(&rows, &schema, "pH");
    assert_eq!(trend.keys, vec!["B1", "B2"]);
    assert!((trend.values[0] - 7.03).abs() < 1e-10);
    assert!((trend.values[1] - 7.20).abs() < 1e-10);

    let cv = build_cv_series(&rows, &schema);
    assert_eq!(cv.keys, vec!["Assay", "pH"]);
    let ph = cv.values[1];
    assert!(ph > 0.0 && ph < 5.0);
    assert_eq!(cv.colors[1], stability_color(StabilityLabel::Stable));
    assert!(cv_axis_max(&cv.values) >= ph);
}

#[test]
fn ph_results_with_a_pass_row() {
    let rows = vec![
        lims("B1", "pH", "7.01"),
        lims("B1", "pH", "7.05"),
        lims("B2", "pH", "7.20"),
        lims("B2", "pH", "PASS"),
    ];
    let schema = RowSchema::lims();

    let trend = build_trend_series(&rows, &schema, "pH");
    assert_eq!(trend.keys, vec!["B1", "B2"]);
    assert!((trend.values[0] - 7.03).abs() < 1e-10);
    assert!((trend.values[1] - 7.20).abs() < 1e-10);

    let groups = cv_groups(&rows, &schema);
    assert_eq!(groups.len(), 1);
    let ph = &groups[0];
    assert_eq!(ph.key, "pH");
    assert_eq!(ph.count, 3);
    assert!((ph.mean - 7.086_666_666_666_667).abs() < 1e-10);
    assert!((ph.cv - 1.413_450_536_342_127_5).abs() < 1e-9);
    assert_eq!(ph.stability(), StabilityLabel::Stable);

    let cv = build_cv_series(&rows, &schema);
    assert_eq!(cv.keys, vec!["pH"]);
    assert!((cv.values[0] - ph.cv).abs() < 1e-12);
}

#[test]
fn group_counts_cover_every_numeric_row() {
    let rows = mixed_rows();
    let schema = RowSchema::lims();
    let groups = aggregate(&rows, |r| schema.analyte_of(r), |r| schema.value_of(r));

    let numeric = rows.iter().filter(|r| is_numeric(schema.value_of(r))).count();
    let counted: usize = groups.values().map(|g| g.count).sum();
    assert_eq!(counted, numeric);
    assert_eq!(counted, 5);

    for g in groups.values() {
        assert!(g.min <= g.mean && g.mean <= g.max);
    }
}

#[test]
fn trend_keys_are_strictly_increasing() {
    let rows: Vec<Row> = ["B3", "B1", "B2", "B1", "B3"]
        .iter()
        .enumerate()
        .map(|(i, b)| lims(b, "pH", &format!("7.{i}")))
        .collect();
    let trend = build_trend_series(&rows, &RowSchema::lims(), "pH");
    assert!(trend.keys.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(trend.len(), 3);
}

#[test]
fn no_numeric_results_gives_empty_series() {
    let rows = vec![lims("B1", "Appearance", "PASS"), lims("B2", "Color", "N/A")];
    let schema = RowSchema::lims();
    assert!(build_cv_series(&rows, &schema).is_empty());
    assert!(build_trend_series(&rows, &schema, "Appearance").is_empty());
}

#[test]
fn column_order_is_stable_under_reordering() {
    let layout = ColumnLayout::default();
    let fields = ["temp_평균", "비고", "종료시간", "배치번호", "temp_표준편차", "처리일시"];
    let once = order_columns(&fields, &layout);
    assert_eq!(
        once,
        vec!["처리일시", "배치번호", "종료시간", "비고", "temp_평균", "temp_표준편차"]
    );
    assert_eq!(order_columns(&once, &layout), once);
}

#[test]
fn json_file_drives_the_viewer_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.json");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        r#"{{"success": true, "data": [
            {{"CHARG": "B1", "ANALYTE": "pH", "FINAL": "7.01"}},
            {{"CHARG": "B1", "ANALYTE": "pH", "FINAL": "7.05"}},
            {{"CHARG": "B2", "ANALYTE": "pH", "FINAL": 7.2}}
        ]}}"#
    )
    .unwrap();
    drop(file);

    let rows = load_file(&path).unwrap();
    let mut state = AppState::with_profile(Profile::lims());
    state.set_rows(rows);

    assert_eq!(state.shape, DataShape::Measurements);
    assert_eq!(state.selected.as_deref(), Some("pH"));
    assert_eq!(state.charts.trend.keys, vec!["B1", "B2"]);
    assert_eq!(state.charts.summary[0].count, 3);

    let out = dir.path().join("summary.csv");
    let summary = &state.charts.summary;
    save_csv(&out, summary.len(), |w| write_summary_csv(w, summary)).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("pH,3,7.087"));
}

#[test]
fn failed_envelope_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.json");
    std::fs::write(&path, r#"{"success": false, "message": "no rows"}"#).unwrap();
    let err = load_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("no rows"));
}

#[test]
fn csv_summary_rows_chart_batch_cv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.csv");
    std::fs::write(
        &path,
        "\u{feff}배치번호,temp_평균,temp_표준편차\nB1,20,1\nB2,30,3\n",
    )
    .unwrap();

    let set: RowSet = load_file(&path).unwrap();
    let mut state = AppState::with_profile(Profile::pims_stats());
    state.set_rows(set);

    assert_eq!(state.shape, DataShape::Summary);
    assert_eq!(state.charts.summary_cv.len(), 1);
    assert!((state.charts.summary_cv[0].cv - 8.0).abs() < 1e-10);
    assert_eq!(state.charts.summary_cv[0].stability, StabilityLabel::Moderate);
}
