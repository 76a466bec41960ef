use crate::config::ColumnLayout;

/// A `<base><separator><suffix>` statistic column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatColumn {
    pub column: String,
    pub base: String,
    pub stat: String,
}

/// Split a column name into base variable and statistic suffix.
///
/// The longest matching suffix wins, and the base must be non-empty.
pub fn split_stat_column(name: &str, layout: &ColumnLayout) -> Option<StatColumn> {
    layout
        .stat_suffixes
        .iter()
        .filter_map(|suffix| {
            let tail = format!("{}{suffix}", layout.stat_separator);
            let base = name.strip_suffix(tail.as_str())?;
            (!base.is_empty()).then(|| StatColumn {
                column: name.to_string(),
                base: base.to_string(),
                stat: suffix.clone(),
            })
        })
        .max_by_key(|c| c.stat.len())
}

/// Deterministic display/export order of a row's columns.
///
/// Priority fields come first (in layout order, if present), then plain
/// columns in source order, then statistic columns grouped by base variable
/// and ordered by the layout's statistic precedence.
pub fn order_columns<S: AsRef<str>>(field_names: &[S], layout: &ColumnLayout) -> Vec<String> {
    let present = |name: &str| field_names.iter().any(|f| f.as_ref() == name);

    let mut ordered: Vec<String> = layout
        .priority_fields
        .iter()
        .filter(|p| present(p.as_str()))
        .cloned()
        .collect();

    let mut plain = Vec::new();
    let mut stats = Vec::new();
    for name in field_names.iter().map(|f| f.as_ref()) {
        if layout.priority_fields.iter().any(|p| p == name) || ordered_contains(&plain, name) {
            continue;
        }
        match split_stat_column(name, layout) {
            Some(col) => {
                if !stats.iter().any(|c: &StatColumn| c.column == name) {
                    stats.push(col);
                }
            }
            None => plain.push(name.to_string()),
        }
    }

    // Stable sort: ties keep their source order.
    stats.sort_by(|a, b| {
        a.base
            .cmp(&b.base)
            .then_with(|| stat_rank(&a.stat, layout).cmp(&stat_rank(&b.stat, layout)))
    });

    ordered.extend(plain);
    ordered.extend(stats.into_iter().map(|c| c.column));
    ordered
}

fn ordered_contains(list: &[String], name: &str) -> bool {
    list.iter().any(|n| n == name)
}

fn stat_rank(stat: &str, layout: &ColumnLayout) -> usize {
    layout
        .stat_suffixes
        .iter()
        .position(|s| s == stat)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english_layout() -> ColumnLayout {
        ColumnLayout {
            priority_fields: vec!["batch".into(), "item".into()],
            stat_suffixes: vec![
                "mean".into(),
                "std".into(),
                "25%".into(),
                "50%".into(),
                "75%".into(),
            ],
            stat_separator: "_".into(),
        }
    }

    #[test]
    fn test_priority_then_plain_then_stats() {
        let fields = [
            "temp_75%",
            "note",
            "temp_mean",
            "item",
            "flow_std",
            "batch",
            "flow_mean",
            "temp_std",
            "operator",
        ];
        let order = order_columns(&fields, &english_layout());
        assert_eq!(
            order,
            vec![
                "batch", "item", "note", "operator", "flow_mean", "flow_std", "temp_mean",
                "temp_std", "temp_75%",
            ]
        );
    }

    #[test]
    fn test_absent_priority_fields_are_skipped() {
        let order = order_columns(&["x_mean", "b"], &english_layout());
        assert_eq!(order, vec!["b", "x_mean"]);
    }

    #[test]
    fn test_base_may_contain_separator() {
        let col = split_stat_column("L23_ROOM_temp_50%", &english_layout()).unwrap();
        assert_eq!(col.base, "L23_ROOM_temp");
        assert_eq!(col.stat, "50%");
        assert!(split_stat_column("_mean", &english_layout()).is_none());
        assert!(split_stat_column("meanwhile", &english_layout()).is_none());
    }

    #[test]
    fn test_idempotent() {
        let fields = ["b_std", "a_75%", "zeta", "batch", "a_mean", "b_mean", "alpha"];
        let layout = english_layout();
        let once = order_columns(&fields, &layout);
        let twice = order_columns(&once, &layout);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_korean_defaults() {
        let fields = ["온도_표준편차", "배치번호", "온도_평균", "압력_50%", "품목코드"];
        let order = order_columns(&fields, &ColumnLayout::default());
        assert_eq!(
            order,
            vec!["배치번호", "품목코드", "압력_50%", "온도_평균", "온도_표준편차"]
        );
    }

    #[test]
    fn test_does_not_mutate_input() {
        let fields = vec!["b".to_string(), "a_mean".to_string()];
        let before = fields.clone();
        let _ = order_columns(&fields, &english_layout());
        assert_eq!(fields, before);
    }
}
