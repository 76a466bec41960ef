//! Statistics query drafts and their request payload.
//!
//! A query targets one item, one process and one or more batches, with a
//! time window that is either shared by all batches ("common") or set per
//! batch ("individual").

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::error::ReportError;

/// Wire format of `datetime-local` values.
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

// ---------------------------------------------------------------------------
// Time window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(default, with = "wire_time")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, with = "wire_time")]
    pub end: Option<NaiveDateTime>,
}

impl TimeRange {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimeSelection {
    Common(TimeRange),
    Individual(BTreeMap<String, TimeRange>),
}

impl Default for TimeSelection {
    fn default() -> Self {
        TimeSelection::Common(TimeRange::default())
    }
}

impl TimeSelection {
    pub fn mode(&self) -> &'static str {
        match self {
            TimeSelection::Common(_) => "common",
            TimeSelection::Individual(_) => "individual",
        }
    }

    /// Switch to per-batch windows; the shared window is discarded.
    pub fn split<S: AsRef<str>>(&mut self, batches: &[S]) {
        let ranges = batches
            .iter()
            .map(|b| b.as_ref().trim())
            .filter(|b| !b.is_empty())
            .map(|b| (b.to_string(), TimeRange::default()))
            .collect();
        *self = TimeSelection::Individual(ranges);
    }

    /// Back to a single shared window, starting empty.
    pub fn merge(&mut self) {
        *self = TimeSelection::default();
    }

    /// Bring the selection in line with the currently selected batches.
    ///
    /// With fewer than two batches there is nothing to set per batch, so an
    /// individual selection collapses to a common one (a lone batch keeps its
    /// window). Otherwise individual windows are kept for batches that are
    /// still selected, added empty for new ones and dropped for the rest.
    pub fn reconcile<S: AsRef<str>>(&mut self, batches: &[S]) {
        let TimeSelection::Individual(ranges) = &mut *self else {
            return;
        };
        let selected: Vec<&str> = batches
            .iter()
            .map(|b| b.as_ref().trim())
            .filter(|b| !b.is_empty())
            .collect();

        if selected.len() < 2 {
            let kept = selected
                .first()
                .and_then(|b| ranges.get(*b).copied())
                .unwrap_or_default();
            *self = TimeSelection::Common(kept);
            return;
        }

        ranges.retain(|batch, _| selected.contains(&batch.as_str()));
        for batch in selected {
            ranges.entry(batch.to_string()).or_default();
        }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsQuery {
    pub item_code: String,
    pub batches: Vec<String>,
    pub process_code: String,
    pub time: TimeSelection,
}

impl StatsQuery {
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.item_code.trim().is_empty() {
            return Err(ReportError::MissingField("item code"));
        }
        if self.selected_batches().is_empty() {
            return Err(ReportError::MissingField("batch"));
        }
        if self.process_code.trim().is_empty() {
            return Err(ReportError::MissingField("process code"));
        }
        Ok(())
    }

    pub fn selected_batches(&self) -> Vec<&str> {
        self.batches
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
            .collect()
    }

    /// Select batches and reconcile the time selection with them.
    pub fn set_batches(&mut self, batches: Vec<String>) {
        self.batches = batches;
        self.time.reconcile(&self.batches);
    }

    /// JSON body of a statistics request.
    pub fn to_payload(&self) -> Result<JsonValue, ReportError> {
        self.validate()?;
        let mut payload = json!({
            "itemcode": self.item_code.trim(),
            "batch_no": self.selected_batches().join(","),
            "proc_code": self.process_code.trim(),
            "mode": self.time.mode(),
        });
        match &self.time {
            TimeSelection::Common(range) => {
                payload["start_time"] = json!(format_time(range.start));
                payload["end_time"] = json!(format_time(range.end));
            }
            TimeSelection::Individual(ranges) => {
                payload["batch_time_ranges"] = serde_json::to_value(ranges)?;
            }
        }
        Ok(payload)
    }
}

fn format_time(t: Option<NaiveDateTime>) -> String {
    t.map(|t| t.format(WIRE_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

mod wire_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::WIRE_TIME_FORMAT;

    pub fn serialize<S: Serializer>(t: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&t.format(WIRE_TIME_FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(s) if !s.trim().is_empty() => {
                NaiveDateTime::parse_from_str(s.trim(), WIRE_TIME_FORMAT)
                    .map(Some)
                    .map_err(serde::de::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn query(batches: &[&str]) -> StatsQuery {
        StatsQuery {
            item_code: "ITEM01".into(),
            batches: batches.iter().map(|b| b.to_string()).collect(),
            process_code: "P10".into(),
            time: TimeSelection::default(),
        }
    }

    #[test]
    fn test_validation() {
        assert!(query(&["B1"]).validate().is_ok());
        assert!(matches!(
            query(&[" "]).validate(),
            Err(ReportError::MissingField("batch"))
        ));
        let mut q = query(&["B1"]);
        q.item_code.clear();
        assert!(matches!(q.validate(), Err(ReportError::MissingField("item code"))));
    }

    #[test]
    fn test_common_payload() {
        let mut q = query(&["B1", "B2"]);
        q.time = TimeSelection::Common(TimeRange {
            start: Some(at(1, 8)),
            end: None,
        });
        let payload = q.to_payload().unwrap();
        assert_eq!(payload["batch_no"], "B1,B2");
        assert_eq!(payload["mode"], "common");
        assert_eq!(payload["start_time"], "2024-03-01T08:00");
        assert_eq!(payload["end_time"], "");
        assert!(payload.get("batch_time_ranges").is_none());
    }

    #[test]
    fn test_individual_payload() {
        let mut q = query(&["B1", "B2"]);
        q.time.split(&q.batches.clone());
        if let TimeSelection::Individual(ranges) = &mut q.time {
            ranges.insert(
                "B1".into(),
                TimeRange {
                    start: Some(at(1, 8)),
                    end: Some(at(2, 8)),
                },
            );
        }
        let payload = q.to_payload().unwrap();
        assert_eq!(payload["mode"], "individual");
        assert_eq!(payload["batch_time_ranges"]["B1"]["start"], "2024-03-01T08:00");
        assert_eq!(payload["batch_time_ranges"]["B2"]["end"], JsonValue::Null);
        assert!(payload.get("start_time").is_none());
    }

    #[test]
    fn test_reconcile_keeps_and_drops_batches() {
        let mut q = query(&["B1", "B2"]);
        q.time.split(&q.batches.clone());
        if let TimeSelection::Individual(ranges) = &mut q.time {
            ranges.get_mut("B1").unwrap().start = Some(at(5, 6));
        }
        q.set_batches(vec!["B1".into(), "B3".into()]);
        let TimeSelection::Individual(ranges) = &q.time else {
            panic!("expected individual mode");
        };
        let keys: Vec<&str> = ranges.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["B1", "B3"]);
        assert_eq!(ranges["B1"].start, Some(at(5, 6)));
        assert!(ranges["B3"].is_empty());
    }

    #[test]
    fn test_reconcile_collapses_to_common() {
        let mut q = query(&["B1", "B2"]);
        q.time.split(&q.batches.clone());
        if let TimeSelection::Individual(ranges) = &mut q.time {
            ranges.get_mut("B2").unwrap().end = Some(at(9, 18));
        }
        q.set_batches(vec!["B2".into()]);
        assert_eq!(
            q.time,
            TimeSelection::Common(TimeRange {
                start: None,
                end: Some(at(9, 18)),
            })
        );
    }

    #[test]
    fn test_time_range_round_trip_through_json() {
        let range: TimeRange =
            serde_json::from_str(r#"{"start": "2024-03-01T08:00", "end": ""}"#).unwrap();
        assert_eq!(range.start, Some(at(1, 8)));
        assert_eq!(range.end, None);
    }
}
