use std::fmt;

use serde::Serialize;

/// CV (%) below which a group is considered stable.
pub const STABLE_CV_LIMIT: f64 = 5.0;

/// CV (%) below which a group is considered moderately variable.
pub const MODERATE_CV_LIMIT: f64 = 15.0;

/// Qualitative variability class used to colour CV charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StabilityLabel {
    Stable,
    Moderate,
    Risk,
    InsufficientData,
}

/// Map a CV percentage and its sample count to a stability label.
pub fn classify(cv: f64, count: usize) -> StabilityLabel {
    if count < 2 {
        StabilityLabel::InsufficientData
    } else if cv < STABLE_CV_LIMIT {
        StabilityLabel::Stable
    } else if cv < MODERATE_CV_LIMIT {
        StabilityLabel::Moderate
    } else {
        StabilityLabel::Risk
    }
}

impl StabilityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityLabel::Stable => "stable",
            StabilityLabel::Moderate => "moderate",
            StabilityLabel::Risk => "risk",
            StabilityLabel::InsufficientData => "insufficient-data",
        }
    }
}

impl fmt::Display for StabilityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sample_is_insufficient() {
        assert_eq!(classify(0.0, 1), StabilityLabel::InsufficientData);
        assert_eq!(classify(40.0, 0), StabilityLabel::InsufficientData);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(classify(0.0, 3), StabilityLabel::Stable);
        assert_eq!(classify(4.99, 3), StabilityLabel::Stable);
        assert_eq!(classify(5.0, 3), StabilityLabel::Moderate);
        assert_eq!(classify(14.99, 2), StabilityLabel::Moderate);
        assert_eq!(classify(15.0, 2), StabilityLabel::Risk);
        assert_eq!(classify(120.0, 10), StabilityLabel::Risk);
    }

    #[test]
    fn test_display() {
        assert_eq!(StabilityLabel::InsufficientData.to_string(), "insufficient-data");
        assert_eq!(StabilityLabel::Risk.to_string(), "risk");
    }

    #[test]
    fn test_serde_matches_display() {
        for label in [
            StabilityLabel::Stable,
            StabilityLabel::Moderate,
            StabilityLabel::Risk,
            StabilityLabel::InsufficientData,
        ] {
            assert_eq!(serde_json::to_value(label).unwrap(), label.as_str());
        }
    }
}
