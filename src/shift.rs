// 🌗 Shift Classifier
// Assigns every receipt to a (shift date, day/night) pair. Receipts rung up
// after midnight but before the night cutoff close out the previous day's
// night shift.

use crate::config::ReportConfig;
use crate::error::ReportError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display pattern for the spreadsheet-friendly date column
pub const EXCEL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// SHIFT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Day,
    Night,
}

impl Shift {
    pub fn label(&self) -> &'static str {
        match self {
            Shift::Day => "day",
            Shift::Night => "night",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SHIFT KEY
// ============================================================================

/// Grouping key for the report: one row per distinct key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftKey {
    pub shift_date: NaiveDate,
    pub shift: Shift,
}

impl ShiftKey {
    pub fn new(shift_date: NaiveDate, shift: Shift) -> Self {
        ShiftKey { shift_date, shift }
    }

    /// Shift date at midnight in the spreadsheet pattern, e.g. "2023-02-09 00:00:00"
    pub fn excel_date(&self) -> String {
        self.shift_date
            .and_time(NaiveTime::MIN)
            .format(EXCEL_DATE_FORMAT)
            .to_string()
    }
}

impl fmt::Display for ShiftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} # {}", self.shift_date, self.shift)
    }
}

// ============================================================================
// TIMESTAMP PARSING
// ============================================================================

const OFFSET_FORMATS: [&str; 4] = [
    // "+0100" and hour-only "+01"
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    // no seconds
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%#z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a receipt timestamp into its wall-clock date and time.
///
/// Offset-carrying timestamps keep the wall clock of their own offset; naive
/// timestamps are taken as written. A bare date reads as midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ReportError> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Ok(dt.naive_local());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(ReportError::MalformedTimestamp {
        index: 0,
        value: value.to_string(),
    })
}

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftClassifier {
    night_cutoff_hour: u32,
    day_shift_cutoff_hour: u32,
}

impl ShiftClassifier {
    pub fn new(night_cutoff_hour: u32, day_shift_cutoff_hour: u32) -> Self {
        ShiftClassifier {
            night_cutoff_hour,
            day_shift_cutoff_hour,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.night_cutoff_hour, config.day_shift_cutoff_hour)
    }

    /// Classify an already parsed wall-clock time.
    ///
    /// Fails only when the night tail would step before the first
    /// representable date.
    pub fn classify_datetime(&self, dt: NaiveDateTime) -> Result<ShiftKey, ReportError> {
        let hour = dt.hour();
        let date = dt.date();

        if hour < self.night_cutoff_hour {
            // Tail of the previous day's night shift
            let previous = date.pred_opt().ok_or_else(|| ReportError::MalformedTimestamp {
                index: 0,
                value: dt.to_string(),
            })?;
            Ok(ShiftKey::new(previous, Shift::Night))
        } else if hour < self.day_shift_cutoff_hour {
            Ok(ShiftKey::new(date, Shift::Day))
        } else {
            Ok(ShiftKey::new(date, Shift::Night))
        }
    }

    pub fn classify(&self, timestamp: &str) -> Result<ShiftKey, ReportError> {
        let dt = parse_timestamp(timestamp)?;

        self.classify_datetime(dt)
            .map_err(|_| ReportError::MalformedTimestamp {
                index: 0,
                value: timestamp.to_string(),
            })
    }
}

impl Default for ShiftClassifier {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
