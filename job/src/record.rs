//! Execution-time records and snapshot parsing

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Rolling-window statistics attached to a record once it has enough history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowStats {
    #[serde(rename = "Baseline")]
    pub baseline: f64,
    #[serde(rename = "StdDev")]
    pub std_dev: f64,
    #[serde(rename = "UpperBounds")]
    pub upper_bound: f64,
    #[serde(rename = "LowerBounds")]
    pub lower_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "Datetime")]
    pub datetime: NaiveDateTime,
    #[serde(rename = "ProcessName")]
    pub process_name: String,
    #[serde(rename = "ExecutionTime")]
    pub execution_time: f64,
    /// `None` means not enough history, never zero.
    #[serde(flatten)]
    pub stats: Option<WindowStats>,
    #[serde(rename = "IsAnomaly", serialize_with = "serialize_flag")]
    pub is_anomaly: bool,
}

impl Record {
    pub fn new(datetime: NaiveDateTime, process_name: impl Into<String>, execution_time: f64) -> Self {
        Self {
            datetime,
            process_name: process_name.into(),
            execution_time,
            stats: None,
            is_anomaly: false,
        }
    }

    pub fn with_stats(self, stats: Option<WindowStats>) -> Self {
        Self { stats, ..self }
    }

    pub fn upper_bound(&self) -> Option<f64> {
        self.stats.map(|s| s.upper_bound)
    }
}

fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

/// Normalize an ISO-8601 timestamp to naive UTC.
///
/// Offsets are converted to UTC; naive inputs are taken as already being UTC.
/// A bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a whole feed snapshot. Any bad item fails the snapshot; no partial
/// result is returned.
pub fn parse_snapshot(items: &[Value]) -> Result<Vec<Record>, ValidationError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let obj = item.as_object().ok_or(ValidationError::NotAnObject { index })?;
            parse_item(index, obj)
        })
        .collect()
}

fn parse_item(index: usize, obj: &Map<String, Value>) -> Result<Record, ValidationError> {
    let raw_datetime = required(index, obj, "Datetime")?
        .as_str()
        .ok_or_else(|| invalid(index, "Datetime", "expected a string"))?;
    let datetime = parse_timestamp(raw_datetime)
        .ok_or_else(|| invalid(index, "Datetime", &format!("unparseable timestamp {raw_datetime:?}")))?;

    let process_name = required(index, obj, "ProcessName")?
        .as_str()
        .ok_or_else(|| invalid(index, "ProcessName", "expected a string"))?;

    let execution_time = required(index, obj, "ExecutionTime")?
        .as_f64()
        .ok_or_else(|| invalid(index, "ExecutionTime", "expected a number"))?;

    Ok(Record::new(datetime, process_name, execution_time))
}

fn required<'a>(index: usize, obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField { index, field }),
        Some(value) => Ok(value),
    }
}

fn invalid(index: usize, field: &'static str, reason: &str) -> ValidationError {
    ValidationError::InvalidField {
        index,
        field,
        reason: reason.to_string(),
    }
}
