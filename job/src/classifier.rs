//! Anomaly labelling against the upper bound

use crate::record::Record;

/// Label every record: anomalous iff its execution time strictly exceeds its
/// upper bound. A record without bounds is never anomalous.
pub fn classify(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .map(|record| {
            let is_anomaly = is_anomalous(&record);
            Record { is_anomaly, ..record }
        })
        .collect()
}

pub fn is_anomalous(record: &Record) -> bool {
    record
        .upper_bound()
        .is_some_and(|upper| record.execution_time > upper)
}

pub fn anomaly_count(records: &[Record]) -> usize {
    records.iter().filter(|r| r.is_anomaly).count()
}
