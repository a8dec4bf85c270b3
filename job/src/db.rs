//! SQLite storage for the analytics dataset

use crate::error::{Result, ValidationError};
use crate::record::{parse_timestamp, Record, WindowStats};
use rusqlite::{params, Connection};
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const STAGING_TABLE: &str = "
DROP TABLE IF EXISTS test_analytics_staging;
CREATE TABLE test_analytics_staging (
    Datetime TEXT NOT NULL,
    ProcessName TEXT NOT NULL,
    ExecutionTime REAL NOT NULL,
    Baseline REAL,
    StdDev REAL,
    UpperBounds REAL,
    LowerBounds REAL,
    IsAnomaly INTEGER NOT NULL DEFAULT 0
);";

/// Source and sink of the stored dataset.
pub trait RecordStore {
    /// Every stored record, in stored order.
    fn load(&self) -> Result<Vec<Record>>;

    /// Replace the whole dataset with `records`. Either every record is
    /// written or the previous dataset is left as it was.
    fn replace_all(&mut self, records: &[Record]) -> Result<()>;
}

pub struct Database {
    conn: Connection,
}

/// Row as read back, before validation.
struct StoredRow {
    datetime: Option<String>,
    process_name: Option<String>,
    execution_time: Option<f64>,
    baseline: Option<f64>,
    std_dev: Option<f64>,
    upper_bound: Option<f64>,
    lower_bound: Option<f64>,
    is_anomaly: Option<i64>,
}

impl Database {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Ok(Self { conn: Connection::open_in_memory()? })
    }

    pub fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(include_str!("../schema.sql"))
    }

    pub fn count(&self) -> rusqlite::Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM test_analytics", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<StoredRow> {
        Ok(StoredRow {
            datetime: row.get(0)?,
            process_name: row.get(1)?,
            execution_time: row.get(2)?,
            baseline: row.get(3)?,
            std_dev: row.get(4)?,
            upper_bound: row.get(5)?,
            lower_bound: row.get(6)?,
            is_anomaly: row.get(7)?,
        })
    }
}

impl StoredRow {
    fn into_record(self, index: usize) -> std::result::Result<Record, ValidationError> {
        let raw = self
            .datetime
            .ok_or(ValidationError::MissingField { index, field: "Datetime" })?;
        let datetime = parse_timestamp(&raw).ok_or_else(|| ValidationError::InvalidField {
            index,
            field: "Datetime",
            reason: format!("unparseable timestamp {raw:?}"),
        })?;
        let process_name = self
            .process_name
            .ok_or(ValidationError::MissingField { index, field: "ProcessName" })?;
        let execution_time = self
            .execution_time
            .ok_or(ValidationError::MissingField { index, field: "ExecutionTime" })?;

        let stats = match (self.baseline, self.std_dev, self.upper_bound, self.lower_bound) {
            (Some(baseline), Some(std_dev), Some(upper_bound), Some(lower_bound)) => Some(WindowStats {
                baseline,
                std_dev,
                upper_bound,
                lower_bound,
            }),
            _ => None,
        };

        Ok(Record {
            datetime,
            process_name,
            execution_time,
            stats,
            is_anomaly: self.is_anomaly.unwrap_or(0) != 0,
        })
    }
}

impl RecordStore for Database {
    fn load(&self) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT Datetime, ProcessName, ExecutionTime, Baseline, StdDev, UpperBounds, LowerBounds, IsAnomaly
             FROM test_analytics ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], Self::map_row)?;

        let mut records = Vec::new();
        for (index, row) in rows.enumerate() {
            records.push(row?.into_record(index)?);
        }
        Ok(records)
    }

    fn replace_all(&mut self, records: &[Record]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(STAGING_TABLE)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO test_analytics_staging
                 (Datetime, ProcessName, ExecutionTime, Baseline, StdDev, UpperBounds, LowerBounds, IsAnomaly)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for record in records {
                let stats = record.stats;
                stmt.execute(params![
                    record.datetime.format(TIMESTAMP_FORMAT).to_string(),
                    record.process_name,
                    record.execution_time,
                    stats.map(|s| s.baseline),
                    stats.map(|s| s.std_dev),
                    stats.map(|s| s.upper_bound),
                    stats.map(|s| s.lower_bound),
                    i32::from(record.is_anomaly),
                ])?;
            }
        }
        tx.execute_batch(
            "DROP TABLE IF EXISTS test_analytics;
             ALTER TABLE test_analytics_staging RENAME TO test_analytics;",
        )?;
        // Dropping the live table took its index with it.
        tx.execute_batch(include_str!("../schema.sql"))?;
        tx.commit()?;
        Ok(())
    }
}
