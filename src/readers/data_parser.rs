use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use crate::error::{MonitorError, Result};
use crate::models::{DataTable, Series};
use crate::readers::csv_table::RawTable;
use crate::readers::meta_parser::{null_if_na, parse_float};
use crate::utils::constants::DATETIME_COLUMN;

/// What to do with negative PM2.5 readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeValues {
    /// Lift to zero
    #[default]
    Zero,
    /// Treat as missing
    Null,
    /// Leave untouched
    Keep,
}

/// Turns a raw `*_data.csv` table into a typed [`DataTable`].
pub struct DataParser {
    negative_values: NegativeValues,
}

impl DataParser {
    pub fn new() -> Self {
        Self {
            negative_values: NegativeValues::Zero,
        }
    }

    pub fn with_negative_values(negative_values: NegativeValues) -> Self {
        Self { negative_values }
    }

    pub fn parse(&self, table: &RawTable) -> Result<DataTable> {
        let mut columns = table.columns();

        let datetime = match columns.next() {
            Some((name, cells)) if name == DATETIME_COLUMN => cells
                .iter()
                .enumerate()
                .map(|(row, cell)| {
                    parse_datetime(cell).map_err(|_| {
                        MonitorError::Schema(format!(
                            "row {}: invalid datetime '{}'",
                            row + 1,
                            cell
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some((name, _)) => {
                return Err(MonitorError::Schema(format!(
                    "first data column must be '{}', found '{}'",
                    DATETIME_COLUMN, name
                )))
            }
            None => {
                return Err(MonitorError::Schema(
                    "data table has no columns".to_string(),
                ))
            }
        };

        let mut clamped = 0usize;
        let series = columns
            .map(|(id, cells)| {
                let values = cells
                    .iter()
                    .map(|cell| {
                        let value = null_if_na(cell).and_then(parse_float);
                        match value {
                            Some(v) if v < 0.0 => {
                                clamped += 1;
                                self.handle_negative(v)
                            }
                            other => other,
                        }
                    })
                    .collect();
                Series::new(id, values)
            })
            .collect::<Vec<_>>();

        if clamped > 0 {
            debug!(
                "Handled {} negative PM2.5 values as {:?}",
                clamped, self.negative_values
            );
        }

        DataTable::new(datetime, series)
    }

    fn handle_negative(&self, value: f64) -> Option<f64> {
        match self.negative_values {
            NegativeValues::Zero => Some(0.0),
            NegativeValues::Null => None,
            NegativeValues::Keep => Some(value),
        }
    }
}

impl Default for DataParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a data-file timestamp as UTC.
///
/// Accepts RFC 3339, `YYYY-mm-dd HH:MM:SS+zzzz`, and naive
/// `YYYY-mm-dd HH:MM:SS` (taken to be UTC).
pub fn parse_datetime(cell: &str) -> Result<DateTime<Utc>> {
    let cell = cell.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(cell, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cell, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(MonitorError::InvalidDatetime(cell.to_string()))
}
