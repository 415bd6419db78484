use tracing::debug;

use crate::error::{MonitorError, Result};
use crate::models::DeviceMetadata;
use crate::readers::csv_table::RawTable;
use crate::utils::constants::{CORE_METADATA_NAMES, NA_SENTINEL};

/// Turns a raw `*_meta.csv` table into typed [`DeviceMetadata`] rows.
pub struct MetaParser;

impl MetaParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, table: &RawTable) -> Result<Vec<DeviceMetadata>> {
        let missing = CORE_METADATA_NAMES
            .iter()
            .filter(|name| table.column(name).is_none())
            .copied()
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(MonitorError::Schema(format!(
                "meta is missing required columns: {}",
                missing.join(", ")
            )));
        }

        let extra = table.num_columns() - CORE_METADATA_NAMES.len();
        if extra > 0 {
            debug!("Ignoring {} non-core metadata columns", extra);
        }

        (0..table.num_rows())
            .map(|row| self.parse_row(table, row))
            .collect()
    }

    fn parse_row(&self, table: &RawTable, row: usize) -> Result<DeviceMetadata> {
        let text = |name: &str| -> Option<String> {
            table
                .column(name)
                .and_then(|c| c.get(row))
                .and_then(|cell| null_if_na(cell))
                .map(|cell| cell.to_string())
        };
        let number = |name: &str| -> Option<f64> { text(name).and_then(|v| parse_float(&v)) };

        let device_deployment_id = text("deviceDeploymentID").ok_or_else(|| {
            MonitorError::Schema(format!("row {} has no deviceDeploymentID", row + 1))
        })?;

        Ok(DeviceMetadata {
            device_deployment_id,
            device_id: text("deviceID"),
            device_type: text("deviceType"),
            device_description: text("deviceDescription"),
            pollutant: text("pollutant"),
            units: text("units"),
            data_ingest_source: text("dataIngestSource"),
            location_id: text("locationID"),
            location_name: text("locationName"),
            longitude: number("longitude"),
            latitude: number("latitude"),
            elevation: number("elevation"),
            country_code: text("countryCode"),
            state_code: text("stateCode"),
            county_name: text("countyName"),
            timezone: text("timezone"),
            aqsid: text("AQSID"),
            full_aqsid: text("fullAQSID"),
        })
    }
}

impl Default for MetaParser {
    fn default() -> Self {
        Self::new()
    }
}

/// `"NA"` and blank cells are missing values
pub(crate) fn null_if_na(cell: &str) -> Option<&str> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == NA_SENTINEL {
        None
    } else {
        Some(trimmed)
    }
}

/// Float parse; anything unparseable or non-finite is missing
pub(crate) fn parse_float(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
