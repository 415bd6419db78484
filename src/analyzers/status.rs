use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DeviceMetadata, Monitor};
use crate::utils::aqi::AqiCategory;

/// A `meta` row extended with the series' most recent valid reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    #[serde(flatten)]
    pub meta: DeviceMetadata,
    pub last_valid_datetime: Option<DateTime<Utc>>,
    #[serde(rename = "lastValidPM_25")]
    pub last_valid_pm25: Option<f64>,
    pub aqi_category: Option<AqiCategory>,
}

/// Current status of every series, in `ids()` order.
///
/// The reading is taken at the last row holding a finite value, or at row 0
/// when a series has none.
pub fn current_status(monitor: &Monitor) -> Vec<StatusRecord> {
    let datetime = monitor.datetime();

    monitor
        .meta()
        .iter()
        .zip(monitor.data().series())
        .map(|(meta, series)| {
            let values = series.values();
            let index = last_valid_index(values);
            let last_valid_pm25 = values.get(index).copied().flatten();

            StatusRecord {
                meta: meta.clone(),
                last_valid_datetime: datetime.get(index).copied(),
                last_valid_pm25,
                aqi_category: last_valid_pm25
                    .filter(|v| v.is_finite())
                    .map(AqiCategory::from_pm25),
            }
        })
        .collect()
}

/// Index of the last finite value, 0 when there is none
pub fn last_valid_index(values: &[Option<f64>]) -> usize {
    values
        .iter()
        .rposition(|v| v.is_some_and(f64::is_finite))
        .unwrap_or(0)
}
