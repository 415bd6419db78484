use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{MonitorError, Result};
use crate::models::data_table::{DataTable, JoinKind};
use crate::models::metadata::{parse_timezone, DeviceMetadata};

/// Identifies one time series in a [`Monitor`].
///
/// Integers are zero-based positions into [`Monitor::ids`]; strings are
/// literal `deviceDeploymentID` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesId<'a> {
    Index(usize),
    Id(&'a str),
}

impl From<usize> for SeriesId<'_> {
    fn from(index: usize) -> Self {
        SeriesId::Index(index)
    }
}

impl<'a> From<&'a str> for SeriesId<'a> {
    fn from(id: &'a str) -> Self {
        SeriesId::Id(id)
    }
}

impl<'a> From<&'a String> for SeriesId<'a> {
    fn from(id: &'a String) -> Self {
        SeriesId::Id(id.as_str())
    }
}

impl std::fmt::Display for SeriesId<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesId::Index(index) => write!(f, "#{}", index),
            SeriesId::Id(id) => write!(f, "{}", id),
        }
    }
}

/// A set of PM2.5 time series: one `meta` row per deployment paired with
/// one `data` column per deployment, in the same order.
///
/// Every manipulation returns a new `Monitor`; value columns are shared
/// between the old and new instance rather than copied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Monitor {
    meta: Vec<DeviceMetadata>,
    data: DataTable,
}

impl Monitor {
    pub fn new(meta: Vec<DeviceMetadata>, data: DataTable) -> Result<Self> {
        let meta_ids = meta.iter().map(|m| m.device_deployment_id.as_str());
        if !meta_ids.eq(data.ids()) {
            return Err(MonitorError::Schema(format!(
                "meta ids {:?} do not match data columns {:?}",
                meta.iter()
                    .map(|m| m.device_deployment_id.as_str())
                    .collect::<Vec<_>>(),
                data.ids()
            )));
        }

        Ok(Self { meta, data })
    }

    /// A monitor with no series and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn meta(&self) -> &[DeviceMetadata] {
        &self.meta
    }

    pub fn data(&self) -> &DataTable {
        &self.data
    }

    pub fn datetime(&self) -> &[DateTime<Utc>] {
        self.data.datetime()
    }

    /// `deviceDeploymentID`s in column order
    pub fn ids(&self) -> Vec<&str> {
        self.meta
            .iter()
            .map(|m| m.device_deployment_id.as_str())
            .collect()
    }

    /// Number of time series
    pub fn count(&self) -> usize {
        self.meta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meta.is_empty()
    }

    pub fn index_of<'a>(&self, id: impl Into<SeriesId<'a>>) -> Result<usize> {
        match id.into() {
            SeriesId::Index(index) if index < self.count() => Ok(index),
            SeriesId::Index(index) => Err(MonitorError::NotFound(format!(
                "series index {} out of range for {} time series",
                index,
                self.count()
            ))),
            SeriesId::Id(id) => self
                .meta
                .iter()
                .position(|m| m.device_deployment_id == id)
                .ok_or_else(|| MonitorError::NotFound(format!("deviceDeploymentID {}", id))),
        }
    }

    pub fn metadata<'a>(&self, id: impl Into<SeriesId<'a>>) -> Result<&DeviceMetadata> {
        let index = self.index_of(id)?;
        Ok(&self.meta[index])
    }

    /// Hourly PM2.5 values of one series
    pub fn pm25<'a>(&self, id: impl Into<SeriesId<'a>>) -> Result<&[Option<f64>]> {
        let index = self.index_of(id)?;
        Ok(self.data.series()[index].values())
    }

    /// Timezone of one series' site
    pub fn timezone<'a>(&self, id: impl Into<SeriesId<'a>>) -> Result<Tz> {
        self.metadata(id)?.tz()
    }

    /// Subset and reorder time series. Unknown ids are an error.
    pub fn select<S: AsRef<str>>(&self, ids: &[S]) -> Result<Monitor> {
        let indices = ids
            .iter()
            .map(|id| self.index_of(id.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.pick(&indices))
    }

    /// Drop time series that contain no valid values at all.
    pub fn drop_empty(&self) -> Monitor {
        let keep = self
            .data
            .series()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.valid_count() > 0)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        let dropped = self.count() - keep.len();
        if dropped > 0 {
            debug!("Dropped {} empty time series of {}", dropped, self.count());
        }

        self.pick(&keep)
    }

    /// Combine with another monitor, keeping only shared timestamps.
    pub fn combine(&self, other: &Monitor) -> Monitor {
        self.combine_with(other, JoinKind::Inner)
    }

    /// Combine with another monitor using the given join on `datetime`.
    ///
    /// Metadata rows are concatenated without deduplication.
    pub fn combine_with(&self, other: &Monitor, kind: JoinKind) -> Monitor {
        let meta = self
            .meta
            .iter()
            .chain(other.meta.iter())
            .cloned()
            .collect::<Vec<_>>();
        let data = self.data.join(&other.data, kind);

        debug!(
            "Combined {} + {} series over {} shared hours ({:?} join)",
            self.count(),
            other.count(),
            data.num_rows(),
            kind
        );

        Monitor { meta, data }
    }

    /// Rows whose datetime lies within `[start, end]`
    pub fn filter_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Monitor {
        Monitor {
            meta: self.meta.clone(),
            data: self.data.filter_range(start, end),
        }
    }

    /// The same series with zero rows
    pub fn without_rows(&self) -> Monitor {
        Monitor {
            meta: self.meta.clone(),
            data: self.data.slice(0, 0),
        }
    }

    /// Trim `data` to whole local calendar days in `timezone`.
    pub fn trim_date(&self, timezone: &str) -> Result<Monitor> {
        let tz = parse_timezone(timezone)?;
        Ok(self.trim_date_tz(tz))
    }

    pub fn trim_date_tz(&self, tz: Tz) -> Monitor {
        let hours = self
            .datetime()
            .iter()
            .map(|dt| dt.with_timezone(&tz).hour())
            .collect::<Vec<_>>();

        let first = hours.iter().position(|h| *h == 0);
        let last = hours.iter().rposition(|h| *h == 23);

        let data = match (first, last) {
            (Some(first), Some(last)) if last >= first && last - first + 1 >= 24 => {
                self.data.slice(first, last + 1)
            }
            _ => self.data.slice(0, 0),
        };

        Monitor {
            meta: self.meta.clone(),
            data,
        }
    }

    fn pick(&self, indices: &[usize]) -> Monitor {
        Monitor {
            meta: indices.iter().map(|&i| self.meta[i].clone()).collect(),
            data: self.data.pick(indices),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::data_table::Series;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn hours_from(start: DateTime<Utc>, n: usize) -> Vec<DateTime<Utc>> {
        (0..n).map(|i| start + Duration::hours(i as i64)).collect()
    }

    fn monitor(start: DateTime<Utc>, columns: &[(&str, Vec<Option<f64>>)]) -> Monitor {
        let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let meta = columns
            .iter()
            .map(|(id, _)| DeviceMetadata::new(*id).with_timezone("America/Los_Angeles"))
            .collect();
        let series = columns
            .iter()
            .map(|(id, values)| Series::new(*id, values.clone()))
            .collect();
        Monitor::new(meta, DataTable::new(hours_from(start, rows), series).unwrap()).unwrap()
    }

    fn utc(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 7, day, hour, 0, 0).unwrap()
    }

    fn assert_bijection(m: &Monitor) {
        assert_eq!(m.ids(), m.data().ids());
    }

    fn sample() -> Monitor {
        monitor(
            utc(15, 0),
            &[
                ("a", vec![Some(1.0), Some(2.0), None, Some(4.0)]),
                ("b", vec![None, None, None, None]),
                ("c", vec![Some(7.0), None, Some(0.0), Some(9.0)]),
            ],
        )
    }

    #[test]
    fn test_new_rejects_mismatched_ids() {
        let data = DataTable::new(vec![utc(15, 0)], vec![Series::new("a", vec![Some(1.0)])]).unwrap();
        let result = Monitor::new(vec![DeviceMetadata::new("b")], data);
        assert!(result.unwrap_err().is_schema_error());
    }

    #[test]
    fn test_ids_and_count() {
        let m = sample();
        assert_eq!(m.ids(), vec!["a", "b", "c"]);
        assert_eq!(m.count(), 3);
        assert_bijection(&m);
    }

    #[test]
    fn test_select_reorders() {
        let m = sample();
        let selected = m.select(&["c", "a"]).unwrap();
        assert_eq!(selected.ids(), vec!["c", "a"]);
        assert_bijection(&selected);
        assert_eq!(selected.pm25("c").unwrap(), m.pm25("c").unwrap());

        // Original is untouched
        assert_eq!(m.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_select_unknown_id_fails() {
        let m = sample();
        let err = m.select(&["a", "zzz"]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_series_id_lookup() {
        let m = sample();
        assert_eq!(m.index_of(2usize).unwrap(), 2);
        assert_eq!(m.index_of("b").unwrap(), 1);
        assert!(m.index_of(3usize).unwrap_err().is_not_found());
        assert!(m.index_of("nope").unwrap_err().is_not_found());
        assert_eq!(m.pm25(0usize).unwrap(), m.pm25("a").unwrap());
    }

    #[test]
    fn test_drop_empty() {
        let m = sample();
        let dropped = m.drop_empty();
        assert_eq!(dropped.ids(), vec!["a", "c"]);
        assert_bijection(&dropped);

        // A column of zeros is not empty
        assert!(dropped.pm25("c").unwrap().contains(&Some(0.0)));
    }

    #[test]
    fn test_drop_empty_is_idempotent() {
        let once = sample().drop_empty();
        let twice = once.drop_empty();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_combine_inner_join() {
        let a = monitor(utc(15, 1), &[("a", vec![Some(1.0), Some(2.0), Some(3.0)])]);
        let b = monitor(utc(15, 2), &[("b", vec![Some(20.0), Some(30.0), Some(40.0)])]);

        let combined = a.combine(&b);
        assert_eq!(combined.datetime(), &[utc(15, 2), utc(15, 3)]);
        assert_eq!(combined.ids(), vec!["a", "b"]);
        assert_bijection(&combined);
    }

    #[test]
    fn test_combine_without_overlap_is_empty_but_valid() {
        let a = monitor(utc(15, 0), &[("a", vec![Some(1.0)])]);
        let b = monitor(utc(16, 0), &[("b", vec![Some(2.0)])]);

        let combined = a.combine(&b);
        assert_eq!(combined.data().num_rows(), 0);
        assert_eq!(combined.count(), 2);
        assert_bijection(&combined);
        assert_eq!(combined.drop_empty().count(), 0);
    }

    #[test]
    fn test_combine_outer_join() {
        let a = monitor(utc(15, 1), &[("a", vec![Some(1.0), Some(2.0)])]);
        let b = monitor(utc(15, 2), &[("b", vec![Some(20.0), Some(30.0)])]);

        let combined = a.combine_with(&b, JoinKind::Outer);
        assert_eq!(combined.data().num_rows(), 3);
        assert_eq!(combined.pm25("a").unwrap(), &[Some(1.0), Some(2.0), None]);
        assert_eq!(combined.pm25("b").unwrap(), &[None, Some(20.0), Some(30.0)]);
    }

    #[test]
    fn test_trim_date_to_whole_local_days() {
        // 05:00 UTC is 22:00 PDT the previous evening
        let values = (0..26).map(|i| Some(i as f64)).collect::<Vec<_>>();
        let m = monitor(utc(15, 5), &[("a", values)]);

        let trimmed = m.trim_date("America/Los_Angeles").unwrap();
        assert_eq!(trimmed.data().num_rows(), 24);
        assert_eq!(trimmed.data().num_rows() % 24, 0);
        assert_eq!(trimmed.datetime()[0], utc(15, 7));
        assert_eq!(trimmed.pm25("a").unwrap()[0], Some(2.0));
        assert_eq!(trimmed.meta(), m.meta());
        assert_bijection(&trimmed);
    }

    #[test]
    fn test_trim_date_drops_trailing_partial_day() {
        // 07:00 UTC is local midnight; 60 rows = 2 full days + 12 hours
        let values = vec![Some(1.0); 60];
        let m = monitor(utc(15, 7), &[("a", values)]);

        let trimmed = m.trim_date("America/Los_Angeles").unwrap();
        assert_eq!(trimmed.data().num_rows(), 48);
    }

    #[test]
    fn test_trim_date_short_span_is_empty() {
        let values = vec![Some(1.0); 20];
        let m = monitor(utc(15, 7), &[("a", values)]);

        let trimmed = m.trim_date("America/Los_Angeles").unwrap();
        assert_eq!(trimmed.data().num_rows(), 0);
        assert_eq!(trimmed.ids(), vec!["a"]);
    }

    #[test]
    fn test_trim_date_invalid_timezone() {
        let err = sample().trim_date("Not/AZone").unwrap_err();
        assert!(matches!(err, MonitorError::InvalidTimezone(_)));
    }
}
