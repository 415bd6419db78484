use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::{MonitorError, Result};

/// One value column of the `data` table, named by its `deviceDeploymentID`.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: String,
    values: Arc<[Option<f64>]>,
}

impl Series {
    pub fn new(id: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            id: id.into(),
            values: values.into(),
        }
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of non-null values
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    fn take(&self, indices: &[Option<usize>]) -> Series {
        let values = indices
            .iter()
            .map(|i| i.and_then(|i| self.values[i]))
            .collect::<Vec<_>>();
        Series::new(self.id.clone(), values)
    }

    fn slice(&self, start: usize, end: usize) -> Series {
        Series::new(self.id.clone(), self.values[start..end].to_vec())
    }
}

/// Row-aligned hourly table: a `datetime` axis plus one column per series.
///
/// Invariant: `datetime` is strictly increasing and every series has exactly
/// one value per timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    datetime: Arc<[DateTime<Utc>]>,
    series: Vec<Series>,
}

impl Default for DataTable {
    fn default() -> Self {
        Self::empty_with_ids::<&str>(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// Keep only timestamps present on both sides
    #[default]
    Inner,
    /// Keep every timestamp, padding missing hours with null
    Outer,
}

impl DataTable {
    pub fn new(datetime: Vec<DateTime<Utc>>, series: Vec<Series>) -> Result<Self> {
        if let Some(pair) = datetime.windows(2).find(|w| w[0] >= w[1]) {
            return Err(MonitorError::Schema(format!(
                "datetime must be strictly increasing: {} is followed by {}",
                pair[0], pair[1]
            )));
        }

        for s in &series {
            if s.len() != datetime.len() {
                return Err(MonitorError::Schema(format!(
                    "series {} has {} values for {} timestamps",
                    s.id,
                    s.len(),
                    datetime.len()
                )));
            }
        }

        Ok(Self {
            datetime: datetime.into(),
            series,
        })
    }

    /// A zero-row table that keeps the given series ids as columns
    pub fn empty_with_ids<S: AsRef<str>>(ids: &[S]) -> Self {
        Self {
            datetime: Arc::from(Vec::<DateTime<Utc>>::new()),
            series: ids.iter().map(|id| Series::new(id.as_ref(), vec![])).collect(),
        }
    }

    pub fn datetime(&self) -> &[DateTime<Utc>] {
        &self.datetime
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn ids(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.id == id)
    }

    pub fn num_rows(&self) -> usize {
        self.datetime.len()
    }

    pub fn num_series(&self) -> usize {
        self.series.len()
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.datetime.first().copied()
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.datetime.last().copied()
    }

    /// Rows `start..end` (end exclusive); out-of-range bounds are clamped
    pub fn slice(&self, start: usize, end: usize) -> DataTable {
        let end = end.min(self.num_rows());
        let start = start.min(end);

        Self {
            datetime: self.datetime[start..end].to_vec().into(),
            series: self.series.iter().map(|s| s.slice(start, end)).collect(),
        }
    }

    /// The last `n` rows
    pub fn tail(&self, n: usize) -> DataTable {
        let rows = self.num_rows();
        self.slice(rows.saturating_sub(n), rows)
    }

    /// Rows whose datetime lies within `[start, end]`
    pub fn filter_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DataTable {
        let first = self.datetime.partition_point(|dt| *dt < start);
        let last = self.datetime.partition_point(|dt| *dt <= end);
        if first >= last {
            return self.slice(0, 0);
        }
        self.slice(first, last)
    }

    /// Keep the series at `indices`, in that order
    pub(crate) fn pick(&self, indices: &[usize]) -> DataTable {
        Self {
            datetime: self.datetime.clone(),
            series: indices.iter().map(|&i| self.series[i].clone()).collect(),
        }
    }

    /// Join two tables on `datetime`. Both axes are sorted, so this is a
    /// single merge walk.
    pub fn join(&self, other: &DataTable, kind: JoinKind) -> DataTable {
        let left = self.datetime();
        let right = other.datetime();

        let mut datetime = Vec::with_capacity(left.len().max(right.len()));
        let mut left_idx = Vec::with_capacity(datetime.capacity());
        let mut right_idx = Vec::with_capacity(datetime.capacity());

        let (mut i, mut j) = (0, 0);
        while i < left.len() || j < right.len() {
            match (left.get(i), right.get(j)) {
                (Some(l), Some(r)) if l == r => {
                    datetime.push(*l);
                    left_idx.push(Some(i));
                    right_idx.push(Some(j));
                    i += 1;
                    j += 1;
                }
                (Some(l), Some(r)) if l < r => {
                    if kind == JoinKind::Outer {
                        datetime.push(*l);
                        left_idx.push(Some(i));
                        right_idx.push(None);
                    }
                    i += 1;
                }
                (Some(_), Some(r)) => {
                    if kind == JoinKind::Outer {
                        datetime.push(*r);
                        left_idx.push(None);
                        right_idx.push(Some(j));
                    }
                    j += 1;
                }
                (Some(l), None) => {
                    if kind == JoinKind::Outer {
                        datetime.push(*l);
                        left_idx.push(Some(i));
                        right_idx.push(None);
                    }
                    i += 1;
                }
                (None, Some(r)) => {
                    if kind == JoinKind::Outer {
                        datetime.push(*r);
                        left_idx.push(None);
                        right_idx.push(Some(j));
                    }
                    j += 1;
                }
                (None, None) => break,
            }
        }

        let series = self
            .series
            .iter()
            .map(|s| s.take(&left_idx))
            .chain(other.series.iter().map(|s| s.take(&right_idx)))
            .collect();

        Self {
            datetime: datetime.into(),
            series,
        }
    }
}
