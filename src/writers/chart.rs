use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::analyzers::{daily_average, diurnal_profile, nowcast};
use crate::error::{MonitorError, Result};
use crate::models::{DeviceMetadata, Monitor, SeriesId};
use crate::utils::aqi::{pm25_to_color, AxisBounds};
use crate::utils::rounding::{round1, round1_all};
use crate::utils::solar::{local_hour_fraction, solar_times};

pub const TIMESERIES_TITLE: &str = "Hourly PM2.5 Values and Nowcast";
pub const DAILY_TITLE: &str = "Daily Average PM2.5";
pub const DIURNAL_TITLE: &str = "PM2.5 by Time of Day";

/// Display metadata shared by every chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartHeader {
    pub title: String,
    pub location_name: Option<String>,
    pub timezone: String,
    pub x_axis_title: String,
    pub y_axis: AxisBounds,
}

impl ChartHeader {
    fn new(title: &str, meta: &DeviceMetadata, timezone: &str, y_values: &[Option<f64>]) -> Self {
        Self {
            title: title.to_string(),
            location_name: meta.location_name.clone(),
            timezone: timezone.to_string(),
            x_axis_title: format!("Time ({})", timezone),
            y_axis: AxisBounds::for_pm25(y_values),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesChart {
    #[serde(flatten)]
    pub header: ChartHeader,
    pub datetime: Vec<DateTime<Utc>>,
    pub pm25: Vec<Option<f64>>,
    pub nowcast: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBarChart {
    #[serde(flatten)]
    pub header: ChartHeader,
    pub datetime: Vec<DateTime<Utc>>,
    /// Local day labels such as "Jul 15"
    pub labels: Vec<String>,
    pub avg_pm25: Vec<Option<f64>>,
    pub colors: Vec<Option<&'static str>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiurnalChart {
    #[serde(flatten)]
    pub header: ChartHeader,
    pub hour: Vec<u32>,
    pub hour_mean: Vec<Option<f64>>,
    pub yesterday: Vec<Option<f64>>,
    pub today: Vec<Option<f64>>,
    /// Local fractional hours for day/night shading
    pub sunrise_hour: Option<f64>,
    pub sunset_hour: Option<f64>,
}

/// Arrays handed to the chart renderer, already rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartPayload {
    Timeseries(TimeseriesChart),
    DailyBar(DailyBarChart),
    Diurnal(DiurnalChart),
}

impl ChartPayload {
    pub fn timeseries<'a>(monitor: &Monitor, id: impl Into<SeriesId<'a>>) -> Result<Self> {
        let index = monitor.index_of(id)?;
        let (meta, timezone) = site(monitor, index)?;

        let pm25 = round1_all(monitor.pm25(index)?);
        let nowcast = round1_all(&nowcast(monitor, index)?);

        Ok(ChartPayload::Timeseries(TimeseriesChart {
            header: ChartHeader::new(TIMESERIES_TITLE, meta, &timezone, &pm25),
            datetime: monitor.datetime().to_vec(),
            pm25,
            nowcast,
        }))
    }

    pub fn daily_bar<'a>(monitor: &Monitor, id: impl Into<SeriesId<'a>>) -> Result<Self> {
        let index = monitor.index_of(id)?;
        let (meta, timezone) = site(monitor, index)?;
        let tz = meta.tz()?;

        let daily = daily_average(monitor, index)?;
        let avg_pm25 = daily.iter().map(|d| round1(d.avg_pm25)).collect::<Vec<_>>();

        Ok(ChartPayload::DailyBar(DailyBarChart {
            header: ChartHeader::new(DAILY_TITLE, meta, &timezone, &avg_pm25),
            datetime: daily.iter().map(|d| d.datetime).collect(),
            labels: daily
                .iter()
                .map(|d| d.datetime.with_timezone(&tz).format("%b %d").to_string())
                .collect(),
            colors: avg_pm25.iter().map(|v| pm25_to_color(*v)).collect(),
            avg_pm25,
        }))
    }

    pub fn diurnal<'a>(monitor: &Monitor, id: impl Into<SeriesId<'a>>) -> Result<Self> {
        let index = monitor.index_of(id)?;
        let (meta, timezone) = site(monitor, index)?;

        let profile = diurnal_profile(monitor, index)?;
        let hour_mean = profile
            .hour_means
            .iter()
            .map(|h| round1(h.mean))
            .collect::<Vec<_>>();
        let yesterday = round1_all(&profile.yesterday);
        let today = round1_all(&profile.today);

        let y_values = hour_mean
            .iter()
            .chain(&yesterday)
            .chain(&today)
            .copied()
            .collect::<Vec<_>>();

        let middle = middle_datetime(monitor.datetime());
        let (sunrise_hour, sunset_hour) = match (middle, meta.latitude, meta.longitude) {
            (Some(middle), Some(latitude), Some(longitude)) => {
                let local_date = middle.with_timezone(&profile.timezone).date_naive();
                let times = solar_times(local_date, latitude, longitude);
                (
                    times.sunrise.map(|t| local_hour_fraction(t, &profile.timezone)),
                    times.sunset.map(|t| local_hour_fraction(t, &profile.timezone)),
                )
            }
            _ => (None, None),
        };

        Ok(ChartPayload::Diurnal(DiurnalChart {
            header: ChartHeader::new(DIURNAL_TITLE, meta, &timezone, &y_values),
            hour: profile.hour_means.iter().map(|h| h.hour).collect(),
            hour_mean,
            yesterday,
            today,
            sunrise_hour,
            sunset_hour,
        }))
    }

    pub fn header(&self) -> &ChartHeader {
        match self {
            ChartPayload::Timeseries(chart) => &chart.header,
            ChartPayload::DailyBar(chart) => &chart.header,
            ChartPayload::Diurnal(chart) => &chart.header,
        }
    }
}

fn site(monitor: &Monitor, index: usize) -> Result<(&DeviceMetadata, String)> {
    let meta = monitor.metadata(index)?;
    let timezone = meta.timezone.clone().ok_or_else(|| {
        MonitorError::InvalidTimezone(format!(
            "no timezone recorded for {}",
            meta.device_deployment_id
        ))
    })?;
    Ok((meta, timezone))
}

/// Timestamp halfway through the series, rounding up
fn middle_datetime(datetime: &[DateTime<Utc>]) -> Option<DateTime<Utc>> {
    let last = datetime.len().checked_sub(1)?;
    datetime.get(datetime.len().div_ceil(2).min(last)).copied()
}

/// The external renderer.
pub trait ChartRenderer {
    fn render(&mut self, payload: &ChartPayload) -> Result<()>;
}

/// Renders payloads as JSON documents, one per line.
pub struct JsonChartWriter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonChartWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: false,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChartRenderer for JsonChartWriter<W> {
    fn render(&mut self, payload: &ChartPayload) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, payload)?;
        } else {
            serde_json::to_writer(&mut self.writer, payload)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}
