use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::analyzers::rolling::rolling_mean;
use crate::error::Result;
use crate::models::{Monitor, SeriesId};
use crate::utils::constants::{DAILY_WINDOW_HOURS, DIURNAL_CLIMATOLOGY_DAYS, NOWCAST_WINDOW_HOURS};
use crate::utils::rounding::mean_present;

/// One day of the daily-average series, stamped at local midnight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAverage {
    pub datetime: DateTime<Utc>,
    pub avg_pm25: Option<f64>,
}

/// Mean PM2.5 for one local hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourMean {
    pub hour: u32,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiurnalProfile {
    pub timezone: Tz,
    /// Raw hourly values for the previous local day
    pub yesterday: Vec<Option<f64>>,
    /// Raw hourly values from local midnight through the latest hour
    pub today: Vec<Option<f64>>,
    /// Always 24 entries, ordered by hour
    pub hour_means: Vec<HourMean>,
}

/// Three-hour trailing average of one series.
pub fn nowcast<'a>(monitor: &Monitor, id: impl Into<SeriesId<'a>>) -> Result<Vec<Option<f64>>> {
    let pm25 = monitor.pm25(id)?;
    Ok(rolling_mean(pm25, NOWCAST_WINDOW_HOURS))
}

/// Daily averages over whole local days at the series' site.
///
/// Days are cut at local calendar dates, so DST days span 23 or 25 rows.
/// Each mean covers that day's present values and is stamped with its
/// local hour-0 timestamp.
pub fn daily_average<'a>(
    monitor: &Monitor,
    id: impl Into<SeriesId<'a>>,
) -> Result<Vec<DailyAverage>> {
    let index = monitor.index_of(id)?;
    let tz = monitor.timezone(index)?;

    let trimmed = monitor.trim_date_tz(tz);
    let datetime = trimmed.datetime();
    let pm25 = trimmed.pm25(index)?;
    let dates = datetime
        .iter()
        .map(|dt| dt.with_timezone(&tz).date_naive())
        .collect::<Vec<_>>();

    let mut daily = Vec::new();
    let mut start = 0;
    while start < dates.len() {
        let end = dates[start..]
            .iter()
            .position(|date| *date != dates[start])
            .map_or(dates.len(), |len| start + len);

        daily.push(DailyAverage {
            datetime: datetime[start],
            avg_pm25: mean_present(&pm25[start..end]),
        });
        start = end;
    }

    Ok(daily)
}

/// Yesterday, today and the recent hour-of-day climatology for one series.
pub fn diurnal_profile<'a>(
    monitor: &Monitor,
    id: impl Into<SeriesId<'a>>,
) -> Result<DiurnalProfile> {
    let index = monitor.index_of(id)?;
    let tz = monitor.timezone(index)?;

    let pm25 = monitor.pm25(index)?;
    let (yesterday, today) = match monitor.datetime().last() {
        Some(last) => {
            let last_hour = last.with_timezone(&tz).hour() as usize;
            let today_start = (pm25.len() - 1).saturating_sub(last_hour);
            let yesterday_start = today_start.saturating_sub(DAILY_WINDOW_HOURS);
            (
                pm25[yesterday_start..today_start].to_vec(),
                pm25[today_start..].to_vec(),
            )
        }
        None => (Vec::new(), Vec::new()),
    };

    let recent = monitor
        .trim_date_tz(tz)
        .data()
        .tail(DIURNAL_CLIMATOLOGY_DAYS * DAILY_WINDOW_HOURS);

    let mut by_hour: Vec<Vec<Option<f64>>> = vec![Vec::new(); 24];
    let values = recent.series()[index].values();
    for (dt, value) in recent.datetime().iter().zip(values) {
        by_hour[dt.with_timezone(&tz).hour() as usize].push(*value);
    }

    let hour_means = by_hour
        .iter()
        .enumerate()
        .map(|(hour, values)| HourMean {
            hour: hour as u32,
            mean: mean_present(values),
        })
        .collect();

    Ok(DiurnalProfile {
        timezone: tz,
        yesterday,
        today,
        hour_means,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataTable, DeviceMetadata, Series};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    const TZ: &str = "America/Denver";

    /// Hourly series starting at local midnight in Denver (UTC-6 in July)
    fn monitor(values: Vec<Option<f64>>, start_local_hour: i64) -> Monitor {
        let start = Utc.with_ymd_and_hms(2023, 7, 10, 6, 0, 0).unwrap()
            + Duration::hours(start_local_hour);
        let datetime = (0..values.len() as i64)
            .map(|h| start + Duration::hours(h))
            .collect();
        let data = DataTable::new(datetime, vec![Series::new("site", values)]).unwrap();
        Monitor::new(vec![DeviceMetadata::new("site").with_timezone(TZ)], data).unwrap()
    }

    #[test]
    fn test_nowcast_by_id_and_index() {
        let m = monitor(vec![Some(3.0), None, Some(9.0), Some(12.0)], 0);
        let expected = vec![Some(3.0), Some(3.0), Some(6.0), Some(10.5)];
        assert_eq!(nowcast(&m, "site").unwrap(), expected);
        assert_eq!(nowcast(&m, 0usize).unwrap(), expected);
        assert!(nowcast(&m, "other").unwrap_err().is_not_found());
    }

    #[test]
    fn test_daily_average_samples_end_of_day() {
        // Two local days: all 10s, then all 20s, preceded by 3 partial hours
        let mut values = vec![Some(99.0); 3];
        values.extend(vec![Some(10.0); 24]);
        values.extend(vec![Some(20.0); 24]);
        let m = monitor(values, 21);

        let daily = daily_average(&m, "site").unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(
            daily[0].datetime,
            Utc.with_ymd_and_hms(2023, 7, 11, 6, 0, 0).unwrap()
        );
        assert_eq!(daily[0].avg_pm25, Some(10.0));
        assert_eq!(daily[1].avg_pm25, Some(20.0));
    }

    /// Hourly series for one site in Los Angeles, one constant value per local day
    fn los_angeles(start: DateTime<Utc>, day_lengths: &[usize]) -> Monitor {
        let values = day_lengths
            .iter()
            .enumerate()
            .flat_map(|(day, len)| vec![Some(10.0 * (day + 1) as f64); *len])
            .collect::<Vec<_>>();
        let datetime = (0..values.len() as i64)
            .map(|h| start + Duration::hours(h))
            .collect();
        let data = DataTable::new(datetime, vec![Series::new("la", values)]).unwrap();
        let meta = DeviceMetadata::new("la").with_timezone("America/Los_Angeles");
        Monitor::new(vec![meta], data).unwrap()
    }

    #[test]
    fn test_daily_average_across_fall_back() {
        // Local midnight 2023-11-04 PDT; Nov 5 has 25 local hours
        let start = Utc.with_ymd_and_hms(2023, 11, 4, 7, 0, 0).unwrap();
        let m = los_angeles(start, &[24, 25, 24]);
        assert_eq!(m.trim_date("America/Los_Angeles").unwrap().data().num_rows(), 73);

        let daily = daily_average(&m, "la").unwrap();
        let stamps = daily.iter().map(|d| d.datetime).collect::<Vec<_>>();
        assert_eq!(
            stamps,
            vec![
                Utc.with_ymd_and_hms(2023, 11, 4, 7, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 11, 5, 7, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 11, 6, 8, 0, 0).unwrap(),
            ]
        );
        let means = daily.iter().map(|d| d.avg_pm25).collect::<Vec<_>>();
        assert_eq!(means, vec![Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn test_daily_average_across_spring_forward() {
        // Local midnight 2023-03-11 PST; Mar 12 has 23 local hours
        let start = Utc.with_ymd_and_hms(2023, 3, 11, 8, 0, 0).unwrap();
        let m = los_angeles(start, &[24, 23, 24]);

        let daily = daily_average(&m, "la").unwrap();
        let stamps = daily.iter().map(|d| d.datetime).collect::<Vec<_>>();
        assert_eq!(
            stamps,
            vec![
                Utc.with_ymd_and_hms(2023, 3, 11, 8, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 3, 12, 8, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 3, 13, 7, 0, 0).unwrap(),
            ]
        );
        let means = daily.iter().map(|d| d.avg_pm25).collect::<Vec<_>>();
        assert_eq!(means, vec![Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn test_daily_average_of_partial_day_is_empty() {
        let m = monitor(vec![Some(1.0); 20], 0);
        assert!(daily_average(&m, "site").unwrap().is_empty());
    }

    #[test]
    fn test_diurnal_today_and_yesterday() {
        // Day one full, day two through local 05:00
        let values = (0..30).map(|h| Some(h as f64)).collect();
        let profile = diurnal_profile(&monitor(values, 0), "site").unwrap();

        assert_eq!(profile.today, (24..30).map(|h| Some(h as f64)).collect::<Vec<_>>());
        assert_eq!(profile.yesterday, (0..24).map(|h| Some(h as f64)).collect::<Vec<_>>());
    }

    #[test]
    fn test_diurnal_hour_means() {
        // Three whole days where each hour reads its local hour plus the day
        let values = (0..72).map(|h| Some((h % 24 + h / 24) as f64)).collect();
        let profile = diurnal_profile(&monitor(values, 0), "site").unwrap();

        assert_eq!(profile.hour_means.len(), 24);
        assert_eq!(profile.hour_means[0], HourMean { hour: 0, mean: Some(1.0) });
        assert_eq!(profile.hour_means[23], HourMean { hour: 23, mean: Some(24.0) });
    }

    #[test]
    fn test_diurnal_short_series() {
        let profile = diurnal_profile(&monitor(vec![Some(5.0); 3], 0), "site").unwrap();
        assert_eq!(profile.today.len(), 3);
        assert!(profile.yesterday.is_empty());
        assert!(profile.hour_means.iter().all(|h| h.mean.is_none()));
    }
}
