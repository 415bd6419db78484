use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};

/// Zenith angle for official sunrise/sunset, accounting for refraction
const OFFICIAL_ZENITH: f64 = 90.833;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarTimes {
    /// `None` when the sun does not rise (polar night) or set (midnight sun)
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

/// Sunrise and sunset on `date` at the given location.
///
/// Uses the almanac approximation from the US Naval Observatory, good to
/// about a minute at mid latitudes.
pub fn solar_times(date: NaiveDate, latitude: f64, longitude: f64) -> SolarTimes {
    SolarTimes {
        sunrise: event_time(date, latitude, longitude, true),
        sunset: event_time(date, latitude, longitude, false),
    }
}

/// Local wall-clock time as fractional hours, e.g. 05:30 -> 5.5
pub fn local_hour_fraction<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> f64 {
    let local = instant.with_timezone(tz);
    local.hour() as f64 + local.minute() as f64 / 60.0
}

fn event_time(date: NaiveDate, latitude: f64, longitude: f64, rising: bool) -> Option<DateTime<Utc>> {
    let day_of_year = date.ordinal() as f64;
    let lng_hour = longitude / 15.0;

    let t = if rising {
        day_of_year + (6.0 - lng_hour) / 24.0
    } else {
        day_of_year + (18.0 - lng_hour) / 24.0
    };

    // Sun's mean anomaly and true longitude
    let mean_anomaly = 0.9856 * t - 3.289;
    let true_longitude = (mean_anomaly
        + 1.916 * sin_deg(mean_anomaly)
        + 0.020 * sin_deg(2.0 * mean_anomaly)
        + 282.634)
        .rem_euclid(360.0);

    // Right ascension, in the same quadrant as the true longitude
    let mut right_ascension = (0.91764 * tan_deg(true_longitude))
        .atan()
        .to_degrees()
        .rem_euclid(360.0);
    let l_quadrant = (true_longitude / 90.0).floor() * 90.0;
    let ra_quadrant = (right_ascension / 90.0).floor() * 90.0;
    right_ascension = (right_ascension + l_quadrant - ra_quadrant) / 15.0;

    let sin_dec = 0.39782 * sin_deg(true_longitude);
    let cos_dec = sin_dec.asin().cos();

    let cos_h = (cos_deg(OFFICIAL_ZENITH) - sin_dec * sin_deg(latitude))
        / (cos_dec * cos_deg(latitude));
    if !(-1.0..=1.0).contains(&cos_h) {
        return None;
    }

    let hour_angle_deg = if rising {
        360.0 - cos_h.acos().to_degrees()
    } else {
        cos_h.acos().to_degrees()
    };
    let hour_angle = hour_angle_deg / 15.0;

    let local_mean_time = hour_angle + right_ascension - 0.06571 * t - 6.622;
    let ut_hours = (local_mean_time - lng_hour).rem_euclid(24.0);

    let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
    Some(midnight + Duration::seconds((ut_hours * 3600.0).round() as i64))
}

fn sin_deg(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

fn cos_deg(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

fn tan_deg(degrees: f64) -> f64 {
    degrees.to_radians().tan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seattle_summer_solstice() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 21).unwrap();
        let times = solar_times(date, 47.61, -122.33);
        let tz = chrono_tz::America::Los_Angeles;

        // Published: sunrise 05:11, sunset 21:11 PDT
        let sunrise = local_hour_fraction(times.sunrise.unwrap(), &tz);
        let sunset = local_hour_fraction(times.sunset.unwrap(), &tz);
        assert!((sunrise - 5.18).abs() < 0.1, "sunrise {}", sunrise);
        assert!((sunset - 21.18).abs() < 0.1, "sunset {}", sunset);
    }

    #[test]
    fn test_polar_day_has_no_sunset() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 21).unwrap();
        let times = solar_times(date, 69.65, 18.96);
        assert!(times.sunrise.is_none());
        assert!(times.sunset.is_none());
    }

    #[test]
    fn test_local_hour_fraction() {
        let instant = Utc.with_ymd_and_hms(2023, 7, 15, 12, 30, 0).unwrap();
        assert_eq!(local_hour_fraction(instant, &Utc), 12.5);
        assert_eq!(local_hour_fraction(instant, &chrono_tz::America::Denver), 6.5);
    }
}
