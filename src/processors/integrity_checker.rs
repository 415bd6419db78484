use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::warn;
use validator::Validate;

use crate::models::Monitor;
use crate::utils::constants::SECONDS_PER_HOUR;

#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub total_series: usize,
    pub total_hours: usize,
    pub empty_series: Vec<String>,
    pub series_statistics: HashMap<String, SeriesStatistics>,
    pub hourly_gaps: Vec<HourlyGap>,
    pub metadata_violations: Vec<MetadataViolation>,
}

/// A step between consecutive rows other than exactly one hour
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyGap {
    pub after: DateTime<Utc>,
    pub before: DateTime<Utc>,
    pub missing_hours: i64,
}

#[derive(Debug, Clone)]
pub struct MetadataViolation {
    pub device_deployment_id: String,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationType {
    OutOfRange,
    UnknownTimezone,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStatistics {
    pub valid_hours: usize,
    pub missing_hours: usize,
    pub min_pm25: Option<f64>,
    pub max_pm25: Option<f64>,
}

impl SeriesStatistics {
    pub fn completeness(&self) -> f64 {
        let total = self.valid_hours + self.missing_hours;
        if total == 0 {
            0.0
        } else {
            self.valid_hours as f64 / total as f64
        }
    }
}

/// Quality-control pass over a [`Monitor`]. Never fails; findings go into an
/// [`IntegrityReport`].
pub struct IntegrityChecker {
    max_reported_gaps: usize,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            max_reported_gaps: 100,
        }
    }

    pub fn with_max_reported_gaps(max_reported_gaps: usize) -> Self {
        Self { max_reported_gaps }
    }

    pub fn check(&self, monitor: &Monitor) -> IntegrityReport {
        let mut report = IntegrityReport {
            total_series: monitor.count(),
            total_hours: monitor.data().num_rows(),
            empty_series: Vec::new(),
            series_statistics: HashMap::new(),
            hourly_gaps: Vec::new(),
            metadata_violations: Vec::new(),
        };

        for series in monitor.data().series() {
            let stats = series_statistics(series.values());
            if stats.valid_hours == 0 {
                report.empty_series.push(series.id.clone());
            }
            report.series_statistics.insert(series.id.clone(), stats);
        }

        self.check_time_axis(monitor.datetime(), &mut report);
        self.check_metadata(monitor, &mut report);

        if !report.metadata_violations.is_empty() {
            warn!(
                "{} metadata violations across {} series",
                report.metadata_violations.len(),
                report.total_series
            );
        }

        report
    }

    fn check_time_axis(&self, datetime: &[DateTime<Utc>], report: &mut IntegrityReport) {
        let step = Duration::seconds(SECONDS_PER_HOUR);

        for pair in datetime.windows(2) {
            if pair[1] - pair[0] != step {
                if report.hourly_gaps.len() >= self.max_reported_gaps {
                    break;
                }
                report.hourly_gaps.push(HourlyGap {
                    after: pair[0],
                    before: pair[1],
                    missing_hours: (pair[1] - pair[0]).num_hours() - 1,
                });
            }
        }
    }

    fn check_metadata(&self, monitor: &Monitor, report: &mut IntegrityReport) {
        for meta in monitor.meta() {
            if let Err(errors) = meta.validate() {
                report.metadata_violations.push(MetadataViolation {
                    device_deployment_id: meta.device_deployment_id.clone(),
                    violation_type: ViolationType::OutOfRange,
                    details: errors.to_string(),
                });
            }

            if let Err(e) = meta.tz() {
                report.metadata_violations.push(MetadataViolation {
                    device_deployment_id: meta.device_deployment_id.clone(),
                    violation_type: ViolationType::UnknownTimezone,
                    details: e.to_string(),
                });
            }
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Time Series: {}\n", report.total_series));
        summary.push_str(&format!("Hours: {}\n", report.total_hours));
        summary.push_str(&format!(
            "Empty Series: {} ({:.1}%)\n",
            report.empty_series.len(),
            percent(report.empty_series.len(), report.total_series)
        ));

        let valid: usize = report.series_statistics.values().map(|s| s.valid_hours).sum();
        summary.push_str(&format!(
            "Valid Values: {} ({:.1}%)\n",
            valid,
            percent(valid, report.total_series * report.total_hours)
        ));
        summary.push_str(&format!("Hourly Gaps: {}\n", report.hourly_gaps.len()));
        summary.push_str(&format!(
            "\nMetadata Violations: {}\n",
            report.metadata_violations.len()
        ));

        if !report.metadata_violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.metadata_violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. {} ({:?}): {}\n",
                    i + 1,
                    violation.device_deployment_id,
                    violation.violation_type,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn series_statistics(values: &[Option<f64>]) -> SeriesStatistics {
    values
        .iter()
        .fold(SeriesStatistics::default(), |mut stats, value| {
            match value {
                Some(v) => {
                    stats.valid_hours += 1;
                    stats.min_pm25 = Some(stats.min_pm25.map_or(*v, |m| m.min(*v)));
                    stats.max_pm25 = Some(stats.max_pm25.map_or(*v, |m| m.max(*v)));
                }
                None => stats.missing_hours += 1,
            }
            stats
        })
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataTable, DeviceMetadata, Series};
    use chrono::TimeZone;

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 7, 15, h, 0, 0).unwrap()
    }

    fn monitor() -> Monitor {
        let meta = vec![
            DeviceMetadata::new("good")
                .with_location("Seattle", -122.33, 47.61)
                .with_timezone("America/Los_Angeles"),
            DeviceMetadata::new("bad")
                .with_location("Nowhere", -200.0, 47.61)
                .with_timezone("Mars/Olympus_Mons"),
        ];
        let data = DataTable::new(
            vec![hour(0), hour(1), hour(4)],
            vec![
                Series::new("good", vec![Some(5.0), None, Some(12.0)]),
                Series::new("bad", vec![None, None, None]),
            ],
        )
        .unwrap();
        Monitor::new(meta, data).unwrap()
    }

    #[test]
    fn test_check_counts_and_statistics() {
        let report = IntegrityChecker::new().check(&monitor());

        assert_eq!(report.total_series, 2);
        assert_eq!(report.total_hours, 3);
        assert_eq!(report.empty_series, vec!["bad".to_string()]);

        let good = &report.series_statistics["good"];
        assert_eq!(good.valid_hours, 2);
        assert_eq!(good.missing_hours, 1);
        assert_eq!(good.min_pm25, Some(5.0));
        assert_eq!(good.max_pm25, Some(12.0));
    }

    #[test]
    fn test_hourly_gaps() {
        let report = IntegrityChecker::new().check(&monitor());
        assert_eq!(
            report.hourly_gaps,
            vec![HourlyGap {
                after: hour(1),
                before: hour(4),
                missing_hours: 2,
            }]
        );
    }

    #[test]
    fn test_reported_gaps_are_capped() {
        let data = DataTable::new(
            vec![hour(0), hour(2), hour(5), hour(9)],
            vec![Series::new("good", vec![Some(1.0); 4])],
        )
        .unwrap();
        let meta = vec![DeviceMetadata::new("good").with_timezone("America/Los_Angeles")];
        let monitor = Monitor::new(meta, data).unwrap();

        assert_eq!(IntegrityChecker::new().check(&monitor).hourly_gaps.len(), 3);

        let report = IntegrityChecker::with_max_reported_gaps(1).check(&monitor);
        assert_eq!(
            report.hourly_gaps,
            vec![HourlyGap {
                after: hour(0),
                before: hour(2),
                missing_hours: 1,
            }]
        );
    }

    #[test]
    fn test_metadata_violations() {
        let report = IntegrityChecker::new().check(&monitor());
        let kinds = report
            .metadata_violations
            .iter()
            .map(|v| (v.device_deployment_id.as_str(), v.violation_type.clone()))
            .collect::<Vec<_>>();

        assert_eq!(
            kinds,
            vec![
                ("bad", ViolationType::OutOfRange),
                ("bad", ViolationType::UnknownTimezone),
            ]
        );
    }

    #[test]
    fn test_generate_summary() {
        let checker = IntegrityChecker::new();
        let summary = checker.generate_summary(&checker.check(&monitor()));

        assert!(summary.contains("Time Series: 2"));
        assert!(summary.contains("Empty Series: 1 (50.0%)"));
        assert!(summary.contains("Hourly Gaps: 1"));
        assert!(summary.contains("Metadata Violations: 2"));
    }

    #[test]
    fn test_empty_monitor() {
        let checker = IntegrityChecker::new();
        let report = checker.check(&Monitor::empty());
        assert_eq!(report.total_series, 0);
        assert!(checker.generate_summary(&report).contains("Valid Values: 0 (0.0%)"));
    }
}
