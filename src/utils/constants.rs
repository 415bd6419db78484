/// Sentinel used for missing cells in the AirFire CSV exports
pub const NA_SENTINEL: &str = "NA";

/// Name of the first column of every data file
pub const DATETIME_COLUMN: &str = "datetime";

/// Core metadata columns, in the order a parsed meta table carries them
pub const CORE_METADATA_NAMES: [&str; 18] = [
    "deviceDeploymentID",
    "deviceID",
    "deviceType",
    "deviceDescription",
    "pollutant",
    "units",
    "dataIngestSource",
    "locationID",
    "locationName",
    "longitude",
    "latitude",
    "elevation",
    "countryCode",
    "stateCode",
    "countyName",
    "timezone",
    "AQSID",
    "fullAQSID",
];

/// Archive defaults
pub const DEFAULT_ARCHIVE_BASE_URL: &str =
    "https://airfire-data-exports.s3.us-west-2.amazonaws.com/monitoring/v2";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Rolling window widths, in hours
pub const NOWCAST_WINDOW_HOURS: usize = 3;
pub const DAILY_WINDOW_HOURS: usize = 24;

/// Number of full days used for the diurnal climatology
pub const DIURNAL_CLIMATOLOGY_DAYS: usize = 7;

/// AQI breakpoints for PM2.5 (µg/m³), upper bound of each category
pub const AQI_GOOD_MAX: f64 = 12.0;
pub const AQI_MODERATE_MAX: f64 = 35.5;
pub const AQI_USG_MAX: f64 = 55.5;
pub const AQI_UNHEALTHY_MAX: f64 = 105.5;
pub const AQI_VERY_UNHEALTHY_MAX: f64 = 250.0;

/// Seconds in one hourly step of the data table
pub const SECONDS_PER_HOUR: i64 = 3600;
