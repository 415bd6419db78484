use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{MonitorError, Result};

/// One row of the `meta` table: a single monitoring site/deployment.
///
/// Every field except `device_deployment_id` may be missing in the upstream
/// exports (`"NA"`), so they are all optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetadata {
    #[serde(rename = "deviceDeploymentID")]
    #[validate(length(min = 1))]
    pub device_deployment_id: String,

    #[serde(rename = "deviceID")]
    pub device_id: Option<String>,
    pub device_type: Option<String>,
    pub device_description: Option<String>,
    pub pollutant: Option<String>,
    pub units: Option<String>,
    pub data_ingest_source: Option<String>,

    #[serde(rename = "locationID")]
    pub location_id: Option<String>,
    pub location_name: Option<String>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    pub elevation: Option<f64>,
    pub country_code: Option<String>,
    pub state_code: Option<String>,
    pub county_name: Option<String>,
    pub timezone: Option<String>,

    #[serde(rename = "AQSID")]
    pub aqsid: Option<String>,

    #[serde(rename = "fullAQSID")]
    pub full_aqsid: Option<String>,
}

impl DeviceMetadata {
    /// A row carrying only its key; everything else missing
    pub fn new(device_deployment_id: impl Into<String>) -> Self {
        Self {
            device_deployment_id: device_deployment_id.into(),
            device_id: None,
            device_type: None,
            device_description: None,
            pollutant: None,
            units: None,
            data_ingest_source: None,
            location_id: None,
            location_name: None,
            longitude: None,
            latitude: None,
            elevation: None,
            country_code: None,
            state_code: None,
            county_name: None,
            timezone: None,
            aqsid: None,
            full_aqsid: None,
        }
    }

    pub fn with_location(mut self, name: &str, longitude: f64, latitude: f64) -> Self {
        self.location_name = Some(name.to_string());
        self.longitude = Some(longitude);
        self.latitude = Some(latitude);
        self
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = Some(timezone.to_string());
        self
    }

    /// Parsed IANA timezone of the site
    pub fn tz(&self) -> Result<Tz> {
        let name = self.timezone.as_deref().ok_or_else(|| {
            MonitorError::InvalidTimezone(format!(
                "no timezone recorded for {}",
                self.device_deployment_id
            ))
        })?;
        parse_timezone(name)
    }

    /// Value of a core metadata column rendered as text, `None` when missing
    pub fn get(&self, column: &str) -> Option<String> {
        match column {
            "deviceDeploymentID" => Some(self.device_deployment_id.clone()),
            "deviceID" => self.device_id.clone(),
            "deviceType" => self.device_type.clone(),
            "deviceDescription" => self.device_description.clone(),
            "pollutant" => self.pollutant.clone(),
            "units" => self.units.clone(),
            "dataIngestSource" => self.data_ingest_source.clone(),
            "locationID" => self.location_id.clone(),
            "locationName" => self.location_name.clone(),
            "longitude" => self.longitude.map(|v| v.to_string()),
            "latitude" => self.latitude.map(|v| v.to_string()),
            "elevation" => self.elevation.map(|v| v.to_string()),
            "countryCode" => self.country_code.clone(),
            "stateCode" => self.state_code.clone(),
            "countyName" => self.county_name.clone(),
            "timezone" => self.timezone.clone(),
            "AQSID" => self.aqsid.clone(),
            "fullAQSID" => self.full_aqsid.clone(),
            _ => None,
        }
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| MonitorError::InvalidTimezone(name.to_string()))
}
