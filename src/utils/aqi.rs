use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    AQI_GOOD_MAX, AQI_MODERATE_MAX, AQI_UNHEALTHY_MAX, AQI_USG_MAX, AQI_VERY_UNHEALTHY_MAX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_pm25(pm25: f64) -> Self {
        if pm25 <= AQI_GOOD_MAX {
            AqiCategory::Good
        } else if pm25 <= AQI_MODERATE_MAX {
            AqiCategory::Moderate
        } else if pm25 <= AQI_USG_MAX {
            AqiCategory::UnhealthyForSensitiveGroups
        } else if pm25 <= AQI_UNHEALTHY_MAX {
            AqiCategory::Unhealthy
        } else if pm25 <= AQI_VERY_UNHEALTHY_MAX {
            AqiCategory::VeryUnhealthy
        } else {
            AqiCategory::Hazardous
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "rgb(0,255,0)",
            AqiCategory::Moderate => "rgb(255,255,0)",
            AqiCategory::UnhealthyForSensitiveGroups => "rgb(255,126,0)",
            AqiCategory::Unhealthy => "rgb(255,0,0)",
            AqiCategory::VeryUnhealthy => "rgb(143,63,151)",
            AqiCategory::Hazardous => "rgb(126,0,35)",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Color for a possibly-missing value; missing values get no color
pub fn pm25_to_color(pm25: Option<f64>) -> Option<&'static str> {
    pm25.filter(|v| v.is_finite())
        .map(|v| AqiCategory::from_pm25(v).color())
}

/// Vertical axis bounds for PM2.5 charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    /// Snap the upper bound to a fixed ladder so charts stay visually stable
    /// as new hours arrive.
    pub fn for_pm25(values: &[Option<f64>]) -> Self {
        let max_pm25 = values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);

        let max = if max_pm25 <= 50.0 {
            50.0
        } else if max_pm25 <= 100.0 {
            100.0
        } else if max_pm25 <= 200.0 {
            200.0
        } else if max_pm25 <= 400.0 {
            500.0
        } else if max_pm25 <= 600.0 {
            600.0
        } else if max_pm25 <= 1000.0 {
            1000.0
        } else if max_pm25 <= 1500.0 {
            1500.0
        } else {
            1.05 * max_pm25
        };

        Self { min: 0.0, max }
    }
}
