pub mod aqi;
pub mod constants;
pub mod logging;
pub mod rounding;
pub mod settings;
pub mod solar;

pub use aqi::{pm25_to_color, AqiCategory, AxisBounds};
pub use constants::*;
pub use logging::init_logging;
pub use rounding::{round1, round1_all};
pub use settings::{ErrorPolicy, Settings};
pub use solar::{local_hour_fraction, solar_times, SolarTimes};
