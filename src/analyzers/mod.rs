pub mod pm25_analyzer;
pub mod rolling;
pub mod status;

pub use pm25_analyzer::{daily_average, diurnal_profile, nowcast, DailyAverage, DiurnalProfile, HourMean};
pub use rolling::rolling_mean;
pub use status::{current_status, last_valid_index, StatusRecord};
