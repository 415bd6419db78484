pub mod analyzers;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use error::{MonitorError, Result};
pub use models::{DeviceMetadata, Monitor, SeriesId};
