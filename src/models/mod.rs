pub mod data_table;
pub mod metadata;
pub mod monitor;

pub use data_table::{DataTable, JoinKind, Series};
pub use metadata::{parse_timezone, DeviceMetadata};
pub use monitor::{Monitor, SeriesId};
