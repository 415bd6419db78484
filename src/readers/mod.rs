pub mod csv_table;
pub mod data_parser;
pub mod loader;
pub mod meta_parser;

pub use csv_table::RawTable;
pub use data_parser::{parse_datetime, DataParser, NegativeValues};
pub use loader::{
    Feed, FileKind, HttpTableSource, LiveMonitor, MonitorLoader, Provider, StaticTableSource,
    TableSource, Timespan,
};
pub use meta_parser::MetaParser;
