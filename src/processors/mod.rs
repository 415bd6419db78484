pub mod combiner;
pub mod integrity_checker;

pub use combiner::{combine_aaw, combine_all};
pub use integrity_checker::{
    HourlyGap, IntegrityChecker, IntegrityReport, MetadataViolation, SeriesStatistics,
    ViolationType,
};
