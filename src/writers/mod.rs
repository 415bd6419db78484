pub mod chart;

pub use chart::{
    ChartHeader, ChartPayload, ChartRenderer, DailyBarChart, DiurnalChart, JsonChartWriter,
    TimeseriesChart,
};
