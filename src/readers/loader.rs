use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

use crate::error::{MonitorError, Result};
use crate::models::{DeviceMetadata, Monitor};
use crate::processors::combine_aaw;
use crate::readers::csv_table::RawTable;
use crate::readers::data_parser::DataParser;
use crate::readers::meta_parser::MetaParser;
use crate::utils::settings::{ErrorPolicy, Settings};

/// Upstream data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Airnow,
    Airsis,
    Wrcc,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Airnow => "airnow",
            Provider::Airsis => "airsis",
            Provider::Wrcc => "wrcc",
        }
    }
}

impl FromStr for Provider {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "airnow" => Ok(Provider::Airnow),
            "airsis" => Ok(Provider::Airsis),
            "wrcc" => Ok(Provider::Wrcc),
            other => Err(MonitorError::InvalidFormat(format!(
                "unknown provider '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Archive time span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timespan {
    /// The most recent ten days, updated every few minutes
    Latest,
    /// The most recent 45 days, updated once a day
    Daily,
}

impl Timespan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timespan::Latest => "latest",
            Timespan::Daily => "daily",
        }
    }
}

impl std::fmt::Display for Timespan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Meta,
    Data,
}

impl FileKind {
    fn as_str(&self) -> &'static str {
        match self {
            FileKind::Meta => "meta",
            FileKind::Data => "data",
        }
    }
}

/// Fetches raw CSV text by URL.
pub trait TableSource {
    fn load_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// [`TableSource`] over HTTP(S).
#[derive(Clone)]
pub struct HttpTableSource {
    client: reqwest::Client,
}

impl HttpTableSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.request_timeout())
    }
}

impl TableSource for HttpTableSource {
    async fn load_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| MonitorError::load(url, e))?;

        response.text().await.map_err(|e| MonitorError::load(url, e))
    }
}

/// [`TableSource`] serving fixed documents from memory.
#[derive(Debug, Clone, Default)]
pub struct StaticTableSource {
    documents: HashMap<String, String>,
}

impl StaticTableSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(url.into(), text.into());
    }
}

impl TableSource for StaticTableSource {
    async fn load_text(&self, url: &str) -> Result<String> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| MonitorError::load(url, "404 Not Found"))
    }
}

/// Loads provider monitors from the monitoring v2 archive layout.
pub struct MonitorLoader<S> {
    source: S,
    archive_base_url: String,
    meta_parser: MetaParser,
    data_parser: DataParser,
}

impl<S: TableSource + Sync> MonitorLoader<S> {
    pub fn new(source: S, archive_base_url: &str) -> Self {
        Self {
            source,
            archive_base_url: archive_base_url.trim_end_matches('/').to_string(),
            meta_parser: MetaParser::new(),
            data_parser: DataParser::new(),
        }
    }

    /// Loader over `source` rooted at the configured archive
    pub fn with_settings(source: S, settings: &Settings) -> Self {
        Self::new(source, &settings.archive_base_url)
    }

    pub fn with_data_parser(mut self, data_parser: DataParser) -> Self {
        self.data_parser = data_parser;
        self
    }

    /// `{base}/{timespan}/data/{provider}_PM2.5_{timespan}_{meta|data}.csv`
    pub fn url(&self, provider: Provider, timespan: Timespan, kind: FileKind) -> String {
        format!(
            "{}/{}/data/{}_PM2.5_{}_{}.csv",
            self.archive_base_url,
            timespan.as_str(),
            provider.as_str(),
            timespan.as_str(),
            kind.as_str()
        )
    }

    pub async fn load_latest(&self, provider: Provider) -> Result<Monitor> {
        self.load(provider, Timespan::Latest).await
    }

    pub async fn load_daily(&self, provider: Provider) -> Result<Monitor> {
        self.load(provider, Timespan::Daily).await
    }

    /// Fetch meta and data concurrently, then parse both.
    pub async fn load(&self, provider: Provider, timespan: Timespan) -> Result<Monitor> {
        let meta_url = self.url(provider, timespan, FileKind::Meta);
        let data_url = self.url(provider, timespan, FileKind::Data);

        let (meta_text, data_text) = tokio::try_join!(
            self.source.load_text(&meta_url),
            self.source.load_text(&data_url)
        )?;

        let meta_table =
            RawTable::from_csv(&meta_text).map_err(|e| MonitorError::load(&meta_url, e))?;
        let data_table =
            RawTable::from_csv(&data_text).map_err(|e| MonitorError::load(&data_url, e))?;

        let meta = self.meta_parser.parse(&meta_table)?;
        let data = self.data_parser.parse(&data_table)?;
        let monitor = align(meta, data)?;

        info!(
            "Loaded {} {} monitor: {} series over {} hours",
            provider,
            timespan,
            monitor.count(),
            monitor.data().num_rows()
        );

        Ok(monitor)
    }

    /// Load all three providers and merge them with [`combine_aaw`].
    pub async fn load_combined(&self, timespan: Timespan) -> Result<Monitor> {
        let (airnow, airsis, wrcc) = tokio::try_join!(
            self.load(Provider::Airnow, timespan),
            self.load(Provider::Airsis, timespan),
            self.load(Provider::Wrcc, timespan)
        )?;

        Ok(combine_aaw(&airnow, &airsis, &wrcc))
    }
}

impl MonitorLoader<HttpTableSource> {
    /// HTTP loader using the configured archive and request timeout
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let source = HttpTableSource::from_settings(settings)?;
        Ok(Self::with_settings(source, settings))
    }
}

/// Order `data` columns to follow `meta`; every id must appear on both sides.
fn align(meta: Vec<DeviceMetadata>, data: crate::models::DataTable) -> Result<Monitor> {
    let indices = meta
        .iter()
        .map(|m| {
            data.ids()
                .iter()
                .position(|id| *id == m.device_deployment_id)
                .ok_or_else(|| {
                    MonitorError::Schema(format!(
                        "no data column for deviceDeploymentID {}",
                        m.device_deployment_id
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    if indices.len() != data.num_series() {
        return Err(MonitorError::Schema(format!(
            "data has {} series but meta describes {}",
            data.num_series(),
            indices.len()
        )));
    }

    Monitor::new(meta, data.pick(&indices))
}

/// Which archive files a [`LiveMonitor`] follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Single(Provider),
    /// AirNow, AIRSIS and WRCC combined
    Combined,
}

/// A monitor that is periodically refreshed from the archive.
///
/// The current monitor is only ever replaced by a complete, successful load.
pub struct LiveMonitor<S> {
    loader: MonitorLoader<S>,
    feed: Feed,
    timespan: Timespan,
    policy: ErrorPolicy,
    current: Monitor,
    last_updated: Option<DateTime<Utc>>,
}

impl<S: TableSource + Sync> LiveMonitor<S> {
    pub fn new(loader: MonitorLoader<S>, feed: Feed, timespan: Timespan) -> Self {
        Self {
            loader,
            feed,
            timespan,
            policy: ErrorPolicy::default(),
            current: Monitor::empty(),
            last_updated: None,
        }
    }

    /// Live monitor that applies the configured [`ErrorPolicy`]
    pub fn from_settings(
        loader: MonitorLoader<S>,
        feed: Feed,
        timespan: Timespan,
        settings: &Settings,
    ) -> Self {
        Self::new(loader, feed, timespan).with_error_policy(settings.error_policy)
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn current(&self) -> &Monitor {
        &self.current
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub async fn refresh(&mut self) -> Result<&Monitor> {
        let result = match self.feed {
            Feed::Single(provider) => self.loader.load(provider, self.timespan).await,
            Feed::Combined => self.loader.load_combined(self.timespan).await,
        };

        match result {
            Ok(monitor) => {
                self.current = monitor;
                self.last_updated = Some(Utc::now());
                Ok(&self.current)
            }
            Err(e) if self.policy == ErrorPolicy::KeepLastGood => {
                error!("Refresh of {:?} failed, keeping previous data: {}", self.feed, e);
                Ok(&self.current)
            }
            Err(e) => Err(e),
        }
    }
}
