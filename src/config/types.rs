use serde::Deserialize;

/// Main configuration structure for Catalog-Sync
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// Crawl walk and scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First page of the category listing
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Site origin that relative next-page links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Gap between the end of one cycle and the start of the next (seconds)
    #[serde(rename = "interval-secs", default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Pause between consecutive page fetches within one walk (milliseconds)
    #[serde(rename = "page-delay-ms", default)]
    pub page_delay_ms: u64,

    /// Hard ceiling on pages fetched in a single walk
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every page request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Change notifier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Events buffered per channel subscriber before further events are dropped
    #[serde(rename = "channel-capacity", default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_interval_secs() -> u64 {
    10
}

fn default_max_pages() -> usize {
    500
}

fn default_user_agent() -> String {
    crate::crawler::DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_channel_capacity() -> usize {
    64
}
