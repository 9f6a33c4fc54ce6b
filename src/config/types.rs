use serde::Deserialize;

/// Main configuration structure for Shutter-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub resolver: ResolverConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Scheduling and persistence behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of items resolved at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Number of buffered records that triggers a write to the store
    #[serde(rename = "flush-threshold", default = "default_flush_threshold")]
    pub flush_threshold: u32,

    /// Upper bound on a single item's resolution (seconds, 0 disables)
    #[serde(rename = "item-timeout-secs", default = "default_item_timeout_secs")]
    pub item_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            flush_threshold: default_flush_threshold(),
            item_timeout_secs: default_item_timeout_secs(),
        }
    }
}

fn default_concurrency() -> u32 {
    4
}

fn default_flush_threshold() -> u32 {
    10
}

fn default_item_timeout_secs() -> u64 {
    120
}

/// How item pages are addressed and which requests count as the photo
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Page address with `{owner}` and `{item}` placeholders
    #[serde(rename = "page-template")]
    pub page_template: String,

    /// Raster extensions a captured request must end with (without the dot)
    #[serde(rename = "image-extensions", default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// Filename marker of the reduced-size rendition
    #[serde(rename = "small-suffix", default = "default_small_suffix")]
    pub small_suffix: String,
}

fn default_image_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "png".to_string()]
}

fn default_small_suffix() -> String {
    "_s".to_string()
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Source dataset location
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// CSV file with at least `user` and `id` columns
    #[serde(rename = "dataset-path")]
    pub dataset_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Append-only CSV store of resolved records
    #[serde(rename = "store-path")]
    pub store_path: String,

    /// Previously cleaned output copied forward when the store is missing
    #[serde(rename = "seed-path", default)]
    pub seed_path: Option<String>,
}
