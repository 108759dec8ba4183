use serde::Deserialize;

/// Main configuration structure for termweave
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Batch crawl behavior configuration
///
/// These values are defaults for new tasks; each task snapshots its own
/// copy at creation time and the scheduler reloads from the task record.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Pacing delay between consecutive term fetches (milliseconds)
    #[serde(rename = "crawl-interval-ms", default = "default_crawl_interval_ms")]
    pub crawl_interval_ms: u64,

    /// Maximum expansion depth; 1 means seeds only
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of newly discovered terms enqueued per crawled term
    #[serde(rename = "fan-out-limit", default = "default_fan_out_limit")]
    pub fan_out_limit: u32,

    /// Languages to fetch for every term
    #[serde(rename = "target-languages", default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Canonical language used for existence checks, cross-language link
    /// resolution, and association extraction
    #[serde(rename = "base-language", default = "default_base_language")]
    pub base_language: String,
}

/// Content source identification and endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Name of the crawler, sent in the User-Agent header
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

    /// API endpoint template; `{lang}` is replaced with the language code
    #[serde(rename = "api-endpoint", default = "default_api_endpoint")]
    pub api_endpoint: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Directory for exported per-term markdown files
    #[serde(rename = "export-dir", default = "default_export_dir")]
    pub export_dir: String,
}

fn default_crawl_interval_ms() -> u64 {
    3000
}

fn default_max_depth() -> u32 {
    1
}

fn default_fan_out_limit() -> u32 {
    10
}

fn default_target_languages() -> Vec<String> {
    vec!["en".to_string(), "zh".to_string()]
}

fn default_base_language() -> String {
    "en".to_string()
}

fn default_api_endpoint() -> String {
    "https://{lang}.wikipedia.org/w/api.php".to_string()
}

fn default_database_path() -> String {
    "./corpus.db".to_string()
}

fn default_export_dir() -> String {
    "./output".to_string()
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            crawl_interval_ms: default_crawl_interval_ms(),
            max_depth: default_max_depth(),
            fan_out_limit: default_fan_out_limit(),
            target_languages: default_target_languages(),
            base_language: default_base_language(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            export_dir: default_export_dir(),
        }
    }
}
