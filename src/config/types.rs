use serde::Deserialize;

/// Main configuration structure for vndb-export
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub fetch: FetchConfig,
    pub pagination: PaginationConfig,
    pub output: OutputConfig,
}

/// The site being exported from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL that relative page links are resolved against
    pub host: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: "https://vndb.org".to_string(),
        }
    }
}

/// Per-page request behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per page before the crawl gives up
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Fixed pause between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Value sent in the User-Agent header
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Treat non-2xx responses as page content instead of failures
    #[serde(rename = "accept-error-status")]
    pub accept_error_status: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 1000,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: "Mozilla/5.0".to_string(),
            accept_error_status: false,
        }
    }
}

/// Where the walker finds its pagination signals
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Query key holding the page number
    #[serde(rename = "page-param")]
    pub page_param: String,

    /// Query key marking a non-canonical listing view
    #[serde(rename = "fake-url-marker")]
    pub fake_url_marker: String,

    /// Selector for the "next page" link
    #[serde(rename = "next-selector")]
    pub next_selector: String,

    /// Selector for the link to the first listing page
    #[serde(rename = "first-tab-selector")]
    pub first_tab_selector: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_param: "p".to_string(),
            fake_url_marker: "vnlist".to_string(),
            next_selector: r#".browsetabs a[rel="next"]"#.to_string(),
            first_tab_selector: ".browsetabs a:first-child".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the export file is written to
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
        }
    }
}
