use crate::FetchError;
use serde::Deserialize;
use url::Url;

/// Placeholder replaced by the page number in [`SiteConfig::page_url_template`]
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Largest number of records the aggregate reserves up front
pub const MAX_PRESIZED_RECORDS: usize = 1 << 16;

/// Main configuration structure for Rep-Roster
///
/// Every section falls back to the reference deployment when omitted, so an
/// empty file (or no file at all) crawls the public user listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub markup: MarkupConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target listing URLs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Listing root, visited once to discover the page count
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Per-page URL; `{page}` is replaced by the 1-based page number
    #[serde(rename = "page-url-template")]
    pub page_url_template: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_url: "https://stackoverflow.com/users".to_string(),
            page_url_template:
                "https://stackoverflow.com/users?page={page}&tab=Reputation&filter=month"
                    .to_string(),
        }
    }
}

impl SiteConfig {
    /// Parses the listing root URL
    pub fn root_url(&self) -> Result<Url, FetchError> {
        Url::parse(&self.root_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.root_url, e)))
    }

    /// Renders the URL for a single listing page
    pub fn page_url(&self, page: u64) -> Result<Url, FetchError> {
        let rendered = self
            .page_url_template
            .replace(PAGE_PLACEHOLDER, &page.to_string());
        Url::parse(&rendered).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", rendered, e)))
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of page fetches in flight at once
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Upper bound on the number of records the crawl will attempt to collect
    #[serde(rename = "record-cap")]
    pub record_cap: u64,

    /// Records the listing shows on a full page
    #[serde(rename = "records-per-page")]
    pub records_per_page: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// TCP connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 50,
            record_cap: 1_000_000,
            records_per_page: 36,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl CrawlerConfig {
    /// Number of pages the record cap allows, rounded up
    pub fn page_budget(&self) -> u64 {
        self.record_cap.div_ceil(self.records_per_page.max(1))
    }

    /// Caps a discovered page count by the record budget
    ///
    /// The result is never below 1, so a listing without pagination still
    /// gets its first page fetched.
    pub fn max_pages(&self, discovered: u64) -> u64 {
        discovered.min(self.page_budget()).max(1)
    }

    /// Capacity hint for the aggregate
    ///
    /// Clamped to [`MAX_PRESIZED_RECORDS`]; the aggregate grows past it on
    /// demand.
    pub fn capacity_hint(&self, max_pages: u64) -> usize {
        let wanted = max_pages
            .saturating_mul(self.records_per_page)
            .min(MAX_PRESIZED_RECORDS as u64);
        usize::try_from(wanted).unwrap_or(MAX_PRESIZED_RECORDS)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler, appended when non-empty
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "rep-roster".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: String::new(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        if self.contact_url.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            )
        }
    }
}

/// CSS selectors and class discriminators describing the listing markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MarkupConfig {
    /// Pagination control container
    pub pagination: String,
    /// Individual page links inside the pagination control
    pub pagination_item: String,
    /// One user card
    pub section: String,
    /// Structural sub-sections of a card, routed by their class attribute
    pub sub_section: String,
    /// Class of the name/location sub-section
    pub details_class: String,
    /// Name node inside the details sub-section
    pub name: String,
    /// Location node inside the details sub-section
    pub location: String,
    /// Class of the reputation sub-section
    pub reputation_class: String,
    /// Reputation score node inside the reputation sub-section
    pub reputation: String,
    /// Class of the tags sub-section
    pub tags_class: String,
    /// Tag link inside the tags sub-section
    pub tag: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            pagination: ".s-pagination".to_string(),
            pagination_item: ".s-pagination--item".to_string(),
            section: ".user-info".to_string(),
            sub_section: "div".to_string(),
            details_class: "user-details".to_string(),
            name: "a".to_string(),
            location: ".user-location".to_string(),
            reputation_class: "-flair".to_string(),
            reputation: ".reputation-score".to_string(),
            tags_class: "user-tags".to_string(),
            tag: "a".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the delimited output file (overwritten on every run)
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Double embedded quotes in string fields instead of writing them verbatim
    #[serde(rename = "escape-quotes")]
    pub escape_quotes: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "data.csv".to_string(),
            escape_quotes: false,
        }
    }
}
