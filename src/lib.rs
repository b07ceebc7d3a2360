//! Rep-Roster: a paginated user-listing harvester
//!
//! This crate discovers how many pages a user listing advertises, fetches
//! every page under a global concurrency ceiling, extracts one record per
//! user card and writes the collected records to a delimited text file.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod state;

use thiserror::Error;

/// Main error type for Rep-Roster operations
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to discover page count from {url}: {source}")]
    Probe { url: String, source: FetchError },

    #[error("Failed to issue request for page {page}: {message}")]
    Issue { page: u64, message: String },

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Page task failed to complete: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PipelineState,
        to: state::PipelineState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors raised by the fetch engine
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised while writing the output file
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for Rep-Roster operations
pub type Result<T> = std::result::Result<T, RosterError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for export operations
pub type ExportResult<T> = std::result::Result<T, ExportError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, Fetcher, HttpFetcher};
pub use output::{write_records, CrawlStatistics};
pub use record::{Aggregate, Record};
pub use state::PipelineState;
