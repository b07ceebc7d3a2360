//! Configuration module for Rep-Roster
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every value has a default matching the public user listing, so the file is
//! optional.
//!
//! # Example
//!
//! ```no_run
//! use rep_roster::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("roster.toml")).unwrap();
//! println!("Record cap: {}", config.crawler.record_cap);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, MarkupConfig, OutputConfig, SiteConfig, UserAgentConfig,
    MAX_PRESIZED_RECORDS, PAGE_PLACEHOLDER,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::{compile_selector, validate, MAX_CONCURRENT_FETCHES, MAX_RECORD_CAP};
