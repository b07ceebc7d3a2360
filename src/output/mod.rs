//! Output module for writing harvested records
//!
//! This module handles:
//! - Exporting records to the delimited output file
//! - Recording and printing run statistics

mod csv;
pub mod stats;

pub use self::csv::{format_csv, write_csv, write_records, QuoteMode, CSV_HEADER};
pub use stats::{print_statistics, CrawlStatistics};
