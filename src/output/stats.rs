//! Run statistics
//!
//! Collected by the coordinator while crawling and printed by the CLI at the
//! end of a run.

use crate::record::AggregateCounters;
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Page count advertised by the listing
    pub pages_discovered: u64,

    /// Pages scheduled after applying the record cap
    pub pages_planned: u64,

    /// Pages fetched and extracted
    pub pages_succeeded: u64,

    /// Pages whose fetch failed
    pub pages_failed: u64,

    /// Records collected
    pub records: u64,

    /// Fields zero-filled because their text did not parse
    pub parse_failures: u64,

    /// When probing started
    pub started_at: DateTime<Utc>,

    /// When the last page task finished
    pub finished_at: DateTime<Utc>,
}

impl CrawlStatistics {
    /// Builds statistics from the aggregate's counters
    pub fn from_counters(
        pages_discovered: u64,
        pages_planned: u64,
        counters: AggregateCounters,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pages_discovered,
            pages_planned,
            pages_succeeded: counters.pages_succeeded,
            pages_failed: counters.pages_failed,
            records: counters.records,
            parse_failures: counters.parse_failures,
            started_at,
            finished_at,
        }
    }

    /// Wall-clock duration of the crawl in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as f64
            / 1000.0
    }

    /// Share of planned pages that were extracted, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_planned == 0 {
            return 0.0;
        }
        (self.pages_succeeded as f64 / self.pages_planned as f64) * 100.0
    }
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Rep-Roster Statistics ===\n");

    println!("Pages:");
    println!("  Discovered: {}", stats.pages_discovered);
    println!("  Planned:    {}", stats.pages_planned);
    println!("  Succeeded:  {}", stats.pages_succeeded);
    println!("  Failed:     {}", stats.pages_failed);
    println!("  Success:    {:.2}%", stats.success_rate());

    println!("\nRecords:");
    println!("  Collected:      {}", stats.records);
    println!("  Parse failures: {}", stats.parse_failures);

    println!("\nTiming:");
    println!("  Started:  {}", stats.started_at.to_rfc3339());
    println!("  Finished: {}", stats.finished_at.to_rfc3339());
    println!("  Duration: {:.2}s", stats.duration_seconds());
}
