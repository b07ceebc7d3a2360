//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a run through its phases:
//! - Probing the listing root for the page count
//! - Capping the page range by the record budget
//! - Fetching every page under the global concurrency ceiling
//! - Waiting for all page tasks before handing records to the exporter

use crate::config::{validate, Config};
use crate::crawler::extractor::{MarkupSelectors, PageExtractor};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::prober::PaginationProber;
use crate::output::{write_records, CrawlStatistics, QuoteMode};
use crate::record::{Aggregate, Record};
use crate::state::PipelineState;
use crate::{ConfigError, RosterError};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Records and statistics from a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Collected records, in completion order
    pub records: Vec<Record>,

    /// Counters gathered while crawling
    pub stats: CrawlStatistics,
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Crawl statistics
    pub stats: CrawlStatistics,

    /// File the records were written to
    pub output_path: PathBuf,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    selectors: Arc<MarkupSelectors>,
    extractor: Arc<PageExtractor>,
    state: PipelineState,
}

impl Coordinator {
    /// Creates a coordinator backed by a real HTTP client
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(RosterError::Config)` - Invalid configuration or client setup failure
    pub fn new(config: Config) -> Result<Self, RosterError> {
        let fetcher = HttpFetcher::from_config(&config.user_agent, &config.crawler)
            .map_err(ConfigError::HttpClient)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates a coordinator using the given fetcher
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, RosterError> {
        validate(&config)?;
        let selectors = Arc::new(MarkupSelectors::compile(&config.markup)?);
        let extractor = Arc::new(PageExtractor::new(Arc::clone(&selectors)));

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            selectors,
            extractor,
            state: PipelineState::Init,
        })
    }

    /// Current pipeline state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) -> Result<(), RosterError> {
        if !self.state.can_transition_to(next) {
            return Err(RosterError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Pipeline {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn fail<T>(&mut self, error: RosterError) -> Result<T, RosterError> {
        self.state = PipelineState::Failed;
        Err(error)
    }

    /// Runs the full pipeline: probe, crawl, then export
    ///
    /// The output file is only written when the crawl finished without error,
    /// so an aborted crawl never produces a partial export.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rep_roster::config::Config;
    /// use rep_roster::crawler::Coordinator;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut coordinator = Coordinator::new(Config::default())?;
    /// let report = coordinator.run().await?;
    /// println!("{} records", report.stats.records);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&mut self) -> Result<RunReport, RosterError> {
        let outcome = self.crawl().await?;

        self.transition(PipelineState::Exporting)?;
        let output_path = PathBuf::from(&self.config.output.csv_path);
        let mode = QuoteMode::from_escape_flag(self.config.output.escape_quotes);
        tracing::info!("Writing {} records to {}", outcome.records.len(), output_path.display());

        if let Err(e) = write_records(&outcome.records, &output_path, mode) {
            return self.fail(e.into());
        }

        self.transition(PipelineState::Done)?;
        Ok(RunReport {
            stats: outcome.stats,
            output_path,
        })
    }

    /// Probes the listing and fetches every page in the capped range
    ///
    /// # Algorithm
    ///
    /// 1. Discover the advertised page count (one fetch)
    /// 2. `max_pages = min(discovered, ceil(record_cap / records_per_page))`
    /// 3. Spawn one task per page, each holding a semaphore permit
    /// 4. Wait for every spawned task, even when issuing stopped early
    pub async fn crawl(&mut self) -> Result<CrawlOutcome, RosterError> {
        self.transition(PipelineState::Probing)?;
        let started_at = Utc::now();

        let discovered = match self.probe().await {
            Ok(pages) => pages,
            Err(e) => return self.fail(e),
        };

        self.transition(PipelineState::Crawling)?;
        let max_pages = self.config.crawler.max_pages(discovered);
        tracing::info!(
            "Crawling {} of {} page(s) with up to {} concurrent fetches",
            max_pages,
            discovered,
            self.config.crawler.max_concurrent_fetches
        );

        let aggregate = Aggregate::with_capacity(self.config.crawler.capacity_hint(max_pages));
        if let Err(e) = self.fetch_pages(max_pages, &aggregate).await {
            return self.fail(e);
        }

        let stats = CrawlStatistics::from_counters(
            discovered,
            max_pages,
            aggregate.counters(),
            started_at,
            Utc::now(),
        );
        tracing::info!(
            "Crawl finished: {} records from {} page(s), {} page(s) failed, {} parse failure(s)",
            stats.records,
            stats.pages_succeeded,
            stats.pages_failed,
            stats.parse_failures
        );

        Ok(CrawlOutcome {
            records: aggregate.take_records(),
            stats,
        })
    }

    async fn probe(&self) -> Result<u64, RosterError> {
        let root_url = self.config.site.root_url()?;
        let prober = PaginationProber::new(self.fetcher.clone(), self.selectors.clone(), root_url);
        prober.discover_max_pages().await
    }

    /// Issues pages `1..=max_pages` and waits for all of them
    ///
    /// An issue failure stops further pages from being queued but in-flight
    /// pages still run to completion before the error is returned.
    async fn fetch_pages(&self, max_pages: u64, aggregate: &Aggregate) -> Result<(), RosterError> {
        let semaphore = Arc::new(Semaphore::new(
            self.config.crawler.max_concurrent_fetches as usize,
        ));
        let mut tasks = JoinSet::new();
        let mut issue_error = None;

        for page in 1..=max_pages {
            let url = match self.config.site.page_url(page) {
                Ok(url) => url,
                Err(e) => {
                    issue_error = Some(RosterError::Issue {
                        page,
                        message: e.to_string(),
                    });
                    break;
                }
            };

            // Blocks while the ceiling is reached
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    issue_error = Some(RosterError::Issue {
                        page,
                        message: e.to_string(),
                    });
                    break;
                }
            };

            let fetcher = self.fetcher.clone();
            let extractor = self.extractor.clone();
            let aggregate = aggregate.clone();
            tasks.spawn(async move {
                let _permit = permit;
                process_page(page, url, fetcher.as_ref(), &extractor, &aggregate).await;
            });
        }

        if let Some(e) = &issue_error {
            tracing::error!("{}; waiting for {} in-flight page(s)", e, tasks.len());
        }

        let mut join_error = None;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Page task failed: {}", e);
                if join_error.is_none() {
                    join_error = Some(e);
                }
            }
        }

        if let Some(e) = issue_error {
            return Err(e);
        }
        if let Some(e) = join_error {
            return Err(e.into());
        }
        Ok(())
    }
}

/// Fetches one page and appends its records to the aggregate
///
/// Fetch failures are logged and counted; they never abort the crawl.
async fn process_page(
    page: u64,
    url: Url,
    fetcher: &dyn Fetcher,
    extractor: &PageExtractor,
    aggregate: &Aggregate,
) {
    let body = match fetcher.fetch(&url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Page {} failed: {}", page, e);
            aggregate.record_page_failed();
            return;
        }
    };

    let extraction = extractor.extract(&body);
    let found = extraction.records.len();
    aggregate.record_parse_failures(extraction.parse_failures);

    for record in extraction.records {
        let scraped = aggregate.append(record);
        tracing::debug!("Scraped {} users", scraped);
    }

    let pages_done = aggregate.record_page_done();
    tracing::info!(
        "Page {}: {} record(s), {} page(s) done, {} record(s) total",
        page,
        found,
        pages_done,
        aggregate.counters().records
    );
}
