//! Pagination probing
//!
//! Visits the listing root once and reads the pagination control to learn how
//! many pages the listing advertises.

use crate::crawler::extractor::{element_text, MarkupSelectors};
use crate::crawler::fetcher::Fetcher;
use crate::record::parse_page_number;
use crate::RosterError;
use scraper::Html;
use std::sync::Arc;
use url::Url;

/// Page count assumed when the listing has no pagination control
pub const MIN_PAGE_COUNT: u64 = 1;

/// Discovers the highest page index of a listing
pub struct PaginationProber {
    fetcher: Arc<dyn Fetcher>,
    selectors: Arc<MarkupSelectors>,
    root_url: Url,
}

impl PaginationProber {
    /// Creates a prober for the listing at `root_url`
    pub fn new(fetcher: Arc<dyn Fetcher>, selectors: Arc<MarkupSelectors>, root_url: Url) -> Self {
        Self {
            fetcher,
            selectors,
            root_url,
        }
    }

    /// Fetches the listing root and returns the advertised page count
    ///
    /// Only the fetch itself can fail; pagination items that are not numbers
    /// are skipped silently.
    pub async fn discover_max_pages(&self) -> Result<u64, RosterError> {
        tracing::debug!("Probing {} for page count", self.root_url);

        let body = self
            .fetcher
            .fetch(&self.root_url)
            .await
            .map_err(|source| RosterError::Probe {
                url: self.root_url.to_string(),
                source,
            })?;

        let max_pages = max_page_number(&self.selectors, &body);
        tracing::info!("Listing advertises {} page(s)", max_pages);
        Ok(max_pages)
    }
}

/// Highest numeric pagination item in `html`, or [`MIN_PAGE_COUNT`]
pub fn max_page_number(selectors: &MarkupSelectors, html: &str) -> u64 {
    let document = Html::parse_document(html);

    document
        .select(&selectors.pagination)
        .flat_map(|control| control.select(&selectors.pagination_item))
        .filter_map(|item| parse_page_number(&element_text(item)))
        .fold(MIN_PAGE_COUNT, u64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkupConfig;
    use crate::FetchError;

    fn selectors() -> MarkupSelectors {
        MarkupSelectors::compile(&MarkupConfig::default()).unwrap()
    }

    fn pagination(items: &[&str]) -> String {
        let items: String = items
            .iter()
            .map(|i| format!(r#"<a class="s-pagination--item" href="?page={0}">{0}</a>"#, i))
            .collect();
        format!(r#"<html><body><div class="s-pagination">{}</div></body></html>"#, items)
    }

    struct StaticFetcher(Result<String, u16>);

    #[async_trait::async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            self.0.clone().map_err(|status| FetchError::Status {
                url: url.to_string(),
                status,
            })
        }
    }

    fn prober(response: Result<String, u16>) -> PaginationProber {
        PaginationProber::new(
            Arc::new(StaticFetcher(response)),
            Arc::new(selectors()),
            Url::parse("https://example.com/users").unwrap(),
        )
    }

    #[test]
    fn test_max_of_numeric_items() {
        let html = pagination(&["1", "2", "...", "7", "Next"]);
        assert_eq!(max_page_number(&selectors(), &html), 7);
    }

    #[test]
    fn test_items_out_of_order() {
        let html = pagination(&["Prev", "40", "3", "12"]);
        assert_eq!(max_page_number(&selectors(), &html), 40);
    }

    #[test]
    fn test_no_pagination_control() {
        let html = "<html><body><p>Just one page</p></body></html>";
        assert_eq!(max_page_number(&selectors(), html), 1);
    }

    #[test]
    fn test_only_non_numeric_items() {
        let html = pagination(&["…", "Next"]);
        assert_eq!(max_page_number(&selectors(), &html), 1);
    }

    #[test]
    fn test_items_outside_control_ignored() {
        let html = format!(
            r#"{}<a class="s-pagination--item">999</a>"#,
            pagination(&["1", "2"])
        );
        assert_eq!(max_page_number(&selectors(), &html), 2);
    }

    #[tokio::test]
    async fn test_discover_max_pages() {
        let prober = prober(Ok(pagination(&["1", "2", "3", "...", "81234", "Next"])));
        assert_eq!(prober.discover_max_pages().await.unwrap(), 81_234);
    }

    #[tokio::test]
    async fn test_discover_propagates_fetch_error() {
        let prober = prober(Err(500));
        let err = prober.discover_max_pages().await.unwrap_err();
        assert!(matches!(err, RosterError::Probe { .. }));
    }
}
