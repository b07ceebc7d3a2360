//! User card extraction
//!
//! Parses one listing page and turns every matched user card into a
//! [`Record`]. Extraction is pull-based: the caller hands over the page body
//! and receives the records, so nothing here touches the network or the
//! shared aggregate.

use crate::config::{compile_selector, MarkupConfig};
use crate::record::{parse_reputation, Record};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;

/// Compiled form of [`MarkupConfig`]
#[derive(Debug, Clone)]
pub struct MarkupSelectors {
    pub pagination: Selector,
    pub pagination_item: Selector,
    pub section: Selector,
    pub sub_section: Selector,
    pub name: Selector,
    pub location: Selector,
    pub reputation: Selector,
    pub tag: Selector,
    pub details_class: String,
    pub reputation_class: String,
    pub tags_class: String,
}

impl MarkupSelectors {
    /// Compiles every selector in the markup configuration
    pub fn compile(config: &MarkupConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            pagination: compile_selector("pagination", &config.pagination)?,
            pagination_item: compile_selector("pagination_item", &config.pagination_item)?,
            section: compile_selector("section", &config.section)?,
            sub_section: compile_selector("sub_section", &config.sub_section)?,
            name: compile_selector("name", &config.name)?,
            location: compile_selector("location", &config.location)?,
            reputation: compile_selector("reputation", &config.reputation)?,
            tag: compile_selector("tag", &config.tag)?,
            details_class: config.details_class.clone(),
            reputation_class: config.reputation_class.clone(),
            tags_class: config.tags_class.clone(),
        })
    }
}

/// Records found on one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    /// One record per matched user card, in document order
    pub records: Vec<Record>,

    /// Fields that failed to parse and were zero-filled
    pub parse_failures: u64,
}

/// Which part of a card a sub-section carries
enum SubSection {
    Details,
    Reputation,
    Tags,
}

/// Extracts user records from listing pages
#[derive(Debug, Clone)]
pub struct PageExtractor {
    selectors: Arc<MarkupSelectors>,
}

impl PageExtractor {
    /// Creates an extractor sharing already compiled selectors
    pub fn new(selectors: Arc<MarkupSelectors>) -> Self {
        Self { selectors }
    }

    /// Compiles the markup configuration and creates an extractor
    pub fn from_config(config: &MarkupConfig) -> Result<Self, ConfigError> {
        MarkupSelectors::compile(config).map(|selectors| Self::new(Arc::new(selectors)))
    }

    /// Extracts every user card on a page
    ///
    /// # Example
    ///
    /// ```
    /// use rep_roster::config::MarkupConfig;
    /// use rep_roster::crawler::PageExtractor;
    ///
    /// let extractor = PageExtractor::from_config(&MarkupConfig::default()).unwrap();
    /// let page = extractor.extract(r#"<div class="user-info">
    ///     <div class="user-details"><a href="/u/1">Ada</a></div>
    /// </div>"#);
    /// assert_eq!(page.records[0].name, "Ada");
    /// ```
    pub fn extract(&self, html: &str) -> PageExtraction {
        let document = Html::parse_document(html);
        let mut page = PageExtraction::default();

        for section in document.select(&self.selectors.section) {
            let (record, failures) = self.extract_section(section);
            page.records.push(record);
            page.parse_failures += failures;
        }

        page
    }

    /// Builds one record from a matched card, counting zero-filled fields
    fn extract_section(&self, section: ElementRef<'_>) -> (Record, u64) {
        let mut record = Record::new();
        let mut failures = 0;

        for child in section.select(&self.selectors.sub_section) {
            let Some(kind) = self.classify(child) else {
                continue;
            };

            match kind {
                SubSection::Details => {
                    record.name = child_text(child, &self.selectors.name);
                    record.location = child_text(child, &self.selectors.location);
                }
                SubSection::Reputation => {
                    let text = child_text(child, &self.selectors.reputation);
                    record.reputation = match parse_reputation(&text) {
                        Ok(value) => value,
                        Err(e) => {
                            tracing::debug!(
                                "Reputation for '{}' defaulted to 0: {}",
                                record.name,
                                e
                            );
                            failures += 1;
                            0
                        }
                    };
                }
                SubSection::Tags => {
                    for (index, tag) in child.select(&self.selectors.tag).enumerate() {
                        let text = element_text(tag);
                        if !record.set_tag(index, text.trim()) {
                            tracing::trace!("Discarding extra tag '{}'", text.trim());
                        }
                    }
                }
            }
        }

        (record, failures)
    }

    /// Routes a sub-section by its exact class attribute
    fn classify(&self, element: ElementRef<'_>) -> Option<SubSection> {
        let class = element.value().attr("class")?;
        if class == self.selectors.details_class {
            Some(SubSection::Details)
        } else if class == self.selectors.reputation_class {
            Some(SubSection::Reputation)
        } else if class == self.selectors.tags_class {
            Some(SubSection::Tags)
        } else {
            None
        }
    }
}

/// Concatenated, trimmed text of every descendant matching `selector`
pub(crate) fn child_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .map(element_text)
        .collect::<String>()
        .trim()
        .to_string()
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}
