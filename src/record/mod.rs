//! Scraped user records
//!
//! This module contains:
//! - The `Record` type produced for every user card
//! - Field parsers turning raw card text into typed values
//! - The concurrency-safe `Aggregate` shared by all page tasks

mod aggregate;
pub mod fields;

pub use aggregate::{Aggregate, AggregateCounters};
pub use fields::{parse_page_number, parse_reputation, FieldError};

/// Number of tag slots kept per record
pub const TAG_SLOTS: usize = 3;

/// One user extracted from a listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Display name
    pub name: String,

    /// Free-text location, empty when the user did not set one
    pub location: String,

    /// Reputation score
    pub reputation: u64,

    /// Top tags in listing order; unfilled slots are empty strings
    pub tags: [String; TAG_SLOTS],
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `tag` in slot `index`, ignoring indices past the last slot
    ///
    /// Returns false when the tag was discarded.
    pub fn set_tag(&mut self, index: usize, tag: impl Into<String>) -> bool {
        match self.tags.get_mut(index) {
            Some(slot) => {
                *slot = tag.into();
                true
            }
            None => false,
        }
    }
}
