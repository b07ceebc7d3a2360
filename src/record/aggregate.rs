//! Shared record collection for concurrent page tasks

use crate::record::Record;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Snapshot of the aggregate's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateCounters {
    /// Records appended so far
    pub records: u64,
    /// Fields that failed to parse and were zero-filled
    pub parse_failures: u64,
    /// Pages whose extraction finished
    pub pages_succeeded: u64,
    /// Pages whose fetch failed after being issued
    pub pages_failed: u64,
}

#[derive(Debug)]
struct Inner {
    records: Vec<Record>,
    counters: AggregateCounters,
}

/// Concurrency-safe collection of records shared by all page tasks
///
/// Cloning is cheap and yields another handle to the same collection. A single
/// lock covers "append + increment", so the running count always equals the
/// number of stored records.
#[derive(Debug, Clone)]
pub struct Aggregate {
    inner: Arc<Mutex<Inner>>,
}

impl Default for Aggregate {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl Aggregate {
    /// Creates an aggregate pre-sized for `capacity` records
    ///
    /// The capacity is only a hint: when it cannot be reserved the aggregate
    /// starts empty and grows on demand.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut records = Vec::new();
        if let Err(e) = records.try_reserve(capacity) {
            tracing::debug!("Skipping pre-sizing for {} records: {}", capacity, e);
        }

        Self {
            inner: Arc::new(Mutex::new(Inner {
                records,
                counters: AggregateCounters::default(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking page task cannot leave a half-pushed record behind
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a record and returns the running count including it
    pub fn append(&self, record: Record) -> u64 {
        let mut inner = self.lock();
        inner.records.push(record);
        inner.counters.records += 1;
        inner.counters.records
    }

    /// Adds `count` zero-filled field failures
    pub fn record_parse_failures(&self, count: u64) {
        if count > 0 {
            self.lock().counters.parse_failures += count;
        }
    }

    /// Marks one page as fully extracted and returns the completed page count
    pub fn record_page_done(&self) -> u64 {
        let mut inner = self.lock();
        inner.counters.pages_succeeded += 1;
        inner.counters.pages_succeeded
    }

    /// Marks one page as failed
    pub fn record_page_failed(&self) {
        self.lock().counters.pages_failed += 1;
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Returns true if no record has been appended
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counter values
    pub fn counters(&self) -> AggregateCounters {
        self.lock().counters
    }

    /// Copies the stored records
    pub fn snapshot(&self) -> Vec<Record> {
        self.lock().records.clone()
    }

    /// Takes the stored records, leaving the aggregate empty
    ///
    /// Counters are kept so statistics can still be read afterwards.
    pub fn take_records(&self) -> Vec<Record> {
        std::mem::take(&mut self.lock().records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn record(name: &str) -> Record {
        Record {
            name: name.to_string(),
            ..Record::default()
        }
    }

    #[test]
    fn test_append_returns_running_count() {
        let aggregate = Aggregate::with_capacity(4);
        assert!(aggregate.is_empty());
        assert_eq!(aggregate.append(record("a")), 1);
        assert_eq!(aggregate.append(record("b")), 2);
        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate.counters().records, 2);
    }

    #[test]
    fn test_unreservable_capacity_starts_empty() {
        let aggregate = Aggregate::with_capacity(usize::MAX);
        assert!(aggregate.is_empty());
        assert_eq!(aggregate.append(record("a")), 1);
    }

    #[test]
    fn test_counters() {
        let aggregate = Aggregate::default();
        aggregate.record_parse_failures(0);
        aggregate.record_parse_failures(3);
        assert_eq!(aggregate.record_page_done(), 1);
        aggregate.record_page_failed();

        let counters = aggregate.counters();
        assert_eq!(counters.parse_failures, 3);
        assert_eq!(counters.pages_succeeded, 1);
        assert_eq!(counters.pages_failed, 1);
    }

    #[test]
    fn test_take_records_keeps_counters() {
        let aggregate = Aggregate::default();
        aggregate.append(record("a"));
        let taken = aggregate.take_records();
        assert_eq!(taken.len(), 1);
        assert!(aggregate.is_empty());
        assert_eq!(aggregate.counters().records, 1);
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let aggregate = Aggregate::default();
        let handles: Vec<_> = (0..200)
            .map(|i| {
                let aggregate = aggregate.clone();
                std::thread::spawn(move || aggregate.append(record(&format!("user{}", i))))
            })
            .collect();

        let mut counts: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        counts.sort_unstable();
        assert_eq!(counts, (1..=200).collect::<Vec<u64>>());

        let names: HashSet<String> = aggregate.snapshot().into_iter().map(|r| r.name).collect();
        assert_eq!(names.len(), 200);
        assert!(names.contains("user0"));
        assert!(names.contains("user199"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_from_tasks() {
        let aggregate = Aggregate::with_capacity(64);
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..64 {
            let aggregate = aggregate.clone();
            tasks.spawn(async move {
                aggregate.append(record(&i.to_string()));
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }
        assert_eq!(aggregate.len(), 64);
    }
}
