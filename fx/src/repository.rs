//! Rate store contract and the in-memory store.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use exrate_common::RateRecord;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{FxError, FxResult};

/// Store holding the current rate snapshot, keyed by currency code.
///
/// Implementations must serialize writers: two imports must never
/// interleave their `replace_all` calls.
#[async_trait]
pub trait RateRepository: Send + Sync {
    /// Get the store name.
    fn name(&self) -> &str;

    /// Every record of the current snapshot, ordered by currency code.
    async fn get_all(&self) -> FxResult<Vec<RateRecord>>;

    /// Record for a currency code (case-insensitive).
    async fn get_by_code(&self, code: &str) -> FxResult<Option<RateRecord>>;

    /// Add one record to the current snapshot.
    async fn insert(&self, record: RateRecord) -> FxResult<()>;

    /// Remove every record.
    async fn delete_all(&self) -> FxResult<()>;

    /// Replace the snapshot with `records`.
    ///
    /// The default clears the store and inserts one by one. Should an
    /// insert fail, the store is cleared again before the error is
    /// returned, so it never holds part of `records`. Stores that can
    /// swap atomically should override this.
    async fn replace_all(&self, records: Vec<RateRecord>) -> FxResult<()> {
        self.delete_all().await?;

        for record in records {
            if let Err(e) = self.insert(record).await {
                if let Err(cleanup) = self.delete_all().await {
                    warn!(store = self.name(), error = %cleanup, "Failed to clear store after insert failure");
                }
                return Err(e);
            }
        }

        Ok(())
    }
}

/// Immutable set of rate records, unique by code and by number.
#[derive(Debug, Clone, Default)]
pub struct RateSnapshot {
    records: BTreeMap<String, RateRecord>,
    numbers: HashSet<u16>,
}

impl RateSnapshot {
    /// Build a snapshot, rejecting duplicate codes or numbers.
    pub fn from_records(records: impl IntoIterator<Item = RateRecord>) -> FxResult<Self> {
        let mut snapshot = Self::default();
        for record in records {
            snapshot.insert(record)?;
        }
        Ok(snapshot)
    }

    /// Add a record.
    pub fn insert(&mut self, record: RateRecord) -> FxResult<()> {
        let key = record.currency_code.to_uppercase();
        if self.records.contains_key(&key) || self.numbers.contains(&record.currency_number) {
            return Err(FxError::DuplicateRecord(record.currency_code));
        }
        self.numbers.insert(record.currency_number);
        self.records.insert(key, record);
        Ok(())
    }

    /// Record for a currency code (case-insensitive).
    pub fn get(&self, code: &str) -> Option<&RateRecord> {
        self.records.get(&code.to_uppercase())
    }

    /// Records ordered by currency code.
    pub fn records(&self) -> impl Iterator<Item = &RateRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// In-memory rate store.
///
/// Readers take a clone of the current `Arc<RateSnapshot>` and never see
/// a half-built snapshot; `replace_all` swaps a fully built one in a
/// single write.
#[derive(Default)]
pub struct InMemoryRateRepository {
    snapshot: RwLock<Arc<RateSnapshot>>,
}

impl InMemoryRateRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<RateSnapshot> {
        self.snapshot.read().clone()
    }
}

#[async_trait]
impl RateRepository for InMemoryRateRepository {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn get_all(&self) -> FxResult<Vec<RateRecord>> {
        Ok(self.snapshot().records().cloned().collect())
    }

    async fn get_by_code(&self, code: &str) -> FxResult<Option<RateRecord>> {
        Ok(self.snapshot().get(code).cloned())
    }

    async fn insert(&self, record: RateRecord) -> FxResult<()> {
        let mut guard = self.snapshot.write();
        Arc::make_mut(&mut *guard).insert(record)
    }

    async fn delete_all(&self) -> FxResult<()> {
        *self.snapshot.write() = Arc::new(RateSnapshot::default());
        Ok(())
    }

    async fn replace_all(&self, records: Vec<RateRecord>) -> FxResult<()> {
        let snapshot = Arc::new(RateSnapshot::from_records(records)?);
        debug!(records = snapshot.len(), "Swapping rate snapshot");
        *self.snapshot.write() = snapshot;
        Ok(())
    }
}

/// Store whose inserts start failing after a set number of successes.
/// Uses the default `replace_all`.
#[cfg(any(test, feature = "test-utils"))]
pub struct FlakyRateRepository {
    inner: InMemoryRateRepository,
    fail_after: usize,
    inserts: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl FlakyRateRepository {
    /// Create a store that accepts `fail_after` inserts, then fails.
    pub fn new(fail_after: usize) -> Self {
        Self {
            inner: InMemoryRateRepository::new(),
            fail_after,
            inserts: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of insert attempts so far.
    pub fn insert_attempts(&self) -> usize {
        self.inserts.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateRepository for FlakyRateRepository {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn get_all(&self) -> FxResult<Vec<RateRecord>> {
        self.inner.get_all().await
    }

    async fn get_by_code(&self, code: &str) -> FxResult<Option<RateRecord>> {
        self.inner.get_by_code(code).await
    }

    async fn insert(&self, record: RateRecord) -> FxResult<()> {
        let attempt = self
            .inserts
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if attempt >= self.fail_after {
            return Err(FxError::Store("insert rejected".to_string()));
        }
        self.inner.insert(record).await
    }

    async fn delete_all(&self) -> FxResult<()> {
        self.inner.delete_all().await
    }
}
