//! Ordered ledger abstraction over the external stores.
//!
//! The engine reads two append-style, time-ordered stores — events (epoch
//! lifecycle markers) and balances (per-account snapshots keyed by the
//! composite sort key) — and writes computed returns to a third. All three
//! are reached through traits so tests can substitute in-memory fakes.

use crate::domain::{AccountName, BalanceSnapshot, EpochMarker, ReturnRecord, SortKey};
use async_trait::async_trait;
use thiserror::Error;

pub mod mock;
pub mod sqlite;

pub use mock::{MockLedger, MockSink};
pub use sqlite::SqliteLedger;

/// Traversal direction for a ranged query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    Ascending,
    Descending,
}

/// Sort-key bounds for a balances query. `Between` is inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKeyRange {
    Unbounded,
    AtMost(SortKey),
    AtLeast(SortKey),
    Between(SortKey, SortKey),
}

impl SortKeyRange {
    /// Reject inverted bounds before they reach a store.
    pub fn validate(&self) -> Result<(), LedgerError> {
        match self {
            SortKeyRange::Between(lo, hi) if lo > hi => Err(LedgerError::Query(format!(
                "range lower bound {} exceeds upper bound {}",
                lo, hi
            ))),
            _ => Ok(()),
        }
    }

    pub fn contains(&self, key: &SortKey) -> bool {
        match self {
            SortKeyRange::Unbounded => true,
            SortKeyRange::AtMost(hi) => key <= hi,
            SortKeyRange::AtLeast(lo) => key >= lo,
            SortKeyRange::Between(lo, hi) => key >= lo && key <= hi,
        }
    }
}

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The store or partition does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed query, e.g. an inverted range.
    #[error("bad query: {0}")]
    Query(String),
    /// The underlying store failed; the engine does not retry.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A stored composite sort key failed to parse.
    #[error("malformed sort key: {0}")]
    MalformedKey(String),
    /// A stored row failed to decode (other than its sort key).
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Unavailable(err.to_string())
    }
}

/// Read abstraction over the events and balances stores. Pure reads,
/// no side effects.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Full ascending scan of the events partition. The marker count is
    /// small and slow-changing, so a full scan per run is acceptable.
    async fn fetch_epoch_markers(&self) -> Result<Vec<EpochMarker>, LedgerError>;

    /// Ranged query over one account's balance history, ordered by
    /// composite sort key.
    async fn fetch_balances(
        &self,
        account: &AccountName,
        range: SortKeyRange,
        order: ScanOrder,
        limit: Option<u32>,
    ) -> Result<Vec<BalanceSnapshot>, LedgerError>;
}

/// Write/continuation abstraction over the return-records store.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist a run's records as one batch; all-or-nothing.
    async fn write_returns(&self, records: &[ReturnRecord]) -> Result<(), LedgerError>;

    /// The most recently written record for an account, the anchor for
    /// continuation mode.
    async fn most_recent_return(
        &self,
        account: &AccountName,
    ) -> Result<Option<ReturnRecord>, LedgerError>;
}
