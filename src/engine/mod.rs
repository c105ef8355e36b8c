//! The time-weighted-return pipeline.
//!
//! One run: resolve epoch bounds -> fetch a balance window -> segment at
//! cash-flow boundaries -> compute per-period returns -> persist valid
//! records. Each run is a fresh, self-contained computation; concurrent
//! runs for the same account are an external scheduling concern.

pub mod calculator;
pub mod fetcher;
pub mod resolver;
pub mod segmenter;

pub use calculator::{CalcOutput, SkipReason, SkippedPeriod};
pub use fetcher::{BalanceWindowFetcher, FetchedWindow};
pub use resolver::EpochResolver;
pub use segmenter::cut_points;

use crate::domain::{AccountName, ReturnRecord, SortKey, Timestamp};
use crate::error::TwrError;
use crate::ledger::{LedgerClient, ResultSink};
use std::sync::Arc;
use tracing::info;

/// How the computation window is chosen. The three source-of-truth
/// variants collapse into one tagged union resolved up front; the rest of
/// the pipeline runs identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Window {
    /// Explicit `[start, end]`, both closed. Does not self-widen.
    Fixed { start: Timestamp, end: Timestamp },
    /// Start from the last persisted return record, widening forward until
    /// enough data is found or "now" is reached.
    ContinueFromLast,
    /// Start from the last persisted return record, up to an explicit end.
    ContinueToDate { end: Timestamp },
}

/// Outcome of one computation run.
#[derive(Debug)]
pub struct RunReport {
    /// Valid records, in period order; already persisted when non-empty.
    pub records: Vec<ReturnRecord>,
    /// Periods skipped with a reportable reason (zero base balance).
    pub skipped: Vec<SkippedPeriod>,
    /// Continuation mode reached "now" without finding two snapshots.
    pub widen_exhausted: bool,
}

/// The TWR engine. Receives its stores at construction; no process-wide
/// singletons, so tests substitute fakes.
pub struct TwrEngine {
    ledger: Arc<dyn LedgerClient>,
    sink: Arc<dyn ResultSink>,
    base_window_hours: i64,
}

impl TwrEngine {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        sink: Arc<dyn ResultSink>,
        base_window_hours: i64,
    ) -> Self {
        TwrEngine {
            ledger,
            sink,
            base_window_hours,
        }
    }

    /// Compute and persist time-weighted returns for one account.
    pub async fn compute_returns(
        &self,
        account: &AccountName,
        window: Window,
    ) -> Result<RunReport, TwrError> {
        self.compute_returns_at(account, window, Timestamp::now())
            .await
    }

    /// Like [`compute_returns`](Self::compute_returns) with an explicit
    /// "now", so widening termination is testable.
    pub async fn compute_returns_at(
        &self,
        account: &AccountName,
        window: Window,
        now: Timestamp,
    ) -> Result<RunReport, TwrError> {
        let markers = self.ledger.fetch_epoch_markers().await?;
        let resolver = EpochResolver::new(markers)?;
        let fetcher = BalanceWindowFetcher::new(self.ledger.as_ref(), &resolver);

        let fetched = match window {
            Window::Fixed { start, end } => {
                if start > end {
                    return Err(TwrError::InvalidWindow(format!(
                        "start {} is after end {}",
                        start, end
                    )));
                }
                let lower = resolver.lower_bound(start);
                let upper = resolver.upper_bound(lower.epoch, end);
                FetchedWindow {
                    snapshots: fetcher.fetch_fixed(account, lower, upper).await?,
                    widen_exhausted: false,
                }
            }
            Window::ContinueFromLast => {
                let anchor = self.continuation_anchor(account).await?;
                fetcher
                    .fetch_widening(account, anchor, self.base_window_hours, now)
                    .await?
            }
            Window::ContinueToDate { end } => {
                let anchor = self.continuation_anchor(account).await?;
                if end <= anchor.timestamp {
                    return Err(TwrError::InvalidWindow(format!(
                        "end {} is not after the last computed point {}",
                        end, anchor.timestamp
                    )));
                }
                let upper = resolver.upper_bound(anchor.epoch, end);
                FetchedWindow {
                    snapshots: fetcher.fetch_fixed(account, anchor, upper).await?,
                    widen_exhausted: false,
                }
            }
        };

        if fetched.widen_exhausted {
            info!(%account, "widening exhausted at present time, nothing to compute");
            return Ok(RunReport {
                records: Vec::new(),
                skipped: Vec::new(),
                widen_exhausted: true,
            });
        }

        let cuts = cut_points(&fetched.snapshots);
        let CalcOutput { records, skipped } = calculator::period_returns(account, &cuts);

        if !records.is_empty() {
            self.sink.write_returns(&records).await?;
        }

        info!(
            %account,
            periods = records.len(),
            skipped = skipped.len(),
            "computation run complete"
        );

        Ok(RunReport {
            records,
            skipped,
            widen_exhausted: false,
        })
    }

    /// The continuation anchor: `(epoch, timestamp)` of the most recent
    /// persisted record.
    async fn continuation_anchor(&self, account: &AccountName) -> Result<SortKey, TwrError> {
        match self.sink.most_recent_return(account).await? {
            Some(record) => Ok(SortKey::new(record.epoch, record.timestamp)),
            None => Err(TwrError::NoContinuationPoint),
        }
    }
}
