//! Balance window fetching: fixed windows and continuation auto-widening.

use crate::domain::{AccountName, BalanceSnapshot, SortKey, Timestamp};
use crate::engine::resolver::EpochResolver;
use crate::error::TwrError;
use crate::ledger::{LedgerClient, ScanOrder, SortKeyRange};
use tracing::debug;

/// Fetched snapshots plus how the fetch ended.
pub struct FetchedWindow {
    pub snapshots: Vec<BalanceSnapshot>,
    /// Continuation mode widened up to "now" without finding two snapshots.
    pub widen_exhausted: bool,
}

/// Retrieves enough balance snapshots to compute at least one period return.
pub struct BalanceWindowFetcher<'a> {
    ledger: &'a dyn LedgerClient,
    resolver: &'a EpochResolver,
}

impl<'a> BalanceWindowFetcher<'a> {
    pub fn new(ledger: &'a dyn LedgerClient, resolver: &'a EpochResolver) -> Self {
        BalanceWindowFetcher { ledger, resolver }
    }

    /// Fixed-window fetch: one query against the resolved bounds. A fixed
    /// window does not self-widen; fewer than two snapshots is
    /// `InsufficientBalanceData`.
    pub async fn fetch_fixed(
        &self,
        account: &AccountName,
        lower: SortKey,
        upper: SortKey,
    ) -> Result<Vec<BalanceSnapshot>, TwrError> {
        debug!(%account, %lower, %upper, "fixed-window balance query");
        let mut snapshots = self
            .ledger
            .fetch_balances(account, SortKeyRange::Between(lower, upper), ScanOrder::Ascending, None)
            .await?;

        if snapshots.len() < 2 {
            return Err(TwrError::InsufficientBalanceData {
                fetched: snapshots.len(),
            });
        }

        self.backfill_baseline(account, &mut snapshots).await?;
        Ok(snapshots)
    }

    /// Continuation fetch: widen the window by whole multiples of the base
    /// duration until two snapshots turn up, clamping the final attempt at
    /// `now` so the search never resolves a bound past the present.
    pub async fn fetch_widening(
        &self,
        account: &AccountName,
        start: SortKey,
        base_window_hours: i64,
        now: Timestamp,
    ) -> Result<FetchedWindow, TwrError> {
        let mut attempt: i64 = 1;
        loop {
            let mut end_ts = start.timestamp.plus_hours(base_window_hours * attempt);
            let clamped = end_ts > now;
            if clamped {
                end_ts = now;
            }
            let upper = self.resolver.upper_bound(start.epoch, end_ts);

            debug!(%account, attempt, %start, %upper, "continuation balance query");
            let mut snapshots = self
                .ledger
                .fetch_balances(
                    account,
                    SortKeyRange::Between(start, upper),
                    ScanOrder::Ascending,
                    None,
                )
                .await?;

            if snapshots.len() >= 2 {
                self.backfill_baseline(account, &mut snapshots).await?;
                return Ok(FetchedWindow {
                    snapshots,
                    widen_exhausted: false,
                });
            }
            if clamped {
                // Reached the present with fewer than two snapshots; accept
                // whatever was fetched and report the exhaustion.
                return Ok(FetchedWindow {
                    snapshots,
                    widen_exhausted: true,
                });
            }
            attempt += 1;
        }
    }

    /// When the window does not start at account inception, the return for
    /// the first period needs a balance baseline preceding the window:
    /// fetch the single snapshot strictly before it and prepend.
    async fn backfill_baseline(
        &self,
        account: &AccountName,
        snapshots: &mut Vec<BalanceSnapshot>,
    ) -> Result<(), TwrError> {
        let earliest = match snapshots.first() {
            Some(s) if !s.is_initiation() => *s,
            _ => return Ok(()),
        };

        // AtMost is inclusive, so fetch two and keep the first strictly
        // earlier one.
        let prior = self
            .ledger
            .fetch_balances(
                account,
                SortKeyRange::AtMost(earliest.sort_key),
                ScanOrder::Descending,
                Some(2),
            )
            .await?;

        if let Some(baseline) = prior.into_iter().find(|s| s.sort_key < earliest.sort_key) {
            debug!(%account, key = %baseline.sort_key, "prepended baseline snapshot");
            snapshots.insert(0, baseline);
        }
        Ok(())
    }
}
