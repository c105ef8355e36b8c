//! Per-period return calculation over cut-point pairs.

use crate::domain::{AccountName, BalanceSnapshot, ReturnRecord, Timestamp};
use serde::Serialize;
use tracing::warn;

/// A period whose return could not be computed; the run continues.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedPeriod {
    pub period_start: Timestamp,
    pub timestamp: Timestamp,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Starting balance was exactly zero; a percentage return is undefined.
    ZeroBaseBalance,
}

/// Valid records plus reportable skips from one calculation pass.
#[derive(Debug, Default)]
pub struct CalcOutput {
    pub records: Vec<ReturnRecord>,
    pub skipped: Vec<SkippedPeriod>,
}

/// Compute one fractional return per adjacent cut-point pair.
///
/// The end value of each period is the pre-deposit balance when the ledger
/// captured one: a flow recorded exactly at the period end belongs to the
/// next period, not this one. No compounding or annualization happens here;
/// chaining `1 + pnl` is the caller's concern.
pub fn period_returns(account: &AccountName, cuts: &[BalanceSnapshot]) -> CalcOutput {
    let mut output = CalcOutput::default();

    for pair in cuts.windows(2) {
        let (start, end) = (&pair[0], &pair[1]);
        let period_start = start.sort_key.timestamp;
        let timestamp = end.sort_key.timestamp;

        if start.balance.is_zero() {
            warn!(
                %account,
                %period_start,
                %timestamp,
                "zero starting balance, skipping period"
            );
            output.skipped.push(SkippedPeriod {
                period_start,
                timestamp,
                reason: SkipReason::ZeroBaseBalance,
            });
            continue;
        }

        let end_value = end.pre_deposit_balance().unwrap_or(end.balance);
        let pnl = (end_value - start.balance) / start.balance;

        output.records.push(ReturnRecord {
            account: account.clone(),
            pnl,
            period_start,
            timestamp,
            epoch: end.sort_key.epoch,
        });
    }

    output
}
