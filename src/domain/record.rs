//! Computed per-period return records.

use crate::domain::{AccountName, Decimal, Epoch, Timestamp};
use serde::{Deserialize, Serialize};

/// One time-weighted return for a single period.
///
/// `pnl` is a fraction, not a percentage: 0.2 means +20% over the period.
/// The result store is append-style; the natural dedup key is
/// `(account, period_start, timestamp)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub account: AccountName,
    pub pnl: Decimal,
    pub period_start: Timestamp,
    /// Period end; also the record's position in the result store's order.
    pub timestamp: Timestamp,
    /// Epoch of the period's end snapshot.
    pub epoch: Epoch,
}
