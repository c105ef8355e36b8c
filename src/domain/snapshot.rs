//! Balance snapshot records as stored in the balances partition.

use crate::domain::{Decimal, SortKey};
use serde::{Deserialize, Serialize};

/// Why a balance snapshot was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    /// The account's first snapshot.
    Initiation,
    /// Any subsequent state change.
    Update,
}

/// Cash-flow detail attached to a snapshot when a deposit or withdrawal
/// was applied at write time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    /// Signed flow amount (positive deposit, negative withdrawal).
    pub deposit: Decimal,
    /// Balance immediately before the flow was applied, captured by the
    /// ledger so the return calculation can exclude the flow itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_deposit_balance: Option<Decimal>,
}

/// One immutable balance snapshot, ordered by sort key within an account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub balance: Decimal,
    pub sort_key: SortKey,
    pub update_type: UpdateType,
    /// Absent means no cash flow: deposit 0, no pre-flow balance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_flow: Option<CashFlow>,
}

impl BalanceSnapshot {
    /// The flow amount at this snapshot, defaulting to zero.
    pub fn deposit(&self) -> Decimal {
        self.cash_flow.map(|cf| cf.deposit).unwrap_or_else(Decimal::zero)
    }

    /// The pre-flow balance, if the ledger captured one.
    pub fn pre_deposit_balance(&self) -> Option<Decimal> {
        self.cash_flow.and_then(|cf| cf.pre_deposit_balance)
    }

    /// True when a non-zero deposit or withdrawal landed at this snapshot.
    pub fn has_cash_flow(&self) -> bool {
        !self.deposit().is_zero()
    }

    pub fn is_initiation(&self) -> bool {
        self.update_type == UpdateType::Initiation
    }
}
