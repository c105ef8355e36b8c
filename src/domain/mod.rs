//! Domain types for the time-weighted-return engine.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: AccountName, Epoch, Timestamp
//! - The composite sort key that orders balance history across epochs
//! - Ledger record types: EpochMarker, BalanceSnapshot, ReturnRecord

pub mod decimal;
pub mod marker;
pub mod primitives;
pub mod record;
pub mod snapshot;
pub mod sort_key;

pub use decimal::Decimal;
pub use marker::EpochMarker;
pub use primitives::{AccountName, Epoch, Timestamp, TimestampParseError};
pub use record::ReturnRecord;
pub use snapshot::{BalanceSnapshot, CashFlow, UpdateType};
pub use sort_key::{SortKey, SortKeyParseError};
