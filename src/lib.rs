pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ledger;

pub use config::Config;
pub use db::init_db;
pub use domain::{
    AccountName, BalanceSnapshot, CashFlow, Decimal, Epoch, EpochMarker, ReturnRecord, SortKey,
    Timestamp, UpdateType,
};
pub use engine::{RunReport, TwrEngine, Window};
pub use error::{AppError, TwrError};
pub use ledger::{
    LedgerClient, LedgerError, MockLedger, MockSink, ResultSink, ScanOrder, SortKeyRange,
    SqliteLedger,
};
