//! In-memory ledger and sink fakes for tests.

use super::{LedgerClient, LedgerError, ResultSink, ScanOrder, SortKeyRange};
use crate::domain::{AccountName, BalanceSnapshot, EpochMarker, ReturnRecord};
use async_trait::async_trait;
use std::sync::Mutex;

/// Mock ledger that serves predefined markers and snapshots.
#[derive(Debug, Default)]
pub struct MockLedger {
    markers: Vec<EpochMarker>,
    balances: Vec<(AccountName, BalanceSnapshot)>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(mut self, marker: EpochMarker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_markers(mut self, markers: Vec<EpochMarker>) -> Self {
        self.markers.extend(markers);
        self
    }

    pub fn with_snapshot(mut self, account: AccountName, snapshot: BalanceSnapshot) -> Self {
        self.balances.push((account, snapshot));
        self
    }

    pub fn with_snapshots(
        mut self,
        account: AccountName,
        snapshots: Vec<BalanceSnapshot>,
    ) -> Self {
        for snapshot in snapshots {
            self.balances.push((account.clone(), snapshot));
        }
        self
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn fetch_epoch_markers(&self) -> Result<Vec<EpochMarker>, LedgerError> {
        let mut markers = self.markers.clone();
        markers.sort_by_key(|m| (m.timestamp, m.epoch));
        Ok(markers)
    }

    async fn fetch_balances(
        &self,
        account: &AccountName,
        range: SortKeyRange,
        order: ScanOrder,
        limit: Option<u32>,
    ) -> Result<Vec<BalanceSnapshot>, LedgerError> {
        range.validate()?;

        let mut matched: Vec<BalanceSnapshot> = self
            .balances
            .iter()
            .filter(|(a, s)| a == account && range.contains(&s.sort_key))
            .map(|(_, s)| *s)
            .collect();

        matched.sort_by_key(|s| s.sort_key);
        if order == ScanOrder::Descending {
            matched.reverse();
        }
        if let Some(limit) = limit {
            matched.truncate(limit as usize);
        }
        Ok(matched)
    }
}

/// Mock sink that records writes and can be seeded with a continuation anchor.
#[derive(Debug, Default)]
pub struct MockSink {
    written: Mutex<Vec<ReturnRecord>>,
    seeded_last: Mutex<Option<ReturnRecord>>,
    fail_writes: bool,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the most-recent record without it counting as a write.
    pub fn with_last_record(self, record: ReturnRecord) -> Self {
        *self.seeded_last.lock().unwrap() = Some(record);
        self
    }

    /// Make every batch write fail, for abort-before-write assertions.
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Everything written so far, in write order.
    pub fn written(&self) -> Vec<ReturnRecord> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultSink for MockSink {
    async fn write_returns(&self, records: &[ReturnRecord]) -> Result<(), LedgerError> {
        if self.fail_writes {
            return Err(LedgerError::Unavailable("mock write failure".to_string()));
        }
        self.written.lock().unwrap().extend_from_slice(records);
        Ok(())
    }

    async fn most_recent_return(
        &self,
        account: &AccountName,
    ) -> Result<Option<ReturnRecord>, LedgerError> {
        let written = self.written.lock().unwrap();
        if let Some(last) = written.iter().rev().find(|r| &r.account == account) {
            return Ok(Some(last.clone()));
        }
        Ok(self
            .seeded_last
            .lock()
            .unwrap()
            .clone()
            .filter(|r| &r.account == account))
    }
}
