//! SQLite-backed ledger store.
//!
//! Implements both `LedgerClient` and `ResultSink` over three tables
//! (epoch_markers, balances, returns). Balance rows are keyed by the
//! encoded composite sort key, and range queries compare the TEXT column
//! directly, so all reads and writes must use the same pad width.

use super::{LedgerClient, LedgerError, ResultSink, ScanOrder, SortKeyRange};
use crate::domain::{
    AccountName, BalanceSnapshot, CashFlow, Decimal, Epoch, EpochMarker, ReturnRecord, SortKey,
    Timestamp, UpdateType,
};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::info;

pub struct SqliteLedger {
    pool: SqlitePool,
    pad_width: usize,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool, pad_width: usize) -> Self {
        SqliteLedger { pool, pad_width }
    }

    pub fn pad_width(&self) -> usize {
        self.pad_width
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Record an epoch marker. The external accounting process owns these;
    /// this engine only writes them in tests and backfill tooling.
    pub async fn insert_epoch_marker(&self, marker: &EpochMarker) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO epoch_markers (epoch, timestamp)
            VALUES (?, ?)
            ON CONFLICT(epoch, timestamp) DO NOTHING
            "#,
        )
        .bind(marker.epoch.as_u64() as i64)
        .bind(marker.timestamp.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Append one balance snapshot to an account's partition.
    pub async fn insert_balance(
        &self,
        account: &AccountName,
        snapshot: &BalanceSnapshot,
    ) -> Result<(), LedgerError> {
        let update_type = match snapshot.update_type {
            UpdateType::Initiation => "initiation",
            UpdateType::Update => "update",
        };
        sqlx::query(
            r#"
            INSERT INTO balances (account, sort_key, balance, update_type, deposit, pre_deposit_balance)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(account, sort_key) DO NOTHING
            "#,
        )
        .bind(account.as_str())
        .bind(snapshot.sort_key.encode(self.pad_width))
        .bind(snapshot.balance.to_canonical_string())
        .bind(update_type)
        .bind(
            snapshot
                .cash_flow
                .map(|cf| cf.deposit.to_canonical_string()),
        )
        .bind(
            snapshot
                .cash_flow
                .and_then(|cf| cf.pre_deposit_balance)
                .map(|d| d.to_canonical_string()),
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent return records for an account, newest first.
    pub async fn recent_returns(
        &self,
        account: &AccountName,
        limit: u32,
    ) -> Result<Vec<ReturnRecord>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT account, pnl, period_start, timestamp, epoch
            FROM returns
            WHERE account = ?
            ORDER BY timestamp DESC, period_start DESC
            LIMIT ?
            "#,
        )
        .bind(account.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_return).collect()
    }
}

#[async_trait]
impl LedgerClient for SqliteLedger {
    async fn fetch_epoch_markers(&self) -> Result<Vec<EpochMarker>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT epoch, timestamp
            FROM epoch_markers
            ORDER BY timestamp ASC, epoch ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let epoch: i64 = row.get("epoch");
                let timestamp: String = row.get("timestamp");
                let timestamp = Timestamp::parse(&timestamp)
                    .map_err(|e| LedgerError::Corrupt(e.to_string()))?;
                Ok(EpochMarker::new(Epoch::new(epoch as u64), timestamp))
            })
            .collect()
    }

    async fn fetch_balances(
        &self,
        account: &AccountName,
        range: SortKeyRange,
        order: ScanOrder,
        limit: Option<u32>,
    ) -> Result<Vec<BalanceSnapshot>, LedgerError> {
        range.validate()?;

        let mut sql = String::from(
            "SELECT sort_key, balance, update_type, deposit, pre_deposit_balance \
             FROM balances WHERE account = ?",
        );
        match range {
            SortKeyRange::Unbounded => {}
            SortKeyRange::AtMost(_) => sql.push_str(" AND sort_key <= ?"),
            SortKeyRange::AtLeast(_) => sql.push_str(" AND sort_key >= ?"),
            SortKeyRange::Between(_, _) => sql.push_str(" AND sort_key BETWEEN ? AND ?"),
        }
        sql.push_str(match order {
            ScanOrder::Ascending => " ORDER BY sort_key ASC",
            ScanOrder::Descending => " ORDER BY sort_key DESC",
        });
        if limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query(&sql).bind(account.as_str());
        match range {
            SortKeyRange::Unbounded => {}
            SortKeyRange::AtMost(k) | SortKeyRange::AtLeast(k) => {
                query = query.bind(k.encode(self.pad_width));
            }
            SortKeyRange::Between(lo, hi) => {
                query = query
                    .bind(lo.encode(self.pad_width))
                    .bind(hi.encode(self.pad_width));
            }
        }
        if let Some(limit) = limit {
            query = query.bind(limit as i64);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_snapshot).collect()
    }
}

#[async_trait]
impl ResultSink for SqliteLedger {
    async fn write_returns(&self, records: &[ReturnRecord]) -> Result<(), LedgerError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(
                r#"
                INSERT INTO returns (account, pnl, period_start, timestamp, epoch)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(account, period_start, timestamp) DO NOTHING
                "#,
            )
            .bind(record.account.as_str())
            .bind(record.pnl.to_canonical_string())
            .bind(record.period_start.to_string())
            .bind(record.timestamp.to_string())
            .bind(record.epoch.as_u64() as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!(count = records.len(), "persisted return records");
        Ok(())
    }

    async fn most_recent_return(
        &self,
        account: &AccountName,
    ) -> Result<Option<ReturnRecord>, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT account, pnl, period_start, timestamp, epoch
            FROM returns
            WHERE account = ?
            ORDER BY timestamp DESC, period_start DESC
            LIMIT 1
            "#,
        )
        .bind(account.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_return).transpose()
    }
}

fn row_to_snapshot(row: &SqliteRow) -> Result<BalanceSnapshot, LedgerError> {
    let raw_key: String = row.get("sort_key");
    let sort_key = SortKey::parse(&raw_key).map_err(|e| LedgerError::MalformedKey(e.to_string()))?;

    let balance: String = row.get("balance");
    let balance = parse_decimal(&balance, "balance")?;

    let update_type: String = row.get("update_type");
    let update_type = match update_type.as_str() {
        "initiation" => UpdateType::Initiation,
        "update" => UpdateType::Update,
        other => {
            return Err(LedgerError::Corrupt(format!(
                "unknown update_type {:?} at {}",
                other, raw_key
            )))
        }
    };

    let deposit: Option<String> = row.get("deposit");
    let pre_deposit_balance: Option<String> = row.get("pre_deposit_balance");
    let cash_flow = match deposit {
        Some(d) => Some(CashFlow {
            deposit: parse_decimal(&d, "deposit")?,
            pre_deposit_balance: pre_deposit_balance
                .as_deref()
                .map(|p| parse_decimal(p, "pre_deposit_balance"))
                .transpose()?,
        }),
        None => None,
    };

    Ok(BalanceSnapshot {
        balance,
        sort_key,
        update_type,
        cash_flow,
    })
}

fn row_to_return(row: &SqliteRow) -> Result<ReturnRecord, LedgerError> {
    let account: String = row.get("account");
    let pnl: String = row.get("pnl");
    let period_start: String = row.get("period_start");
    let timestamp: String = row.get("timestamp");
    let epoch: i64 = row.get("epoch");

    Ok(ReturnRecord {
        account: AccountName::new(account),
        pnl: parse_decimal(&pnl, "pnl")?,
        period_start: Timestamp::parse(&period_start)
            .map_err(|e| LedgerError::Corrupt(e.to_string()))?,
        timestamp: Timestamp::parse(&timestamp).map_err(|e| LedgerError::Corrupt(e.to_string()))?,
        epoch: Epoch::new(epoch as u64),
    })
}

fn parse_decimal(raw: &str, column: &str) -> Result<Decimal, LedgerError> {
    Decimal::from_str_canonical(raw)
        .map_err(|_| LedgerError::Corrupt(format!("non-decimal {} value {:?}", column, raw)))
}
