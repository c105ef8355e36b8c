use std::sync::Arc;
use tempfile::TempDir;
use twrd::db::init_db;
use twrd::domain::{
    AccountName, BalanceSnapshot, CashFlow, Decimal, Epoch, EpochMarker, ReturnRecord, SortKey,
    Timestamp, UpdateType,
};
use twrd::engine::{TwrEngine, Window};
use twrd::ledger::{LedgerClient, LedgerError, ResultSink, ScanOrder, SortKeyRange, SqliteLedger};

fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn account() -> AccountName {
    AccountName::new("bevy_fund")
}

fn snapshot(
    epoch: u64,
    t: &str,
    balance: &str,
    update_type: UpdateType,
    cash_flow: Option<CashFlow>,
) -> BalanceSnapshot {
    BalanceSnapshot {
        balance: dec(balance),
        sort_key: SortKey::new(Epoch::new(epoch), ts(t)),
        update_type,
        cash_flow,
    }
}

async fn setup_store() -> (Arc<SqliteLedger>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    (Arc::new(SqliteLedger::new(pool, 5)), temp_dir)
}

#[tokio::test]
async fn balances_round_trip_preserves_cash_flow() {
    let (store, _temp) = setup_store().await;
    let snap = snapshot(
        2,
        "2023-01-10 08:00:00",
        "150",
        UpdateType::Update,
        Some(CashFlow {
            deposit: dec("50"),
            pre_deposit_balance: Some(dec("100")),
        }),
    );
    store.insert_balance(&account(), &snap).await.unwrap();

    let fetched = store
        .fetch_balances(
            &account(),
            SortKeyRange::Unbounded,
            ScanOrder::Ascending,
            None,
        )
        .await
        .unwrap();
    assert_eq!(fetched, vec![snap]);
}

#[tokio::test]
async fn range_queries_follow_encoded_key_order_across_epochs() {
    let (store, _temp) = setup_store().await;
    // Insert out of chronological order; the sort key must restore it,
    // including across the epoch boundary.
    let snaps = [
        snapshot(4, "2023-01-16 00:00:00", "120", UpdateType::Update, None),
        snapshot(3, "2023-01-14 00:00:00", "100", UpdateType::Update, None),
        snapshot(3, "2023-01-12 00:00:00", "95", UpdateType::Initiation, None),
    ];
    for snap in &snaps {
        store.insert_balance(&account(), snap).await.unwrap();
    }

    let fetched = store
        .fetch_balances(
            &account(),
            SortKeyRange::Between(
                SortKey::new(Epoch::new(3), ts("2023-01-13 00:00:00")),
                SortKey::new(Epoch::new(4), ts("2023-01-17 00:00:00")),
            ),
            ScanOrder::Ascending,
            None,
        )
        .await
        .unwrap();
    assert_eq!(fetched.len(), 2);
    assert_eq!(fetched[0].sort_key.epoch, Epoch::new(3));
    assert_eq!(fetched[1].sort_key.epoch, Epoch::new(4));

    let newest = store
        .fetch_balances(
            &account(),
            SortKeyRange::Unbounded,
            ScanOrder::Descending,
            Some(1),
        )
        .await
        .unwrap();
    assert_eq!(newest[0].sort_key.epoch, Epoch::new(4));
}

#[tokio::test]
async fn inverted_range_is_rejected_before_hitting_sqlite() {
    let (store, _temp) = setup_store().await;
    let result = store
        .fetch_balances(
            &account(),
            SortKeyRange::Between(
                SortKey::new(Epoch::new(4), ts("2023-01-16 00:00:00")),
                SortKey::new(Epoch::new(3), ts("2023-01-14 00:00:00")),
            ),
            ScanOrder::Ascending,
            None,
        )
        .await;
    assert!(matches!(result, Err(LedgerError::Query(_))));
}

#[tokio::test]
async fn malformed_stored_sort_key_is_corrupt_data() {
    let (store, _temp) = setup_store().await;
    // Bypass the typed writer to plant a corrupt row.
    sqlx::query(
        "INSERT INTO balances (account, sort_key, balance, update_type) VALUES (?, ?, ?, ?)",
    )
    .bind(account().as_str())
    .bind("not-a-sort-key")
    .bind("100")
    .bind("update")
    .execute(store.pool())
    .await
    .unwrap();

    let result = store
        .fetch_balances(
            &account(),
            SortKeyRange::Unbounded,
            ScanOrder::Ascending,
            None,
        )
        .await;
    assert!(matches!(result, Err(LedgerError::MalformedKey(_))));
}

#[tokio::test]
async fn returns_dedup_on_natural_key_and_most_recent_wins() {
    let (store, _temp) = setup_store().await;
    let first = ReturnRecord {
        account: account(),
        pnl: dec("0.1"),
        period_start: ts("2023-01-10 00:00:00"),
        timestamp: ts("2023-01-10 08:00:00"),
        epoch: Epoch::new(2),
    };
    let second = ReturnRecord {
        account: account(),
        pnl: dec("0.2"),
        period_start: ts("2023-01-10 08:00:00"),
        timestamp: ts("2023-01-10 16:00:00"),
        epoch: Epoch::new(2),
    };

    store
        .write_returns(&[first.clone(), second.clone()])
        .await
        .unwrap();
    // Re-running an overlapping window writes the same natural keys again;
    // the store dedups rather than duplicating.
    store.write_returns(&[first.clone()]).await.unwrap();

    let recent = store.recent_returns(&account(), 10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0], second);

    let most_recent = store.most_recent_return(&account()).await.unwrap();
    assert_eq!(most_recent, Some(second));

    let other = store
        .most_recent_return(&AccountName::new("other_fund"))
        .await
        .unwrap();
    assert_eq!(other, None);
}

#[tokio::test]
async fn end_to_end_run_over_sqlite() {
    let (store, _temp) = setup_store().await;
    store
        .insert_epoch_marker(&EpochMarker::new(Epoch::new(2), ts("2023-01-01 00:00:00")))
        .await
        .unwrap();

    let snaps = [
        snapshot(
            2,
            "2023-01-10 00:00:00",
            "100",
            UpdateType::Initiation,
            None,
        ),
        snapshot(
            2,
            "2023-01-10 08:00:00",
            "150",
            UpdateType::Update,
            Some(CashFlow {
                deposit: dec("50"),
                pre_deposit_balance: Some(dec("100")),
            }),
        ),
        snapshot(2, "2023-01-10 16:00:00", "180", UpdateType::Update, None),
    ];
    for snap in &snaps {
        store.insert_balance(&account(), snap).await.unwrap();
    }

    let engine = TwrEngine::new(store.clone(), store.clone(), 8);
    let report = engine
        .compute_returns(
            &account(),
            Window::Fixed {
                start: ts("2023-01-10 00:00:00"),
                end: ts("2023-01-11 00:00:00"),
            },
        )
        .await
        .unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].pnl, dec("0"));
    assert_eq!(report.records[1].pnl, dec("0.2"));

    // Continuation picks up from the persisted records and finds nothing
    // new before "now".
    let follow_up = engine
        .compute_returns_at(
            &account(),
            Window::ContinueFromLast,
            ts("2023-01-10 18:00:00"),
        )
        .await
        .unwrap();
    assert!(follow_up.widen_exhausted);
    assert!(follow_up.records.is_empty());
}
