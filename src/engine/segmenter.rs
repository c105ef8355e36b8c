//! Period segmentation: reduce balance history to return-relevant cut points.

use crate::domain::BalanceSnapshot;

/// Keep a snapshot iff it is the first, the last, or carries a non-zero
/// deposit. Everything else is an intermediate mark-to-market that does not
/// affect time-weighted returns.
///
/// Idempotent: cut points are fixed points of this rule. Fewer than two
/// survivors means no periods can be formed; downstream emits zero records.
pub fn cut_points(snapshots: &[BalanceSnapshot]) -> Vec<BalanceSnapshot> {
    let last = snapshots.len().saturating_sub(1);
    snapshots
        .iter()
        .enumerate()
        .filter(|(i, s)| *i == 0 || *i == last || s.has_cash_flow())
        .map(|(_, s)| *s)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CashFlow, Decimal, Epoch, SortKey, Timestamp, UpdateType};

    fn snap(t: &str, balance: &str, deposit: Option<&str>) -> BalanceSnapshot {
        BalanceSnapshot {
            balance: Decimal::from_str_canonical(balance).unwrap(),
            sort_key: SortKey::new(Epoch::new(2), Timestamp::parse(t).unwrap()),
            update_type: UpdateType::Update,
            cash_flow: deposit.map(|d| CashFlow {
                deposit: Decimal::from_str_canonical(d).unwrap(),
                pre_deposit_balance: None,
            }),
        }
    }

    #[test]
    fn keeps_endpoints_and_cash_flows_only() {
        let snapshots = vec![
            snap("2023-01-10 00:00:00", "100", None),
            snap("2023-01-10 08:00:00", "105", None),
            snap("2023-01-10 16:00:00", "150", Some("50")),
            snap("2023-01-11 00:00:00", "155", None),
            snap("2023-01-11 08:00:00", "180", None),
        ];

        let cuts = cut_points(&snapshots);
        let times: Vec<String> = cuts
            .iter()
            .map(|s| s.sort_key.timestamp.to_string())
            .collect();
        assert_eq!(
            times,
            vec![
                "2023-01-10 00:00:00",
                "2023-01-10 16:00:00",
                "2023-01-11 08:00:00"
            ]
        );
    }

    #[test]
    fn withdrawal_is_a_cut_point() {
        let snapshots = vec![
            snap("2023-01-10 00:00:00", "100", None),
            snap("2023-01-10 08:00:00", "80", Some("-20")),
            snap("2023-01-10 16:00:00", "85", None),
        ];
        assert_eq!(cut_points(&snapshots).len(), 3);
    }

    #[test]
    fn local_extremes_without_flows_are_dropped() {
        let snapshots = vec![
            snap("2023-01-10 00:00:00", "100", None),
            snap("2023-01-10 08:00:00", "500", None),
            snap("2023-01-10 16:00:00", "100", None),
        ];
        // Only return between cut points is reported, not intra-period
        // volatility.
        assert_eq!(cut_points(&snapshots).len(), 2);
    }

    #[test]
    fn idempotent_on_already_cut_sequence() {
        let snapshots = vec![
            snap("2023-01-10 00:00:00", "100", None),
            snap("2023-01-10 16:00:00", "150", Some("50")),
            snap("2023-01-11 08:00:00", "180", None),
        ];
        let once = cut_points(&snapshots);
        let twice = cut_points(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn degenerate_sequences() {
        assert!(cut_points(&[]).is_empty());
        let single = vec![snap("2023-01-10 00:00:00", "100", None)];
        assert_eq!(cut_points(&single).len(), 1);
    }
}
