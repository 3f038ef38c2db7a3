//! Property-based tests for reconciliation invariants
//!
//! These tests use proptest to verify:
//! - Conservation: Σ(per-driver balance) == fleet balance == earned - paid
//! - Completeness: every driver name appears exactly once
//! - Overpay classification: paid > earned ⇒ negative balance, overpaid
//! - Idempotence: same records → same output

use chrono::NaiveDate;
use fleet_ledger::{
    compute_driver_balance, compute_fleet_balance, compute_fleet_balance_by, extract_letter_facts,
    BalanceOrder, Config, DisbursementRecord, EarningsRecord, FareStatus, FleetLedger,
    LedgerStore, LetterStatus, MatchBy, NewDisbursement, NewEarning, PaymentMethod,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
}

/// Strategy for amounts in cents (0.00 ..= 9999.99)
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for driver names, including near-duplicates that must stay apart
fn name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Alice".to_string()),
        Just("alice".to_string()),
        Just("Alice ".to_string()),
        Just("Bob".to_string()),
        Just("Carl".to_string()),
        "[A-Z][a-z]{2,6}",
    ]
}

fn earnings_strategy() -> impl Strategy<Value = Vec<EarningsRecord>> {
    prop::collection::vec((name_strategy(), amount_strategy()), 0..60).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (driver_name, amount))| EarningsRecord {
                id: i as u64 + 1,
                driver_name,
                driver_id: None,
                date: day(),
                amount,
                status: if i % 2 == 0 { FareStatus::Paid } else { FareStatus::Unpaid },
            })
            .collect()
    })
}

fn disbursements_strategy() -> impl Strategy<Value = Vec<DisbursementRecord>> {
    prop::collection::vec((name_strategy(), amount_strategy()), 0..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (driver_name, amount))| DisbursementRecord {
                id: i as u64 + 1,
                driver_name,
                driver_id: None,
                date: day(),
                amount,
                method: PaymentMethod::Cash,
                notes: String::new(),
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: per-driver balances add up to the fleet balance exactly
    #[test]
    fn prop_conservation(
        earnings in earnings_strategy(),
        disbursements in disbursements_strategy(),
    ) {
        let fleet = compute_fleet_balance(&earnings, &disbursements);

        let sum: Decimal = fleet.per_driver.iter().map(|d| d.balance).sum();
        prop_assert_eq!(sum, fleet.fleet_balance);
        prop_assert_eq!(fleet.fleet_balance, fleet.fleet_total_earnings - fleet.fleet_total_paid);

        let raw_earned: Decimal = earnings.iter().map(|r| r.amount).sum();
        let raw_paid: Decimal = disbursements.iter().map(|r| r.amount).sum();
        prop_assert_eq!(fleet.fleet_total_earnings, raw_earned);
        prop_assert_eq!(fleet.fleet_total_paid, raw_paid);
        prop_assert!(fleet.is_conserved());
    }

    /// Property: every name in either collection appears exactly once
    #[test]
    fn prop_completeness(
        earnings in earnings_strategy(),
        disbursements in disbursements_strategy(),
    ) {
        let fleet = compute_fleet_balance(&earnings, &disbursements);

        let expected: BTreeSet<&str> = earnings
            .iter()
            .map(|r| r.driver_name.as_str())
            .chain(disbursements.iter().map(|r| r.driver_name.as_str()))
            .collect();
        let reported: Vec<&str> = fleet.per_driver.iter().map(|d| d.driver_name.as_str()).collect();
        let unique: BTreeSet<&str> = reported.iter().copied().collect();

        prop_assert_eq!(reported.len(), unique.len());
        prop_assert_eq!(unique, expected);
    }

    /// Property: overpaid exactly when paid exceeds earned
    #[test]
    fn prop_overpay_classification(
        earnings in earnings_strategy(),
        disbursements in disbursements_strategy(),
    ) {
        let fleet = compute_fleet_balance(&earnings, &disbursements);

        for driver in &fleet.per_driver {
            prop_assert_eq!(driver.balance, driver.total_earnings - driver.total_paid);
            prop_assert_eq!(driver.is_overpaid, driver.total_paid > driver.total_earnings);
            prop_assert_eq!(driver.is_overpaid, driver.balance < Decimal::ZERO);
        }
    }

    /// Property: reconciliation is deterministic
    #[test]
    fn prop_idempotent(
        earnings in earnings_strategy(),
        disbursements in disbursements_strategy(),
    ) {
        let first = compute_fleet_balance(&earnings, &disbursements);
        let second = compute_fleet_balance(&earnings, &disbursements);
        prop_assert_eq!(&first, &second);

        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        prop_assert_eq!(first_json, second_json);
    }

    /// Property: single-driver computation agrees with the fleet view
    #[test]
    fn prop_driver_balance_matches_fleet(
        earnings in earnings_strategy(),
        disbursements in disbursements_strategy(),
        probe in name_strategy(),
    ) {
        let fleet = compute_fleet_balance(&earnings, &disbursements);
        let single = compute_driver_balance(&probe, &earnings, &disbursements);

        match fleet.driver(&probe) {
            Some(entry) => prop_assert_eq!(entry, &single),
            None => {
                prop_assert_eq!(single.total_earnings, Decimal::ZERO);
                prop_assert_eq!(single.total_paid, Decimal::ZERO);
            }
        }
    }

    /// Property: letter status is PENDING PAYMENT only for a positive balance
    #[test]
    fn prop_letter_status(
        earnings in earnings_strategy(),
        disbursements in disbursements_strategy(),
        probe in name_strategy(),
    ) {
        let facts = extract_letter_facts(&probe, &earnings, &disbursements);
        let expected = if facts.balance > Decimal::ZERO {
            LetterStatus::PendingPayment
        } else {
            LetterStatus::PaidInFull
        };
        prop_assert_eq!(facts.status, expected);
    }

    /// Property: without driver IDs, ID matching falls back to name matching
    #[test]
    fn prop_id_matching_without_ids(
        earnings in earnings_strategy(),
        disbursements in disbursements_strategy(),
    ) {
        let by_name = compute_fleet_balance(&earnings, &disbursements);
        let by_id = compute_fleet_balance_by(&earnings, &disbursements, MatchBy::DriverId);
        prop_assert_eq!(by_name, by_id);
    }

    /// Property: sorting changes order, not content
    #[test]
    fn prop_sorting_preserves_set(
        earnings in earnings_strategy(),
        disbursements in disbursements_strategy(),
    ) {
        let fleet = compute_fleet_balance(&earnings, &disbursements);
        let sorted = fleet.clone().sorted_by(BalanceOrder::BalanceDescending);

        prop_assert_eq!(sorted.per_driver.len(), fleet.per_driver.len());
        prop_assert_eq!(sorted.fleet_balance, fleet.fleet_balance);
        for pair in sorted.per_driver.windows(2) {
            prop_assert!(pair[0].balance >= pair[1].balance);
        }
    }

    /// Property: the pay-driver flow never pushes an owed driver negative
    #[test]
    fn prop_payouts_bounded_by_balance(
        fares in prop::collection::vec(amount_strategy(), 1..10),
        payouts in prop::collection::vec(amount_strategy(), 1..10),
    ) {
        let ledger = FleetLedger::in_memory(Config::default()).unwrap();
        for amount in &fares {
            ledger.record_fare(NewEarning::new("Alice", day(), *amount)).unwrap();
        }

        for amount in payouts {
            let before = ledger.driver_balance("Alice");
            let result = ledger.pay_driver(NewDisbursement::new("Alice", day(), amount));
            if before.is_owed() {
                prop_assert_eq!(result.is_ok(), amount <= before.balance);
            } else {
                prop_assert!(result.is_ok());
            }
            if before.is_owed() {
                prop_assert!(ledger.driver_balance("Alice").balance >= Decimal::ZERO);
            }
        }
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    fn fare(store: &LedgerStore, name: &str, amount: Decimal) {
        store.append_earning(NewEarning::new(name, day(), amount)).unwrap();
    }

    fn pay(store: &LedgerStore, name: &str, amount: Decimal) {
        store
            .append_disbursement(NewDisbursement::new(name, day(), amount))
            .unwrap();
    }

    #[test]
    fn test_scenario_partial_payout() {
        let store = LedgerStore::in_memory();
        fare(&store, "Alice", Decimal::from(800));
        fare(&store, "Alice", Decimal::from(700));
        pay(&store, "Alice", Decimal::from(1000));

        let snapshot = store.snapshot();
        let fleet = compute_fleet_balance(&snapshot.earnings, &snapshot.disbursements);
        let alice = fleet.driver("Alice").unwrap();
        assert_eq!(alice.total_earnings, Decimal::from(1500));
        assert_eq!(alice.total_paid, Decimal::from(1000));
        assert_eq!(alice.balance, Decimal::from(500));
        assert!(!alice.is_overpaid);
    }

    #[test]
    fn test_scenario_paid_before_any_trip() {
        let store = LedgerStore::in_memory();
        pay(&store, "Bob", Decimal::from(300));

        let snapshot = store.snapshot();
        let fleet = compute_fleet_balance(&snapshot.earnings, &snapshot.disbursements);
        let bob = fleet.driver("Bob").unwrap();
        assert_eq!(bob.total_earnings, Decimal::ZERO);
        assert_eq!(bob.total_paid, Decimal::from(300));
        assert_eq!(bob.balance, Decimal::from(-300));
        assert!(bob.is_overpaid);

        let letter = extract_letter_facts("Bob", &snapshot.earnings, &snapshot.disbursements);
        assert_eq!(letter.status.as_str(), "PAID IN FULL");
    }

    #[test]
    fn test_scenario_unpaid_driver() {
        let store = LedgerStore::in_memory();
        fare(&store, "Carl", Decimal::from(1000));

        let snapshot = store.snapshot();
        let fleet = compute_fleet_balance(&snapshot.earnings, &snapshot.disbursements);
        assert_eq!(fleet.driver("Carl").unwrap().balance, Decimal::from(1000));

        let letter = extract_letter_facts("Carl", &snapshot.earnings, &snapshot.disbursements);
        assert_eq!(letter.status.as_str(), "PENDING PAYMENT");
    }

    #[test]
    fn test_scenario_thirty_dimes() {
        let store = LedgerStore::in_memory();
        for _ in 0..30 {
            fare(&store, "Dee", Decimal::new(10, 2));
        }

        let snapshot = store.snapshot();
        let fleet = compute_fleet_balance(&snapshot.earnings, &snapshot.disbursements);
        let dee = fleet.driver("Dee").unwrap();
        assert_eq!(dee.total_earnings, Decimal::new(300, 2));
        assert_eq!(format!("{:.2}", dee.total_earnings), "3.00");
    }

    #[test]
    fn test_scenario_empty_ledger() {
        let store = LedgerStore::in_memory();
        let fleet = fleet_ledger::reconcile(&store, MatchBy::DriverName);
        assert!(fleet.per_driver.is_empty());
        assert_eq!(fleet.fleet_total_earnings, Decimal::ZERO);
        assert_eq!(fleet.fleet_total_paid, Decimal::ZERO);
        assert_eq!(fleet.fleet_balance, Decimal::ZERO);
    }
}
