//! Main ledger orchestration layer
//!
//! This module ties together the store, the reconciliation engine, letter
//! extraction, the dashboard and metrics into one high-level API.
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use fleet_ledger::{Config, FleetLedger, NewDisbursement, NewEarning};
//! use rust_decimal::Decimal;
//!
//! fn main() -> fleet_ledger::Result<()> {
//!     let ledger = FleetLedger::open(Config::default())?;
//!     let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//!
//!     ledger.record_fare(NewEarning::new("Alice", today, Decimal::from(800)))?;
//!     ledger.pay_driver(NewDisbursement::new("Alice", today, Decimal::from(500)))?;
//!
//!     let letter = ledger.letter_facts("Alice");
//!     println!("{}: {}", letter.driver_name, letter.status);
//!
//!     ledger.save()
//! }
//! ```

use crate::{
    balance::{
        compute_driver_balance_by, compute_driver_balance_by_id, compute_fleet_balance_by,
        DriverBalance, FleetBalance, MatchBy,
    },
    dashboard::DashboardSummary,
    letter::LetterFacts,
    metrics::Metrics,
    store::{LedgerSnapshot, LedgerStore},
    types::{DisbursementRecord, DriverId, EarningsRecord, NewDisbursement, NewEarning},
    Config, Error, Result,
};
use rust_decimal::Decimal;
use std::time::Instant;

/// Main ledger interface
#[derive(Debug)]
pub struct FleetLedger {
    /// Record store
    store: LedgerStore,

    /// Metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl FleetLedger {
    /// Open the ledger backed by `config.data_file`
    pub fn open(config: Config) -> Result<Self> {
        let store = LedgerStore::open(&config.data_file)?;
        Self::with_store(store, config)
    }

    /// Ledger over an in-memory store
    pub fn in_memory(config: Config) -> Result<Self> {
        Self::with_store(LedgerStore::in_memory(), config)
    }

    fn with_store(store: LedgerStore, config: Config) -> Result<Self> {
        let metrics = Metrics::new()?;
        tracing::info!(
            service = %config.service_name,
            match_by = ?config.match_by,
            "Fleet ledger ready"
        );
        Ok(Self {
            store,
            metrics,
            config,
        })
    }

    /// Underlying store (roster, bulk clear, raw scans)
    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Record a fare
    pub fn record_fare(&self, fare: NewEarning) -> Result<EarningsRecord> {
        let record = self.store.append_earning(fare)?;
        self.metrics.record_earning();
        Ok(record)
    }

    /// Pay a driver
    ///
    /// The ceiling is the balance of the same driver key the fleet view groups
    /// the payout under. When the fleet owes the driver, the payout may not
    /// exceed that balance. When nothing is owed, any non-negative amount is
    /// accepted as an advance.
    ///
    /// Matching by ID, a payout without a driver ID is rejected if any record
    /// under the same name carries one; it has to name the ID explicitly.
    pub fn pay_driver(&self, payout: NewDisbursement) -> Result<DisbursementRecord> {
        let match_by = self.config.match_by;
        let driver_name = payout.driver_name.clone();
        let driver_id = payout.driver_id.clone();
        let requested = payout.amount;

        let result = self.store.append_disbursement_if(payout, |earnings, disbursements| {
            if match_by == MatchBy::DriverId && driver_id.is_none() {
                check_unlinked_name(&driver_name, earnings, disbursements)?;
            }
            let current = compute_driver_balance_by(
                &driver_name,
                driver_id.as_ref(),
                earnings,
                disbursements,
                match_by,
            );
            check_payout(&current, requested)
        });

        match result {
            Ok(record) => {
                self.metrics.record_disbursement();
                tracing::info!(
                    id = record.id,
                    driver = %record.driver_name,
                    amount = %record.amount,
                    "Driver paid"
                );
                Ok(record)
            }
            Err(err) => {
                self.metrics.record_rejected_payout();
                tracing::warn!(
                    driver = %driver_name,
                    amount = %requested,
                    error = %err,
                    "Payout rejected"
                );
                Err(err)
            }
        }
    }

    /// Most that can be paid to a driver right now, by name
    pub fn payable_to(&self, driver_name: &str) -> Decimal {
        self.driver_balance(driver_name).payable()
    }

    /// Reconcile every driver
    pub fn fleet_balance(&self) -> FleetBalance {
        self.reconcile_snapshot(&self.store.snapshot())
    }

    fn reconcile_snapshot(&self, snapshot: &LedgerSnapshot) -> FleetBalance {
        let started = Instant::now();
        let fleet = compute_fleet_balance_by(
            &snapshot.earnings,
            &snapshot.disbursements,
            self.config.match_by,
        );
        self.metrics.record_reconciliation(started.elapsed());

        tracing::debug!(
            drivers = fleet.per_driver.len(),
            fleet_balance = %fleet.fleet_balance,
            "Fleet reconciled"
        );
        fleet
    }

    /// Balance of one driver by exact name
    ///
    /// Matching by ID, only records without a driver ID count towards the name.
    pub fn driver_balance(&self, driver_name: &str) -> DriverBalance {
        let snapshot = self.store.snapshot();
        compute_driver_balance_by(
            driver_name,
            None,
            &snapshot.earnings,
            &snapshot.disbursements,
            self.config.match_by,
        )
    }

    /// Balance of one driver by roster ID
    pub fn driver_balance_by_id(&self, driver_id: &DriverId) -> Result<DriverBalance> {
        let driver = self
            .store
            .list_drivers()
            .into_iter()
            .find(|d| &d.id == driver_id)
            .ok_or_else(|| Error::DriverNotFound(driver_id.to_string()))?;

        let snapshot = self.store.snapshot();
        Ok(compute_driver_balance_by_id(
            driver_id,
            &driver.name,
            &snapshot.earnings,
            &snapshot.disbursements,
        ))
    }

    /// Statement facts for one driver
    pub fn letter_facts(&self, driver_name: &str) -> LetterFacts {
        LetterFacts::from_balance(&self.driver_balance(driver_name))
    }

    /// Dashboard headline numbers, all taken from one snapshot
    pub fn dashboard(&self) -> DashboardSummary {
        let snapshot = self.store.snapshot();
        let fleet = self.reconcile_snapshot(&snapshot);
        DashboardSummary::build(
            &self.store.list_drivers(),
            &self.store.list_cars(),
            &snapshot.earnings,
            &fleet,
        )
    }

    /// Persist the store
    pub fn save(&self) -> Result<()> {
        self.store.save()
    }
}

fn check_unlinked_name(
    driver_name: &str,
    earnings: &[EarningsRecord],
    disbursements: &[DisbursementRecord],
) -> Result<()> {
    let linked = earnings
        .iter()
        .filter(|r| r.driver_name == driver_name)
        .find_map(|r| r.driver_id.as_ref())
        .or_else(|| {
            disbursements
                .iter()
                .filter(|r| r.driver_name == driver_name)
                .find_map(|r| r.driver_id.as_ref())
        });

    match linked {
        Some(id) => Err(Error::InvalidRecord(format!(
            "Driver '{}' has records linked to {}; pay by driver ID",
            driver_name, id
        ))),
        None => Ok(()),
    }
}

fn check_payout(current: &DriverBalance, requested: Decimal) -> Result<()> {
    if requested < Decimal::ZERO {
        return Err(Error::InvalidRecord(
            "Payout amount must not be negative".to_string(),
        ));
    }

    if current.is_owed() && requested > current.balance {
        return Err(Error::ExceedsPayable {
            driver: current.driver_name.clone(),
            requested,
            payable: current.balance,
        });
    }

    Ok(())
}
