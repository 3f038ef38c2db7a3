//! Fleet Ledger
//!
//! Driver balance reconciliation for a small taxi fleet.
//!
//! # Architecture
//!
//! - **Append-only records**: fares (earnings) and payouts (disbursements) are never edited
//! - **Derived balances**: every balance is recomputed from the records on demand
//! - **Explicit store**: one `LedgerStore` per process, loaded and saved explicitly
//! - **Exact money**: all amounts and sums are `Decimal`
//!
//! # Invariants
//!
//! - Conservation: Σ(per-driver balance) == fleet balance == earned - paid
//! - Completeness: every driver named in either collection is reported once
//! - Deterministic: same records → same balances
//! - Drivers are matched by exact name unless configured to match by ID

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod balance;
pub mod letter;
pub mod dashboard;
pub mod store;
pub mod ledger;
pub mod error;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::{
    Car, CarStatus, DisbursementRecord, Driver, DriverId, DriverStatus, EarningsRecord,
    FareStatus, NewCar, NewDisbursement, NewDriver, NewEarning, PaymentMethod, RecordId,
};
pub use balance::{
    compute_driver_balance, compute_driver_balance_by, compute_driver_balance_by_id,
    compute_fleet_balance, compute_fleet_balance_by, reconcile, BalanceOrder, DriverBalance,
    FleetBalance, LedgerSource, MatchBy,
};
pub use letter::{extract_letter_facts, LetterFacts, LetterStatus};
pub use dashboard::DashboardSummary;
pub use store::{LedgerSnapshot, LedgerStore, MAX_RECORD_AMOUNT};
pub use ledger::FleetLedger;
pub use config::Config;
