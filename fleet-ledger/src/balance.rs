//! Driver balance reconciliation
//!
//! Folds the earnings and disbursement collections into per-driver and
//! fleet-wide balances.
//!
//! # Algorithm
//!
//! 1. Group earnings by driver key, summing amounts
//! 2. Group disbursements by driver key, summing amounts
//! 3. Take the union of keys from both groupings
//! 4. Emit one balance per key, missing totals default to zero
//! 5. Fleet totals are the sums over the per-driver balances
//!
//! # Example
//!
//! ```text
//! Earnings:       Alice 800, Alice 700, Carl 1000
//! Disbursements:  Alice 1000, Bob 300
//!
//! Alice: earned 1500, paid 1000, balance  500
//! Bob:   earned    0, paid  300, balance -300 (overpaid)
//! Carl:  earned 1000, paid    0, balance 1000
//!
//! Fleet: earned 2500, paid 1300, balance 1200
//! ```
//!
//! Amounts are summed as `Decimal`, so the per-driver balances add up to the
//! fleet balance exactly. Amounts are not validated here; a negative record is
//! simply summed.

use crate::types::{DisbursementRecord, DriverId, EarningsRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Read interface the engine needs from a record store
pub trait LedgerSource {
    /// Full scan of earnings records
    fn list_earnings(&self) -> Vec<EarningsRecord>;

    /// Full scan of disbursement records
    fn list_disbursements(&self) -> Vec<DisbursementRecord>;
}

/// How records are attributed to a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBy {
    /// Exact string equality on the driver name
    #[default]
    #[serde(alias = "name")]
    DriverName,
    /// Stable driver ID; records without one fall back to their name
    #[serde(alias = "id")]
    DriverId,
}

impl FromStr for MatchBy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "driver_name" => Ok(MatchBy::DriverName),
            "id" | "driver_id" => Ok(MatchBy::DriverId),
            other => Err(crate::Error::Config(format!(
                "Unknown match mode '{}', expected 'name' or 'id'",
                other
            ))),
        }
    }
}

/// Grouping key. ID and name keys never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum DriverKey {
    Id(DriverId),
    Name(String),
}

impl DriverKey {
    fn for_record(match_by: MatchBy, driver_name: &str, driver_id: Option<&DriverId>) -> Self {
        match (match_by, driver_id) {
            (MatchBy::DriverId, Some(id)) => DriverKey::Id(id.clone()),
            _ => DriverKey::Name(driver_name.to_string()),
        }
    }
}

/// Balance of a single driver (derived, never persisted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverBalance {
    /// Driver name
    pub driver_name: String,

    /// Driver ID, if any contributing record carried one
    pub driver_id: Option<DriverId>,

    /// Sum of earnings
    pub total_earnings: Decimal,

    /// Sum of disbursements
    pub total_paid: Decimal,

    /// `total_earnings - total_paid`
    pub balance: Decimal,

    /// `balance < 0`
    pub is_overpaid: bool,

    /// Number of earnings records
    pub trip_count: usize,

    /// Number of disbursement records
    pub payout_count: usize,

    /// A sum left the `Decimal` range and was clamped to `Decimal::MAX` / `Decimal::MIN`
    #[serde(default)]
    pub overflowed: bool,
}

impl DriverBalance {
    /// All-zero balance for a driver with no records
    pub fn zero(driver_name: impl Into<String>) -> Self {
        let driver_name: String = driver_name.into();
        Accumulator::new(&driver_name).finish()
    }

    /// Ceiling for the next payout: the unpaid balance, or zero when nothing is owed
    pub fn payable(&self) -> Decimal {
        self.balance.max(Decimal::ZERO)
    }

    /// Fleet still owes this driver
    pub fn is_owed(&self) -> bool {
        self.balance > Decimal::ZERO
    }

    /// Earnings and payouts match exactly
    pub fn is_settled(&self) -> bool {
        self.balance.is_zero()
    }
}

/// Display order for per-driver balances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceOrder {
    /// Driver name ascending
    Name,
    /// Largest outstanding balance first, ties by name
    BalanceDescending,
}

/// Per-driver balances plus fleet-wide totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetBalance {
    /// One entry per driver key
    pub per_driver: Vec<DriverBalance>,

    /// Sum of all earnings
    pub fleet_total_earnings: Decimal,

    /// Sum of all disbursements
    pub fleet_total_paid: Decimal,

    /// `fleet_total_earnings - fleet_total_paid`
    pub fleet_balance: Decimal,

    /// Some driver or fleet total was clamped; the figures are not exact
    #[serde(default)]
    pub overflowed: bool,
}

impl FleetBalance {
    /// Look up a driver by exact name
    pub fn driver(&self, driver_name: &str) -> Option<&DriverBalance> {
        self.per_driver.iter().find(|d| d.driver_name == driver_name)
    }

    /// Drivers with a negative balance
    pub fn overpaid(&self) -> impl Iterator<Item = &DriverBalance> {
        self.per_driver.iter().filter(|d| d.is_overpaid)
    }

    /// Re-sort the per-driver list for display
    pub fn sorted_by(mut self, order: BalanceOrder) -> Self {
        match order {
            BalanceOrder::Name => self
                .per_driver
                .sort_by(|a, b| a.driver_name.cmp(&b.driver_name)),
            BalanceOrder::BalanceDescending => self.per_driver.sort_by(|a, b| {
                match b.balance.cmp(&a.balance) {
                    Ordering::Equal => a.driver_name.cmp(&b.driver_name),
                    other => other,
                }
            }),
        }
        self
    }

    /// Per-driver balances sum to the fleet balance
    pub fn is_conserved(&self) -> bool {
        let sum = self
            .per_driver
            .iter()
            .try_fold(Decimal::ZERO, |acc, d| acc.checked_add(d.balance));

        !self.overflowed
            && sum == Some(self.fleet_balance)
            && self.fleet_total_earnings.checked_sub(self.fleet_total_paid)
                == Some(self.fleet_balance)
    }
}

/// `total + amount`, clamped to the `Decimal` range
fn add_money(total: Decimal, amount: Decimal, overflowed: &mut bool) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        *overflowed = true;
        if amount.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// `total - amount`, clamped to the `Decimal` range
fn sub_money(total: Decimal, amount: Decimal, overflowed: &mut bool) -> Decimal {
    total.checked_sub(amount).unwrap_or_else(|| {
        *overflowed = true;
        if amount.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

struct Accumulator {
    driver_name: String,
    driver_id: Option<DriverId>,
    earnings: Decimal,
    paid: Decimal,
    trips: usize,
    payouts: usize,
    overflowed: bool,
}

impl Accumulator {
    fn new(driver_name: &str) -> Self {
        Self {
            driver_name: driver_name.to_string(),
            driver_id: None,
            earnings: Decimal::ZERO,
            paid: Decimal::ZERO,
            trips: 0,
            payouts: 0,
            overflowed: false,
        }
    }

    fn add_earning(&mut self, record: &EarningsRecord) {
        self.note_id(record.driver_id.as_ref());
        self.earnings = add_money(self.earnings, record.amount, &mut self.overflowed);
        self.trips += 1;
    }

    fn add_payout(&mut self, record: &DisbursementRecord) {
        self.note_id(record.driver_id.as_ref());
        self.paid = add_money(self.paid, record.amount, &mut self.overflowed);
        self.payouts += 1;
    }

    fn note_id(&mut self, driver_id: Option<&DriverId>) {
        if self.driver_id.is_none() {
            self.driver_id = driver_id.cloned();
        }
    }

    fn finish(self) -> DriverBalance {
        let mut overflowed = self.overflowed;
        let balance = sub_money(self.earnings, self.paid, &mut overflowed);
        DriverBalance {
            driver_name: self.driver_name,
            driver_id: self.driver_id,
            total_earnings: self.earnings,
            total_paid: self.paid,
            balance,
            is_overpaid: balance < Decimal::ZERO,
            trip_count: self.trips,
            payout_count: self.payouts,
            overflowed,
        }
    }
}

/// Reconcile all drivers, matching records by exact driver name
pub fn compute_fleet_balance(
    earnings: &[EarningsRecord],
    disbursements: &[DisbursementRecord],
) -> FleetBalance {
    compute_fleet_balance_by(earnings, disbursements, MatchBy::DriverName)
}

/// Reconcile all drivers with an explicit matching mode
///
/// Drivers are emitted in ascending key order, so repeated calls over the same
/// input produce identical output. Sums that leave the `Decimal` range are
/// clamped and reported through `overflowed`.
pub fn compute_fleet_balance_by(
    earnings: &[EarningsRecord],
    disbursements: &[DisbursementRecord],
    match_by: MatchBy,
) -> FleetBalance {
    let mut groups: BTreeMap<DriverKey, Accumulator> = BTreeMap::new();

    for record in earnings {
        let key = DriverKey::for_record(match_by, &record.driver_name, record.driver_id.as_ref());
        groups
            .entry(key)
            .or_insert_with(|| Accumulator::new(&record.driver_name))
            .add_earning(record);
    }

    for record in disbursements {
        let key = DriverKey::for_record(match_by, &record.driver_name, record.driver_id.as_ref());
        groups
            .entry(key)
            .or_insert_with(|| Accumulator::new(&record.driver_name))
            .add_payout(record);
    }

    let per_driver: Vec<DriverBalance> = groups.into_values().map(Accumulator::finish).collect();

    let mut overflowed = per_driver.iter().any(|d| d.overflowed);
    let mut fleet_total_earnings = Decimal::ZERO;
    let mut fleet_total_paid = Decimal::ZERO;
    for driver in &per_driver {
        fleet_total_earnings =
            add_money(fleet_total_earnings, driver.total_earnings, &mut overflowed);
        fleet_total_paid = add_money(fleet_total_paid, driver.total_paid, &mut overflowed);
    }
    let fleet_balance = sub_money(fleet_total_earnings, fleet_total_paid, &mut overflowed);

    if overflowed {
        tracing::warn!(drivers = per_driver.len(), "Fleet totals clamped on overflow");
    }

    FleetBalance {
        per_driver,
        fleet_total_earnings,
        fleet_total_paid,
        fleet_balance,
        overflowed,
    }
}

/// Balance of one driver under an explicit matching mode
///
/// Selects exactly the records `compute_fleet_balance_by` would group under
/// the same key: with `MatchBy::DriverId` and an ID, the records carrying that
/// ID; otherwise the records whose name equals `driver_name` and which, when
/// matching by ID, carry no ID of their own. The reported name for an ID group
/// is taken from its first record, falling back to `driver_name`.
pub fn compute_driver_balance_by(
    driver_name: &str,
    driver_id: Option<&DriverId>,
    earnings: &[EarningsRecord],
    disbursements: &[DisbursementRecord],
    match_by: MatchBy,
) -> DriverBalance {
    let target = DriverKey::for_record(match_by, driver_name, driver_id);
    let selects = |name: &str, id: Option<&DriverId>| {
        DriverKey::for_record(match_by, name, id) == target
    };

    let reported_name = match &target {
        DriverKey::Id(_) => earnings
            .iter()
            .filter(|r| selects(&r.driver_name, r.driver_id.as_ref()))
            .map(|r| r.driver_name.as_str())
            .chain(
                disbursements
                    .iter()
                    .filter(|r| selects(&r.driver_name, r.driver_id.as_ref()))
                    .map(|r| r.driver_name.as_str()),
            )
            .next()
            .unwrap_or(driver_name),
        DriverKey::Name(_) => driver_name,
    };

    let mut acc = Accumulator::new(reported_name);
    if let DriverKey::Id(id) = &target {
        acc.driver_id = Some(id.clone());
    }

    for record in earnings
        .iter()
        .filter(|r| selects(&r.driver_name, r.driver_id.as_ref()))
    {
        acc.add_earning(record);
    }

    for record in disbursements
        .iter()
        .filter(|r| selects(&r.driver_name, r.driver_id.as_ref()))
    {
        acc.add_payout(record);
    }

    acc.finish()
}

/// Balance of one driver by exact name. Unknown names yield an all-zero balance.
pub fn compute_driver_balance(
    driver_name: &str,
    earnings: &[EarningsRecord],
    disbursements: &[DisbursementRecord],
) -> DriverBalance {
    compute_driver_balance_by(driver_name, None, earnings, disbursements, MatchBy::DriverName)
}

/// Balance of one driver by stable ID
///
/// The reported name is taken from the first matching record; `fallback_name`
/// is used when no record carries the ID.
pub fn compute_driver_balance_by_id(
    driver_id: &DriverId,
    fallback_name: &str,
    earnings: &[EarningsRecord],
    disbursements: &[DisbursementRecord],
) -> DriverBalance {
    compute_driver_balance_by(
        fallback_name,
        Some(driver_id),
        earnings,
        disbursements,
        MatchBy::DriverId,
    )
}

/// Reconcile everything a source currently holds
pub fn reconcile<S: LedgerSource + ?Sized>(source: &S, match_by: MatchBy) -> FleetBalance {
    let earnings = source.list_earnings();
    let disbursements = source.list_disbursements();
    compute_fleet_balance_by(&earnings, &disbursements, match_by)
}
