//! Dashboard summary
//!
//! Roster counts next to the balance classification. Unlike letters, the
//! dashboard keeps overpaid drivers apart from settled ones.

use crate::balance::FleetBalance;
use crate::types::{Car, CarStatus, Driver, DriverStatus, EarningsRecord, FareStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline numbers for the dashboard page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Registered drivers
    pub total_drivers: usize,
    /// Drivers with `Active` status
    pub active_drivers: usize,
    /// Registered cars
    pub total_cars: usize,
    /// Cars with `Available` status
    pub available_cars: usize,
    /// Drivers the fleet still owes
    pub drivers_owed: usize,
    /// Drivers with a zero balance
    pub drivers_settled: usize,
    /// Drivers paid more than they earned
    pub drivers_overpaid: usize,
    /// Fares not yet collected
    pub unpaid_fares: usize,
    /// Fleet-wide earnings
    pub fleet_total_earnings: Decimal,
    /// Fleet-wide payouts
    pub fleet_total_paid: Decimal,
    /// Fleet-wide balance
    pub fleet_balance: Decimal,
}

impl DashboardSummary {
    /// Build from the roster, the raw earnings and a reconciled fleet balance
    pub fn build(
        drivers: &[Driver],
        cars: &[Car],
        earnings: &[EarningsRecord],
        fleet: &FleetBalance,
    ) -> Self {
        Self {
            total_drivers: drivers.len(),
            active_drivers: drivers
                .iter()
                .filter(|d| d.status == DriverStatus::Active)
                .count(),
            total_cars: cars.len(),
            available_cars: cars
                .iter()
                .filter(|c| c.status == CarStatus::Available)
                .count(),
            drivers_owed: fleet.per_driver.iter().filter(|d| d.is_owed()).count(),
            drivers_settled: fleet.per_driver.iter().filter(|d| d.is_settled()).count(),
            drivers_overpaid: fleet.per_driver.iter().filter(|d| d.is_overpaid).count(),
            unpaid_fares: earnings
                .iter()
                .filter(|e| e.status == FareStatus::Unpaid)
                .count(),
            fleet_total_earnings: fleet.fleet_total_earnings,
            fleet_total_paid: fleet.fleet_total_paid,
            fleet_balance: fleet.fleet_balance,
        }
    }
}
