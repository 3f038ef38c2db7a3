//! Driver payment statement facts
//!
//! Resolves a [`DriverBalance`] into the values a statement letter needs.
//! Formatting and delivery belong to the renderer.
//!
//! Only two statuses exist here: an overpaid driver (negative balance) is
//! reported as `PAID IN FULL`, while the dashboard counts overpaid drivers on
//! their own.

use crate::balance::{compute_driver_balance, DriverBalance};
use crate::types::{DisbursementRecord, EarningsRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment status printed on a driver letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterStatus {
    /// Fleet still owes the driver
    #[serde(rename = "PENDING PAYMENT")]
    PendingPayment,
    /// Nothing owed (includes overpaid drivers)
    #[serde(rename = "PAID IN FULL")]
    PaidInFull,
}

impl LetterStatus {
    /// Classify a balance
    pub fn for_balance(balance: Decimal) -> Self {
        if balance > Decimal::ZERO {
            LetterStatus::PendingPayment
        } else {
            LetterStatus::PaidInFull
        }
    }

    /// Status string as printed
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterStatus::PendingPayment => "PENDING PAYMENT",
            LetterStatus::PaidInFull => "PAID IN FULL",
        }
    }
}

impl fmt::Display for LetterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fully resolved facts for one driver's statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterFacts {
    /// Driver name
    pub driver_name: String,
    /// Total earned
    pub total_earnings: Decimal,
    /// Total paid out
    pub total_paid: Decimal,
    /// Outstanding balance
    pub balance: Decimal,
    /// Letter status
    pub status: LetterStatus,
}

impl LetterFacts {
    /// Project a balance into letter facts
    pub fn from_balance(balance: &DriverBalance) -> Self {
        Self {
            driver_name: balance.driver_name.clone(),
            total_earnings: balance.total_earnings,
            total_paid: balance.total_paid,
            balance: balance.balance,
            status: LetterStatus::for_balance(balance.balance),
        }
    }

    /// Label/value pairs in statement order, money rounded to cents
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Driver", self.driver_name.clone()),
            ("Total Earnings", format!("{:.2}", self.total_earnings)),
            ("Total Paid", format!("{:.2}", self.total_paid)),
            ("Balance", format!("{:.2}", self.balance)),
            ("Status", self.status.to_string()),
        ]
    }
}

impl From<&DriverBalance> for LetterFacts {
    fn from(balance: &DriverBalance) -> Self {
        Self::from_balance(balance)
    }
}

/// Letter facts for a driver straight from the record collections
pub fn extract_letter_facts(
    driver_name: &str,
    earnings: &[EarningsRecord],
    disbursements: &[DisbursementRecord],
) -> LetterFacts {
    LetterFacts::from_balance(&compute_driver_balance(driver_name, earnings, disbursements))
}
