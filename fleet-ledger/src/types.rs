//! Core types for the fleet ledger
//!
//! All types are designed for:
//! - Stable JSON persistence (serde)
//! - Exact arithmetic (Decimal for money)
//! - Append-only records (no setters on stored records)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic record identifier, assigned by the store starting at 1
pub type RecordId = u64;

/// Stable driver identifier (`DRV-001`, `DRV-002`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(String);

impl DriverId {
    /// Create new driver ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Driver ID for the given roster sequence number
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("DRV-{:03}", seq))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collection status of a single fare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FareStatus {
    /// Fare collected
    Paid,
    /// Fare still outstanding
    Unpaid,
}

impl FareStatus {
    /// Display label
    pub fn as_str(&self) -> &'static str {
        match self {
            FareStatus::Paid => "Paid",
            FareStatus::Unpaid => "Unpaid",
        }
    }
}

/// How a disbursement was paid out. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash in hand
    Cash,
    /// Bank transfer
    BankTransfer,
    /// UPI / digital wallet
    DigitalWallet,
    /// Card
    Card,
}

impl PaymentMethod {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::DigitalWallet => "UPI/Digital Wallet",
            PaymentMethod::Card => "Card",
        }
    }

    /// Parse a user-entered method name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "bank" | "bank transfer" | "bank_transfer" | "banktransfer" => {
                Some(PaymentMethod::BankTransfer)
            }
            "upi" | "wallet" | "digital wallet" | "digital_wallet" | "upi/digital wallet" => {
                Some(PaymentMethod::DigitalWallet)
            }
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A fare collected by a driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsRecord {
    /// Record ID
    pub id: RecordId,

    /// Driver name, matched by exact string equality
    pub driver_name: String,

    /// Stable driver ID (only used when matching by ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<DriverId>,

    /// Date the fare was earned
    pub date: NaiveDate,

    /// Fare amount
    pub amount: Decimal,

    /// Collection status of this fare
    pub status: FareStatus,
}

/// A payout made to a driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementRecord {
    /// Record ID
    pub id: RecordId,

    /// Driver name, matched by exact string equality
    pub driver_name: String,

    /// Stable driver ID (only used when matching by ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<DriverId>,

    /// Date of the payout
    pub date: NaiveDate,

    /// Amount paid out
    pub amount: Decimal,

    /// Payment method
    pub method: PaymentMethod,

    /// Free-text notes
    #[serde(default)]
    pub notes: String,
}

/// Earnings entry as submitted, before the store assigns an ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEarning {
    /// Driver name
    pub driver_name: String,
    /// Optional stable driver ID
    pub driver_id: Option<DriverId>,
    /// Date earned
    pub date: NaiveDate,
    /// Fare amount
    pub amount: Decimal,
    /// Collection status
    pub status: FareStatus,
}

impl NewEarning {
    /// Unpaid fare for a driver
    pub fn new(driver_name: impl Into<String>, date: NaiveDate, amount: Decimal) -> Self {
        Self {
            driver_name: driver_name.into(),
            driver_id: None,
            date,
            amount,
            status: FareStatus::Unpaid,
        }
    }

    /// Set collection status
    pub fn with_status(mut self, status: FareStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach stable driver ID
    pub fn with_driver_id(mut self, driver_id: DriverId) -> Self {
        self.driver_id = Some(driver_id);
        self
    }

    pub(crate) fn into_record(self, id: RecordId) -> EarningsRecord {
        EarningsRecord {
            id,
            driver_name: self.driver_name,
            driver_id: self.driver_id,
            date: self.date,
            amount: self.amount,
            status: self.status,
        }
    }
}

/// Disbursement as submitted, before the store assigns an ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDisbursement {
    /// Driver name
    pub driver_name: String,
    /// Optional stable driver ID
    pub driver_id: Option<DriverId>,
    /// Payout date
    pub date: NaiveDate,
    /// Amount paid out
    pub amount: Decimal,
    /// Payment method
    pub method: PaymentMethod,
    /// Notes
    pub notes: String,
}

impl NewDisbursement {
    /// Cash payout to a driver
    pub fn new(driver_name: impl Into<String>, date: NaiveDate, amount: Decimal) -> Self {
        Self {
            driver_name: driver_name.into(),
            driver_id: None,
            date,
            amount,
            method: PaymentMethod::Cash,
            notes: String::new(),
        }
    }

    /// Set payment method
    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    /// Set notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Attach stable driver ID
    pub fn with_driver_id(mut self, driver_id: DriverId) -> Self {
        self.driver_id = Some(driver_id);
        self
    }

    pub(crate) fn into_record(self, id: RecordId) -> DisbursementRecord {
        DisbursementRecord {
            id,
            driver_name: self.driver_name,
            driver_id: self.driver_id,
            date: self.date,
            amount: self.amount,
            method: self.method,
            notes: self.notes,
        }
    }
}

/// Roster status of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverStatus {
    /// Working
    Active,
    /// Not working
    Inactive,
    /// Temporarily away
    OnLeave,
}

/// Registered driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// Driver ID
    pub id: DriverId,
    /// Full name
    pub name: String,
    /// License number (unique)
    pub license: String,
    /// Phone number
    #[serde(default)]
    pub phone: String,
    /// Roster status
    pub status: DriverStatus,
    /// Date registered
    pub added_on: NaiveDate,
}

/// Driver registration form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDriver {
    /// Full name
    pub name: String,
    /// License number
    pub license: String,
    /// Phone number
    pub phone: String,
    /// Initial status
    pub status: DriverStatus,
    /// Date registered
    pub added_on: NaiveDate,
}

impl NewDriver {
    /// Active driver with no phone on file
    pub fn new(name: impl Into<String>, license: impl Into<String>, added_on: NaiveDate) -> Self {
        Self {
            name: name.into(),
            license: license.into(),
            phone: String::new(),
            status: DriverStatus::Active,
            added_on,
        }
    }

    /// Set phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Set roster status
    pub fn with_status(mut self, status: DriverStatus) -> Self {
        self.status = status;
        self
    }
}

/// Roster status of a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarStatus {
    /// Ready for a driver
    Available,
    /// Currently on the road
    InService,
    /// In the workshop
    Maintenance,
}

/// Registered car
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    /// Car ID
    pub id: RecordId,
    /// Make and model
    pub model: String,
    /// Model year
    pub year: u16,
    /// CPNC permit number (unique)
    pub cpnc: String,
    /// License plate (unique)
    pub plate: String,
    /// Roster status
    pub status: CarStatus,
    /// Date registered
    pub added_on: NaiveDate,
}

/// Car registration form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCar {
    /// Make and model
    pub model: String,
    /// Model year
    pub year: u16,
    /// CPNC permit number
    pub cpnc: String,
    /// License plate
    pub plate: String,
    /// Initial status
    pub status: CarStatus,
    /// Date registered
    pub added_on: NaiveDate,
}

impl NewCar {
    /// Available car
    pub fn new(
        model: impl Into<String>,
        year: u16,
        cpnc: impl Into<String>,
        plate: impl Into<String>,
        added_on: NaiveDate,
    ) -> Self {
        Self {
            model: model.into(),
            year,
            cpnc: cpnc.into(),
            plate: plate.into(),
            status: CarStatus::Available,
            added_on,
        }
    }

    /// Set roster status
    pub fn with_status(mut self, status: CarStatus) -> Self {
        self.status = status;
        self
    }
}
