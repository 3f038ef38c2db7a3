//! Error types for the fleet ledger

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Reconciliation itself never fails; these surface at the store boundary
/// (record creation, persistence) and in the pay-driver flow.
#[derive(Error, Debug)]
pub enum Error {
    /// Record rejected at creation (negative amount, empty driver name, ...)
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Disbursement larger than what the fleet currently owes the driver
    #[error("Payout of {requested} to {driver} exceeds payable balance {payable}")]
    ExceedsPayable {
        /// Driver name as entered
        driver: String,
        /// Requested payout
        requested: Decimal,
        /// Current payable ceiling
        payable: Decimal,
    },

    /// Driver with the same license already registered
    #[error("Duplicate driver: {0}")]
    DuplicateDriver(String),

    /// Car with the same CPNC or plate already registered
    #[error("Duplicate car: {0}")]
    DuplicateCar(String),

    /// Driver not in the roster
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Store file (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Other(format!("Metrics error: {}", err))
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
