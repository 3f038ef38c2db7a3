//! Record store
//!
//! # Collections
//!
//! - `earnings` - Append-only fare log (key: record id)
//! - `disbursements` - Append-only payout log (key: record id)
//! - `drivers` - Driver roster (key: `DRV-nnn`)
//! - `cars` - Car roster (key: record id)
//!
//! Everything lives in memory behind one lock and is persisted as a single
//! JSON document. Saving writes a sibling temp file and renames it over the
//! target.

use crate::{
    balance::LedgerSource,
    error::{Error, Result},
    types::{
        Car, DisbursementRecord, Driver, DriverId, EarningsRecord, NewCar, NewDisbursement,
        NewDriver, NewEarning, RecordId,
    },
};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest amount a single fare or payout may carry (one trillion)
pub const MAX_RECORD_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// On-disk layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    last_earning_id: RecordId,
    #[serde(default)]
    last_disbursement_id: RecordId,
    #[serde(default)]
    last_driver_seq: u64,
    #[serde(default)]
    last_car_id: RecordId,
    #[serde(default)]
    earnings: Vec<EarningsRecord>,
    #[serde(default)]
    disbursements: Vec<DisbursementRecord>,
    #[serde(default)]
    drivers: Vec<Driver>,
    #[serde(default)]
    cars: Vec<Car>,
}

impl LedgerFile {
    /// Counters never go below what the records already use, even if the
    /// file was edited by hand.
    fn repair_sequences(&mut self) {
        let max_earning = self.earnings.iter().map(|r| r.id).max().unwrap_or(0);
        self.last_earning_id = self.last_earning_id.max(max_earning);

        let max_disbursement = self.disbursements.iter().map(|r| r.id).max().unwrap_or(0);
        self.last_disbursement_id = self.last_disbursement_id.max(max_disbursement);

        let max_car = self.cars.iter().map(|c| c.id).max().unwrap_or(0);
        self.last_car_id = self.last_car_id.max(max_car);

        let max_driver = self
            .drivers
            .iter()
            .filter_map(|d| d.id.as_str().strip_prefix("DRV-"))
            .filter_map(|seq| seq.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.last_driver_seq = self.last_driver_seq.max(max_driver);
    }
}

/// Consistent copy of both record collections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// Earnings at snapshot time
    pub earnings: Vec<EarningsRecord>,
    /// Disbursements at snapshot time
    pub disbursements: Vec<DisbursementRecord>,
}

impl LedgerSource for LedgerSnapshot {
    fn list_earnings(&self) -> Vec<EarningsRecord> {
        self.earnings.clone()
    }

    fn list_disbursements(&self) -> Vec<DisbursementRecord> {
        self.disbursements.clone()
    }
}

/// Store statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Earnings records held
    pub total_earnings: usize,
    /// Disbursement records held
    pub total_disbursements: usize,
    /// Registered drivers
    pub total_drivers: usize,
    /// Registered cars
    pub total_cars: usize,
}

/// In-process record store with explicit load/save
#[derive(Debug)]
pub struct LedgerStore {
    path: Option<PathBuf>,
    state: RwLock<LedgerFile>,
}

impl LedgerStore {
    /// Empty store that is never persisted
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(LedgerFile::default()),
        }
    }

    /// Open a store file, starting empty if it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let mut file: LedgerFile = serde_json::from_str(&content)?;
            file.repair_sequences();
            file
        } else {
            LedgerFile::default()
        };

        tracing::info!(
            path = %path.display(),
            earnings = file.earnings.len(),
            disbursements = file.disbursements.len(),
            drivers = file.drivers.len(),
            cars = file.cars.len(),
            "Opened ledger store"
        );

        Ok(Self {
            path: Some(path),
            state: RwLock::new(file),
        })
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persist the store. No-op for in-memory stores.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            tracing::debug!("In-memory store, nothing to save");
            return Ok(());
        };

        let content = {
            let state = self.state.read();
            serde_json::to_string_pretty(&*state)?
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;

        tracing::info!(path = %path.display(), "Ledger store saved");
        Ok(())
    }

    // Record operations

    /// Append a fare
    pub fn append_earning(&self, fare: NewEarning) -> Result<EarningsRecord> {
        validate_entry(&fare.driver_name, fare.amount)?;

        let mut state = self.state.write();
        state.last_earning_id += 1;
        let record = fare.into_record(state.last_earning_id);
        state.earnings.push(record.clone());

        tracing::debug!(
            id = record.id,
            driver = %record.driver_name,
            amount = %record.amount,
            "Earning appended"
        );

        Ok(record)
    }

    /// Append a payout
    pub fn append_disbursement(&self, payout: NewDisbursement) -> Result<DisbursementRecord> {
        self.append_disbursement_if(payout, |_, _| Ok(()))
    }

    /// Append a payout if `check` accepts it
    ///
    /// `check` sees the collections under the write lock, so nothing can be
    /// appended between the check and the append.
    pub fn append_disbursement_if<F>(
        &self,
        payout: NewDisbursement,
        check: F,
    ) -> Result<DisbursementRecord>
    where
        F: FnOnce(&[EarningsRecord], &[DisbursementRecord]) -> Result<()>,
    {
        validate_entry(&payout.driver_name, payout.amount)?;

        let mut state = self.state.write();
        check(&state.earnings, &state.disbursements)?;

        state.last_disbursement_id += 1;
        let record = payout.into_record(state.last_disbursement_id);
        state.disbursements.push(record.clone());

        tracing::debug!(
            id = record.id,
            driver = %record.driver_name,
            amount = %record.amount,
            method = %record.method,
            "Disbursement appended"
        );

        Ok(record)
    }

    /// Both collections captured under one read lock
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read();
        LedgerSnapshot {
            earnings: state.earnings.clone(),
            disbursements: state.disbursements.clone(),
        }
    }

    /// Remove every earnings record. IDs keep counting from where they were.
    pub fn clear_earnings(&self) -> usize {
        let removed = std::mem::take(&mut self.state.write().earnings).len();
        tracing::info!(removed, "Earnings cleared");
        removed
    }

    /// Remove every disbursement record. IDs keep counting from where they were.
    pub fn clear_disbursements(&self) -> usize {
        let removed = std::mem::take(&mut self.state.write().disbursements).len();
        tracing::info!(removed, "Disbursements cleared");
        removed
    }

    // Roster operations

    /// Register a driver
    pub fn add_driver(&self, driver: NewDriver) -> Result<Driver> {
        require("Driver name", &driver.name)?;
        require("License number", &driver.license)?;

        let mut state = self.state.write();
        if state.drivers.iter().any(|d| d.license == driver.license) {
            return Err(Error::DuplicateDriver(format!(
                "license {} already registered",
                driver.license
            )));
        }

        state.last_driver_seq += 1;
        let driver = Driver {
            id: DriverId::from_sequence(state.last_driver_seq),
            name: driver.name,
            license: driver.license,
            phone: driver.phone,
            status: driver.status,
            added_on: driver.added_on,
        };
        state.drivers.push(driver.clone());

        tracing::info!(id = %driver.id, name = %driver.name, "Driver registered");
        Ok(driver)
    }

    /// Remove a driver from the roster. Their ledger records are kept.
    pub fn remove_driver(&self, id: &DriverId) -> Result<Driver> {
        let mut state = self.state.write();
        let index = state
            .drivers
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| Error::DriverNotFound(id.to_string()))?;

        let driver = state.drivers.remove(index);
        tracing::info!(id = %driver.id, name = %driver.name, "Driver removed");
        Ok(driver)
    }

    /// Roster in registration order
    pub fn list_drivers(&self) -> Vec<Driver> {
        self.state.read().drivers.clone()
    }

    /// Register a car
    pub fn add_car(&self, car: NewCar) -> Result<Car> {
        require("Car model", &car.model)?;
        require("CPNC number", &car.cpnc)?;
        require("License plate", &car.plate)?;

        let mut state = self.state.write();
        if state.cars.iter().any(|c| c.cpnc == car.cpnc) {
            return Err(Error::DuplicateCar(format!("CPNC {} already registered", car.cpnc)));
        }
        if state.cars.iter().any(|c| c.plate == car.plate) {
            return Err(Error::DuplicateCar(format!("plate {} already registered", car.plate)));
        }

        state.last_car_id += 1;
        let car = Car {
            id: state.last_car_id,
            model: car.model,
            year: car.year,
            cpnc: car.cpnc,
            plate: car.plate,
            status: car.status,
            added_on: car.added_on,
        };
        state.cars.push(car.clone());

        tracing::info!(id = car.id, model = %car.model, plate = %car.plate, "Car registered");
        Ok(car)
    }

    /// Cars in registration order
    pub fn list_cars(&self) -> Vec<Car> {
        self.state.read().cars.clone()
    }

    /// Get store statistics
    pub fn stats(&self) -> StoreStats {
        let state = self.state.read();
        StoreStats {
            total_earnings: state.earnings.len(),
            total_disbursements: state.disbursements.len(),
            total_drivers: state.drivers.len(),
            total_cars: state.cars.len(),
        }
    }
}

impl LedgerSource for LedgerStore {
    fn list_earnings(&self) -> Vec<EarningsRecord> {
        self.state.read().earnings.clone()
    }

    fn list_disbursements(&self) -> Vec<DisbursementRecord> {
        self.state.read().disbursements.clone()
    }
}

fn validate_entry(driver_name: &str, amount: Decimal) -> Result<()> {
    require("Driver name", driver_name)?;
    if amount < Decimal::ZERO {
        return Err(Error::InvalidRecord(format!(
            "Amount must not be negative, got {}",
            amount
        )));
    }
    if amount > MAX_RECORD_AMOUNT {
        return Err(Error::InvalidRecord(format!(
            "Amount {} exceeds the per-record limit of {}",
            amount, MAX_RECORD_AMOUNT
        )));
    }
    Ok(())
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidRecord(format!("{} is required", field)));
    }
    Ok(())
}
