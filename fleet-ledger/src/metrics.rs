//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the fleet ledger.
//!
//! # Metrics
//!
//! - `fleet_earnings_appended_total` - Fares recorded
//! - `fleet_disbursements_appended_total` - Payouts recorded
//! - `fleet_payouts_rejected_total` - Payouts refused by the pay-driver flow
//! - `fleet_reconciliations_total` - Reconciliation runs
//! - `fleet_reconcile_duration_seconds` - Histogram of reconciliation latencies
//!
//! Each `Metrics` owns its registry, so several ledgers can live in one process.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Fares recorded
    pub earnings_appended: IntCounter,

    /// Payouts recorded
    pub disbursements_appended: IntCounter,

    /// Payouts refused
    pub payouts_rejected: IntCounter,

    /// Reconciliation runs
    pub reconciliations_total: IntCounter,

    /// Reconciliation duration histogram
    pub reconcile_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let earnings_appended =
            IntCounter::new("fleet_earnings_appended_total", "Total number of fares recorded")?;
        registry.register(Box::new(earnings_appended.clone()))?;

        let disbursements_appended = IntCounter::new(
            "fleet_disbursements_appended_total",
            "Total number of driver payouts recorded",
        )?;
        registry.register(Box::new(disbursements_appended.clone()))?;

        let payouts_rejected = IntCounter::new(
            "fleet_payouts_rejected_total",
            "Total number of payouts refused by the pay-driver flow",
        )?;
        registry.register(Box::new(payouts_rejected.clone()))?;

        let reconciliations_total = IntCounter::new(
            "fleet_reconciliations_total",
            "Total number of reconciliation runs",
        )?;
        registry.register(Box::new(reconciliations_total.clone()))?;

        let reconcile_duration = Histogram::with_opts(
            HistogramOpts::new(
                "fleet_reconcile_duration_seconds",
                "Histogram of reconciliation latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.500]),
        )?;
        registry.register(Box::new(reconcile_duration.clone()))?;

        Ok(Self {
            earnings_appended,
            disbursements_appended,
            payouts_rejected,
            reconciliations_total,
            reconcile_duration,
            registry,
        })
    }

    /// Record a fare append
    pub fn record_earning(&self) {
        self.earnings_appended.inc();
    }

    /// Record a payout append
    pub fn record_disbursement(&self) {
        self.disbursements_appended.inc();
    }

    /// Record a refused payout
    pub fn record_rejected_payout(&self) {
        self.payouts_rejected.inc();
    }

    /// Record a reconciliation run
    pub fn record_reconciliation(&self, elapsed: Duration) {
        self.reconciliations_total.inc();
        self.reconcile_duration.observe(elapsed.as_secs_f64());
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Prometheus text exposition of every metric
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .is_err()
        {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("earnings_appended", &self.earnings_appended.get())
            .field("disbursements_appended", &self.disbursements_appended.get())
            .field("payouts_rejected", &self.payouts_rejected.get())
            .field("reconciliations_total", &self.reconciliations_total.get())
            .finish_non_exhaustive()
    }
}
