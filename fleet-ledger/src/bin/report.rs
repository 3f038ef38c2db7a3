//! Fleet ledger command-line report
//!
//! ```text
//! fleet-report [--config PATH] balances [--sort name|balance]
//! fleet-report [--config PATH] letter NAME
//! fleet-report [--config PATH] dashboard
//! fleet-report [--config PATH] fare NAME AMOUNT [YYYY-MM-DD]
//! fleet-report [--config PATH] pay NAME AMOUNT [METHOD] [DRV-nnn] [YYYY-MM-DD]
//! ```

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use fleet_ledger::{
    BalanceOrder, Config, DriverId, FleetLedger, NewDisbursement, NewEarning, PaymentMethod,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let config = load_config(&mut args)?;
    init_tracing(config.log_json);

    tracing::info!(data_file = %config.data_file.display(), "Starting fleet report");
    let ledger = FleetLedger::open(config).context("failed to open ledger store")?;

    let mut args = args.into_iter();
    match args.next().as_deref() {
        Some("balances") | None => {
            let order = match (args.next().as_deref(), args.next().as_deref()) {
                (Some("--sort"), Some("balance")) => BalanceOrder::BalanceDescending,
                (Some("--sort"), Some("name")) | (None, _) => BalanceOrder::Name,
                (flag, value) => bail!("unexpected arguments: {:?} {:?}", flag, value),
            };
            print_balances(&ledger, order);
        }
        Some("letter") => {
            let name = args.next().ok_or_else(|| anyhow!("letter needs a driver name"))?;
            for (label, value) in ledger.letter_facts(&name).fields() {
                println!("{:<16}{}", label, value);
            }
        }
        Some("dashboard") => {
            let summary = ledger.dashboard();
            println!(
                "Drivers          {} ({} active)",
                summary.total_drivers, summary.active_drivers
            );
            println!(
                "Cars             {} ({} available)",
                summary.total_cars, summary.available_cars
            );
            println!("Unpaid fares     {}", summary.unpaid_fares);
            println!("Drivers owed     {}", summary.drivers_owed);
            println!("Drivers settled  {}", summary.drivers_settled);
            println!("Drivers overpaid {}", summary.drivers_overpaid);
            println!("Total earnings   {:.2}", summary.fleet_total_earnings);
            println!("Total paid       {:.2}", summary.fleet_total_paid);
            println!("Fleet balance    {:.2}", summary.fleet_balance);
        }
        Some("fare") => {
            let name = args.next().ok_or_else(|| anyhow!("fare needs a driver name"))?;
            let amount = parse_amount(args.next())?;
            let date = parse_date(args.next())?;

            let record = ledger.record_fare(NewEarning::new(name, date, amount))?;
            ledger.save()?;
            println!(
                "Recorded fare #{} for {}: {:.2}",
                record.id, record.driver_name, record.amount
            );
        }
        Some("pay") => {
            let name = args.next().ok_or_else(|| anyhow!("pay needs a driver name"))?;
            let amount = parse_amount(args.next())?;

            let mut payout = NewDisbursement::new(name, chrono::Local::now().date_naive(), amount);
            for arg in args {
                if let Some(method) = PaymentMethod::parse(&arg) {
                    payout = payout.with_method(method);
                } else if arg.starts_with("DRV-") {
                    payout = payout.with_driver_id(DriverId::new(arg));
                } else {
                    payout.date = parse_date(Some(arg))?;
                }
            }

            let record = ledger.pay_driver(payout)?;
            ledger.save()?;
            println!(
                "Paid {} {:.2} by {} (payout #{})",
                record.driver_name, record.amount, record.method, record.id
            );
        }
        Some(other) => bail!("unknown command '{}'", other),
    }

    tracing::debug!(
        reconciliations = ledger.metrics().reconciliations_total.get(),
        "Fleet report finished"
    );
    Ok(())
}

/// Pull `--config PATH` out of the arguments; environment overrides apply on top
fn load_config(args: &mut Vec<String>) -> anyhow::Result<Config> {
    let mut config = match args.iter().position(|a| a == "--config") {
        Some(index) => {
            let path = args
                .get(index + 1)
                .cloned()
                .ok_or_else(|| anyhow!("--config needs a path"))?;
            args.remove(index + 1);
            args.remove(index);
            Config::from_file(&path).with_context(|| format!("failed to load {}", path))?
        }
        None => Config::default(),
    };
    config.apply_env()?;
    Ok(config)
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_balances(ledger: &FleetLedger, order: BalanceOrder) {
    let fleet = ledger.fleet_balance().sorted_by(order);

    println!(
        "{:<24}{:>14}{:>14}{:>14}  {}",
        "Driver", "Earnings", "Paid", "Balance", "Flag"
    );
    for driver in &fleet.per_driver {
        let flag = if driver.is_overpaid { "OVERPAID" } else { "" };
        println!(
            "{:<24}{:>14.2}{:>14.2}{:>14.2}  {}",
            driver.driver_name, driver.total_earnings, driver.total_paid, driver.balance, flag
        );
    }
    println!(
        "{:<24}{:>14.2}{:>14.2}{:>14.2}",
        "FLEET", fleet.fleet_total_earnings, fleet.fleet_total_paid, fleet.fleet_balance
    );
}

fn parse_amount(arg: Option<String>) -> anyhow::Result<Decimal> {
    let raw = arg.ok_or_else(|| anyhow!("missing amount"))?;
    Decimal::from_str(raw.trim()).with_context(|| format!("invalid amount '{}'", raw))
}

fn parse_date(arg: Option<String>) -> anyhow::Result<NaiveDate> {
    match arg {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", raw)),
        None => Ok(chrono::Local::now().date_naive()),
    }
}
