//! Blotter CLI — the cross-app order flow without a terminal UI.
//!
//! Commands:
//! - `demo` — script the desk → combined round trip: draft orders, send
//!   them across the bus, execute them to completion, print both blotters
//! - `check-config` — parse a TOML config file and print the resolved setup

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use blotter_core::{
    BlotterConfig, ContextBus, InProcessBus, Order, OrderDraft, OrderStatus, Session, SessionEvent,
};

const DEMO_TICKERS: [&str; 5] = ["AAPL", "MSFT", "NVDA", "TSLA", "AMZN"];

#[derive(Parser)]
#[command(
    name = "blotter",
    about = "Order blotter demo — desk and combined apps on one context bus"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scripted desk → combined scenario and print both blotters.
    Demo {
        /// Number of orders to draft on the desk.
        #[arg(long, default_value_t = 3)]
        orders: usize,

        /// Milliseconds between fill increments.
        #[arg(long, default_value_t = 200)]
        tick_ms: u64,

        /// Trade date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        trade_date: Option<String>,

        /// Optional TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Parse a TOML config file and print the resolved setup.
    CheckConfig {
        /// Path to the config file.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo {
            orders,
            tick_ms,
            trade_date,
            config,
        } => run_demo(orders, tick_ms, trade_date.as_deref(), config),
        Commands::CheckConfig { path } => run_check_config(&path),
    }
}

fn run_demo(
    orders: usize,
    tick_ms: u64,
    trade_date: Option<&str>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    if orders == 0 {
        bail!("--orders must be at least 1");
    }

    let mut config = match config_path {
        Some(path) => BlotterConfig::from_file(path)?,
        None => BlotterConfig::default(),
    };
    config.fill.tick_ms = tick_ms;

    let trade_date = trade_date
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let bus: Arc<dyn ContextBus> = Arc::new(InProcessBus::new());
    let mut desk = Session::connect(config.desk_app(), Arc::clone(&bus), config.fill_settings());
    let mut combined = Session::connect(
        config.combined_app(),
        Arc::clone(&bus),
        config.fill_settings(),
    );

    // 1. Draft orders on the desk and send each to the combined app.
    println!("Drafting {orders} order(s) on {}...", desk.app_name());
    for i in 0..orders {
        let draft = OrderDraft {
            ticker: DEMO_TICKERS[i % DEMO_TICKERS.len()].to_string(),
            target_price: config.draft.target_price + (i as f64) * 5.0,
            target_quantity: config.draft.target_quantity + (i as u32 % 4) * 50,
            trade_date,
            ..config.draft.clone()
        };
        let id = desk.submit(draft)?;
        desk.send_to(id, &config.combined_app())?;
        debug!(order_id = %id, "drafted and sent");
    }

    // 2. Wait for every order to land on the combined side.
    pump_until(&mut combined, Duration::from_secs(5), |session, _| {
        session.store().len() == orders
    })?;
    println!(
        "{} received {} order(s).",
        combined.app_name(),
        combined.store().len()
    );

    // 3. Execute them all on the combined app.
    let ids: Vec<_> = combined.store().snapshot().iter().map(|o| o.order_id).collect();
    for id in ids {
        combined.execute(id)?;
    }
    println!("Executing... (tick {tick_ms}ms)");

    pump_until(&mut combined, fill_deadline(orders, tick_ms), |session, events| {
        for event in events {
            if let SessionEvent::FillProgress {
                order_id,
                executed_quantity,
                target_quantity,
            } = event
            {
                println!("  {order_id}: {executed_quantity}/{target_quantity}");
            }
        }
        session
            .store()
            .snapshot()
            .iter()
            .all(|o| o.status == OrderStatus::Filled)
    })?;

    // 4. Report both sides.
    print_blotter(desk.app_name().as_str(), &desk.store().snapshot());
    print_blotter(combined.app_name().as_str(), &combined.store().snapshot());

    combined.shutdown();
    desk.shutdown();
    Ok(())
}

/// Generous ceiling: four increments per order plus slack.
fn fill_deadline(orders: usize, tick_ms: u64) -> Duration {
    Duration::from_millis(tick_ms * 6 * orders as u64 + 2000)
}

/// Pump a session until `done` returns true or the deadline passes.
fn pump_until<F>(session: &mut Session, deadline: Duration, mut done: F) -> Result<()>
where
    F: FnMut(&Session, &[SessionEvent]) -> bool,
{
    let start = Instant::now();
    loop {
        let events = session.pump();
        if done(session, &events) {
            return Ok(());
        }
        if start.elapsed() > deadline {
            bail!("timed out waiting for the {} app", session.app_name());
        }
        thread::sleep(Duration::from_millis(10));
    }
}

fn print_blotter(app: &str, orders: &[Order]) {
    println!();
    println!("=== {app} blotter ({} orders) ===", orders.len());
    if orders.is_empty() {
        println!("(empty)");
        return;
    }
    println!(
        "{:<6} {:<7} {:<5} {:>11} {:>9} {:>11} {:<11} {:<11} {:<8}",
        "ID", "Ticker", "Side", "Exec", "Price", "Amount", "Trade", "Settle", "Status"
    );
    println!("{}", "-".repeat(88));
    for order in orders {
        println!(
            "{:<6} {:<7} {:<5} {:>11} {:>9.2} {:>11.2} {:<11} {:<11} {:<8}",
            order.order_id.to_string(),
            order.ticker,
            order.transaction_type.label(),
            format!("{}/{}", order.executed_quantity, order.target_quantity),
            order.target_price,
            order.target_amount,
            order.trade_date.format("%Y-%m-%d").to_string(),
            order.settlement_date.format("%Y-%m-%d").to_string(),
            order.status.to_string(),
        );
    }
}

fn run_check_config(path: &Path) -> Result<()> {
    let config = BlotterConfig::from_file(path)?;

    println!("Config OK: {}", path.display());
    println!();
    println!("Apps:");
    println!("  desk:     {}", config.apps.desk);
    println!("  combined: {}", config.apps.combined);
    println!("Fill:");
    println!("  tick:     {}ms", config.fill.tick_ms);
    println!("  step:     {:.0}% of target", config.fill.increment_fraction * 100.0);
    println!("Draft defaults:");
    println!("  {} {} x{} @ {}", config.draft.transaction_type.label(), config.draft.ticker, config.draft.target_quantity, config.draft.target_price);
    println!("  broker {}, account {}, trade date {}", config.draft.broker.label(), config.draft.account, config.draft.trade_date);
    Ok(())
}
