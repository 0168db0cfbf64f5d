//! # Quote Tool
//!
//! Prints the plan breakdown for a catalog item, for checking catalog data
//! and plan math without the storefront.
//!
//! ## Usage
//! ```bash
//! # Default selection, pay-to-own over 2 weeks
//! cargo run -p xtrapush-checkout --bin xtrapush-quote -- --catalog ./item.json
//!
//! # 256GB, 6 weeks, priced in pounds
//! cargo run -p xtrapush-checkout --bin xtrapush-quote -- \
//!     --catalog ./item.json --storage 256GB --weeks 6 --locale international
//!
//! # 18-month lease with a live stock check, as JSON
//! cargo run -p xtrapush-checkout --bin xtrapush-quote -- \
//!     --catalog ./item.json --plan lease --lease-months 18 --check-stock --json
//! ```
//!
//! The catalog file uses the upstream API shape (either field spelling,
//! optionally wrapped in `{ "data": ... }`).

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use xtrapush_checkout::{CatalogSource, CheckoutConfig, StaticCatalog, StockValidator};
use xtrapush_core::{
    reduce, CheckoutAction, CheckoutState, Condition, InstallmentWeeks, LeaseDuration, Locale, PlanType,
};

#[derive(Debug, Parser)]
#[command(name = "xtrapush-quote", about = "Quote installment and lease plans for a catalog item", long_about = None)]
struct QuoteArgs {
    /// Catalog item JSON file
    #[arg(long)]
    catalog: PathBuf,

    /// Color to select
    #[arg(long)]
    color: Option<String>,

    /// Storage to select, e.g. 256GB
    #[arg(long)]
    storage: Option<String>,

    /// Condition to select (new, like_new, good, fair)
    #[arg(long, value_parser = parse_condition)]
    condition: Option<Condition>,

    /// Plan type (pay-to-own, pay-to-lease)
    #[arg(long, default_value = "pay-to-own")]
    plan: PlanType,

    /// Installment weeks for pay-to-own (2, 4 or 6)
    #[arg(long, default_value_t = 2)]
    weeks: u32,

    /// Lease length in months
    #[arg(long, conflicts_with_all = ["lease_weeks", "lease_days", "lease_start"])]
    lease_months: Option<u32>,

    /// Lease length in weeks
    #[arg(long, conflicts_with_all = ["lease_days", "lease_start"])]
    lease_weeks: Option<u32>,

    /// Lease length in days
    #[arg(long, conflicts_with = "lease_start")]
    lease_days: Option<u32>,

    /// Lease start date (YYYY-MM-DD), used with --lease-end
    #[arg(long, requires = "lease_end")]
    lease_start: Option<NaiveDate>,

    /// Lease end date (YYYY-MM-DD)
    #[arg(long, requires = "lease_start")]
    lease_end: Option<NaiveDate>,

    /// Market locale; overrides the config file
    #[arg(long)]
    locale: Option<Locale>,

    /// Re-read the catalog file and run the stock check
    #[arg(long)]
    check_stock: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Config file path (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_condition(token: &str) -> Result<Condition, String> {
    Condition::from_token(token).ok_or_else(|| format!("unknown condition '{}'", token))
}

impl QuoteArgs {
    fn lease_duration(&self) -> Option<LeaseDuration> {
        if let Some(count) = self.lease_months {
            return Some(LeaseDuration::Months { count });
        }
        if let Some(count) = self.lease_weeks {
            return Some(LeaseDuration::Weeks { count });
        }
        if let Some(count) = self.lease_days {
            return Some(LeaseDuration::Days { count });
        }
        match (self.lease_start, self.lease_end) {
            (Some(start), Some(end)) => Some(LeaseDuration::DateRange { start, end }),
            _ => None,
        }
    }

    /// Reducer actions in the order the storefront would send them.
    fn actions(&self) -> Result<Vec<CheckoutAction>, Box<dyn std::error::Error>> {
        let mut actions = Vec::new();

        if let Some(color) = &self.color {
            actions.push(CheckoutAction::SelectColor(color.clone()));
        }
        if let Some(storage) = &self.storage {
            actions.push(CheckoutAction::SelectStorage(storage.clone()));
        }
        if let Some(condition) = self.condition {
            actions.push(CheckoutAction::SelectCondition(condition));
        }

        actions.push(CheckoutAction::SelectWeeks(InstallmentWeeks::try_from(self.weeks)?));
        if let Some(duration) = self.lease_duration() {
            actions.push(CheckoutAction::SelectLeaseDuration(duration));
        }
        actions.push(CheckoutAction::SelectPlanType(self.plan));

        Ok(actions)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = QuoteArgs::parse();

    let mut config = CheckoutConfig::load_or_default(args.config.clone());
    if let Some(locale) = args.locale {
        config.market.locale = locale;
    }

    let catalog = Arc::new(StaticCatalog::from_json_file(&args.catalog).await?);
    let item_id = catalog
        .item_ids()
        .await
        .into_iter()
        .next()
        .ok_or("catalog file holds no item")?;
    let item = catalog.fetch_item(&item_id).await?;

    let mut state = CheckoutState::open(item, None, config.locale(), 1)?;
    for action in args.actions()? {
        state = reduce(&state, action)?;
    }

    let stock = if args.check_stock {
        let fresh = Arc::new(StaticCatalog::from_json_file(&args.catalog).await?);
        let validator = StockValidator::new(fresh, config.stock_timeout(), config.locale());
        Some(validator.validate(&state.item.id, &state.selection).await)
    } else {
        None
    };

    if args.json {
        print_json(&state, stock.as_ref())?;
    } else {
        print_table(&state, stock.as_ref());
    }

    Ok(())
}

type StockOutcome = xtrapush_checkout::CheckoutResult<xtrapush_core::StockClearance>;

fn print_json(state: &CheckoutState, stock: Option<&StockOutcome>) -> Result<(), Box<dyn std::error::Error>> {
    let stock = stock.map(|outcome| match outcome {
        Ok(clearance) => serde_json::json!({
            "ok": true,
            "availableStock": clearance.available_stock(),
        }),
        Err(e) => serde_json::json!({
            "ok": false,
            "error": xtrapush_checkout::CheckoutFailure::from(e),
        }),
    });

    let report = serde_json::json!({
        "itemId": state.item.id,
        "selection": state.selection,
        "price": state.price,
        "breakdown": state.breakdown,
        "display": state.breakdown.to_money(state.price.currency),
        "stock": stock,
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_table(state: &CheckoutState, stock: Option<&StockOutcome>) {
    let b = &state.breakdown;
    let money = b.to_money(state.price.currency);
    let selection = &state.selection;

    println!(
        "{} [{}]",
        state.item.name,
        selection.variant_id.as_deref().unwrap_or("no variant")
    );
    println!(
        "  {} / {} / {}",
        selection.color.as_deref().unwrap_or("-"),
        selection.storage.as_deref().unwrap_or("-"),
        selection.condition.token()
    );
    println!();

    if !b.is_valid_calculation {
        println!("  No valid breakdown for this item and plan.");
        return;
    }

    match b.weeks {
        Some(weeks) => println!("  Plan              {} over {} weeks", b.plan_type, weeks),
        None => println!("  Plan              {}", b.plan_type),
    }
    println!("  Base price        {}", money.base_price);
    println!(
        "  Adjusted total    {}  (+{:.2}%)",
        money.adjusted_total, b.total_adjustment_percentage
    );
    println!(
        "  Deposit           {}  ({:.0}%)",
        money.deposit_amount, b.deposit_percentage
    );
    println!("  Remaining         {}", money.remaining_balance);
    println!("  Weekly            {}", money.weekly_amount);

    if let (Some(lease), Some(monthly), Some(total)) = (b.lease, money.lease_monthly_rate, money.lease_total_cost) {
        println!("  Lease months      {:.2}", lease.months);
        println!("  Lease monthly     {}", monthly);
        println!("  Lease total       {}", total);
        println!("  Lease interest    {:.2}%", lease.lease_interest_rate * 100.0);
    }

    match stock {
        Some(Ok(clearance)) => println!("\n  Stock             {} available", clearance.available_stock()),
        Some(Err(e)) => println!("\n  Stock             {}", e),
        None => {}
    }
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the default `info,xtrapush=debug` filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,xtrapush=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
