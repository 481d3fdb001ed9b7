//! Compute schedules for every plan in a CSV file
//!
//! Prints portfolio totals and writes scheduled payouts aggregated by
//! calendar month for the admin dashboard.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use investor_returns::calculator::RemainderPolicy;
use investor_returns::plan::{load_plans, loader::DEFAULT_PLANS_PATH};
use investor_returns::{PortfolioRunner, PortfolioTotals, ReturnTerms};

#[derive(Debug, Parser)]
#[command(name = "portfolio_report", about = "Portfolio payout report")]
struct Cli {
    /// Plan file with PlanId,Principal,Frequency,StartDate columns
    #[arg(long, default_value = DEFAULT_PLANS_PATH)]
    plans: PathBuf,

    /// Monthly totals output file
    #[arg(long, default_value = "portfolio_monthly_totals.csv")]
    output: PathBuf,

    /// Let the final period of each plan absorb rounding drift
    #[arg(long)]
    reconcile_remainder: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    println!("Loading plans from {}...", cli.plans.display());
    let plans = load_plans(&cli.plans).with_context(|| format!("could not load {}", cli.plans.display()))?;
    println!("Loaded {} plans in {:?}", plans.len(), start.elapsed());

    let remainder = if cli.reconcile_remainder {
        RemainderPolicy::FinalPeriod
    } else {
        RemainderPolicy::Preserve
    };
    let runner = PortfolioRunner::with_terms(ReturnTerms::standard().with_remainder(remainder));

    let mut schedules = Vec::with_capacity(plans.len());
    for (plan, result) in plans.iter().zip(runner.run_batch(&plans)) {
        match result {
            Ok(schedule) => schedules.push(schedule),
            Err(e) => log::warn!("skipping plan {}: {}", plan.plan_id, e),
        }
    }

    let totals = PortfolioTotals::from_summaries(&PortfolioRunner::summarize(&schedules));
    let months = PortfolioRunner::monthly_totals(&schedules);

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("could not create {}", cli.output.display()))?;
    writer.write_record(["Year", "Month", "Payouts", "Amount"])?;
    for month in &months {
        writer.write_record(&[
            month.year.to_string(),
            month.month.to_string(),
            month.payouts.to_string(),
            month.amount.to_string(),
        ])?;
    }
    writer.flush()?;
    println!("Monthly totals written to {}", cli.output.display());

    println!("\nPortfolio Summary:");
    println!("  Plans:           {}", totals.plans);
    println!("  Total principal: {}", totals.total_principal);
    println!("  Total expected:  {}", totals.total_expected);
    println!("  Paid to date:    {}", totals.paid_to_date);
    println!("  Outstanding:     {}", totals.outstanding);

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
