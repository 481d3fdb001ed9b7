//! Investor Returns CLI
//!
//! Command-line interface for pricing a plan and printing its payout schedule

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use investor_returns::calculator::RemainderPolicy;
use investor_returns::plan::{parse_principal, parse_start_date};
use investor_returns::{InvestmentPlan, PayoutFrequency, PayoutSchedule, PlanSummary, ReturnCalculator, ReturnTerms};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(name = "investor-returns", version, about = "Payout calculator for investor plans")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Per-period payout breakdown for a principal
    Payout {
        #[command(flatten)]
        plan: PlanArgs,
    },
    /// Full payout schedule for a plan
    Schedule {
        #[command(flatten)]
        plan: PlanArgs,

        /// Plan start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: String,

        /// Let the final period absorb rounding drift
        #[arg(long)]
        reconcile_remainder: bool,

        /// Print the schedule as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also write the schedule to a CSV file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Committed principal, e.g. 1400000 or "1,400,000.00"
    #[arg(long)]
    principal: String,

    /// weekly or monthly
    #[arg(long)]
    frequency: String,

    /// Profit over the term as a fraction of principal
    #[arg(long, default_value = "0.25")]
    profit_rate: Decimal,
}

impl PlanArgs {
    fn terms(&self, remainder: RemainderPolicy) -> ReturnTerms {
        ReturnTerms {
            profit_rate: self.profit_rate,
            remainder,
        }
    }
}

#[derive(serde::Serialize)]
struct ScheduleCsvRow {
    #[serde(rename = "PlanId")]
    plan_id: u32,
    #[serde(rename = "Period")]
    period: u32,
    #[serde(rename = "DueDate")]
    due_date: String,
    #[serde(rename = "Interest")]
    interest: Decimal,
    #[serde(rename = "Principal")]
    principal: Decimal,
    #[serde(rename = "Total")]
    total: Decimal,
    #[serde(rename = "Status")]
    status: String,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Payout { plan } => run_payout(&plan),
        Command::Schedule {
            plan,
            start_date,
            reconcile_remainder,
            json,
            output,
        } => {
            let remainder = if reconcile_remainder {
                RemainderPolicy::FinalPeriod
            } else {
                RemainderPolicy::Preserve
            };
            run_schedule(&plan, &start_date, remainder, json, output)
        }
    }
}

fn run_payout(args: &PlanArgs) -> Result<()> {
    let calculator = ReturnCalculator::new(args.terms(RemainderPolicy::Preserve));
    let breakdown = calculator
        .compute_periodic_payout_raw(&args.principal, &args.frequency)
        .context("could not compute payout")?;

    println!("Principal:            {}", breakdown.principal());
    println!("Periods:              {}", breakdown.periods);
    println!("Interest per period:  {}", breakdown.interest_per_period);
    println!("Principal per period: {}", breakdown.principal_per_period);
    println!("Total per period:     {}", breakdown.total_per_period);
    println!("Total payout:         {}", breakdown.total_payout);
    println!("Rounding drift:       {}", breakdown.rounding_drift());
    Ok(())
}

fn run_schedule(
    args: &PlanArgs,
    start_date: &str,
    remainder: RemainderPolicy,
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let frequency: PayoutFrequency = args.frequency.parse()?;
    let plan = InvestmentPlan::new(0, parse_principal(&args.principal)?, frequency, parse_start_date(start_date)?)?;

    let calculator = ReturnCalculator::new(args.terms(remainder));
    let schedule = calculator.compute_schedule(&plan).context("could not compute schedule")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
    } else {
        print_schedule(&schedule);
    }

    if let Some(path) = output {
        write_schedule_csv(&schedule, &path)
            .with_context(|| format!("could not write {}", path.display()))?;
        println!("\nSchedule written to: {}", path.display());
    }
    Ok(())
}

fn print_schedule(schedule: &PayoutSchedule) {
    println!("{:>6} {:>12} {:>14} {:>14} {:>14}", "Period", "Due", "Interest", "Principal", "Total");
    println!("{}", "-".repeat(64));
    for entry in schedule.entries() {
        println!(
            "{:>6} {:>12} {:>14} {:>14} {:>14}",
            entry.period_index(),
            entry.due_date(),
            entry.interest_portion(),
            entry.principal_portion(),
            entry.total_amount(),
        );
    }

    let summary = PlanSummary::from_schedule(schedule);
    println!("\nSummary:");
    println!("  Total scheduled: {}", summary.total_expected);
    println!("  Total payout:    {}", schedule.breakdown().total_payout);
    println!("  Maturity date:   {}", summary.maturity_date);
    if let Some(next) = summary.next_payout_date {
        println!("  Next payout:     {}", next);
    }
}

fn write_schedule_csv(schedule: &PayoutSchedule, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for entry in schedule.entries() {
        writer.serialize(ScheduleCsvRow {
            plan_id: entry.plan_id(),
            period: entry.period_index(),
            due_date: entry.due_date().to_string(),
            interest: entry.interest_portion(),
            principal: entry.principal_portion(),
            total: entry.total_amount(),
            status: entry.status().to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
