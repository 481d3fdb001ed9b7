//! Portfolio runner for batch schedule generation and dashboard summaries
//!
//! Builds schedules for many plans at once and reduces them into the figures
//! the investor and admin dashboards show.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{PayoutSchedule, ReturnCalculator, ReturnTerms};
use crate::error::CalculatorError;
use crate::payout::PayoutStatus;
use crate::plan::{InvestmentPlan, PayoutFrequency, PlanId};

/// Investor dashboard figures for one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub plan_id: PlanId,
    pub principal: Decimal,
    pub payout_frequency: PayoutFrequency,

    /// Sum of every scheduled payout
    pub total_expected: Decimal,
    pub paid_to_date: Decimal,
    pub outstanding: Decimal,

    pub completed: usize,
    pub pending: usize,
    pub failed: usize,

    pub next_payout_date: Option<NaiveDate>,
    pub maturity_date: NaiveDate,
}

impl PlanSummary {
    pub fn from_schedule(schedule: &PayoutSchedule) -> Self {
        Self {
            plan_id: schedule.plan().plan_id,
            principal: schedule.plan().principal,
            payout_frequency: schedule.plan().payout_frequency,
            total_expected: schedule.scheduled_total(),
            paid_to_date: schedule.paid_to_date(),
            outstanding: schedule.outstanding(),
            completed: schedule.count_with_status(PayoutStatus::Completed),
            pending: schedule.count_with_status(PayoutStatus::Pending),
            failed: schedule.count_with_status(PayoutStatus::Failed),
            next_payout_date: schedule.next_payout_date(),
            maturity_date: schedule.maturity_date(),
        }
    }

    /// Share of the expected total already paid (0.0 - 1.0), for progress bars
    pub fn progress(&self) -> f64 {
        if self.total_expected <= Decimal::ZERO {
            return 0.0;
        }
        (self.paid_to_date / self.total_expected).to_f64().unwrap_or(0.0)
    }
}

/// Aggregate figures across a set of plans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub plans: usize,
    pub total_principal: Decimal,
    pub total_expected: Decimal,
    pub paid_to_date: Decimal,
    pub outstanding: Decimal,
}

impl PortfolioTotals {
    pub fn from_summaries(summaries: &[PlanSummary]) -> Self {
        summaries.iter().fold(Self::default(), |mut acc, s| {
            acc.plans += 1;
            acc.total_principal += s.principal;
            acc.total_expected += s.total_expected;
            acc.paid_to_date += s.paid_to_date;
            acc.outstanding += s.outstanding;
            acc
        })
    }
}

/// Scheduled payouts falling in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub payouts: usize,
    pub amount: Decimal,
}

/// Batch runner around a shared calculator
#[derive(Debug, Clone, Default)]
pub struct PortfolioRunner {
    calculator: ReturnCalculator,
}

impl PortfolioRunner {
    /// Runner with the standard terms
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terms(terms: ReturnTerms) -> Self {
        Self {
            calculator: ReturnCalculator::new(terms),
        }
    }

    pub fn calculator(&self) -> &ReturnCalculator {
        &self.calculator
    }

    /// Schedule for a single plan
    pub fn run(&self, plan: &InvestmentPlan) -> Result<PayoutSchedule, CalculatorError> {
        self.calculator.compute_schedule(plan)
    }

    /// Schedules for many plans, computed in parallel; results keep input order
    pub fn run_batch(&self, plans: &[InvestmentPlan]) -> Vec<Result<PayoutSchedule, CalculatorError>> {
        log::info!("computing schedules for {} plans", plans.len());
        plans.par_iter().map(|plan| self.run(plan)).collect()
    }

    /// Scheduled payouts grouped by calendar month, oldest first
    pub fn monthly_totals(schedules: &[PayoutSchedule]) -> Vec<MonthlyTotal> {
        let mut by_month: BTreeMap<(i32, u32), (usize, Decimal)> = BTreeMap::new();

        for entry in schedules.iter().flat_map(|s| s.entries().iter()) {
            let due = entry.due_date();
            let slot = by_month.entry((due.year(), due.month())).or_default();
            slot.0 += 1;
            slot.1 += entry.total_amount();
        }

        by_month
            .into_iter()
            .map(|((year, month), (payouts, amount))| MonthlyTotal {
                year,
                month,
                payouts,
                amount,
            })
            .collect()
    }

    pub fn summarize(schedules: &[PayoutSchedule]) -> Vec<PlanSummary> {
        schedules.iter().map(PlanSummary::from_schedule).collect()
    }
}
