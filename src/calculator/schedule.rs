//! Payout schedule generation and date arithmetic

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::engine::{PayoutBreakdown, ReturnCalculator};
use crate::error::CalculatorError;
use crate::payout::{PayoutScheduleEntry, PayoutStatus};
use crate::plan::{InvestmentPlan, PayoutFrequency, TERM_MONTHS};

/// Due date of the k-th payout
///
/// Monthly offsets are taken from the start date each time, so a plan that
/// starts on the 31st pays on the last day of shorter months and returns to
/// the 31st afterwards.
pub fn due_date(
    start_date: NaiveDate,
    frequency: PayoutFrequency,
    period_index: u32,
) -> Result<NaiveDate, CalculatorError> {
    let date = match frequency {
        PayoutFrequency::Weekly => start_date.checked_add_days(Days::new(7 * u64::from(period_index))),
        PayoutFrequency::Monthly => start_date.checked_add_months(Months::new(period_index)),
    };
    date.ok_or_else(|| {
        CalculatorError::InvalidDate(format!(
            "{} + {} {} periods is outside the calendar",
            start_date, period_index, frequency
        ))
    })
}

/// End of the 12-month term, independent of payout frequency
pub fn maturity_date(start_date: NaiveDate) -> Result<NaiveDate, CalculatorError> {
    start_date
        .checked_add_months(Months::new(TERM_MONTHS))
        .ok_or_else(|| CalculatorError::InvalidDate(format!("{} has no maturity date", start_date)))
}

/// A plan together with its ordered payout entries
///
/// Amounts change only through the calculator's repricing and status only
/// through each entry's own transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutSchedule {
    /// Plan the schedule was issued for (principal tracks admin edits)
    pub(super) plan: InvestmentPlan,

    /// Breakdown currently applied to pending entries
    pub(super) breakdown: PayoutBreakdown,

    /// Entries ordered by period index
    pub(super) entries: Vec<PayoutScheduleEntry>,

    /// start_date + 12 months
    pub(super) maturity_date: NaiveDate,
}

impl PayoutSchedule {
    /// Plan the schedule was issued for, with the current principal
    pub fn plan(&self) -> &InvestmentPlan {
        &self.plan
    }

    pub fn breakdown(&self) -> &PayoutBreakdown {
        &self.breakdown
    }

    /// Entries ordered by period index
    pub fn entries(&self) -> &[PayoutScheduleEntry] {
        &self.entries
    }

    pub fn maturity_date(&self) -> NaiveDate {
        self.maturity_date
    }

    /// Due date of the first pending entry
    ///
    /// A schedule with no entries yet pays one period after the start date;
    /// a fully settled schedule has no next payout.
    pub fn next_payout_date(&self) -> Option<NaiveDate> {
        if self.entries.is_empty() {
            return due_date(self.plan.start_date, self.plan.payout_frequency, 1).ok();
        }
        self.entries
            .iter()
            .find(|e| e.is_pending())
            .map(|e| e.due_date())
    }

    pub fn entry(&self, period_index: u32) -> Option<&PayoutScheduleEntry> {
        self.entries.iter().find(|e| e.period_index() == period_index)
    }

    /// Entry for recording a status transition
    pub fn entry_mut(&mut self, period_index: u32) -> Option<&mut PayoutScheduleEntry> {
        self.entries.iter_mut().find(|e| e.period_index() == period_index)
    }

    pub fn pending(&self) -> impl Iterator<Item = &PayoutScheduleEntry> {
        self.entries.iter().filter(|e| e.is_pending())
    }

    pub fn count_with_status(&self, status: PayoutStatus) -> usize {
        self.entries.iter().filter(|e| e.status() == status).count()
    }

    /// Sum of every entry's amount, settled or not
    pub fn scheduled_total(&self) -> Decimal {
        self.entries.iter().map(|e| e.total_amount()).sum()
    }

    /// Sum of completed payouts
    pub fn paid_to_date(&self) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.status() == PayoutStatus::Completed)
            .map(|e| e.total_amount())
            .sum()
    }

    /// Sum of payouts still pending
    pub fn outstanding(&self) -> Decimal {
        self.pending().map(|e| e.total_amount()).sum()
    }
}

impl ReturnCalculator {
    /// Build the full schedule for a plan
    pub fn compute_schedule(&self, plan: &InvestmentPlan) -> Result<PayoutSchedule, CalculatorError> {
        let breakdown = self.compute_periodic_payout(plan.principal, plan.payout_frequency)?;
        let maturity_date = maturity_date(plan.start_date)?;

        let entries = (1..=breakdown.periods)
            .map(|k| self.build_entry(plan, &breakdown, k))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "plan {}: {} {} entries, maturity {}",
            plan.plan_id,
            entries.len(),
            plan.payout_frequency,
            maturity_date
        );

        Ok(PayoutSchedule {
            plan: plan.clone(),
            breakdown,
            entries,
            maturity_date,
        })
    }
}

/// Schedule under the standard 25% terms
pub fn compute_schedule(plan: &InvestmentPlan) -> Result<PayoutSchedule, CalculatorError> {
    ReturnCalculator::default().compute_schedule(plan)
}
