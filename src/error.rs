//! Error types shared across the crate

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::payout::PayoutStatus;
use crate::plan::PlanId;

/// Failures raised by the return calculator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculatorError {
    /// Principal is zero, negative or not a number
    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),

    /// Frequency is not one of weekly/monthly
    #[error("invalid payout frequency: {0:?} (expected \"weekly\" or \"monthly\")")]
    InvalidFrequency(String),

    /// Start date cannot be parsed or the schedule runs off the calendar
    #[error("invalid start date: {0}")]
    InvalidDate(String),

    /// Period index outside the plan's term
    #[error("period {index} is outside 1..={periods}")]
    InvalidPeriod { index: u32, periods: u32 },

    /// An entry refused to be repriced
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Illegal payout status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move payout from {from} to {to}")]
pub struct TransitionError {
    pub from: PayoutStatus,
    pub to: PayoutStatus,
}

/// Failures raised by a payout ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("no schedule recorded for plan {0}")]
    UnknownPlan(PlanId),

    #[error("plan {plan_id} has no period {period_index}")]
    UnknownPeriod { plan_id: PlanId, period_index: u32 },

    #[error("a schedule for plan {0} is already recorded")]
    ScheduleExists(PlanId),

    #[error("period {period_index} of plan {plan_id} is already {status}")]
    AlreadySettled {
        plan_id: PlanId,
        period_index: u32,
        status: PayoutStatus,
    },

    /// Same plan, same payment date, same amount as an existing completed payout
    #[error(
        "plan {plan_id} already has a payout of {amount} on {paid_on} (period {existing_period}); \
         confirm to record it again"
    )]
    PossibleDuplicate {
        plan_id: PlanId,
        paid_on: NaiveDate,
        amount: Decimal,
        existing_period: u32,
    },

    #[error(transparent)]
    Calculator(#[from] CalculatorError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Failures while loading plans from CSV
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read plan file: {0}")]
    Csv(#[from] csv::Error),

    #[error("plan {plan_id}: {source}")]
    InvalidPlan {
        plan_id: PlanId,
        #[source]
        source: CalculatorError,
    },
}
