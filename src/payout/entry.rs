//! Scheduled payout entries and their status lifecycle

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::plan::PlanId;

/// Status of a scheduled payout
///
/// `Pending` is the only non-terminal state: it moves to `Completed` when a
/// payment is recorded or to `Failed` when a failure is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Completed,
    Failed,
}

impl PayoutStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PayoutStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Completed => "completed",
            PayoutStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled or settled payment within a plan's term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutScheduleEntry {
    plan_id: PlanId,
    period_index: u32,
    interest_portion: Decimal,
    principal_portion: Decimal,
    total_amount: Decimal,
    due_date: NaiveDate,
    status: PayoutStatus,
    paid_on: Option<NaiveDate>,
    failure_reason: Option<String>,
}

impl PayoutScheduleEntry {
    /// Create a pending entry; the total is always the sum of both portions
    pub fn new(
        plan_id: PlanId,
        period_index: u32,
        interest_portion: Decimal,
        principal_portion: Decimal,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            plan_id,
            period_index,
            interest_portion,
            principal_portion,
            total_amount: interest_portion + principal_portion,
            due_date,
            status: PayoutStatus::Pending,
            paid_on: None,
            failure_reason: None,
        }
    }

    pub fn plan_id(&self) -> PlanId {
        self.plan_id
    }

    /// 1-based position within the term
    pub fn period_index(&self) -> u32 {
        self.period_index
    }

    pub fn interest_portion(&self) -> Decimal {
        self.interest_portion
    }

    pub fn principal_portion(&self) -> Decimal {
        self.principal_portion
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn status(&self) -> PayoutStatus {
        self.status
    }

    /// Actual payment date, set once completed
    pub fn paid_on(&self) -> Option<NaiveDate> {
        self.paid_on
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.status == PayoutStatus::Pending
    }

    /// Record a successful payment
    pub fn mark_completed(&mut self, paid_on: NaiveDate) -> Result<(), TransitionError> {
        self.transition(PayoutStatus::Completed)?;
        self.paid_on = Some(paid_on);
        Ok(())
    }

    /// Record a failed payment attempt
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        self.transition(PayoutStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    /// Replace the amounts of a pending entry; settled entries are history
    pub(crate) fn reprice(
        &mut self,
        interest_portion: Decimal,
        principal_portion: Decimal,
    ) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError {
                from: self.status,
                to: PayoutStatus::Pending,
            });
        }
        self.interest_portion = interest_portion;
        self.principal_portion = principal_portion;
        self.total_amount = interest_portion + principal_portion;
        Ok(())
    }

    fn transition(&mut self, to: PayoutStatus) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError { from: self.status, to });
        }
        self.status = to;
        Ok(())
    }
}
