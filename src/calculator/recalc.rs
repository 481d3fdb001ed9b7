//! Repricing a schedule after an administrator edits the committed principal

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::engine::{PayoutBreakdown, ReturnCalculator};
use super::schedule::PayoutSchedule;
use crate::error::CalculatorError;

/// Result of a principal change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationOutcome {
    /// Breakdown now applied to pending entries
    pub breakdown: PayoutBreakdown,

    /// Pending entries that were repriced
    pub updated_pending: usize,

    /// Completed or failed entries left as recorded
    pub preserved_history: usize,
}

impl ReturnCalculator {
    /// Reprice every pending entry for a new principal
    ///
    /// Completed and failed entries keep their recorded amounts. The schedule
    /// is left untouched if the new principal is invalid.
    pub fn recalculate_on_principal_change(
        &self,
        schedule: &mut PayoutSchedule,
        new_principal: Decimal,
    ) -> Result<RecalculationOutcome, CalculatorError> {
        let breakdown = self.compute_periodic_payout(new_principal, schedule.plan.payout_frequency)?;

        let mut updated_pending = 0;
        let mut preserved_history = 0;

        for entry in schedule.entries.iter_mut() {
            if !entry.is_pending() {
                preserved_history += 1;
                continue;
            }
            let (interest, principal) = self.portions_for(&breakdown, entry.period_index());
            entry.reprice(interest, principal)?;
            updated_pending += 1;
        }

        log::info!(
            "plan {}: principal {} -> {}, {} pending entries repriced, {} historical entries preserved",
            schedule.plan.plan_id,
            schedule.plan.principal,
            new_principal,
            updated_pending,
            preserved_history
        );

        schedule.plan.principal = new_principal;
        schedule.breakdown = breakdown;

        Ok(RecalculationOutcome {
            breakdown,
            updated_pending,
            preserved_history,
        })
    }
}
