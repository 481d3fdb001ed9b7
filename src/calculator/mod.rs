//! Return calculator: periodic payouts, schedules and principal changes

mod terms;
mod engine;
mod schedule;
mod recalc;

pub use terms::{round2, RemainderPolicy, ReturnTerms, CURRENCY_DP, DEFAULT_PROFIT_RATE};
pub use engine::{compute_periodic_payout, PayoutBreakdown, ReturnCalculator};
pub use schedule::{compute_schedule, due_date, maturity_date, PayoutSchedule};
pub use recalc::RecalculationOutcome;
