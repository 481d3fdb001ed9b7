//! Investor Returns - payout engine for fixed-term investor plans
//!
//! This library provides:
//! - Periodic payout breakdowns (interest and principal per period)
//! - Weekly and monthly payout schedules with maturity and next-payout dates
//! - Repricing of pending payouts when committed principal changes
//! - A payout ledger enforcing one settlement per period
//! - Portfolio summaries for investor and admin dashboards

pub mod error;
pub mod plan;
pub mod calculator;
pub mod payout;
pub mod portfolio;

// Re-export commonly used types
pub use error::{CalculatorError, LedgerError, LoadError, TransitionError};
pub use plan::{InvestmentPlan, PayoutFrequency, PlanId};
pub use calculator::{PayoutBreakdown, PayoutSchedule, RecalculationOutcome, ReturnCalculator, ReturnTerms};
pub use payout::{InMemoryLedger, PaymentRecord, PayoutLedger, PayoutScheduleEntry, PayoutStatus};
pub use portfolio::{PlanSummary, PortfolioRunner, PortfolioTotals};
