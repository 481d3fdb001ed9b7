//! Payout entries and the ledger that records them

mod entry;
pub mod ledger;

pub use entry::{PayoutScheduleEntry, PayoutStatus};
pub use ledger::{InMemoryLedger, PaymentRecord, PayoutLedger};
