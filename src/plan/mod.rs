//! Investment plan data structures and plan loading

mod data;
pub mod loader;

pub use data::{
    InvestmentPlan, PayoutFrequency, PlanId, DATE_FORMAT, TERM_MONTHS,
    parse_principal, parse_start_date, principal_for_units, validate_principal,
};
pub use loader::{load_plans, load_plans_from_reader, load_default_plans};
