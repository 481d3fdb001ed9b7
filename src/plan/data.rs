//! Investment plan data structures and input parsing

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalculatorError;

/// Plan identifier used as the persistence key
pub type PlanId = u32;

/// Every plan runs for twelve months regardless of payout frequency
pub const TERM_MONTHS: u32 = 12;

/// Date format accepted for plan start dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How often an investor is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutFrequency {
    /// 52 payouts, seven days apart
    Weekly,
    /// 12 payouts, one calendar month apart
    Monthly,
}

impl PayoutFrequency {
    /// Number of payout periods in the term
    pub fn periods(&self) -> u32 {
        match self {
            PayoutFrequency::Weekly => 52,
            PayoutFrequency::Monthly => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutFrequency::Weekly => "weekly",
            PayoutFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PayoutFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoutFrequency {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(PayoutFrequency::Weekly),
            "monthly" => Ok(PayoutFrequency::Monthly),
            _ => Err(CalculatorError::InvalidFrequency(s.to_string())),
        }
    }
}

/// One investor's funding commitment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentPlan {
    /// Unique plan identifier
    pub plan_id: PlanId,

    /// Capital contributed
    pub principal: Decimal,

    /// Fixed at creation; never changes an issued schedule
    pub payout_frequency: PayoutFrequency,

    /// Date the plan begins; the first payout falls one period later
    pub start_date: NaiveDate,
}

impl InvestmentPlan {
    /// Create a plan, rejecting a non-positive principal
    pub fn new(
        plan_id: PlanId,
        principal: Decimal,
        payout_frequency: PayoutFrequency,
        start_date: NaiveDate,
    ) -> Result<Self, CalculatorError> {
        Ok(Self {
            plan_id,
            principal: validate_principal(principal)?,
            payout_frequency,
            start_date,
        })
    }

    /// Create a plan from raw form/CSV values
    pub fn from_raw(
        plan_id: PlanId,
        principal: &str,
        frequency: &str,
        start_date: &str,
    ) -> Result<Self, CalculatorError> {
        Self::new(
            plan_id,
            parse_principal(principal)?,
            frequency.parse()?,
            parse_start_date(start_date)?,
        )
    }

    pub fn term_months(&self) -> u32 {
        TERM_MONTHS
    }

    /// Number of payouts over the term
    pub fn periods(&self) -> u32 {
        self.payout_frequency.periods()
    }
}

/// Reject a principal that is zero or negative
pub fn validate_principal(principal: Decimal) -> Result<Decimal, CalculatorError> {
    if principal <= Decimal::ZERO {
        return Err(CalculatorError::InvalidPrincipal(format!(
            "{} must be greater than zero",
            principal
        )));
    }
    Ok(principal)
}

/// Parse a principal typed by an administrator, e.g. "1,400,000.00"
pub fn parse_principal(raw: &str) -> Result<Decimal, CalculatorError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let value = Decimal::from_str(&cleaned)
        .map_err(|_| CalculatorError::InvalidPrincipal(format!("{:?} is not a number", raw)))?;
    validate_principal(value)
}

/// Parse a `YYYY-MM-DD` start date
pub fn parse_start_date(raw: &str) -> Result<NaiveDate, CalculatorError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| CalculatorError::InvalidDate(format!("{:?}: {}", raw, e)))
}

/// Principal derived from a number of funded units (e.g. bikes) at a unit price
pub fn principal_for_units(units: u32, unit_price: Decimal) -> Result<Decimal, CalculatorError> {
    let principal = Decimal::from(units).checked_mul(unit_price).ok_or_else(|| {
        CalculatorError::InvalidPrincipal(format!(
            "{} units at {} exceeds the supported range",
            units, unit_price
        ))
    })?;
    validate_principal(principal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("weekly".parse::<PayoutFrequency>(), Ok(PayoutFrequency::Weekly));
        assert_eq!(" Monthly ".parse::<PayoutFrequency>(), Ok(PayoutFrequency::Monthly));
        assert_eq!(
            "yearly".parse::<PayoutFrequency>(),
            Err(CalculatorError::InvalidFrequency("yearly".to_string()))
        );
    }

    #[test]
    fn test_periods() {
        assert_eq!(PayoutFrequency::Weekly.periods(), 52);
        assert_eq!(PayoutFrequency::Monthly.periods(), 12);
    }

    #[test]
    fn test_parse_principal() {
        assert_eq!(parse_principal("1,400,000.00"), Ok(dec!(1400000)));
        assert_eq!(parse_principal(" 2500 "), Ok(dec!(2500)));
        assert!(matches!(parse_principal("abc"), Err(CalculatorError::InvalidPrincipal(_))));
        assert!(matches!(parse_principal("0"), Err(CalculatorError::InvalidPrincipal(_))));
        assert!(matches!(parse_principal("-500"), Err(CalculatorError::InvalidPrincipal(_))));
    }

    #[test]
    fn test_parse_start_date() {
        assert_eq!(
            parse_start_date("2024-01-15"),
            Ok(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
        assert!(matches!(parse_start_date("2024-13-01"), Err(CalculatorError::InvalidDate(_))));
        assert!(matches!(parse_start_date("15/01/2024"), Err(CalculatorError::InvalidDate(_))));
    }

    #[test]
    fn test_plan_from_raw() {
        let plan = InvestmentPlan::from_raw(7, "1400000", "monthly", "2024-01-15").unwrap();
        assert_eq!(plan.plan_id, 7);
        assert_eq!(plan.principal, dec!(1400000));
        assert_eq!(plan.periods(), 12);
        assert_eq!(plan.term_months(), 12);

        assert!(matches!(
            InvestmentPlan::from_raw(7, "1000", "yearly", "2024-01-15"),
            Err(CalculatorError::InvalidFrequency(_))
        ));
    }

    #[test]
    fn test_principal_for_units() {
        assert_eq!(principal_for_units(4, dec!(350000)), Ok(dec!(1400000)));
        assert!(principal_for_units(0, dec!(350000)).is_err());
        assert!(matches!(
            principal_for_units(2, Decimal::MAX),
            Err(CalculatorError::InvalidPrincipal(_))
        ));
    }
}
