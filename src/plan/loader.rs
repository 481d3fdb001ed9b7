//! Load investment plans from CSV

use super::{InvestmentPlan, PlanId};
use crate::error::LoadError;
use csv::Reader;
use std::path::Path;

/// Default plan file location
pub const DEFAULT_PLANS_PATH: &str = "data/plans.csv";

/// Raw CSV row; values are parsed by the plan constructor so errors match form input
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "PlanId")]
    plan_id: PlanId,
    #[serde(rename = "Principal")]
    principal: String,
    #[serde(rename = "Frequency")]
    frequency: String,
    #[serde(rename = "StartDate")]
    start_date: String,
}

impl CsvRow {
    fn to_plan(self) -> Result<InvestmentPlan, LoadError> {
        InvestmentPlan::from_raw(self.plan_id, &self.principal, &self.frequency, &self.start_date)
            .map_err(|source| LoadError::InvalidPlan {
                plan_id: self.plan_id,
                source,
            })
    }
}

/// Load all plans from a CSV file
pub fn load_plans<P: AsRef<Path>>(path: P) -> Result<Vec<InvestmentPlan>, LoadError> {
    let reader = Reader::from_path(path)?;
    collect_plans(reader)
}

/// Load plans from any reader (e.g., string buffer, upload body)
pub fn load_plans_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<InvestmentPlan>, LoadError> {
    collect_plans(Reader::from_reader(reader))
}

/// Load plans from the default data/plans.csv location
pub fn load_default_plans() -> Result<Vec<InvestmentPlan>, LoadError> {
    load_plans(DEFAULT_PLANS_PATH)
}

fn collect_plans<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<InvestmentPlan>, LoadError> {
    let mut plans = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        plans.push(row.to_plan()?);
    }

    log::debug!("loaded {} plans", plans.len());
    Ok(plans)
}
