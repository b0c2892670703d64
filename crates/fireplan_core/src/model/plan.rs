use serde::{Deserialize, Serialize};

use super::{Account, AssetAllocation, AssetReturns, Percentage, ReturnsMode};

/// Market assumptions as whole-number percentages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAssumptions {
    pub stock_return: Percentage,
    pub bond_return: Percentage,
    pub cash_return: Percentage,
    pub inflation_rate: Percentage,
}

impl MarketAssumptions {
    /// Expected nominal returns as decimals
    pub fn nominal_returns(&self) -> AssetReturns {
        AssetReturns {
            stocks: self.stock_return.as_decimal(),
            bonds: self.bond_return.as_decimal(),
            cash: self.cash_return.as_decimal(),
        }
    }

    pub fn inflation(&self) -> f64 {
        self.inflation_rate.as_decimal()
    }
}

/// Validated plan: every required value present and in range.
///
/// Produced by [`QuickPlanInputs::validate`](super::QuickPlanInputs::validate);
/// the engine and analyzer only ever see plans.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub current_age: u32,
    pub life_expectancy: u32,
    pub annual_income: f64,
    pub annual_expenses: f64,
    /// Sum of starting account balances
    pub invested_assets: f64,
    pub income_growth_rate: Percentage,
    pub expense_growth_rate: Percentage,
    pub allocation: AssetAllocation,
    pub retirement_expenses: f64,
    pub target_retirement_age: Option<u32>,
    pub part_time_income: f64,
    pub market: MarketAssumptions,
    pub safe_withdrawal_rate: Percentage,
    pub retirement_income: f64,
    pub effective_tax_rate: Percentage,
    pub preferred_mode: ReturnsMode,
    pub accounts: Vec<Account>,
}

impl Plan {
    /// Number of simulated years after the starting age
    pub fn horizon_years(&self) -> u32 {
        self.life_expectancy.saturating_sub(self.current_age)
    }
}
