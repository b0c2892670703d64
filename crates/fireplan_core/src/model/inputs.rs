//! Plan inputs as entered by the user
//!
//! `QuickPlanInputs` mirrors the quick-plan form: nullable currency fields stay
//! `Option` until validation turns them into a [`Plan`](super::Plan). Rates
//! are whole-number [`Percentage`]s.

use serde::{Deserialize, Serialize};

use super::{AccountKind, Percentage, ReturnsMode};

/// Immutable per-run configuration of a household's finances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickPlanInputs {
    pub basics: BasicsInputs,
    pub growth_rates: GrowthRatesInputs,
    pub allocation: AllocationInputs,
    pub goals: GoalsInputs,
    pub market_assumptions: MarketAssumptionsInputs,
    pub retirement_funding: RetirementFundingInputs,
    /// Explicit accounts; when empty the invested assets form one taxable account
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<AccountInputs>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicsInputs {
    pub current_age: Option<u32>,
    pub annual_income: Option<f64>,
    pub annual_expenses: Option<f64>,
    pub invested_assets: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRatesInputs {
    pub income_growth_rate: Percentage,
    pub expense_growth_rate: Percentage,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationInputs {
    pub stock_allocation: Percentage,
    pub bond_allocation: Percentage,
    pub cash_allocation: Percentage,
}

impl AllocationInputs {
    pub fn total(&self) -> f64 {
        self.stock_allocation.value() + self.bond_allocation.value() + self.cash_allocation.value()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsInputs {
    pub retirement_expenses: Option<f64>,
    /// Retire at this age instead of when the portfolio reaches its target
    #[serde(default)]
    pub target_retirement_age: Option<u32>,
    #[serde(default)]
    pub part_time_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAssumptionsInputs {
    pub stock_return: Percentage,
    pub bond_return: Percentage,
    pub cash_return: Percentage,
    pub inflation_rate: Percentage,
    #[serde(default)]
    pub simulation_mode: ReturnsMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementFundingInputs {
    pub safe_withdrawal_rate: Percentage,
    #[serde(default)]
    pub retirement_income: f64,
    pub life_expectancy: u32,
    #[serde(default)]
    pub effective_tax_rate: Percentage,
}

/// One account of the multi-account plan variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInputs {
    pub name: String,
    pub kind: AccountKind,
    pub balance: f64,
    /// Cost basis (taxable) or contribution basis (Roth); defaults to the balance
    #[serde(default)]
    pub basis: Option<f64>,
    /// Falls back to the plan allocation
    #[serde(default)]
    pub allocation: Option<AllocationInputs>,
    #[serde(default)]
    pub contribution_limit: Option<f64>,
    /// Rank when routing savings, lowest first; unranked accounts follow in
    /// tax-treatment order
    #[serde(default)]
    pub contribution_priority: Option<u32>,
}

impl Default for QuickPlanInputs {
    fn default() -> Self {
        Self {
            basics: BasicsInputs {
                current_age: Some(30),
                annual_income: Some(100_000.0),
                annual_expenses: Some(60_000.0),
                invested_assets: Some(250_000.0),
            },
            growth_rates: GrowthRatesInputs {
                income_growth_rate: Percentage::new(3.0),
                expense_growth_rate: Percentage::new(3.0),
            },
            allocation: AllocationInputs {
                stock_allocation: Percentage::new(70.0),
                bond_allocation: Percentage::new(20.0),
                cash_allocation: Percentage::new(10.0),
            },
            goals: GoalsInputs {
                retirement_expenses: Some(40_000.0),
                target_retirement_age: None,
                part_time_income: 0.0,
            },
            market_assumptions: MarketAssumptionsInputs {
                stock_return: Percentage::new(10.0),
                bond_return: Percentage::new(5.0),
                cash_return: Percentage::new(3.0),
                inflation_rate: Percentage::new(3.0),
                simulation_mode: ReturnsMode::Fixed,
            },
            retirement_funding: RetirementFundingInputs {
                safe_withdrawal_rate: Percentage::new(4.0),
                retirement_income: 0.0,
                life_expectancy: 90,
                effective_tax_rate: Percentage::new(15.0),
            },
            accounts: Vec::new(),
        }
    }
}
