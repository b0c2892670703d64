//! Deterministic FIRE projections
//!
//! These use the plan's expected returns directly, with contributions from
//! nominal income and expense growth and growth at the real blended return.

use serde::{Deserialize, Serialize};

use crate::config::TaxMode;
use crate::model::{Plan, real_rate};

/// Longest horizon [`years_to_fire`] scans
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// Portfolio whose safe withdrawal covers retirement expenses.
///
/// `retirementExpenses / (safeWithdrawalRate / 100)`, so 40,000 at 4% is
/// exactly 1,000,000.
pub fn required_portfolio(plan: &Plan) -> f64 {
    plan.retirement_expenses / plan.safe_withdrawal_rate.as_decimal()
}

/// Required portfolio grossed up so withdrawals also pay the effective tax
pub fn gross_required_portfolio(plan: &Plan) -> f64 {
    required_portfolio(plan) / (1.0 - plan.effective_tax_rate.as_decimal())
}

/// Portfolio at which a run switches to retirement spending.
///
/// Only the flat effective-rate tax model grosses the target up; progressive
/// runs price withdrawal taxes year by year instead.
pub fn retirement_target(plan: &Plan, tax_mode: TaxMode) -> f64 {
    match tax_mode {
        TaxMode::Progressive => required_portfolio(plan),
        TaxMode::Effective => gross_required_portfolio(plan),
    }
}

/// Allocation-weighted expected nominal return
pub fn portfolio_return_nominal(plan: &Plan) -> f64 {
    let returns = plan.market.nominal_returns();
    let allocation = &plan.allocation;
    allocation.stocks * returns.stocks
        + allocation.bonds * returns.bonds
        + allocation.cash * returns.cash
}

/// Blended return after inflation (Fisher relation)
pub fn portfolio_return_real(plan: &Plan) -> f64 {
    real_rate(portfolio_return_nominal(plan), plan.market.inflation())
}

/// Net savings in year `year` (1 = first year), compounding income and
/// expenses at their nominal growth rates
pub fn yearly_contribution(plan: &Plan, year: u32) -> f64 {
    let n = year as i32;
    plan.annual_income * (1.0 + plan.income_growth_rate.as_decimal()).powi(n)
        - plan.annual_expenses * (1.0 + plan.expense_growth_rate.as_decimal()).powi(n)
}

/// Portfolio after `years` years: the starting assets compounded at the real
/// return plus each end-of-year contribution. The balance never drops below
/// zero.
pub fn future_portfolio_value(plan: &Plan, years: u32) -> f64 {
    let rate = portfolio_return_real(plan);
    (1..=years).fold(plan.invested_assets, |value, year| {
        advance(value, rate, yearly_contribution(plan, year))
    })
}

#[inline]
fn advance(value: f64, rate: f64, contribution: f64) -> f64 {
    (value * (1.0 + rate) + contribution).max(0.0)
}

/// Outcome of a deterministic years-to-FIRE projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum FireOutcome {
    /// The projected portfolio meets the required portfolio
    Reached { years: u32, age: u32, portfolio: f64 },
    /// Not reached within [`MAX_PROJECTION_YEARS`]
    Unreachable,
}

impl FireOutcome {
    pub fn years(&self) -> Option<u32> {
        match self {
            FireOutcome::Reached { years, .. } => Some(*years),
            FireOutcome::Unreachable => None,
        }
    }

    pub fn fire_age(&self) -> Option<u32> {
        match self {
            FireOutcome::Reached { age, .. } => Some(*age),
            FireOutcome::Unreachable => None,
        }
    }
}

/// First year the projected portfolio meets the required portfolio
pub fn years_to_fire(plan: &Plan) -> FireOutcome {
    let required = required_portfolio(plan);
    let rate = portfolio_return_real(plan);

    let mut value = plan.invested_assets;
    for years in 0..=MAX_PROJECTION_YEARS {
        if years > 0 {
            value = advance(value, rate, yearly_contribution(plan, years));
        }
        if value >= required {
            return FireOutcome::Reached {
                years,
                age: plan.current_age + years,
                portfolio: value,
            };
        }
    }
    FireOutcome::Unreachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Percentage, QuickPlanInputs};

    fn plan() -> Plan {
        QuickPlanInputs::default().validate().unwrap()
    }

    #[test]
    fn test_required_portfolio_closed_form() {
        let plan = plan();
        assert_eq!(plan.retirement_expenses, 40_000.0);
        assert_eq!(required_portfolio(&plan), 1_000_000.0);
        assert!((gross_required_portfolio(&plan) - 1_000_000.0 / 0.85).abs() < 1e-6);
        assert_eq!(retirement_target(&plan, TaxMode::Progressive), 1_000_000.0);
        assert_eq!(
            retirement_target(&plan, TaxMode::Effective),
            gross_required_portfolio(&plan)
        );
    }

    #[test]
    fn test_blended_returns() {
        let plan = plan();
        // 0.7 * 10% + 0.2 * 5% + 0.1 * 3%
        assert!((portfolio_return_nominal(&plan) - 0.083).abs() < 1e-12);
        assert!((portfolio_return_real(&plan) - (1.083 / 1.03 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_first_year_contribution() {
        let contribution = yearly_contribution(&plan(), 1);
        assert!(
            (contribution - 41_200.0).abs() < 1e-6,
            "Expected 41200, got {}",
            contribution
        );
    }

    #[test]
    fn test_future_value_at_zero_years_is_assets() {
        let plan = plan();
        assert_eq!(future_portfolio_value(&plan, 0), plan.invested_assets);
    }

    #[test]
    fn test_years_to_fire_default_plan() {
        let plan = plan();
        let outcome = years_to_fire(&plan);
        let years = outcome.years().unwrap();
        assert!(years > 0 && years < 30);
        assert_eq!(outcome.fire_age(), Some(30 + years));
        assert!(future_portfolio_value(&plan, years) >= 1_000_000.0);
        assert!(future_portfolio_value(&plan, years - 1) < 1_000_000.0);
    }

    #[test]
    fn test_already_fire() {
        let mut inputs = QuickPlanInputs::default();
        inputs.basics.invested_assets = Some(1_200_000.0);
        let plan = inputs.validate().unwrap();
        let outcome = years_to_fire(&plan);
        assert_eq!(outcome.years(), Some(0));
        assert_eq!(outcome.fire_age(), Some(30));
    }

    #[test]
    fn test_unreachable_is_data_not_error() {
        let mut inputs = QuickPlanInputs::default();
        inputs.basics.annual_income = Some(50_000.0);
        inputs.basics.invested_assets = Some(0.0);
        inputs.allocation.stock_allocation = Percentage::ZERO;
        inputs.allocation.bond_allocation = Percentage::ZERO;
        inputs.allocation.cash_allocation = Percentage::HUNDRED;
        let plan = inputs.validate().unwrap();
        assert_eq!(years_to_fire(&plan), FireOutcome::Unreachable);
    }
}
