//! Input validation
//!
//! Turns user-entered [`QuickPlanInputs`] into a [`Plan`]. Every check reports
//! the camelCase path of the offending field so a host can point at it.

use crate::error::{FireplanError, FireplanResult};
use crate::model::{
    Account, AccountId, AccountInputs, AccountKind, AllocationInputs, AssetAllocation,
    AssetBalances, MarketAssumptions, Percentage, Plan, QuickPlanInputs,
};

/// Allowed deviation of an allocation total from 100
pub const ALLOCATION_TOLERANCE: f64 = 0.01;

impl QuickPlanInputs {
    /// Check every field and resolve the plan the engine runs on
    pub fn validate(&self) -> FireplanResult<Plan> {
        let basics = &self.basics;
        let current_age = require(basics.current_age, "basics.currentAge")?;
        check_age(current_age, "basics.currentAge", 16, 100)?;
        let annual_income = require(basics.annual_income, "basics.annualIncome")?;
        check_amount(annual_income, "basics.annualIncome", true)?;
        let annual_expenses = require(basics.annual_expenses, "basics.annualExpenses")?;
        check_amount(annual_expenses, "basics.annualExpenses", false)?;
        let invested_assets = require(basics.invested_assets, "basics.investedAssets")?;
        check_amount(invested_assets, "basics.investedAssets", true)?;

        let growth = &self.growth_rates;
        check_percentage(growth.income_growth_rate, "growthRates.incomeGrowthRate", 0.0, 50.0)?;
        check_percentage(growth.expense_growth_rate, "growthRates.expenseGrowthRate", 0.0, 10.0)?;

        let allocation = validate_allocation(&self.allocation, "allocation")?;

        let funding = &self.retirement_funding;
        check_age(funding.life_expectancy, "retirementFunding.lifeExpectancy", 50, 110)?;
        if funding.life_expectancy <= current_age {
            return Err(FireplanError::invalid(
                "retirementFunding.lifeExpectancy",
                format!(
                    "must be greater than the current age ({current_age}), got {}",
                    funding.life_expectancy
                ),
            ));
        }
        check_percentage(
            funding.safe_withdrawal_rate,
            "retirementFunding.safeWithdrawalRate",
            2.0,
            6.0,
        )?;
        check_amount(funding.retirement_income, "retirementFunding.retirementIncome", true)?;
        check_percentage(
            funding.effective_tax_rate,
            "retirementFunding.effectiveTaxRate",
            0.0,
            50.0,
        )?;

        let goals = &self.goals;
        let retirement_expenses = require(goals.retirement_expenses, "goals.retirementExpenses")?;
        check_amount(retirement_expenses, "goals.retirementExpenses", false)?;
        check_amount(goals.part_time_income, "goals.partTimeIncome", true)?;
        if let Some(age) = goals.target_retirement_age {
            if age < current_age || age > funding.life_expectancy {
                return Err(FireplanError::invalid(
                    "goals.targetRetirementAge",
                    format!(
                        "must be between the current age ({current_age}) and life expectancy ({}), got {age}",
                        funding.life_expectancy
                    ),
                ));
            }
        }

        let market = &self.market_assumptions;
        check_percentage(market.stock_return, "marketAssumptions.stockReturn", 0.0, 20.0)?;
        check_percentage(market.bond_return, "marketAssumptions.bondReturn", 0.0, 15.0)?;
        check_percentage(market.cash_return, "marketAssumptions.cashReturn", 0.0, 10.0)?;
        check_percentage(market.inflation_rate, "marketAssumptions.inflationRate", 0.0, 8.0)?;

        let accounts = resolve_accounts(&self.accounts, invested_assets, allocation)?;
        let invested_assets = accounts.iter().map(Account::total_value).sum();

        Ok(Plan {
            current_age,
            life_expectancy: funding.life_expectancy,
            annual_income,
            annual_expenses,
            invested_assets,
            income_growth_rate: growth.income_growth_rate,
            expense_growth_rate: growth.expense_growth_rate,
            allocation,
            retirement_expenses,
            target_retirement_age: goals.target_retirement_age,
            part_time_income: goals.part_time_income,
            market: MarketAssumptions {
                stock_return: market.stock_return,
                bond_return: market.bond_return,
                cash_return: market.cash_return,
                inflation_rate: market.inflation_rate,
            },
            safe_withdrawal_rate: funding.safe_withdrawal_rate,
            retirement_income: funding.retirement_income,
            effective_tax_rate: funding.effective_tax_rate,
            preferred_mode: market.simulation_mode,
            accounts,
        })
    }
}

/// Check an allocation's components and that they sum to 100 (± 0.01)
pub fn validate_allocation(
    allocation: &AllocationInputs,
    field: &'static str,
) -> FireplanResult<AssetAllocation> {
    for part in [
        allocation.stock_allocation,
        allocation.bond_allocation,
        allocation.cash_allocation,
    ] {
        check_percentage(part, field, 0.0, 100.0)?;
    }

    let total = allocation.total();
    if (total - 100.0).abs() > ALLOCATION_TOLERANCE {
        return Err(FireplanError::invalid(
            field,
            format!("allocations must sum to 100%, got {total}%"),
        ));
    }

    Ok(AssetAllocation::from_percentages(
        allocation.stock_allocation,
        allocation.bond_allocation,
        allocation.cash_allocation,
    ))
}

fn resolve_accounts(
    inputs: &[AccountInputs],
    invested_assets: f64,
    plan_allocation: AssetAllocation,
) -> FireplanResult<Vec<Account>> {
    if inputs.is_empty() {
        return Ok(vec![Account {
            id: AccountId(1),
            name: "Brokerage".to_string(),
            kind: AccountKind::Taxable,
            allocation: plan_allocation,
            balances: AssetBalances::allocate(invested_assets, &plan_allocation),
            basis: invested_assets,
            contribution_limit: None,
            contribution_priority: None,
        }]);
    }

    if inputs.len() >= usize::from(u16::MAX) {
        return Err(FireplanError::invalid("accounts", "too many accounts"));
    }

    inputs
        .iter()
        .enumerate()
        .map(|(index, account)| {
            check_amount(account.balance, "accounts.balance", true)?;
            let allocation = match &account.allocation {
                Some(allocation) => validate_allocation(allocation, "accounts.allocation")?,
                None => plan_allocation,
            };
            let basis = account.basis.unwrap_or(account.balance);
            check_amount(basis, "accounts.basis", true)?;
            if let Some(limit) = account.contribution_limit {
                check_amount(limit, "accounts.contributionLimit", true)?;
            }

            Ok(Account {
                id: AccountId(index as u16 + 1),
                name: account.name.clone(),
                kind: account.kind,
                allocation,
                balances: AssetBalances::allocate(account.balance, &allocation),
                basis: match account.kind {
                    AccountKind::Taxable | AccountKind::Roth401k | AccountKind::RothIra => basis,
                    _ => 0.0,
                },
                contribution_limit: account.contribution_limit,
                contribution_priority: account.contribution_priority,
            })
        })
        .collect()
}

fn require<T>(value: Option<T>, field: &'static str) -> FireplanResult<T> {
    value.ok_or(FireplanError::MissingField { field })
}

fn check_amount(value: f64, field: &'static str, allow_zero: bool) -> FireplanResult<()> {
    if !value.is_finite() {
        return Err(FireplanError::invalid(field, "must be a finite number"));
    }
    if value < 0.0 || (!allow_zero && value == 0.0) {
        let bound = if allow_zero { "0 or more" } else { "greater than 0" };
        return Err(FireplanError::invalid(
            field,
            format!("must be {bound}, got {value}"),
        ));
    }
    Ok(())
}

fn check_percentage(
    value: Percentage,
    field: &'static str,
    min: f64,
    max: f64,
) -> FireplanResult<()> {
    if !value.is_finite() {
        return Err(FireplanError::invalid(field, "must be a finite number"));
    }
    if value.value() < min || value.value() > max {
        return Err(FireplanError::invalid(
            field,
            format!("must be between {min}% and {max}%, got {value}"),
        ));
    }
    Ok(())
}

fn check_age(value: u32, field: &'static str, min: u32, max: u32) -> FireplanResult<()> {
    if !(min..=max).contains(&value) {
        return Err(FireplanError::invalid(
            field,
            format!("must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(())
}
