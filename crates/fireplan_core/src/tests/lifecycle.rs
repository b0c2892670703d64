//! Full runs: phases, account routing, withdrawals, taxes and RMDs

use proptest::prelude::{any, prop_assert, prop_assert_eq, proptest};

use crate::model::{
    AccountInputs, AccountKind, Percentage, Phase, QuickPlanInputs, RMD_START_AGE, ReturnsMode,
};
use crate::simulation::run_single_simulation;

fn account(name: &str, kind: AccountKind, balance: f64, limit: Option<f64>) -> AccountInputs {
    AccountInputs {
        name: name.to_string(),
        kind,
        balance,
        basis: None,
        allocation: None,
        contribution_limit: limit,
        contribution_priority: None,
    }
}

/// Retired from the start, living off a single account
fn retiree(age: u32, kind: AccountKind, balance: f64) -> QuickPlanInputs {
    let mut inputs = QuickPlanInputs::default();
    inputs.basics.current_age = Some(age);
    inputs.goals.target_retirement_age = Some(age);
    inputs.accounts = vec![account("Only", kind, balance, None)];
    inputs
}

// ============================================================================
// Contributions
// ============================================================================

#[test]
fn test_contributions_fill_accounts_by_priority() {
    let mut inputs = QuickPlanInputs::default();
    inputs.accounts = vec![
        account("Brokerage", AccountKind::Taxable, 0.0, None),
        account("Roth", AccountKind::RothIra, 0.0, Some(7_000.0)),
        account("401k", AccountKind::Traditional401k, 0.0, Some(23_500.0)),
    ];

    let result = run_single_simulation(&inputs, ReturnsMode::Fixed, None).unwrap();
    let first = &result.snapshots[1];

    // 103000 of income less 61800 of expenses
    assert!((first.contributions - 41_200.0).abs() < 1e-6, "got {}", first.contributions);
    let value = |name: &str| {
        first
            .accounts
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.total_value)
            .unwrap()
    };
    assert!((value("401k") - 23_500.0).abs() < 1e-6);
    assert!((value("Roth") - 7_000.0).abs() < 1e-6);
    assert!((value("Brokerage") - 10_700.0).abs() < 1e-6);
    assert!((first.by_tax_treatment.tax_deferred - 23_500.0).abs() < 1e-6);
}

#[test]
fn test_contribution_priority_ranks_taxable_ahead_of_401k() {
    let mut brokerage = account("Brokerage", AccountKind::Taxable, 0.0, Some(20_000.0));
    brokerage.contribution_priority = Some(0);
    let mut inputs = QuickPlanInputs::default();
    inputs.accounts = vec![
        account("401k", AccountKind::Traditional401k, 0.0, Some(23_500.0)),
        brokerage,
    ];

    let plan = inputs.validate().unwrap();
    assert_eq!(plan.accounts[1].contribution_priority, Some(0));

    let result = run_single_simulation(&inputs, ReturnsMode::Fixed, None).unwrap();
    let first = &result.snapshots[1];
    let value = |name: &str| {
        first
            .accounts
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.total_value)
            .unwrap()
    };
    assert!((value("Brokerage") - 20_000.0).abs() < 1e-6);
    assert!((value("401k") - 21_200.0).abs() < 1e-6);
}

// ============================================================================
// Withdrawals and taxes
// ============================================================================

#[test]
fn test_early_tax_deferred_withdrawal_is_penalized() {
    let inputs = retiree(40, AccountKind::Traditional401k, 2_000_000.0);
    let result = run_single_simulation(&inputs, ReturnsMode::Fixed, None).unwrap();
    let first = &result.snapshots[1];

    assert_eq!(first.phase, Phase::Retirement);
    assert!(first.withdrawals > 40_000.0);
    let penalty = first.taxes.early_withdrawal_penalty;
    assert!(
        (penalty - first.withdrawals * 0.10).abs() < 1e-6,
        "Expected 10% of {}, got {}",
        first.withdrawals,
        penalty
    );
}

#[test]
fn test_qualified_tax_deferred_withdrawal_has_no_penalty() {
    let inputs = retiree(60, AccountKind::Traditional401k, 2_000_000.0);
    let result = run_single_simulation(&inputs, ReturnsMode::Fixed, None).unwrap();
    let first = &result.snapshots[1];

    assert_eq!(first.taxes.early_withdrawal_penalty, 0.0);
    assert!(first.taxes.ordinary_income_tax > 0.0);
}

#[test]
fn test_withdrawals_are_grossed_up_for_taxes() {
    let inputs = retiree(60, AccountKind::Traditional401k, 2_000_000.0);
    let result = run_single_simulation(&inputs, ReturnsMode::Fixed, None).unwrap();
    let first = &result.snapshots[1];

    let needed = first.total_expenses + first.taxes.total();
    assert!(
        (first.withdrawals - needed).abs() < 0.05,
        "Withdrew {}, needed {}",
        first.withdrawals,
        needed
    );
    assert_eq!(first.shortfall, 0.0);
}

#[test]
fn test_roth_withdrawals_are_untaxed_after_59() {
    let inputs = retiree(65, AccountKind::RothIra, 2_000_000.0);
    let result = run_single_simulation(&inputs, ReturnsMode::Fixed, None).unwrap();
    let first = &result.snapshots[1];

    assert_eq!(first.taxes.total(), 0.0);
    assert!((first.withdrawals - 40_000.0).abs() < 1e-6);
}

// ============================================================================
// Required minimum distributions
// ============================================================================

#[test]
fn test_required_distributions_start_at_73() {
    let mut inputs = retiree(72, AccountKind::Traditional401k, 1_000_000.0);
    inputs.goals.retirement_expenses = Some(20_000.0);
    inputs.retirement_funding.life_expectancy = 80;

    let result = run_single_simulation(&inputs, ReturnsMode::Fixed, None).unwrap();
    let at_73 = result.snapshot_at_age(RMD_START_AGE).unwrap();

    // First distribution is the starting balance over the age-73 divisor
    let expected = 1_000_000.0 / 26.5;
    assert!(
        (at_73.required_distributions - expected).abs() < 0.01,
        "Expected {}, got {}",
        expected,
        at_73.required_distributions
    );
    assert_eq!(at_73.withdrawals, 0.0);
    assert!(at_73.taxes.ordinary_income_tax > 0.0);

    // What the distribution did not spend lands in a new taxable account
    let leftover = at_73.required_distributions - at_73.total_expenses - at_73.taxes.total();
    assert!((at_73.contributions - leftover).abs() < 1e-6);
    assert!(at_73.accounts.iter().any(|a| a.kind == AccountKind::Taxable));
    assert!((at_73.by_tax_treatment.taxable - leftover).abs() < 1e-6);
}

#[test]
fn test_no_required_distributions_before_73() {
    let inputs = retiree(65, AccountKind::Traditional401k, 1_000_000.0);
    let result = run_single_simulation(&inputs, ReturnsMode::Fixed, None).unwrap();
    assert!(
        result
            .snapshots
            .iter()
            .filter(|s| s.age < RMD_START_AGE)
            .all(|s| s.required_distributions == 0.0)
    );
    assert!(result.snapshot_at_age(80).unwrap().required_distributions > 0.0);
}

// ============================================================================
// Bankruptcy never produces negative balances
// ============================================================================

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(32))]

    #[test]
    fn prop_balances_stay_non_negative(
        seed in any::<u64>(),
        historical in any::<bool>(),
        current_age in 25u32..70,
        invested in 0u32..1_500,
        retirement_expenses in 20u32..150,
        retire_after in 0u32..15,
        stocks in 0u32..=100,
    ) {
        let mut inputs = QuickPlanInputs::default();
        inputs.basics.current_age = Some(current_age);
        inputs.basics.invested_assets = Some(f64::from(invested) * 1_000.0);
        inputs.goals.retirement_expenses = Some(f64::from(retirement_expenses) * 1_000.0);
        inputs.goals.target_retirement_age = Some(current_age + retire_after);
        inputs.allocation.stock_allocation = Percentage::new(f64::from(stocks));
        inputs.allocation.bond_allocation = Percentage::new(f64::from(100 - stocks));
        inputs.allocation.cash_allocation = Percentage::ZERO;

        let mode = if historical { ReturnsMode::Historical } else { ReturnsMode::Stochastic };
        let result = run_single_simulation(&inputs, mode, Some(seed)).unwrap();

        for snapshot in &result.snapshots {
            prop_assert!(snapshot.total_portfolio >= 0.0);
            for account in &snapshot.accounts {
                prop_assert!(account.balances.stocks >= 0.0, "{:?}", account);
                prop_assert!(account.balances.bonds >= 0.0, "{:?}", account);
                prop_assert!(account.balances.cash >= 0.0, "{:?}", account);
            }
        }

        let (last, earlier) = result.snapshots.split_last().unwrap();
        prop_assert!(earlier.iter().all(|s| s.phase != Phase::Bankrupt));
        match result.bankruptcy_age {
            Some(age) => {
                prop_assert_eq!(last.phase, Phase::Bankrupt);
                prop_assert_eq!(last.age, age);
                prop_assert!(last.shortfall > 0.0);
            }
            None => {
                prop_assert_eq!(last.age, 90);
                prop_assert!(result.snapshots.iter().all(|s| s.shortfall == 0.0));
            }
        }
    }
}
