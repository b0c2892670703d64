//! Account-level money movement for one run
//!
//! A [`Portfolio`] owns every account of a single run. Each year the engine
//! applies returns to beginning-of-year balances, takes required minimum
//! distributions, then routes the net cash flow in as contributions or out as
//! withdrawals. Nothing here computes tax; withdrawals report their taxable
//! character and the engine prices it.

use crate::model::{
    Account, AccountId, AccountKind, AccountSnapshot, AssetAllocation, AssetBalances, AssetClass,
    AssetReturns, RmdTable, TaxTreatment, TreatmentBalances,
};
use crate::taxes::{PENALTY_FREE_AGE, TaxableIncome};

/// Balances below this are treated as empty
const DUST: f64 = 0.01;

const REINVESTMENT_ACCOUNT_NAME: &str = "RMD Reinvestment";

/// One stage of the withdrawal order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WithdrawalSource {
    Savings,
    Taxable,
    TaxDeferred,
    /// Roth money up to the contribution basis
    RothBasis,
    /// Roth money beyond the contribution basis
    RothEarnings,
    /// Any Roth money, qualified
    Roth,
    Hsa,
}

const EARLY_WITHDRAWAL_ORDER: [WithdrawalSource; 6] = [
    WithdrawalSource::Savings,
    WithdrawalSource::Taxable,
    WithdrawalSource::RothBasis,
    WithdrawalSource::TaxDeferred,
    WithdrawalSource::RothEarnings,
    WithdrawalSource::Hsa,
];

const QUALIFIED_WITHDRAWAL_ORDER: [WithdrawalSource; 5] = [
    WithdrawalSource::Savings,
    WithdrawalSource::TaxDeferred,
    WithdrawalSource::Taxable,
    WithdrawalSource::Roth,
    WithdrawalSource::Hsa,
];

impl WithdrawalSource {
    fn matches(self, kind: AccountKind) -> bool {
        match self {
            WithdrawalSource::Savings => kind.tax_treatment() == TaxTreatment::CashSavings,
            WithdrawalSource::Taxable => kind.tax_treatment() == TaxTreatment::Taxable,
            WithdrawalSource::TaxDeferred => kind.tax_treatment() == TaxTreatment::TaxDeferred,
            WithdrawalSource::RothBasis
            | WithdrawalSource::RothEarnings
            | WithdrawalSource::Roth => kind.tracks_contribution_basis(),
            WithdrawalSource::Hsa => kind == AccountKind::Hsa,
        }
    }

    /// Withdrawal order for someone of `age`
    fn order_for_age(age: u32) -> &'static [WithdrawalSource] {
        if is_early(age) {
            &EARLY_WITHDRAWAL_ORDER
        } else {
            &QUALIFIED_WITHDRAWAL_ORDER
        }
    }
}

fn is_early(age: u32) -> bool {
    f64::from(age) < PENALTY_FREE_AGE
}

/// Result of pulling money out of the portfolio
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WithdrawalOutcome {
    /// Cash actually raised
    pub gross: f64,
    /// Part of the request the portfolio could not cover
    pub shortfall: f64,
    /// Taxable character of the money raised
    pub taxable: TaxableIncome,
}

/// Accounts of one run, in priority order of their ids
#[derive(Debug, Clone)]
pub struct Portfolio {
    accounts: Vec<Account>,
    /// Account values at the end of the previous year, for RMDs
    prior_year_end: Vec<f64>,
}

impl Portfolio {
    pub fn new(accounts: Vec<Account>) -> Self {
        let prior_year_end = accounts.iter().map(Account::total_value).collect();
        Self {
            accounts,
            prior_year_end,
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn total_value(&self) -> f64 {
        self.accounts.iter().map(Account::total_value).sum()
    }

    pub fn by_asset_class(&self) -> AssetBalances {
        let mut totals = AssetBalances::default();
        for account in &self.accounts {
            totals.add(&account.balances);
        }
        totals
    }

    pub fn by_tax_treatment(&self) -> TreatmentBalances {
        let mut totals = TreatmentBalances::default();
        for account in &self.accounts {
            totals.add(account.tax_treatment(), account.total_value());
        }
        totals
    }

    pub fn snapshots(&self) -> Vec<AccountSnapshot> {
        self.accounts.iter().map(Account::snapshot).collect()
    }

    /// Grow every sub-balance by its asset-class return; returns the total gain
    pub fn apply_returns(&mut self, returns: &AssetReturns) -> f64 {
        let mut gain = 0.0;
        for account in &mut self.accounts {
            for class in AssetClass::ALL {
                let balance = account.balances.get_mut(class);
                let growth = *balance * returns.get(class);
                let grown = (*balance + growth).max(0.0);
                gain += grown - *balance;
                *balance = grown;
            }
        }
        gain
    }

    /// Route new money by contribution priority, honouring contribution limits.
    ///
    /// Accounts with an explicit priority come first, lowest rank first; the
    /// rest follow tax-deferred, tax-free, taxable, cash savings.
    ///
    /// Money that no account below its limit can take lands in the first
    /// taxable account, else the last account in priority order.
    pub fn contribute(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 || self.accounts.is_empty() {
            return 0.0;
        }

        let mut order: Vec<usize> = (0..self.accounts.len()).collect();
        order.sort_by_key(|&i| self.accounts[i].contribution_order());

        let mut remaining = amount;
        for &index in &order {
            if remaining <= 0.0 {
                break;
            }
            let room = self.accounts[index].contribution_limit.unwrap_or(f64::INFINITY);
            let deposit = remaining.min(room);
            if deposit > 0.0 {
                deposit_into(&mut self.accounts[index], deposit);
                remaining -= deposit;
            }
        }

        if remaining > 0.0 {
            let overflow = self
                .accounts
                .iter()
                .position(|a| a.tax_treatment() == TaxTreatment::Taxable)
                .or_else(|| order.last().copied());
            if let Some(index) = overflow {
                deposit_into(&mut self.accounts[index], remaining);
            }
        }

        amount
    }

    /// Deposit RMD proceeds that were not spent into a taxable account,
    /// opening one if the plan has none
    pub fn reinvest(&mut self, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        let index = match self
            .accounts
            .iter()
            .position(|a| a.tax_treatment() == TaxTreatment::Taxable)
        {
            Some(index) => index,
            None => self.open_reinvestment_account(),
        };
        deposit_into(&mut self.accounts[index], amount);
    }

    fn open_reinvestment_account(&mut self) -> usize {
        let last_id = self.accounts.iter().map(|a| a.id.0).max().unwrap_or(0);
        let allocation = self
            .accounts
            .iter()
            .find(|a| a.tax_treatment() == TaxTreatment::TaxDeferred)
            .or(self.accounts.first())
            .map(|a| a.allocation)
            .unwrap_or(AssetAllocation::ALL_CASH);

        self.accounts.push(Account {
            id: AccountId(last_id.saturating_add(1)),
            name: REINVESTMENT_ACCOUNT_NAME.to_string(),
            kind: AccountKind::Taxable,
            allocation,
            balances: AssetBalances::default(),
            basis: 0.0,
            contribution_limit: None,
            contribution_priority: None,
        });
        self.prior_year_end.push(0.0);
        self.accounts.len() - 1
    }

    /// Withdraw `amount` following the age-dependent order.
    ///
    /// Balances never go negative: whatever cannot be raised is reported as
    /// the shortfall.
    pub fn withdraw(&mut self, amount: f64, age: u32) -> WithdrawalOutcome {
        let mut outcome = WithdrawalOutcome::default();
        if amount <= 0.0 {
            return outcome;
        }

        let early = is_early(age);
        let mut remaining = amount;
        for &source in WithdrawalSource::order_for_age(age) {
            for account in self.accounts.iter_mut().filter(|a| source.matches(a.kind)) {
                if remaining <= 0.0 {
                    break;
                }
                let available = match source {
                    WithdrawalSource::RothBasis => account.basis.min(account.total_value()),
                    _ => account.total_value(),
                };
                let request = remaining.min(available);
                if request <= 0.0 {
                    continue;
                }

                let value_before = account.total_value();
                let taken = take_from(account, request);
                remaining -= taken;
                outcome.gross += taken;
                record_tax_character(source, account, taken, value_before, early, &mut outcome);
                clear_dust(account);
            }
        }

        outcome.shortfall = if remaining > DUST { remaining } else { 0.0 };
        outcome
    }

    /// Take this year's required minimum distributions; returns the total
    pub fn take_required_distributions(&mut self, age: u32, table: &RmdTable) -> f64 {
        let mut total = 0.0;
        for (account, &prior) in self.accounts.iter_mut().zip(&self.prior_year_end) {
            if !account.kind.requires_minimum_distributions() {
                continue;
            }
            let required = table
                .required_distribution(age, prior)
                .min(account.total_value());
            if required > 0.0 {
                total += take_from(account, required);
                clear_dust(account);
            }
        }
        total
    }

    /// Reset every account to its target allocation
    pub fn rebalance(&mut self) {
        for account in &mut self.accounts {
            let total = account.total_value();
            if total > 0.0 {
                account.balances = AssetBalances::allocate(total, &account.allocation);
            }
        }
    }

    /// Record year-end values; call once at the end of every simulated year
    pub fn close_year(&mut self) {
        self.prior_year_end = self.accounts.iter().map(Account::total_value).collect();
    }
}

fn deposit_into(account: &mut Account, amount: f64) {
    let split = AssetBalances::allocate(amount, &account.allocation);
    account.balances.add(&split);
    if matches!(account.tax_treatment(), TaxTreatment::Taxable)
        || account.kind.tracks_contribution_basis()
    {
        account.basis += amount;
    }
}

/// Sell holdings cash first, then bonds, then stocks
fn take_from(account: &mut Account, amount: f64) -> f64 {
    let mut remaining = amount;
    for class in AssetClass::LIQUIDATION_ORDER {
        if remaining <= 0.0 {
            break;
        }
        let balance = account.balances.get_mut(class);
        let taken = remaining.min(*balance);
        *balance -= taken;
        remaining -= taken;
    }
    amount - remaining
}

fn record_tax_character(
    source: WithdrawalSource,
    account: &mut Account,
    taken: f64,
    value_before: f64,
    early: bool,
    outcome: &mut WithdrawalOutcome,
) {
    let taxable = &mut outcome.taxable;
    match source {
        WithdrawalSource::Savings | WithdrawalSource::Hsa => {}
        WithdrawalSource::Taxable => {
            // Realize gains pro rata; a basis above value realizes a loss
            let fraction = if value_before > 0.0 { taken / value_before } else { 1.0 };
            let basis_sold = account.basis * fraction;
            taxable.capital_gains += taken - basis_sold;
            account.basis -= basis_sold;
        }
        WithdrawalSource::TaxDeferred => {
            taxable.ordinary_income += taken;
            if early {
                taxable.penalized_withdrawals += taken;
            }
        }
        WithdrawalSource::RothBasis => {
            account.basis = (account.basis - taken).max(0.0);
        }
        WithdrawalSource::RothEarnings => {
            taxable.ordinary_income += taken;
            taxable.penalized_withdrawals += taken;
        }
        WithdrawalSource::Roth => {
            account.basis = (account.basis - taken).max(0.0);
        }
    }
}

fn clear_dust(account: &mut Account) {
    if account.total_value() < DUST {
        account.balances = AssetBalances::default();
        if account.tax_treatment() == TaxTreatment::Taxable {
            account.basis = 0.0;
        }
    }
}
