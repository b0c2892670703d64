//! Account definitions
//!
//! An account is one ownership bucket of money with a tax treatment, a target
//! allocation and a running balance in each asset class.

use serde::{Deserialize, Serialize};

use super::assets::{AssetAllocation, AssetBalances};
use super::ids::AccountId;

/// Tax treatment for an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaxTreatment {
    /// Regular brokerage - realized gains taxed as capital gains
    Taxable,
    /// 401k, Traditional IRA - withdrawals taxed as ordinary income
    TaxDeferred,
    /// Roth IRA, Roth 401k, HSA - qualified withdrawals untaxed
    TaxFree,
    /// Savings account - withdrawals untaxed, no growth taxed here
    CashSavings,
}

impl TaxTreatment {
    pub const ALL: [TaxTreatment; 4] = [
        TaxTreatment::Taxable,
        TaxTreatment::TaxDeferred,
        TaxTreatment::TaxFree,
        TaxTreatment::CashSavings,
    ];

    /// Priority used when routing surplus cash into accounts
    pub fn contribution_rank(self) -> u8 {
        match self {
            TaxTreatment::TaxDeferred => 0,
            TaxTreatment::TaxFree => 1,
            TaxTreatment::Taxable => 2,
            TaxTreatment::CashSavings => 3,
        }
    }
}

/// Concrete account product; determines tax treatment and withdrawal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountKind {
    Savings,
    Taxable,
    #[serde(rename = "401k")]
    Traditional401k,
    #[serde(rename = "ira")]
    TraditionalIra,
    #[serde(rename = "roth401k")]
    Roth401k,
    RothIra,
    Hsa,
}

impl AccountKind {
    pub fn tax_treatment(self) -> TaxTreatment {
        match self {
            AccountKind::Savings => TaxTreatment::CashSavings,
            AccountKind::Taxable => TaxTreatment::Taxable,
            AccountKind::Traditional401k | AccountKind::TraditionalIra => {
                TaxTreatment::TaxDeferred
            }
            AccountKind::Roth401k | AccountKind::RothIra | AccountKind::Hsa => {
                TaxTreatment::TaxFree
            }
        }
    }

    /// Roth accounts track contributions separately from earnings
    pub fn tracks_contribution_basis(self) -> bool {
        matches!(self, AccountKind::Roth401k | AccountKind::RothIra)
    }

    /// Subject to required minimum distributions
    pub fn requires_minimum_distributions(self) -> bool {
        self.tax_treatment() == TaxTreatment::TaxDeferred
    }
}

/// Running state of one account during a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub kind: AccountKind,
    pub allocation: AssetAllocation,
    pub balances: AssetBalances,
    /// Cost basis for taxable accounts, contribution basis for Roth accounts
    pub basis: f64,
    /// Maximum new money accepted per year
    pub contribution_limit: Option<f64>,
    /// Explicit contribution rank, lowest first
    pub contribution_priority: Option<u32>,
}

impl Account {
    pub fn tax_treatment(&self) -> TaxTreatment {
        self.kind.tax_treatment()
    }

    pub fn total_value(&self) -> f64 {
        self.balances.total()
    }

    /// Sort key for routing savings: ranked accounts first by rank, then the
    /// rest by tax treatment
    pub fn contribution_order(&self) -> (bool, u32, u8) {
        (
            self.contribution_priority.is_none(),
            self.contribution_priority.unwrap_or(0),
            self.tax_treatment().contribution_rank(),
        )
    }

    /// Gains that would be realized if the whole account were sold
    pub fn unrealized_gain(&self) -> f64 {
        self.total_value() - self.basis
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            account_id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            tax_treatment: self.tax_treatment(),
            balances: self.balances,
            total_value: self.total_value(),
        }
    }
}

/// Account state recorded at the end of a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub account_id: AccountId,
    pub name: String,
    pub kind: AccountKind,
    pub tax_treatment: TaxTreatment,
    pub balances: AssetBalances,
    pub total_value: f64,
}
