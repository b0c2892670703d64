//! Asset classes, allocations and per-class balances

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Percentage;

/// Broad asset class an account's money sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetClass {
    Stocks,
    Bonds,
    Cash,
}

impl AssetClass {
    pub const ALL: [AssetClass; 3] = [AssetClass::Stocks, AssetClass::Bonds, AssetClass::Cash];

    /// Order in which holdings are sold inside a single account
    pub const LIQUIDATION_ORDER: [AssetClass; 3] =
        [AssetClass::Cash, AssetClass::Bonds, AssetClass::Stocks];
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetClass::Stocks => "stock",
            AssetClass::Bonds => "bond",
            AssetClass::Cash => "cash",
        };
        f.write_str(name)
    }
}

/// Target mix of an account, as fractions summing to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetAllocation {
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
}

impl AssetAllocation {
    pub const ALL_CASH: AssetAllocation = AssetAllocation {
        stocks: 0.0,
        bonds: 0.0,
        cash: 1.0,
    };

    /// Convert whole-number percentages into fractions
    pub fn from_percentages(stocks: Percentage, bonds: Percentage, cash: Percentage) -> Self {
        Self {
            stocks: stocks.as_decimal(),
            bonds: bonds.as_decimal(),
            cash: cash.as_decimal(),
        }
    }

    pub fn weight(&self, class: AssetClass) -> f64 {
        match class {
            AssetClass::Stocks => self.stocks,
            AssetClass::Bonds => self.bonds,
            AssetClass::Cash => self.cash,
        }
    }

    pub fn total(&self) -> f64 {
        self.stocks + self.bonds + self.cash
    }
}

/// Money held in each asset class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetBalances {
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
}

impl AssetBalances {
    /// Split `amount` according to `allocation`
    pub fn allocate(amount: f64, allocation: &AssetAllocation) -> Self {
        Self {
            stocks: amount * allocation.stocks,
            bonds: amount * allocation.bonds,
            cash: amount * allocation.cash,
        }
    }

    pub fn get(&self, class: AssetClass) -> f64 {
        match class {
            AssetClass::Stocks => self.stocks,
            AssetClass::Bonds => self.bonds,
            AssetClass::Cash => self.cash,
        }
    }

    pub fn get_mut(&mut self, class: AssetClass) -> &mut f64 {
        match class {
            AssetClass::Stocks => &mut self.stocks,
            AssetClass::Bonds => &mut self.bonds,
            AssetClass::Cash => &mut self.cash,
        }
    }

    pub fn total(&self) -> f64 {
        self.stocks + self.bonds + self.cash
    }

    pub fn add(&mut self, other: &AssetBalances) {
        self.stocks += other.stocks;
        self.bonds += other.bonds;
        self.cash += other.cash;
    }
}
