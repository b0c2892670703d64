use serde::{Deserialize, Serialize};

use super::AssetClass;

/// How per-period returns are generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnsMode {
    /// Market assumptions applied verbatim every year
    #[default]
    #[serde(rename = "fixedReturns", alias = "fixed")]
    Fixed,
    /// Correlated random draws around the market assumptions
    #[serde(rename = "monteCarlo", alias = "stochastic")]
    Stochastic,
    /// Sequences resampled from the historical table
    #[serde(rename = "historicalBacktest", alias = "historical")]
    Historical,
}

impl ReturnsMode {
    /// Whether the seed influences the trajectory
    pub fn is_seeded(self) -> bool {
        !matches!(self, ReturnsMode::Fixed)
    }
}

/// Annual rates of return per asset class, as decimals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetReturns {
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
}

impl AssetReturns {
    pub fn get(&self, class: AssetClass) -> f64 {
        match class {
            AssetClass::Stocks => self.stocks,
            AssetClass::Bonds => self.bonds,
            AssetClass::Cash => self.cash,
        }
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            stocks: f(self.stocks),
            bonds: f(self.bonds),
            cash: f(self.cash),
        }
    }
}

/// One period's returns in both nominal and real terms
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReturns {
    pub nominal: AssetReturns,
    pub real: AssetReturns,
    pub inflation: f64,
    /// Source year when drawn from the historical table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_year: Option<i16>,
}

impl PeriodReturns {
    pub fn from_nominal(nominal: AssetReturns, inflation: f64) -> Self {
        Self {
            nominal,
            real: nominal.map(|rate| real_rate(rate, inflation)),
            inflation,
            historical_year: None,
        }
    }

    pub fn from_real(real: AssetReturns, inflation: f64) -> Self {
        Self {
            nominal: real.map(|rate| nominal_rate(rate, inflation)),
            real,
            inflation,
            historical_year: None,
        }
    }
}

/// Fisher relation: real rate from a nominal rate and inflation
#[inline]
pub fn real_rate(nominal: f64, inflation: f64) -> f64 {
    (1.0 + nominal) / (1.0 + inflation) - 1.0
}

/// Inverse of [`real_rate`]
#[inline]
pub fn nominal_rate(real: f64, inflation: f64) -> f64 {
    (1.0 + real) * (1.0 + inflation) - 1.0
}
