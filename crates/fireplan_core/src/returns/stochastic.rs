//! Correlated Monte Carlo returns
//!
//! Each period draws four independent standard normals, correlates them with
//! the Cholesky factor of the correlation matrix, then maps them to:
//! - stocks: lognormal, `exp(mu + sigma*z) - 1` with `mu = ln(1+E) - sigma^2/2`
//!   so the expected simple return equals the assumption
//! - bonds, cash, inflation: normal around the assumption

use rand::Rng;
use rand_distr::StandardNormal;

use crate::config::VolatilityAssumptions;
use crate::error::{FireplanError, FireplanResult};
use crate::model::{AssetReturns, MarketAssumptions, PeriodReturns};
use crate::rng::Lcg;

use super::ReturnsProvider;

/// Correlation of stocks, bonds, cash and inflation, in that order
pub const DEFAULT_CORRELATION: [[f64; 4]; 4] = [
    [1.0, -0.1, 0.05, -0.15],
    [-0.1, 1.0, 0.2, -0.3],
    [0.05, 0.2, 1.0, 0.6],
    [-0.15, -0.3, 0.6, 1.0],
];

/// Floor on drawn rates so a period can never wipe out more than the balance
const MIN_RETURN: f64 = -0.99;
const MIN_INFLATION: f64 = -0.5;

const SERIES: [&str; 4] = ["stock return", "bond return", "cash return", "inflation"];

#[derive(Debug, Clone)]
pub struct StochasticReturns {
    means: [f64; 4],
    sigmas: [f64; 4],
    /// Lognormal location parameter for stocks
    stock_mu: f64,
    cholesky: [[f64; 4]; 4],
    rng: Lcg,
}

impl StochasticReturns {
    pub fn new(
        market: &MarketAssumptions,
        volatility: &VolatilityAssumptions,
        seed: u64,
    ) -> FireplanResult<Self> {
        Self::with_correlation(market, volatility, &DEFAULT_CORRELATION, seed)
    }

    pub fn with_correlation(
        market: &MarketAssumptions,
        volatility: &VolatilityAssumptions,
        correlation: &[[f64; 4]; 4],
        seed: u64,
    ) -> FireplanResult<Self> {
        let nominal = market.nominal_returns();
        let means = [nominal.stocks, nominal.bonds, nominal.cash, market.inflation()];
        let sigmas = [
            volatility.stocks.as_decimal(),
            volatility.bonds.as_decimal(),
            volatility.cash.as_decimal(),
            volatility.inflation.as_decimal(),
        ];

        for ((series, mean), sigma) in SERIES.into_iter().zip(means).zip(sigmas) {
            if !mean.is_finite() || mean <= -1.0 {
                return Err(FireplanError::InvalidDistributionParameters {
                    series,
                    reason: "mean must be finite and above -100%",
                });
            }
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(FireplanError::InvalidDistributionParameters {
                    series,
                    reason: "volatility must be finite and non-negative",
                });
            }
        }

        for i in 0..4 {
            if (correlation[i][i] - 1.0).abs() > 1e-9 {
                return Err(FireplanError::InvalidDistributionParameters {
                    series: "correlation",
                    reason: "diagonal entries must be 1",
                });
            }
            for j in 0..4 {
                if (correlation[i][j] - correlation[j][i]).abs() > 1e-9
                    || correlation[i][j].abs() > 1.0
                {
                    return Err(FireplanError::InvalidDistributionParameters {
                        series: "correlation",
                        reason: "matrix must be symmetric with entries in [-1, 1]",
                    });
                }
            }
        }

        let cholesky = cholesky(correlation).ok_or(FireplanError::InvalidDistributionParameters {
            series: "correlation",
            reason: "matrix is not positive definite",
        })?;

        let stock_sigma = sigmas[0];
        Ok(Self {
            means,
            sigmas,
            stock_mu: (1.0 + means[0]).ln() - stock_sigma * stock_sigma / 2.0,
            cholesky,
            rng: Lcg::new(seed),
        })
    }

    fn correlated_normals(&mut self) -> [f64; 4] {
        let z: [f64; 4] = std::array::from_fn(|_| self.rng.sample(StandardNormal));
        let mut out = [0.0; 4];
        for (i, row) in self.cholesky.iter().enumerate() {
            out[i] = row.iter().zip(z).take(i + 1).map(|(l, zj)| l * zj).sum();
        }
        out
    }
}

impl ReturnsProvider for StochasticReturns {
    fn next_returns(&mut self, _period: u32) -> PeriodReturns {
        let z = self.correlated_normals();

        let stocks = (self.stock_mu + self.sigmas[0] * z[0]).exp() - 1.0;
        let bonds = self.means[1] + self.sigmas[1] * z[1];
        let cash = self.means[2] + self.sigmas[2] * z[2];
        let inflation = (self.means[3] + self.sigmas[3] * z[3]).max(MIN_INFLATION);

        let nominal = AssetReturns {
            stocks: stocks.max(MIN_RETURN),
            bonds: bonds.max(MIN_RETURN),
            cash: cash.max(MIN_RETURN),
        };
        PeriodReturns::from_nominal(nominal, inflation)
    }
}

/// Lower-triangular Cholesky factor, or `None` if `matrix` is not positive definite
pub fn cholesky<const N: usize>(matrix: &[[f64; N]; N]) -> Option<[[f64; N]; N]> {
    let mut lower = [[0.0; N]; N];
    for i in 0..N {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| lower[i][k] * lower[j][k]).sum();
            if i == j {
                let diagonal = matrix[i][i] - sum;
                if diagonal <= 0.0 || !diagonal.is_finite() {
                    return None;
                }
                lower[i][j] = diagonal.sqrt();
            } else {
                lower[i][j] = (matrix[i][j] - sum) / lower[j][j];
            }
        }
    }
    Some(lower)
}
