use crate::error::{FireplanError, FireplanResult};
use crate::model::{MarketAssumptions, PeriodReturns};

use super::ReturnsProvider;

/// The plan's market assumptions, every period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedReturns {
    returns: PeriodReturns,
}

impl FixedReturns {
    pub fn new(market: &MarketAssumptions) -> FireplanResult<Self> {
        let nominal = market.nominal_returns();
        let inflation = market.inflation();

        for (series, rate) in [
            ("stock return", nominal.stocks),
            ("bond return", nominal.bonds),
            ("cash return", nominal.cash),
            ("inflation", inflation),
        ] {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(FireplanError::InvalidDistributionParameters {
                    series,
                    reason: "rate must be finite and above -100%",
                });
            }
        }

        Ok(Self {
            returns: PeriodReturns::from_nominal(nominal, inflation),
        })
    }
}

impl ReturnsProvider for FixedReturns {
    fn next_returns(&mut self, _period: u32) -> PeriodReturns {
        self.returns
    }
}
