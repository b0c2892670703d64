mod accounts;
mod assets;
mod historical;
mod ids;
mod inputs;
mod percentage;
mod plan;
mod results;
mod returns;
mod rmd;

pub use accounts::{Account, AccountKind, AccountSnapshot, TaxTreatment};
pub use assets::{AssetAllocation, AssetBalances, AssetClass};
pub use historical::{
    HistoricalStatistics, HistoricalTable, HistoricalYear, SeriesStatistics, nyu_stern,
};
pub use ids::AccountId;
pub use inputs::{
    AccountInputs, AllocationInputs, BasicsInputs, GoalsInputs, GrowthRatesInputs,
    MarketAssumptionsInputs, QuickPlanInputs, RetirementFundingInputs,
};
pub use percentage::Percentage;
pub use plan::{MarketAssumptions, Plan};
pub use results::{
    AgePercentiles, FireAgePercentiles, HistoricalRange, MultiSimulationResult, PercentileSet,
    PeriodSnapshot, Phase, RunContext, SeededRun, SimulationResult, TaxBreakdown,
    TreatmentBalances,
};
pub use returns::{AssetReturns, PeriodReturns, ReturnsMode, nominal_rate, real_rate};
pub use rmd::{RMD_START_AGE, RmdTable, RmdTableEntry};
