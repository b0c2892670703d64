//! Tax calculation for one simulated year
//!
//! Ordinary income runs through progressive brackets after the standard
//! deduction. Long-term capital gains are stacked on top of ordinary taxable
//! income and taxed with their own brackets. Net capital losses offset up to
//! a capped amount of ordinary income per year and the rest carries forward,
//! offsetting future gains first. The early withdrawal penalty is a flat
//! surtax kept apart from income tax.
//!
//! Bracket tables are in today's dollars. Nominal-basis runs pass a price
//! level so thresholds and the deduction grow with inflation.

use serde::{Deserialize, Serialize};

use crate::config::TaxMode;
use crate::model::TaxBreakdown;

/// Lower edge of a bracket and the rate applied above it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub threshold: f64,
    pub rate: f64,
}

const fn bracket(threshold: f64, rate: f64) -> TaxBracket {
    TaxBracket { threshold, rate }
}

/// 2025 single filer ordinary income brackets
pub const SINGLE_ORDINARY_2025: [TaxBracket; 7] = [
    bracket(0.0, 0.10),
    bracket(11_925.0, 0.12),
    bracket(48_475.0, 0.22),
    bracket(103_350.0, 0.24),
    bracket(197_300.0, 0.32),
    bracket(250_525.0, 0.35),
    bracket(626_350.0, 0.37),
];

/// 2025 single filer long-term capital gains brackets
pub const SINGLE_CAPITAL_GAINS_2025: [TaxBracket; 3] = [
    bracket(0.0, 0.0),
    bracket(47_025.0, 0.15),
    bracket(518_900.0, 0.20),
];

pub const STANDARD_DEDUCTION_2025: f64 = 15_000.0;
pub const CAPITAL_LOSS_LIMIT: f64 = 3_000.0;
pub const EARLY_WITHDRAWAL_PENALTY_RATE: f64 = 0.10;

/// Age from which tax-advantaged withdrawals are penalty free
pub const PENALTY_FREE_AGE: f64 = 59.5;

/// Everything the calculator needs for one filing status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxTables {
    pub ordinary: Vec<TaxBracket>,
    pub capital_gains: Vec<TaxBracket>,
    pub standard_deduction: f64,
    pub capital_loss_limit: f64,
    pub early_withdrawal_penalty_rate: f64,
}

impl Default for TaxTables {
    fn default() -> Self {
        Self::single_filer_2025()
    }
}

impl TaxTables {
    pub fn single_filer_2025() -> Self {
        Self {
            ordinary: SINGLE_ORDINARY_2025.to_vec(),
            capital_gains: SINGLE_CAPITAL_GAINS_2025.to_vec(),
            standard_deduction: STANDARD_DEDUCTION_2025,
            capital_loss_limit: CAPITAL_LOSS_LIMIT,
            early_withdrawal_penalty_rate: EARLY_WITHDRAWAL_PENALTY_RATE,
        }
    }
}

/// Calculate tax using progressive brackets.
/// Returns 0 for zero or negative income.
pub fn calculate_bracket_tax(income: f64, brackets: &[TaxBracket]) -> f64 {
    if income <= 0.0 || brackets.is_empty() {
        return 0.0;
    }

    let mut tax = 0.0;
    for (i, bracket) in brackets.iter().enumerate() {
        if income <= bracket.threshold {
            break;
        }
        let next_threshold = brackets
            .get(i + 1)
            .map(|b| b.threshold)
            .unwrap_or(f64::INFINITY);
        let taxable_in_bracket = income.min(next_threshold) - bracket.threshold;
        tax += taxable_in_bracket * bracket.rate;
    }

    tax
}

/// Calculate the tax on `additional_income` stacked on top of `base_income`
pub fn calculate_marginal_tax(
    additional_income: f64,
    base_income: f64,
    brackets: &[TaxBracket],
) -> f64 {
    calculate_bracket_tax(base_income + additional_income, brackets)
        - calculate_bracket_tax(base_income, brackets)
}

/// Bracket tax with every threshold multiplied by `price_level`.
///
/// Bracket tax is homogeneous in income and thresholds, so scaling the income
/// down and the tax back up gives the same answer without building new tables.
fn scaled_bracket_tax(income: f64, brackets: &[TaxBracket], price_level: f64) -> f64 {
    calculate_bracket_tax(income / price_level, brackets) * price_level
}

/// Taxable events of one year
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaxableIncome {
    /// Wages, pensions, tax-deferred withdrawals and RMDs
    pub ordinary_income: f64,
    /// Net realized capital gain; negative for a net loss
    pub capital_gains: f64,
    /// Withdrawals subject to the early withdrawal penalty
    pub penalized_withdrawals: f64,
}

impl TaxableIncome {
    pub fn combine(&self, other: &TaxableIncome) -> TaxableIncome {
        TaxableIncome {
            ordinary_income: self.ordinary_income + other.ordinary_income,
            capital_gains: self.capital_gains + other.capital_gains,
            penalized_withdrawals: self.penalized_withdrawals + other.penalized_withdrawals,
        }
    }
}

/// Year-over-year tax state for one run
#[derive(Debug, Clone)]
pub struct TaxCalculator {
    mode: TaxMode,
    tables: TaxTables,
    /// Flat rate used by [`TaxMode::Effective`], as a decimal
    effective_rate: f64,
    carryforward: f64,
}

impl TaxCalculator {
    pub fn new(mode: TaxMode, tables: TaxTables, effective_rate: f64) -> Self {
        Self {
            mode,
            tables,
            effective_rate,
            carryforward: 0.0,
        }
    }

    /// Capital loss waiting to offset future gains
    pub fn carryforward(&self) -> f64 {
        self.carryforward
    }

    /// Compute the year's taxes without committing the loss carryforward
    pub fn assess(&self, income: &TaxableIncome, price_level: f64) -> TaxBreakdown {
        let price_level = if price_level > 0.0 { price_level } else { 1.0 };
        let tables = &self.tables;

        let net_gain = income.capital_gains - self.carryforward;
        let (gains, loss_deduction, carryforward) = if net_gain >= 0.0 {
            (net_gain, 0.0, 0.0)
        } else {
            let loss = -net_gain;
            let deduction = loss.min(tables.capital_loss_limit);
            (0.0, deduction, loss - deduction)
        };
        let ordinary = (income.ordinary_income.max(0.0) - loss_deduction).max(0.0);
        let early_withdrawal_penalty =
            income.penalized_withdrawals.max(0.0) * tables.early_withdrawal_penalty_rate;

        match self.mode {
            TaxMode::Effective => TaxBreakdown {
                taxable_ordinary_income: ordinary,
                taxable_capital_gains: gains,
                ordinary_income_tax: ordinary * self.effective_rate,
                capital_gains_tax: gains * self.effective_rate,
                early_withdrawal_penalty,
                capital_loss_deduction: loss_deduction,
                capital_loss_carryforward: carryforward,
            },
            TaxMode::Progressive => {
                let deduction = tables.standard_deduction * price_level;
                let taxable_ordinary = (ordinary - deduction).max(0.0);
                let unused_deduction = (deduction - ordinary).max(0.0);
                let taxable_gains = (gains - unused_deduction).max(0.0);

                let ordinary_income_tax =
                    scaled_bracket_tax(taxable_ordinary, &tables.ordinary, price_level);
                let capital_gains_tax = scaled_bracket_tax(
                    taxable_ordinary + taxable_gains,
                    &tables.capital_gains,
                    price_level,
                ) - scaled_bracket_tax(taxable_ordinary, &tables.capital_gains, price_level);

                TaxBreakdown {
                    taxable_ordinary_income: taxable_ordinary,
                    taxable_capital_gains: taxable_gains,
                    ordinary_income_tax,
                    capital_gains_tax: capital_gains_tax.max(0.0),
                    early_withdrawal_penalty,
                    capital_loss_deduction: loss_deduction,
                    capital_loss_carryforward: carryforward,
                }
            }
        }
    }

    /// Compute the year's taxes and carry any unused loss into next year
    pub fn settle(&mut self, income: &TaxableIncome, price_level: f64) -> TaxBreakdown {
        let breakdown = self.assess(income, price_level);
        self.carryforward = breakdown.capital_loss_carryforward;
        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progressive() -> TaxCalculator {
        TaxCalculator::new(TaxMode::Progressive, TaxTables::single_filer_2025(), 0.15)
    }

    fn ordinary(amount: f64) -> TaxableIncome {
        TaxableIncome {
            ordinary_income: amount,
            ..Default::default()
        }
    }

    #[test]
    fn test_bracket_tax_first_bracket() {
        let tax = calculate_bracket_tax(5_000.0, &SINGLE_ORDINARY_2025);
        assert!((tax - 500.0).abs() < 0.01, "Expected 500, got {}", tax);
    }

    #[test]
    fn test_bracket_tax_multiple_brackets() {
        // $60,000 taxable:
        // $11,925 at 10% = $1,192.50
        // $36,550 at 12% = $4,386.00
        // $11,525 at 22% = $2,535.50
        // Total = $8,114.00
        let tax = calculate_bracket_tax(60_000.0, &SINGLE_ORDINARY_2025);
        assert!((tax - 8_114.0).abs() < 0.01, "Expected 8114, got {}", tax);
    }

    #[test]
    fn test_bracket_tax_never_negative() {
        assert_eq!(calculate_bracket_tax(0.0, &SINGLE_ORDINARY_2025), 0.0);
        assert_eq!(calculate_bracket_tax(-5_000.0, &SINGLE_ORDINARY_2025), 0.0);
        assert_eq!(calculate_bracket_tax(5_000.0, &[]), 0.0);
    }

    #[test]
    fn test_marginal_tax() {
        // $45,000 base sits in the 12% bracket
        // Additional $10,000:
        // $3,475 at 12% = $417
        // $6,525 at 22% = $1,435.50
        let marginal = calculate_marginal_tax(10_000.0, 45_000.0, &SINGLE_ORDINARY_2025);
        assert!(
            (marginal - 1_852.5).abs() < 0.01,
            "Expected 1852.5, got {}",
            marginal
        );
    }

    #[test]
    fn test_standard_deduction_applied_first() {
        let taxes = progressive().assess(&ordinary(14_000.0), 1.0);
        assert_eq!(taxes.taxable_ordinary_income, 0.0);
        assert_eq!(taxes.total(), 0.0);

        let taxes = progressive().assess(&ordinary(75_000.0), 1.0);
        assert!((taxes.taxable_ordinary_income - 60_000.0).abs() < 1e-9);
        assert!((taxes.ordinary_income_tax - 8_114.0).abs() < 0.01);
    }

    #[test]
    fn test_capital_gains_stack_on_ordinary_income() {
        // $40,000 taxable ordinary leaves $7,025 in the 0% gains bracket
        let income = TaxableIncome {
            ordinary_income: 55_000.0,
            capital_gains: 20_000.0,
            penalized_withdrawals: 0.0,
        };
        let taxes = progressive().assess(&income, 1.0);
        let expected = (20_000.0 - 7_025.0) * 0.15;
        assert!(
            (taxes.capital_gains_tax - expected).abs() < 0.01,
            "Expected {}, got {}",
            expected,
            taxes.capital_gains_tax
        );
    }

    #[test]
    fn test_unused_deduction_offsets_gains() {
        let income = TaxableIncome {
            ordinary_income: 5_000.0,
            capital_gains: 30_000.0,
            penalized_withdrawals: 0.0,
        };
        let taxes = progressive().assess(&income, 1.0);
        assert!((taxes.taxable_capital_gains - 20_000.0).abs() < 1e-9);
        // Still inside the 0% bracket
        assert_eq!(taxes.capital_gains_tax, 0.0);
    }

    #[test]
    fn test_capital_loss_deduction_and_carryforward() {
        let mut calculator = progressive();
        let year_one = TaxableIncome {
            ordinary_income: 50_000.0,
            capital_gains: -10_000.0,
            penalized_withdrawals: 0.0,
        };
        let taxes = calculator.settle(&year_one, 1.0);
        assert_eq!(taxes.capital_loss_deduction, 3_000.0);
        assert!((taxes.taxable_ordinary_income - 32_000.0).abs() < 1e-9);
        assert_eq!(calculator.carryforward(), 7_000.0);

        // Carryforward offsets next year's gains before anything else
        let year_two = TaxableIncome {
            ordinary_income: 50_000.0,
            capital_gains: 5_000.0,
            penalized_withdrawals: 0.0,
        };
        let taxes = calculator.settle(&year_two, 1.0);
        assert_eq!(taxes.taxable_capital_gains, 0.0);
        assert_eq!(taxes.capital_loss_deduction, 2_000.0);
        assert_eq!(calculator.carryforward(), 0.0);
    }

    #[test]
    fn test_assess_does_not_commit_carryforward() {
        let calculator = progressive();
        let income = TaxableIncome {
            capital_gains: -10_000.0,
            ..Default::default()
        };
        let taxes = calculator.assess(&income, 1.0);
        assert_eq!(taxes.capital_loss_carryforward, 7_000.0);
        assert_eq!(calculator.carryforward(), 0.0);
    }

    #[test]
    fn test_early_withdrawal_penalty_is_separate() {
        let income = TaxableIncome {
            ordinary_income: 20_000.0,
            capital_gains: 0.0,
            penalized_withdrawals: 20_000.0,
        };
        let taxes = progressive().assess(&income, 1.0);
        assert!((taxes.early_withdrawal_penalty - 2_000.0).abs() < 1e-9);
        // $5,000 taxable at 10%
        assert!((taxes.ordinary_income_tax - 500.0).abs() < 0.01);
        assert!((taxes.total() - 2_500.0).abs() < 0.01);
    }

    #[test]
    fn test_effective_mode_is_flat() {
        let calculator = TaxCalculator::new(TaxMode::Effective, TaxTables::default(), 0.15);
        let income = TaxableIncome {
            ordinary_income: 40_000.0,
            capital_gains: 10_000.0,
            penalized_withdrawals: 0.0,
        };
        let taxes = calculator.assess(&income, 1.0);
        assert!((taxes.ordinary_income_tax - 6_000.0).abs() < 1e-9);
        assert!((taxes.capital_gains_tax - 1_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_level_scales_brackets() {
        let today = progressive().assess(&ordinary(75_000.0), 1.0);
        let doubled = progressive().assess(&ordinary(150_000.0), 2.0);
        assert!((doubled.ordinary_income_tax - 2.0 * today.ordinary_income_tax).abs() < 0.01);
        assert!((doubled.taxable_ordinary_income - 120_000.0).abs() < 1e-9);
    }
}
