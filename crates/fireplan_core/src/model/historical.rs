//! Historical annual returns
//!
//! Real (inflation-adjusted) returns for stocks, bonds and cash plus CPI
//! inflation, 1928 onwards, from the NYU Stern historical dataset. The series
//! are columnar and aligned: index `i` of each array is calendar year
//! `START_YEAR + i`.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::AssetReturns;
use crate::error::{FireplanError, FireplanResult};

/// One calendar year of historical data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalYear {
    pub year: i16,
    /// Real returns
    pub returns: AssetReturns,
    pub inflation: f64,
}

/// Aligned historical series that returns providers sample from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTable {
    pub name: Cow<'static, str>,
    pub start_year: i16,
    pub stocks: Cow<'static, [f64]>,
    pub bonds: Cow<'static, [f64]>,
    pub cash: Cow<'static, [f64]>,
    pub inflation: Cow<'static, [f64]>,
}

impl Default for HistoricalTable {
    fn default() -> Self {
        Self::nyu_stern()
    }
}

impl HistoricalTable {
    /// NYU Stern real returns, 1928-2024
    pub fn nyu_stern() -> Self {
        Self {
            name: Cow::Borrowed("NYU Stern 1928-2024"),
            start_year: nyu_stern::START_YEAR,
            stocks: Cow::Borrowed(nyu_stern::STOCK_REAL_RETURNS),
            bonds: Cow::Borrowed(nyu_stern::BOND_REAL_RETURNS),
            cash: Cow::Borrowed(nyu_stern::CASH_REAL_RETURNS),
            inflation: Cow::Borrowed(nyu_stern::INFLATION_RATES),
        }
    }

    /// Build a table from owned series, which must all have the same non-zero length
    pub fn from_series(
        name: impl Into<String>,
        start_year: i16,
        stocks: Vec<f64>,
        bonds: Vec<f64>,
        cash: Vec<f64>,
        inflation: Vec<f64>,
    ) -> FireplanResult<Self> {
        let len = stocks.len();
        if len == 0 {
            return Err(FireplanError::invalid(
                "historicalTable",
                "historical series are empty",
            ));
        }
        if bonds.len() != len || cash.len() != len || inflation.len() != len {
            return Err(FireplanError::invalid(
                "historicalTable",
                "historical series have different lengths",
            ));
        }
        Ok(Self {
            name: Cow::Owned(name.into()),
            start_year,
            stocks: Cow::Owned(stocks),
            bonds: Cow::Owned(bonds),
            cash: Cow::Owned(cash),
            inflation: Cow::Owned(inflation),
        })
    }

    pub fn len(&self) -> usize {
        self.stocks
            .len()
            .min(self.bonds.len())
            .min(self.cash.len())
            .min(self.inflation.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last calendar year covered by every series
    pub fn end_year(&self) -> i16 {
        self.start_year + self.len() as i16 - 1
    }

    /// Year at a zero-based position
    pub fn get(&self, index: usize) -> Option<HistoricalYear> {
        if index >= self.len() {
            return None;
        }
        Some(HistoricalYear {
            year: self.start_year + index as i16,
            returns: AssetReturns {
                stocks: self.stocks[index],
                bonds: self.bonds[index],
                cash: self.cash[index],
            },
            inflation: self.inflation[index],
        })
    }

    /// Look up a calendar year
    pub fn year(&self, year: i16) -> Option<HistoricalYear> {
        let offset = year.checked_sub(self.start_year)?;
        usize::try_from(offset).ok().and_then(|i| self.get(i))
    }

    /// Years in `start..=end` that the table covers
    pub fn range(&self, start: i16, end: i16) -> impl Iterator<Item = HistoricalYear> + '_ {
        (start..=end).filter_map(|year| self.year(year))
    }

    pub fn statistics(&self) -> Option<HistoricalStatistics> {
        let n = self.len();
        Some(HistoricalStatistics {
            stocks: SeriesStatistics::from_values(&self.stocks[..n])?,
            bonds: SeriesStatistics::from_values(&self.bonds[..n])?,
            cash: SeriesStatistics::from_values(&self.cash[..n])?,
            inflation: SeriesStatistics::from_values(&self.inflation[..n])?,
        })
    }
}

/// Summary statistics for one historical series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStatistics {
    pub arithmetic_mean: f64,
    pub geometric_mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub years: usize,
}

impl SeriesStatistics {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let arithmetic_mean = values.iter().sum::<f64>() / n;

        // Geometric mean: (product of (1+r))^(1/n) - 1
        let product: f64 = values.iter().map(|r| 1.0 + r).product();
        let geometric_mean = product.powf(1.0 / n) - 1.0;

        let variance = values
            .iter()
            .map(|r| (r - arithmetic_mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            arithmetic_mean,
            geometric_mean,
            std_dev: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            years: values.len(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalStatistics {
    pub stocks: SeriesStatistics,
    pub bonds: SeriesStatistics,
    pub cash: SeriesStatistics,
    pub inflation: SeriesStatistics,
}

pub mod nyu_stern {
    /// First calendar year in every series
    pub const START_YEAR: i16 = 1928;

    /// S&P 500 with dividends, real annual return
    pub const STOCK_REAL_RETURNS: &[f64] = &[
        0.4549, -0.0883, -0.2001, -0.3807, 0.0182, 0.4885, -0.0266, 0.4249, 0.3006, -0.3713,
        0.3298, -0.0110, -0.1131, -0.2065, 0.0930, 0.2147, 0.1636, 0.3284, -0.2248, -0.0334,
        0.0263, 0.2081, 0.2348, 0.1668, 0.1727, -0.0194, 0.5371, 0.3210, 0.0433, -0.1298, 0.4123,
        0.1015, -0.0101, 0.2579, -0.1001, 0.2063, 0.1530, 0.1028, -0.1298, 0.2015, 0.0582, -0.1360,
        -0.0190, 0.1061, 0.1484, -0.2117, -0.3404, 0.2811, 0.1809, -0.1282, -0.0230, 0.0461,
        0.1708, -0.1251, 0.1598, 0.1787, 0.0211, 0.2643, 0.1721, 0.0132, 0.1160, 0.2564, -0.0864,
        0.2636, 0.0446, 0.0703, -0.0131, 0.3380, 0.1874, 0.3088, 0.2630, 0.1772, -0.1201, -0.1320,
        -0.2378, 0.2599, 0.0725, 0.0137, 0.1275, 0.0135, -0.3661, 0.2260, 0.1313, -0.0084, 0.1391,
        0.3019, 0.1267, 0.0064, 0.0950, 0.1909, -0.0602, 0.2828, 0.1644, 0.2002, -0.2301, 0.2197,
        0.2154,
    ];

    /// 10-year US Treasury bond, real annual return
    pub const BOND_REAL_RETURNS: &[f64] = &[
        0.0201, 0.0360, 0.1168, 0.0745, 0.2125, 0.0108, 0.0635, 0.0144, 0.0352, -0.0144, 0.0719,
        0.0441, 0.0465, -0.1087, -0.0618, -0.0046, 0.0027, 0.0152, -0.1270, -0.0727, -0.0101,
        0.0688, -0.0519, -0.0594, 0.0150, 0.0337, 0.0406, -0.0170, -0.0509, 0.0379, -0.0379,
        -0.0430, 0.1014, 0.0138, 0.0430, 0.0004, 0.0273, -0.0118, -0.0053, -0.0448, -0.0138,
        -0.1056, 0.1059, 0.0631, -0.0057, -0.0464, -0.0921, -0.0312, 0.1060, -0.0507, -0.0899,
        -0.1114, -0.1378, -0.0066, 0.2792, -0.0057, 0.0941, 0.2111, 0.2293, -0.0900, 0.0364,
        0.1247, 0.0012, 0.1159, 0.0628, 0.1116, -0.1043, 0.2042, -0.0183, 0.0810, 0.1310, -0.1065,
        0.1283, 0.0396, 0.1244, -0.0148, 0.0120, -0.0053, -0.0057, 0.0589, 0.1999, -0.1347, 0.0686,
        0.1270, 0.0121, -0.1045, 0.0991, 0.0055, -0.0136, 0.0068, -0.0189, 0.0719, 0.0984, -0.1070,
        -0.2281, 0.0051, -0.0427,
    ];

    /// 3-month US Treasury bill, real annual return
    pub const CASH_REAL_RETURNS: &[f64] = &[
        0.0429, 0.0256, 0.1169, 0.1282, 0.1264, 0.0020, -0.0122, -0.0274, -0.0126, -0.0251, 0.0292,
        0.0005, -0.0067, -0.0891, -0.0797, -0.0250, -0.0188, -0.0183, -0.1503, -0.0757, -0.0189,
        0.0326, -0.0446, -0.0423, 0.0096, 0.0113, 0.0169, 0.0134, -0.0035, 0.0032, 0.0001, 0.0163,
        0.0149, 0.0167, 0.0142, 0.0149, 0.0255, 0.0199, 0.0135, 0.0122, 0.0059, 0.0044, 0.0078,
        0.0103, 0.0063, -0.0154, -0.0400, -0.0108, 0.0011, -0.0135, -0.0169, -0.0286, -0.0100,
        0.0469, 0.0652, 0.0465, 0.0538, 0.0354, 0.0482, 0.0129, 0.0215, 0.0331, 0.0131, 0.0224,
        0.0052, 0.0024, 0.0154, 0.0288, 0.0163, 0.0330, 0.0311, 0.0190, 0.0235, 0.0182, -0.0075,
        -0.0086, -0.0182, -0.0026, 0.0214, 0.0027, 0.0128, -0.0250, -0.0134, -0.0283, -0.0163,
        -0.0142, -0.0072, -0.0067, -0.0172, -0.0115, 0.0003, -0.0022, -0.0099, -0.0653, -0.0416,
        0.0166, 0.0216,
    ];

    /// CPI inflation
    pub const INFLATION_RATES: &[f64] = &[
        -0.0116, 0.0058, -0.0640, -0.0932, -0.1027, 0.0076, 0.0152, 0.0299, 0.0145, 0.0286,
        -0.0278, 0.0000, 0.0071, 0.0993, 0.0903, 0.0296, 0.0230, 0.0225, 0.1813, 0.0884, 0.0299,
        -0.0207, 0.0593, 0.0600, 0.0075, 0.0075, -0.0074, 0.0037, 0.0299, 0.0290, 0.0176, 0.0173,
        0.0136, 0.0067, 0.0133, 0.0164, 0.0097, 0.0192, 0.0346, 0.0304, 0.0472, 0.0620, 0.0557,
        0.0327, 0.0341, 0.0871, 0.1234, 0.0694, 0.0486, 0.0670, 0.0902, 0.1329, 0.1252, 0.0892,
        0.0383, 0.0379, 0.0395, 0.0380, 0.0110, 0.0443, 0.0442, 0.0465, 0.0611, 0.0306, 0.0290,
        0.0275, 0.0267, 0.0254, 0.0332, 0.0170, 0.0161, 0.0268, 0.0339, 0.0155, 0.0238, 0.0188,
        0.0326, 0.0342, 0.0254, 0.0408, 0.0009, 0.0272, 0.0150, 0.0296, 0.0174, 0.0150, 0.0076,
        0.0073, 0.0207, 0.0211, 0.0191, 0.0229, 0.0136, 0.0704, 0.0645, 0.0335, 0.0275,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_are_aligned() {
        assert_eq!(nyu_stern::STOCK_REAL_RETURNS.len(), 97);
        assert_eq!(nyu_stern::BOND_REAL_RETURNS.len(), 97);
        assert_eq!(nyu_stern::CASH_REAL_RETURNS.len(), 97);
        assert_eq!(nyu_stern::INFLATION_RATES.len(), 97);

        let table = HistoricalTable::nyu_stern();
        assert_eq!(table.start_year, 1928);
        assert_eq!(table.end_year(), 2024);
    }

    #[test]
    fn test_year_lookup() {
        let table = HistoricalTable::nyu_stern();

        let crash = table.year(2008).unwrap();
        assert_eq!(crash.returns.stocks, -0.3661);
        assert_eq!(crash.returns.bonds, 0.1999);
        assert_eq!(crash.inflation, 0.0009);

        let first = table.get(0).unwrap();
        assert_eq!(first.year, 1928);
        assert_eq!(first.returns.stocks, 0.4549);

        assert!(table.year(1927).is_none());
        assert!(table.year(2025).is_none());
    }

    #[test]
    fn test_range_is_clipped_to_table() {
        let table = HistoricalTable::nyu_stern();
        let years: Vec<i16> = table.range(2020, 2030).map(|y| y.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022, 2023, 2024]);
    }

    #[test]
    fn test_statistics() {
        let stats = HistoricalTable::nyu_stern().statistics().unwrap();
        assert_eq!(stats.stocks.years, 97);
        assert_eq!(stats.stocks.min, -0.3807);
        assert_eq!(stats.stocks.max, 0.5371);
        assert!(stats.stocks.arithmetic_mean > stats.bonds.arithmetic_mean);
        assert!(stats.stocks.std_dev > stats.cash.std_dev);
        assert!(stats.stocks.geometric_mean < stats.stocks.arithmetic_mean);
    }

    #[test]
    fn test_from_series_rejects_mismatched_lengths() {
        assert!(
            HistoricalTable::from_series("bad", 2000, vec![0.1, 0.2], vec![0.0], vec![0.0, 0.0], vec![0.0, 0.0])
                .is_err()
        );
        assert!(HistoricalTable::from_series("empty", 2000, vec![], vec![], vec![], vec![]).is_err());

        let table =
            HistoricalTable::from_series("ok", 2000, vec![0.1], vec![0.02], vec![0.01], vec![0.03])
                .unwrap();
        assert_eq!(table.end_year(), 2000);
    }
}
