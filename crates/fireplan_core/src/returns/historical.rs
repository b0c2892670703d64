//! Historical sequence returns
//!
//! Walks the historical table one calendar year per period. A sequence starts
//! at some year and runs forward; when it falls off the end of the table it
//! restarts, either at a fresh random year or back at the first year.

use rand::Rng;

use crate::error::{FireplanError, FireplanResult};
use crate::model::{HistoricalRange, HistoricalTable, PeriodReturns};
use crate::rng::Lcg;

use super::ReturnsProvider;

/// What happens when a sequence runs past the last year of the table
#[derive(Debug, Clone)]
pub enum SequenceRestart {
    /// Jump to a random year drawn from the generator
    Random(Lcg),
    /// Continue from the first year of the table
    Wrap,
}

#[derive(Debug, Clone)]
pub struct HistoricalReturns {
    table: HistoricalTable,
    cursor: usize,
    restart: SequenceRestart,
    ranges: Vec<HistoricalRange>,
}

impl HistoricalReturns {
    /// Start at a random year and jump to another random year at the end of the table
    pub fn random_start(table: HistoricalTable, seed: u64) -> FireplanResult<Self> {
        if table.is_empty() {
            return Err(empty_table());
        }
        let mut rng = Lcg::new(seed);
        let cursor = rng.random_range(0..table.len());
        Ok(Self {
            table,
            cursor,
            restart: SequenceRestart::Random(rng),
            ranges: Vec::new(),
        })
    }

    /// Start at `start_year` and wrap to the first year at the end of the table
    pub fn from_start_year(table: HistoricalTable, start_year: i16) -> FireplanResult<Self> {
        if table.is_empty() {
            return Err(empty_table());
        }
        let cursor = start_year
            .checked_sub(table.start_year)
            .and_then(|offset| usize::try_from(offset).ok())
            .filter(|&i| i < table.len())
            .ok_or_else(|| {
                FireplanError::invalid(
                    "startYear",
                    format!(
                        "{start_year} is outside {}-{}",
                        table.start_year,
                        table.end_year()
                    ),
                )
            })?;
        Ok(Self {
            table,
            cursor,
            restart: SequenceRestart::Wrap,
            ranges: Vec::new(),
        })
    }

    fn record(&mut self, year: i16) {
        match self.ranges.last_mut() {
            Some(range) if range.end_year + 1 == year => range.end_year = year,
            _ => self.ranges.push(HistoricalRange {
                start_year: year,
                end_year: year,
            }),
        }
    }
}

impl ReturnsProvider for HistoricalReturns {
    fn next_returns(&mut self, _period: u32) -> PeriodReturns {
        if self.cursor >= self.table.len() {
            self.cursor = match &mut self.restart {
                SequenceRestart::Random(rng) => rng.random_range(0..self.table.len()),
                SequenceRestart::Wrap => 0,
            };
        }

        let Some(year) = self.table.get(self.cursor) else {
            return PeriodReturns::default();
        };
        self.cursor += 1;
        self.record(year.year);

        PeriodReturns {
            historical_year: Some(year.year),
            ..PeriodReturns::from_real(year.returns, year.inflation)
        }
    }

    fn historical_ranges(&self) -> &[HistoricalRange] {
        &self.ranges
    }
}

fn empty_table() -> FireplanError {
    FireplanError::invalid("historicalTable", "historical table has no years")
}
