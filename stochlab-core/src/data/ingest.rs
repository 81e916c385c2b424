//! Series preparation: turn whatever a provider returned into a series the
//! engine accepts.

use chrono::NaiveDate;
use log::warn;
use thiserror::Error;

use crate::domain::Bar;

#[derive(Debug, Error, PartialEq)]
pub enum BarError {
    #[error("duplicate bar dated {0}")]
    DuplicateDate(NaiveDate),

    #[error("empty date range: {start} is not before {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
}

/// Counts of what `prepare_series` dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareStats {
    pub out_of_range: usize,
    pub void: usize,
    pub insane: usize,
}

impl PrepareStats {
    pub fn dropped(&self) -> usize {
        self.out_of_range + self.void + self.insane
    }
}

/// Filter to `[start, end)`, drop void and insane bars, and sort by date.
///
/// Two bars sharing a date is an error: there is no way to tell which one
/// the provider meant.
pub fn prepare_series(
    symbol: &str,
    mut bars: Vec<Bar>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(Vec<Bar>, PrepareStats), BarError> {
    if start >= end {
        return Err(BarError::EmptyRange { start, end });
    }

    let mut stats = PrepareStats::default();
    bars.retain(|bar| {
        if bar.date < start || bar.date >= end {
            stats.out_of_range += 1;
            false
        } else if bar.is_void() {
            stats.void += 1;
            false
        } else if !bar.is_sane() {
            stats.insane += 1;
            false
        } else {
            true
        }
    });

    bars.sort_by_key(|bar| bar.date);
    if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(BarError::DuplicateDate(pair[0].date));
    }

    if stats.void + stats.insane > 0 {
        warn!(
            "{symbol}: dropped {} void and {} malformed bars",
            stats.void, stats.insane
        );
    }

    Ok((bars, stats))
}
