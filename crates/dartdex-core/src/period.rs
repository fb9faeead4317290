//! Filing periods: a (year, quarter) pair.
//!
//! A period names one collection cycle and one directory in the record
//! layout (`{year}/Q{quarter}`). Periods order chronologically, so sorting
//! a list in reverse gives newest-first.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LookupError;

/// One filing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub quarter: u8,
}

impl Period {
    /// Builds a period, rejecting quarters outside `1..=4`.
    pub fn new(year: i32, quarter: u8) -> Result<Self, LookupError> {
        if !(1..=4).contains(&quarter) {
            return Err(LookupError::InvalidPeriod {
                reason: format!("quarter must be 1-4, got {}", quarter),
            });
        }
        if year <= 0 {
            return Err(LookupError::InvalidPeriod {
                reason: format!("year must be positive, got {}", year),
            });
        }
        Ok(Self { year, quarter })
    }

    /// Directory segment for the quarter, e.g. `Q3`.
    pub fn quarter_dir(&self) -> String {
        format!("Q{}", self.quarter)
    }

    /// Report code used by the disclosure API for this quarter's filing.
    ///
    /// Q1 and Q3 are quarterly reports, Q2 the half-year report and Q4 the
    /// annual business report.
    pub fn report_code(&self) -> &'static str {
        match self.quarter {
            1 => "11013",
            2 => "11012",
            3 => "11014",
            _ => "11011",
        }
    }

    /// Every period in `years × quarters`, skipping invalid quarters.
    pub fn grid(years: &[i32], quarters: &[u8]) -> Vec<Period> {
        let mut out = Vec::with_capacity(years.len() * quarters.len());
        for &year in years {
            for &quarter in quarters {
                if let Ok(p) = Period::new(year, quarter) {
                    out.push(p);
                }
            }
        }
        out
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

/// Accepts `2025Q1`, `2025-Q1`, `2025_Q1` and `2025-1` (case-insensitive `q`).
impl FromStr for Period {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LookupError::InvalidPeriod {
            reason: format!("expected YEARQn (e.g. 2025Q1), got '{}'", s),
        };

        let s = s.trim();
        let upper = s.to_ascii_uppercase();
        let (year_part, quarter_part) = if let Some(idx) = upper.find('Q') {
            let year = upper[..idx].trim_end_matches(['-', '_']);
            (year, &upper[idx + 1..])
        } else if let Some((year, quarter)) = upper.split_once(['-', '_']) {
            (year, quarter)
        } else {
            return Err(invalid());
        };

        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let quarter: u8 = quarter_part.parse().map_err(|_| invalid())?;
        Period::new(year, quarter)
    }
}
