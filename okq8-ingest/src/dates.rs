//! Dates in the export look like "04 Jul 2024" or "4 maj 2024": day, abbreviated
//! month name in the export's locale, four-digit year.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::{IngestError, Result};

/// Abbreviated month names, January first. Matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthNames {
    abbreviations: [&'static str; 12],
}

impl MonthNames {
    pub fn swedish() -> Self {
        Self {
            abbreviations: [
                "jan", "feb", "mar", "apr", "maj", "jun", "jul", "aug", "sep", "okt", "nov", "dec",
            ],
        }
    }

    pub fn english() -> Self {
        Self {
            abbreviations: [
                "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
            ],
        }
    }

    /// Accepts POSIX or BCP 47 style tags: `sv`, `sv_SE`, `sv-SE`, `sv_SE.UTF-8`.
    pub fn for_locale(tag: &str) -> Result<Self> {
        let language = tag
            .split(['_', '-', '.'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        match language.as_str() {
            "sv" => Ok(Self::swedish()),
            "en" => Ok(Self::english()),
            _ => Err(IngestError::UnknownLocale(tag.to_string())),
        }
    }

    /// 1-based month number for an abbreviation.
    pub fn month(&self, name: &str) -> Option<u32> {
        let name = name.to_lowercase();
        self.abbreviations
            .iter()
            .position(|m| *m == name)
            .map(|i| i as u32 + 1)
    }
}

impl Default for MonthNames {
    fn default() -> Self {
        Self::swedish()
    }
}

/// Compiled "day month-abbreviation year" format bound to one month table.
#[derive(Debug, Clone)]
pub struct DateFormat {
    months: MonthNames,
    pattern: Regex,
}

impl DateFormat {
    pub fn new(months: MonthNames) -> Result<Self> {
        let pattern = Regex::new(r"^(?P<day>\d{1,2})\s+(?P<month>\p{L}+)\s+(?P<year>\d{4})$")?;
        Ok(Self { months, pattern })
    }

    pub fn months(&self) -> &MonthNames {
        &self.months
    }

    /// Parse to midnight of the given day, or `None` if the text is not a valid date.
    pub fn parse(&self, s: &str) -> Option<NaiveDateTime> {
        let caps = self.pattern.captures(s.trim())?;
        let day: u32 = caps["day"].parse().ok()?;
        let month = self.months.month(&caps["month"])?;
        let year: i32 = caps["year"].parse().ok()?;

        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
    }
}
