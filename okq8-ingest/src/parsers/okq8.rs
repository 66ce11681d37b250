//! OKQ8 Bank transaction export parser (xlsx)
//!
//! Expected sheet layout (header row, then most-recent-first transactions):
//!   Datum        Typ   Beskrivning      In på konto  Ut från konto  Originalt belopp  Valuta  Kurs
//!   04 Jul 2024  Köp   Finska pinnar                 -12
//!   28 Jun 2024  Insättning  Bg Inbetalning  5579.64
//!
//! Amounts are passed through as exported: debits are already negative.

use std::path::Path;

use crate::dates::{DateFormat, MonthNames};
use crate::error::{IngestError, Result};
use crate::sheet::{Cell, Column, RawRow, TabularSource, open_workbook, read_rows};
use crate::types::{CURRENCY, ForeignAmount, Statement, StatementLine, TransactionType};

/// Pick the transaction type and amount for a row.
///
/// Credit wins over debit; the original amount is only used when both are empty.
pub fn type_and_amount(row: &RawRow) -> Result<(TransactionType, f64)> {
    if let Some(credit) = amount(row, Column::AmountIn)? {
        return Ok((TransactionType::Credit, credit));
    }
    if let Some(debit) = amount(row, Column::AmountOut)? {
        return Ok((TransactionType::Debit, debit));
    }
    match amount(row, Column::OriginalAmount)? {
        Some(original) => Ok((TransactionType::Other, original)),
        None => Err(IngestError::MissingAmount { row: row.position }),
    }
}

/// Turn one data row into a statement line. No state is shared between rows.
pub fn classify(row: &RawRow, format: &DateFormat, currency: &str) -> Result<StatementLine> {
    let date = match row.get(Column::Date) {
        Cell::Text(s) => format.parse(s),
        _ => None,
    }
    .ok_or_else(|| IngestError::InvalidDate {
        row: row.position,
        value: row.get(Column::Date).to_string(),
    })?;

    let memo = row.get(Column::Description).to_string();

    let (trntype, amount) = type_and_amount(row)?;
    let original = foreign_amount(row, currency);

    log::debug!("row {}: trntype={} amount={} memo={:?}", row.position, trntype, amount, memo);

    Ok(StatementLine::new(date, memo, amount, trntype).with_original(original))
}

fn amount(row: &RawRow, column: Column) -> Result<Option<f64>> {
    let cell = row.get(column);
    if cell.is_absent() {
        return Ok(None);
    }
    match cell {
        Cell::Number(n) => Ok(Some(*n)),
        Cell::Text(s) => parse_amount_text(s).map(Some).ok_or_else(|| IngestError::InvalidAmount {
            row: row.position,
            column: column.header(),
            value: s.clone(),
        }),
        Cell::Empty => Ok(None),
    }
}

/// "1 234,50" and "-12" style text amounts.
fn parse_amount_text(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            ',' => '.',
            '\u{2212}' => '-',
            other => other,
        })
        .collect();
    cleaned.parse().ok()
}

/// Currency and rate are informational: an unreadable rate is dropped, not fatal.
fn foreign_amount(row: &RawRow, currency: &str) -> Option<ForeignAmount> {
    let code = match row.get(Column::Currency) {
        Cell::Text(s) if !s.trim().is_empty() => s.trim(),
        _ => return None,
    };
    if code.eq_ignore_ascii_case(currency) {
        return None;
    }
    let rate = amount(row, Column::Rate).unwrap_or_else(|e| {
        log::warn!("ignoring rate: {e}");
        None
    });
    Some(ForeignAmount {
        currency: code.to_string(),
        rate,
    })
}

/// Parser for OKQ8 Bank exports. Holds the month-name table for the export's
/// locale; build one per locale and reuse it across files.
#[derive(Debug, Clone)]
pub struct Okq8Parser {
    format: DateFormat,
}

impl Okq8Parser {
    /// Fails with `UnknownLocale` before any file is touched.
    pub fn new(locale: &str) -> Result<Self> {
        Self::with_months(MonthNames::for_locale(locale)?)
    }

    pub fn swedish() -> Result<Self> {
        Self::with_months(MonthNames::swedish())
    }

    pub fn with_months(months: MonthNames) -> Result<Self> {
        Ok(Self {
            format: DateFormat::new(months)?,
        })
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Statement> {
        let range = open_workbook(path)?;
        self.parse_source(&range)
    }

    /// Validate the header, then classify every row in order. Stops at the first error.
    pub fn parse_source<S>(&self, source: &S) -> Result<Statement>
    where
        S: TabularSource + ?Sized,
    {
        let mut statement = Statement::okq8();

        for row in read_rows(source)? {
            let line = classify(&row, &self.format, CURRENCY)
                .inspect_err(|e| log::warn!("aborting parse: {e}"))?;
            statement.lines.push(line);
        }

        log::info!(
            "parsed {} lines for account {}",
            statement.lines.len(),
            statement.account_id
        );
        Ok(statement)
    }
}
