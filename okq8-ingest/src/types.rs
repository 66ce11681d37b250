use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::txn_id::generate_transaction_id;

/// Fixed account metadata for this bank. Not derived from file content.
pub const ACCOUNT_ID: &str = "OKQ8";
pub const BANK_ID: &str = "OKQ8";
pub const CURRENCY: &str = "SEK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Credit,
    Debit,
    Other,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Debit => "DEBIT",
            TransactionType::Other => "OTHER",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Foreign currency details for a card purchase made abroad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignAmount {
    pub currency: String,
    pub rate: Option<f64>,
}

/// One normalized transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Hex SHA-256 of (date, memo, amount, trntype). Identical transactions share it.
    pub id: String,
    /// Booking date at midnight
    pub date: NaiveDateTime,
    pub memo: String,
    /// Amount as exported by the bank: credits positive, debits already negative.
    pub amount: f64,
    pub trntype: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<ForeignAmount>,
}

impl StatementLine {
    pub fn new(
        date: NaiveDateTime,
        memo: impl Into<String>,
        amount: f64,
        trntype: TransactionType,
    ) -> Self {
        let memo = memo.into();
        let id = generate_transaction_id(&date, &memo, amount, trntype);
        Self {
            id,
            date,
            memo,
            amount,
            trntype,
            original: None,
        }
    }

    pub fn with_original(mut self, original: Option<ForeignAmount>) -> Self {
        self.original = original;
        self
    }
}

/// Account metadata plus the lines of one imported file, in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub account_id: String,
    pub currency: String,
    pub bank_id: String,
    pub lines: Vec<StatementLine>,
}

impl Statement {
    pub fn okq8() -> Self {
        Self {
            account_id: ACCOUNT_ID.to_string(),
            currency: CURRENCY.to_string(),
            bank_id: BANK_ID.to_string(),
            lines: Vec::new(),
        }
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Earliest and latest line date, or `None` for an empty statement.
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = self.lines.iter().map(|l| l.date).min()?;
        let max = self.lines.iter().map(|l| l.date).max()?;
        Some((min, max))
    }

    pub fn count_of(&self, trntype: TransactionType) -> usize {
        self.lines.iter().filter(|l| l.trntype == trntype).count()
    }
}
