use anyhow::{Context, Result};
use clap::ValueEnum;
use okq8_ingest::{Statement, TransactionType};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Csv,
}

const CSV_HEADER: [&str; 8] = [
    "id",
    "date",
    "memo",
    "amount",
    "trntype",
    "currency",
    "orig_currency",
    "rate",
];

#[derive(Debug, Serialize)]
struct CsvLine<'a> {
    id: &'a str,
    date: String,
    memo: &'a str,
    amount: f64,
    trntype: TransactionType,
    currency: &'a str,
    orig_currency: Option<&'a str>,
    rate: Option<f64>,
}

pub fn write_statement<W: Write>(statement: &Statement, format: Format, mut out: W) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, statement).context("serialize statement")?;
            writeln!(out)?;
        }
        Format::Csv => {
            // explicit header so an empty statement still yields one
            let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
            wtr.write_record(CSV_HEADER)?;
            for line in &statement.lines {
                wtr.serialize(CsvLine {
                    id: &line.id,
                    date: line.date.format("%Y-%m-%d").to_string(),
                    memo: &line.memo,
                    amount: line.amount,
                    trntype: line.trntype,
                    currency: &statement.currency,
                    orig_currency: line.original.as_ref().map(|o| o.currency.as_str()),
                    rate: line.original.as_ref().and_then(|o| o.rate),
                })?;
            }
            wtr.flush()?;
        }
    }
    Ok(())
}

pub fn summary(statement: &Statement) -> String {
    let range = match statement.date_range() {
        Some((from, to)) => format!("{} .. {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d")),
        None => "-".to_string(),
    };
    format!(
        "{} lines (credit: {}, debit: {}, other: {}) | total={:.2} {} | dates {}",
        statement.lines.len(),
        statement.count_of(TransactionType::Credit),
        statement.count_of(TransactionType::Debit),
        statement.count_of(TransactionType::Other),
        statement.total(),
        statement.currency,
        range
    )
}
