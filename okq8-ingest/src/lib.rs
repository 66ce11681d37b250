//! okq8-ingest: reads OKQ8 Bank spreadsheet exports into a normalized statement.
//!
//! Reading and classification are separate steps: [`sheet::read_rows`] validates the
//! header and yields raw rows, [`parsers::classify`] maps one row to one line.
//! [`Okq8Parser`] composes the two.

pub mod dates;
pub mod error;
pub mod parsers;
pub mod sheet;
pub mod txn_id;
pub mod types;

pub use dates::{DateFormat, MonthNames};
pub use error::IngestError;
pub use parsers::Okq8Parser;
pub use sheet::{Cell, Column, DataRows, RawRow, TabularSource, EXPECTED_HEADER};
pub use types::{ForeignAmount, Statement, StatementLine, TransactionType};
