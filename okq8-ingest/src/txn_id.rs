use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};

use crate::types::TransactionType;

/// Deterministic id for a statement line.
///
/// Two lines with equal date, memo, amount and type get the same id, which is
/// what lets a re-import of the same export be recognized downstream.
pub fn generate_transaction_id(
    date: &NaiveDateTime,
    memo: &str,
    amount: f64,
    trntype: TransactionType,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(memo.as_bytes());
    hasher.update(amount.to_string().as_bytes());
    hasher.update(trntype.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
