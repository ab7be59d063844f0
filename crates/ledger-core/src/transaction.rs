//! One ledger row per recorded income or expense.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::LedgerError;

/// Column headers of the persisted ledger, in order.
pub const LEDGER_HEADERS: [&str; 6] = [
    "Tanggal",
    "Pemasukan",
    "Pengeluaran",
    "Kategori",
    "Minggu Ke",
    "Bulan",
];

/// A single ledger entry. Build with [`TransactionRow::income`] or
/// [`TransactionRow::expense`] so that exactly one amount is set and the
/// week/month columns agree with the date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRow {
    #[serde(rename = "Tanggal")]
    pub date: NaiveDate,
    #[serde(rename = "Pemasukan")]
    pub income: Option<u64>,
    #[serde(rename = "Pengeluaran")]
    pub expense: Option<u64>,
    #[serde(rename = "Kategori")]
    pub category: Option<Category>,
    #[serde(rename = "Minggu Ke")]
    pub week_number: u32,
    #[serde(rename = "Bulan")]
    pub month_name: String,
}

impl TransactionRow {
    pub fn income(date: NaiveDate, amount: u64) -> Self {
        Self {
            date,
            income: Some(amount),
            expense: None,
            category: None,
            week_number: iso_week(date),
            month_name: month_name(date),
        }
    }

    pub fn expense(date: NaiveDate, amount: u64, category: Category) -> Self {
        Self {
            date,
            income: None,
            expense: Some(amount),
            category: Some(category),
            week_number: iso_week(date),
            month_name: month_name(date),
        }
    }

    pub fn is_income(&self) -> bool {
        self.income.is_some()
    }
}

/// ISO 8601 week number (1..=53).
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Full English month name, e.g. `October`.
pub fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string()
}

/// Largest single entry the ledger accepts.
pub const MAX_AMOUNT: u64 = i64::MAX as u64;

/// Parse a chat message as a whole-rupiah amount.
///
/// Surrounding whitespace and a leading `+` are accepted; anything else that is
/// not plain digits (signs, separators, decimals) is rejected, as is any amount
/// above [`MAX_AMOUNT`].
pub fn parse_amount(text: &str) -> Result<u64, LedgerError> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::validation(format!(
            "'{}' is not a whole number",
            trimmed
        )));
    }
    let amount = digits
        .parse::<u64>()
        .map_err(|e| LedgerError::validation(format!("'{}': {}", trimmed, e)))?;
    if amount > MAX_AMOUNT {
        return Err(LedgerError::validation(format!(
            "'{}' exceeds the largest amount {}",
            trimmed, MAX_AMOUNT
        )));
    }
    Ok(amount)
}
