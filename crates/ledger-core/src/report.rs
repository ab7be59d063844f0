//! Weekly and monthly report text.

use chrono::NaiveDate;

use crate::aggregate::{Summary, monthly_summary, weekly_summary};
use crate::error::LedgerError;
use crate::store::LedgerStore;
use crate::transaction::{iso_week, month_name};

/// Which period a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Weekly,
    Monthly,
}

impl ReportKind {
    pub const fn name(self) -> &'static str {
        match self {
            ReportKind::Weekly => "weekly",
            ReportKind::Monthly => "monthly",
        }
    }

    /// ISO week number or full month name of `today`.
    pub fn period_label(self, today: NaiveDate) -> String {
        match self {
            ReportKind::Weekly => iso_week(today).to_string(),
            ReportKind::Monthly => month_name(today),
        }
    }

    /// Totals for the period containing `today`.
    pub fn summarize(self, store: &dyn LedgerStore, today: NaiveDate) -> Result<Summary, LedgerError> {
        let rows = store.read_all()?;
        Ok(match self {
            ReportKind::Weekly => weekly_summary(&rows, iso_week(today)),
            ReportKind::Monthly => monthly_summary(&rows, &month_name(today)),
        })
    }

    /// Render the Markdown report for a period.
    pub fn render(self, period_label: &str, income: u64, expense: u64, balance: i128) -> String {
        let header = match self {
            ReportKind::Weekly => format!("📊 *Laporan Mingguan - Minggu ke-{}*\n\n", period_label),
            ReportKind::Monthly => format!("📅 *Laporan Bulanan - {}*\n", period_label),
        };
        format!(
            "{}💰 Total Pemasukan: {}\n💸 Total Pengeluaran: {}\n🧾 Saldo: {}",
            header,
            format_rupiah(income),
            format_rupiah(expense),
            format_rupiah(balance)
        )
    }

    /// Read the ledger, aggregate the current period and render it.
    pub fn build(self, store: &dyn LedgerStore, today: NaiveDate) -> Result<String, LedgerError> {
        let summary = self.summarize(store, today)?;
        Ok(self.render(
            &self.period_label(today),
            summary.income,
            summary.expense,
            summary.balance(),
        ))
    }

    /// Plain-text message sent instead of the report when building it failed.
    pub fn failure_message(self, err: &LedgerError) -> String {
        let period = match self {
            ReportKind::Weekly => "mingguan",
            ReportKind::Monthly => "bulanan",
        };
        format!("Gagal membuat laporan {}.\nError: {}", period, err)
    }
}

/// `Rp` amount with comma thousands separators and no decimals, e.g. `Rp1,250,000`.
pub fn format_rupiah(amount: impl Into<i128>) -> String {
    let amount: i128 = amount.into();
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("Rp-{}", grouped)
    } else {
        format!("Rp{}", grouped)
    }
}
