//! Period totals over a ledger snapshot. Every call re-scans the rows it is given.

use crate::transaction::TransactionRow;

/// Income and expense totals for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub income: u64,
    pub expense: u64,
}

impl Summary {
    /// Income minus expense; negative when more was spent than earned.
    pub fn balance(&self) -> i128 {
        i128::from(self.income) - i128::from(self.expense)
    }

    fn add(mut self, row: &TransactionRow) -> Self {
        self.income = self.income.saturating_add(row.income.unwrap_or(0));
        self.expense = self.expense.saturating_add(row.expense.unwrap_or(0));
        self
    }
}

fn summarize<'a>(rows: impl IntoIterator<Item = &'a TransactionRow>) -> Summary {
    rows.into_iter().fold(Summary::default(), Summary::add)
}

/// Totals of rows recorded in ISO week `iso_week`. The year is not part of the filter.
pub fn weekly_summary(rows: &[TransactionRow], iso_week: u32) -> Summary {
    summarize(rows.iter().filter(|r| r.week_number == iso_week))
}

/// Totals of rows whose month column equals `month_name` (e.g. `October`).
pub fn monthly_summary(rows: &[TransactionRow], month_name: &str) -> Summary {
    summarize(rows.iter().filter(|r| r.month_name == month_name))
}
