//! Ledger persistence: an append-only table with the six-column layout of
//! [`LEDGER_HEADERS`](crate::transaction::LEDGER_HEADERS).
//! Pass your store to the router: `Router::new(transport, Arc::new(your_store), ..)`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::LedgerError;
use crate::transaction::{LEDGER_HEADERS, TransactionRow};

/// Ledger store abstraction. Rows are immutable once appended.
pub trait LedgerStore: Send + Sync {
    /// Append one row. The row is durable when this returns `Ok`.
    fn append(&self, row: &TransactionRow) -> Result<(), LedgerError>;
    /// Read every row in insertion order.
    fn read_all(&self) -> Result<Vec<TransactionRow>, LedgerError>;
}

/// Default implementation backed by a single CSV file.
///
/// All appends and reads go through one lock, so concurrent chats and the
/// scheduled reports never interleave on the file.
pub struct CsvLedgerStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvLedgerStore {
    /// Open the ledger at `path`, creating it with a header row when absent.
    /// An existing file must carry the expected header.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        if path.exists() {
            check_headers(&path)?;
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LedgerError::store(format!("create_dir_all {}: {}", parent.display(), e))
                })?;
            }
            let file = File::create(&path)
                .map_err(|e| LedgerError::store(format!("{}: {}", path.display(), e)))?;
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(LEDGER_HEADERS)?;
            writer.flush()?;
            debug!(
                event = "ledger.created",
                domain = "ledger",
                path = %path.display()
            );
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn check_headers(path: &Path) -> Result<(), LedgerError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| LedgerError::store(format!("{}: {}", path.display(), e)))?;
    let headers = reader.headers()?;
    let found: Vec<&str> = headers.iter().map(str::trim).collect();
    if found != LEDGER_HEADERS {
        return Err(LedgerError::store(format!(
            "{}: unexpected columns [{}], expected [{}]",
            path.display(),
            found.join(", "),
            LEDGER_HEADERS.join(", ")
        )));
    }
    Ok(())
}

/// A file edited by hand may lack the final newline; the next record must
/// still start on its own line.
fn terminate_last_line(file: &mut File) -> Result<(), LedgerError> {
    if file.metadata()?.len() == 0 {
        return Ok(());
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        file.write_all(b"\n")?;
    }
    Ok(())
}

impl LedgerStore for CsvLedgerStore {
    fn append(&self, row: &TransactionRow) -> Result<(), LedgerError> {
        let _guard = self.guard();
        if !self.path.exists() {
            return Err(LedgerError::store(format!(
                "{}: ledger file not found",
                self.path.display()
            )));
        }
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LedgerError::store(format!("{}: {}", self.path.display(), e)))?;
        terminate_last_line(&mut file)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(row)?;
        let mut file = writer
            .into_inner()
            .map_err(|e| LedgerError::store(e.to_string()))?;
        file.flush()?;
        file.sync_all()?;
        debug!(
            event = "ledger.append",
            domain = "ledger",
            kind = if row.is_income() { "income" } else { "expense" },
            week = row.week_number,
            month = %row.month_name
        );
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<TransactionRow>, LedgerError> {
        let _guard = self.guard();
        check_headers(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;
        let rows = reader
            .deserialize::<TransactionRow>()
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            event = "ledger.read",
            domain = "ledger",
            rows = rows.len() as u64
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn open_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("transaksi.csv");
        let store = CsvLedgerStore::open(&path).unwrap();
        assert_eq!(store.path(), path.as_path());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Tanggal,Pemasukan,Pengeluaran,Kategori,Minggu Ke,Bulan\n");
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn appended_rows_are_read_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::open(dir.path().join("transaksi.csv")).unwrap();
        let income = TransactionRow::income(date(2026, 10, 12), 500_000);
        let expense = TransactionRow::expense(date(2026, 10, 13), 20_000, Category::Jajanan);
        store.append(&income).unwrap();
        store.append(&expense).unwrap();

        let rows = store.read_all().unwrap();
        assert_eq!(rows, vec![income, expense]);
    }

    #[test]
    fn rows_use_empty_cells_for_absent_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transaksi.csv");
        let store = CsvLedgerStore::open(&path).unwrap();
        store
            .append(&TransactionRow::income(date(2026, 10, 18), 1_000))
            .unwrap();
        store
            .append(&TransactionRow::expense(
                date(2026, 10, 18),
                250,
                Category::PengeluaranKampus,
            ))
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[1], "2026-10-18,1000,,,42,October");
        assert_eq!(lines[2], "2026-10-18,,250,Pengeluaran Kampus,42,October");
    }

    #[test]
    fn reopening_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transaksi.csv");
        {
            let store = CsvLedgerStore::open(&path).unwrap();
            store
                .append(&TransactionRow::income(date(2026, 1, 5), 10))
                .unwrap();
        }
        let store = CsvLedgerStore::open(&path).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn open_rejects_foreign_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transaksi.csv");
        std::fs::write(&path, "date,amount\n2026-01-01,5\n").unwrap();
        let err = CsvLedgerStore::open(&path).err().unwrap();
        assert!(matches!(err, LedgerError::Store(_)));
        assert!(err.to_string().contains("unexpected columns"));
    }

    #[test]
    fn read_fails_when_file_disappears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transaksi.csv");
        let store = CsvLedgerStore::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(store.read_all(), Err(LedgerError::Store(_))));
        let row = TransactionRow::income(date(2026, 1, 5), 10);
        assert!(matches!(store.append(&row), Err(LedgerError::Store(_))));
    }

    #[test]
    fn read_reports_unknown_category() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transaksi.csv");
        CsvLedgerStore::open(&path).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "2026-01-05,,10,Liburan,2,January").unwrap();
        let store = CsvLedgerStore::open(&path).unwrap();
        let err = store.read_all().unwrap_err();
        assert!(err.to_string().contains("Liburan"));
    }

    #[test]
    fn append_after_unterminated_last_line_keeps_both_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transaksi.csv");
        std::fs::write(
            &path,
            "Tanggal,Pemasukan,Pengeluaran,Kategori,Minggu Ke,Bulan\n2026-10-12,5000,,,42,October",
        )
        .unwrap();
        let store = CsvLedgerStore::open(&path).unwrap();
        let expense = TransactionRow::expense(date(2026, 10, 13), 700, Category::MakananPokok);
        store.append(&expense).unwrap();

        let rows = store.read_all().unwrap();
        assert_eq!(
            rows,
            vec![TransactionRow::income(date(2026, 10, 12), 5000), expense]
        );
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("October\n"));
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            std::sync::Arc::new(CsvLedgerStore::open(dir.path().join("transaksi.csv")).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        store
                            .append(&TransactionRow::income(date(2026, 2, 2), i))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.read_all().unwrap().len(), 80);
    }
}
