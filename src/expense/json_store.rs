//! Implements an expense store backed by a single JSON file.

use std::{
    ffi::OsString,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use crate::{
    Error,
    expense::{
        Expense, ExpenseId, ExpenseStore, ValidatedExpense,
        domain::{next_free_id, timestamp_id},
    },
};

/// Stores expenses as a pretty-printed JSON array in a file.
///
/// The collection is loaded once when the store is opened and kept in memory.
/// Every mutation writes the whole collection to a temporary file next to the
/// original and renames it into place, so readers of the file never see a
/// partially written array. The in-memory copy only changes once the write
/// succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    expenses: Mutex<Vec<Expense>>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// A missing or empty file is treated as an empty collection, the file is
    /// created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an [Error::IoError] if the file exists but cannot be read, or an
    /// [Error::JSONSerializationError] if it does not hold a JSON array of expenses.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();

        let expenses = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "No expense file at {}, starting with an empty collection",
                    path.display()
                );
                Vec::new()
            }
            Err(error) => return Err(error.into()),
        };

        tracing::debug!(
            "Loaded {} expenses from {}",
            expenses.len(),
            path.display()
        );

        Ok(Self {
            path,
            expenses: Mutex::new(expenses),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Expense>>, Error> {
        self.expenses.lock().map_err(|error| {
            tracing::error!("could not acquire the expense file lock: {error}");
            Error::StoreLockError
        })
    }

    /// Write `expenses` to the file, then replace the in-memory collection.
    fn commit(
        &self,
        current: &mut MutexGuard<'_, Vec<Expense>>,
        expenses: Vec<Expense>,
    ) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(&expenses)?;

        let mut temp_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| OsString::from("expenses.json"));
        temp_name.push(".tmp");
        let temp_path = self.path.with_file_name(temp_name);

        let mut file = File::create(&temp_path)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;

        **current = expenses;

        Ok(())
    }
}

impl ExpenseStore for JsonFileStore {
    fn create(&self, expense: ValidatedExpense) -> Result<Expense, Error> {
        let mut current = self.lock()?;

        let requested = expense.requested_id().unwrap_or_else(timestamp_id);
        let id = next_free_id(requested, |id| current.iter().any(|other| other.id == id))?;
        let expense = expense.into_expense(id);

        let mut expenses = current.clone();
        expenses.push(expense.clone());
        self.commit(&mut current, expenses)?;

        Ok(expense)
    }

    fn get_all(&self) -> Result<Vec<Expense>, Error> {
        Ok(self.lock()?.clone())
    }

    fn update(&self, id: ExpenseId, expense: ValidatedExpense) -> Result<Expense, Error> {
        let mut current = self.lock()?;

        let Some(index) = current.iter().position(|other| other.id == id) else {
            return Err(Error::UpdateMissingExpense(id));
        };

        let expense = expense.into_expense(id);
        let mut expenses = current.clone();
        expenses[index] = expense.clone();
        self.commit(&mut current, expenses)?;

        Ok(expense)
    }

    fn delete(&self, id: ExpenseId) -> Result<(), Error> {
        let mut current = self.lock()?;

        let expenses: Vec<Expense> = current
            .iter()
            .filter(|expense| expense.id != id)
            .cloned()
            .collect();

        if expenses.len() == current.len() {
            return Err(Error::DeleteMissingExpense(id));
        }

        self.commit(&mut current, expenses)
    }
}

#[cfg(test)]
mod json_file_store_tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::{
        Error,
        expense::{Expense, ExpenseData, ExpenseStore, JsonFileStore},
    };

    fn expense_data(id: Option<i64>, amount: &str, category: &str, date: &str) -> ExpenseData {
        ExpenseData {
            id,
            amount: amount.to_owned(),
            category: category.to_owned(),
            date: date.to_owned(),
            note: String::new(),
        }
    }

    fn open_temp_store() -> (TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().expect("could not create temp dir");
        let store =
            JsonFileStore::open(dir.path().join("expenses.json")).expect("could not open store");
        (dir, store)
    }

    #[test]
    fn missing_file_is_an_empty_collection() {
        let (dir, store) = open_temp_store();

        assert_eq!(store.get_all(), Ok(vec![]));
        assert!(!dir.path().join("expenses.json").exists());
    }

    #[test]
    fn create_then_list_includes_expense() {
        let (_dir, store) = open_temp_store();

        let created = store
            .create(
                expense_data(None, "12.50", "Food", "2024-01-05")
                    .validate()
                    .unwrap(),
            )
            .expect("could not create expense");

        assert!(created.id > 0);
        assert_eq!(store.get_all(), Ok(vec![created]));
    }

    #[test]
    fn create_keeps_requested_id_and_skips_taken_ones() {
        let (_dir, store) = open_temp_store();
        let data = expense_data(Some(100), "1", "Food", "2024-01-05");

        let first = store.create(data.clone().validate().unwrap()).unwrap();
        let second = store.create(data.validate().unwrap()).unwrap();

        assert_eq!(first.id, 100);
        assert_eq!(second.id, 101);
    }

    #[test]
    fn create_with_largest_taken_id_fails_and_store_stays_usable() {
        let (_dir, store) = open_temp_store();
        let data = expense_data(Some(i64::MAX), "1", "Food", "2024-01-05");
        let first = store.create(data.clone().validate().unwrap()).unwrap();

        let second = store.create(data.validate().unwrap());

        assert!(
            matches!(second, Err(Error::InvalidExpense("id", _))),
            "want an invalid id error, got {second:?}"
        );
        assert_eq!(store.get_all(), Ok(vec![first]));
    }

    #[test]
    fn writes_pretty_printed_array_that_reopens() {
        let (dir, store) = open_temp_store();
        let created = store
            .create(
                expense_data(Some(1), "10.00", "Food", "2024-01-05")
                    .validate()
                    .unwrap(),
            )
            .unwrap();

        let text = fs::read_to_string(dir.path().join("expenses.json")).unwrap();
        assert!(text.starts_with("[\n"), "want pretty-printed JSON, got {text}");
        assert!(!dir.path().join("expenses.json.tmp").exists());

        let reopened = JsonFileStore::open(dir.path().join("expenses.json")).unwrap();
        assert_eq!(reopened.get_all(), Ok(vec![created]));
    }

    #[test]
    fn reads_records_with_numeric_amounts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        fs::write(
            &path,
            r#"[{"id": 5, "amount": 7.5, "category": "Food", "date": "2024-01-05", "note": "x"}]"#,
        )
        .unwrap();

        let store = JsonFileStore::open(&path).unwrap();

        assert_eq!(store.get_all().unwrap()[0].amount, "7.5");
    }

    #[test]
    fn open_fails_on_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        fs::write(&path, "{ not json").unwrap();

        let result = JsonFileStore::open(&path);

        assert!(matches!(result, Err(Error::JSONSerializationError(_))));
    }

    #[test]
    fn update_replaces_in_place() {
        let (_dir, store) = open_temp_store();
        for id in 1..=3 {
            store
                .create(
                    expense_data(Some(id), "1", "Food", "2024-01-05")
                        .validate()
                        .unwrap(),
                )
                .unwrap();
        }
        let mut changed = expense_data(None, "1", "Food", "2024-01-05");
        changed.note = "updated".to_owned();

        let updated = store.update(2, changed.validate().unwrap()).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(updated.id, 2);
        assert_eq!(all.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(all[1].note, "updated");
    }

    #[test]
    fn update_missing_expense_leaves_collection_unchanged() {
        let (_dir, store) = open_temp_store();
        store
            .create(
                expense_data(Some(1), "1", "Food", "2024-01-05")
                    .validate()
                    .unwrap(),
            )
            .unwrap();
        let before = store.get_all().unwrap();

        let result = store.update(
            999,
            expense_data(None, "2", "Food", "2024-01-06")
                .validate()
                .unwrap(),
        );

        assert_eq!(result, Err(Error::UpdateMissingExpense(999)));
        assert_eq!(store.get_all().unwrap(), before);
    }

    #[test]
    fn delete_removes_expense() {
        let (_dir, store) = open_temp_store();
        let expense = store
            .create(
                expense_data(Some(1), "1", "Food", "2024-01-05")
                    .validate()
                    .unwrap(),
            )
            .unwrap();

        assert_eq!(store.delete(expense.id), Ok(()));
        assert_eq!(store.get_all(), Ok(Vec::<Expense>::new()));
    }

    #[test]
    fn delete_missing_expense_leaves_size_unchanged() {
        let (_dir, store) = open_temp_store();
        store
            .create(
                expense_data(Some(1), "1", "Food", "2024-01-05")
                    .validate()
                    .unwrap(),
            )
            .unwrap();

        assert_eq!(store.delete(2), Err(Error::DeleteMissingExpense(2)));
        assert_eq!(store.get_all().unwrap().len(), 1);
    }
}
