//! Implements a document store for expenses on top of SQLite.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    expense::{
        Expense, ExpenseId, ExpenseStore, ValidatedExpense,
        domain::{next_free_id, timestamp_id},
    },
};

/// Stores one row per expense in the `expense` table.
///
/// Each row has a store-assigned `document_id` that fixes the listing order,
/// and the expense's own `id`, which is what updates and deletes match on.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// The caller should create the table with [initialize] first.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::StoreLockError
        })
    }
}

impl ExpenseStore for SQLiteExpenseStore {
    fn create(&self, expense: ValidatedExpense) -> Result<Expense, Error> {
        let connection = self.lock()?;

        let requested = expense.requested_id().unwrap_or_else(timestamp_id);
        let mut exists_statement =
            connection.prepare("SELECT EXISTS(SELECT 1 FROM expense WHERE id = ?1)")?;
        let mut lookup_error = None;
        let id = next_free_id(requested, |id| {
            exists_statement
                .query_row([id], |row| row.get::<_, bool>(0))
                .unwrap_or_else(|error| {
                    lookup_error.get_or_insert(error);
                    false
                })
        });
        drop(exists_statement);
        if let Some(error) = lookup_error {
            return Err(error.into());
        }
        let id = id?;

        let expense = expense.into_expense(id);
        connection.execute(
            "INSERT INTO expense (id, amount, category, date, note) VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                expense.id,
                &expense.amount,
                &expense.category,
                &expense.date,
                &expense.note,
            ),
        )?;

        Ok(expense)
    }

    fn get_all(&self) -> Result<Vec<Expense>, Error> {
        let connection = self.lock()?;

        connection
            .prepare(
                "SELECT id, amount, category, date, note FROM expense ORDER BY document_id ASC",
            )?
            .query_map([], map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::from))
            .collect()
    }

    fn update(&self, id: ExpenseId, expense: ValidatedExpense) -> Result<Expense, Error> {
        let connection = self.lock()?;
        let expense = expense.into_expense(id);

        let rows_affected = connection.execute(
            "UPDATE expense SET amount = ?1, category = ?2, date = ?3, note = ?4 WHERE id = ?5",
            (
                &expense.amount,
                &expense.category,
                &expense.date,
                &expense.note,
                id,
            ),
        )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingExpense(id));
        }

        Ok(expense)
    }

    fn delete(&self, id: ExpenseId) -> Result<(), Error> {
        let connection = self.lock()?;

        let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingExpense(id));
        }

        Ok(())
    }
}

/// Create the expense table if it does not exist yet.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            document_id INTEGER PRIMARY KEY,
            id INTEGER NOT NULL UNIQUE,
            amount TEXT NOT NULL,
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            note TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: row.get(2)?,
        date: row.get(3)?,
        note: row.get(4)?,
    })
}
