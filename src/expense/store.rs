//! Defines the expense store trait.

use std::fmt::Debug;

use crate::{
    Error,
    expense::{Expense, ExpenseId, ValidatedExpense},
};

/// Handles the persistence of the expense collection.
///
/// Implementers guard their own read-modify-write cycles, so a store may be
/// shared between request handlers behind an `Arc`.
pub trait ExpenseStore: Debug + Send + Sync {
    /// Add an expense to the store and return it with its assigned ID.
    ///
    /// The requested ID is used when given and free, otherwise the ID starts from the
    /// current timestamp. Taken IDs are skipped, so the returned ID is always unique.
    fn create(&self, expense: ValidatedExpense) -> Result<Expense, Error>;

    /// Retrieve every expense in storage order.
    fn get_all(&self) -> Result<Vec<Expense>, Error>;

    /// Replace the expense with the ID `id`, keeping its ID.
    ///
    /// # Errors
    ///
    /// Returns [Error::UpdateMissingExpense] if no expense has the ID `id`.
    fn update(&self, id: ExpenseId, expense: ValidatedExpense) -> Result<Expense, Error>;

    /// Remove the expense with the ID `id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::DeleteMissingExpense] if no expense has the ID `id`.
    fn delete(&self, id: ExpenseId) -> Result<(), Error>;
}
