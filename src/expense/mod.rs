//! Expenses: the domain types, the storage backends and the HTTP handlers.
//!
//! The JSON API in [api] is the persistence endpoint, the page and form
//! handlers serve the HTML interface built on top of the same store.

mod api;
mod domain;
mod form;
mod json_store;
mod page;
mod sqlite_store;
mod store;

pub use api::{
    ExpenseApiState, create_expense_endpoint, delete_expense_endpoint, list_expenses_endpoint,
    update_expense_endpoint,
};
pub use domain::{Expense, ExpenseData, ExpenseId, ValidatedExpense, next_free_id, timestamp_id};
pub use form::{
    create_expense_form_endpoint, delete_expense_form_endpoint, update_expense_form_endpoint,
};
pub use json_store::JsonFileStore;
pub use page::{ExpensesPageState, get_expenses_page};
pub use sqlite_store::{SQLiteExpenseStore, initialize as initialize_db};
pub use store::ExpenseStore;
