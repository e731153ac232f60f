//! The JSON API for the expense collection at `/api/expenses`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState, Error,
    expense::{Expense, ExpenseData, ExpenseId, ExpenseStore},
};

/// The state needed by the expense API.
#[derive(Debug, Clone)]
pub struct ExpenseApiState {
    /// The shared expense store.
    pub store: Arc<dyn ExpenseStore>,
}

impl FromRef<AppState> for ExpenseApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// A route handler for creating an expense, responds with the stored expense
/// and 201 Created.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseApiState>,
    Json(data): Json<ExpenseData>,
) -> Result<impl IntoResponse, Error> {
    let expense = data
        .validate()
        .inspect_err(|error| tracing::debug!("Rejected expense: {error}"))?;

    let expense = state
        .store
        .create(expense)
        .inspect_err(|error| tracing::error!("Could not create expense: {error}"))?;

    tracing::info!("Created expense {}", expense.id);

    Ok((StatusCode::CREATED, Json(expense)))
}

/// A route handler for listing every expense in storage order.
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseApiState>,
) -> Result<Json<Vec<Expense>>, Error> {
    state
        .store
        .get_all()
        .map(Json)
        .inspect_err(|error| tracing::error!("Could not list expenses: {error}"))
}

/// A route handler for replacing the expense `expense_id`.
///
/// Any `id` in the body is ignored, the expense keeps the ID from the path.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseApiState>,
    Path(expense_id): Path<ExpenseId>,
    Json(data): Json<ExpenseData>,
) -> Result<Json<Expense>, Error> {
    let expense = data.validate()?;

    state
        .store
        .update(expense_id, expense)
        .map(Json)
        .inspect_err(|error| match error {
            Error::UpdateMissingExpense(_) => tracing::debug!("{error}"),
            error => tracing::error!("Could not update expense {expense_id}: {error}"),
        })
}

/// A route handler for deleting the expense `expense_id`, responds with 204 No Content.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseApiState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<StatusCode, Error> {
    state
        .store
        .delete(expense_id)
        .inspect_err(|error| match error {
            Error::DeleteMissingExpense(_) => tracing::debug!("{error}"),
            error => tracing::error!("Could not delete expense {expense_id}: {error}"),
        })?;

    tracing::info!("Deleted expense {expense_id}");

    Ok(StatusCode::NO_CONTENT)
}
