//! The endpoints behind the expense form and the delete buttons on the expenses page.
//!
//! On success these respond with an `HX-Redirect` back to the page, which
//! reloads the collection and resets the form. On failure they respond with an
//! alert that htmx swaps into the alert container, leaving the form as it was.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form and Query since they parse an empty string as
// None instead of rejecting the request like the axum versions.
use axum_extra::extract::{Form, Query};
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    Error, endpoints,
    expense::{ExpenseApiState, ExpenseData, ExpenseId},
};

/// The fields of the expense form.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub note: String,
}

impl From<ExpenseForm> for ExpenseData {
    fn from(form: ExpenseForm) -> Self {
        Self {
            id: None,
            amount: form.amount,
            category: form.category,
            date: form.date,
            note: form.note,
        }
    }
}

/// Where to send the browser after a successful submission.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

impl RedirectQuery {
    /// The redirect target, restricted to paths on this site.
    fn target(self) -> String {
        match self.redirect_url {
            Some(url) if url.starts_with('/') && !url.starts_with("//") => url,
            Some(url) => {
                tracing::warn!("Ignoring redirect to {url:?}, it is not a local path");
                endpoints::ROOT.to_owned()
            }
            None => endpoints::ROOT.to_owned(),
        }
    }
}

fn redirect(query: RedirectQuery) -> Response {
    (HxRedirect(query.target()), StatusCode::SEE_OTHER).into_response()
}

/// A route handler for creating an expense from the expense form.
///
/// The ID is assigned by the store from the current time.
pub async fn create_expense_form_endpoint(
    State(state): State<ExpenseApiState>,
    Query(query): Query<RedirectQuery>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let expense = match ExpenseData::from(form).validate() {
        Ok(expense) => expense,
        Err(error) => return error.into_alert_response(),
    };

    match state.store.create(expense) {
        Ok(expense) => {
            tracing::info!("Created expense {}", expense.id);
            redirect(query)
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an expense: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for updating an expense from the expense form in edit mode.
pub async fn update_expense_form_endpoint(
    State(state): State<ExpenseApiState>,
    Path(expense_id): Path<ExpenseId>,
    Query(query): Query<RedirectQuery>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let expense = match ExpenseData::from(form).validate() {
        Ok(expense) => expense,
        Err(error) => return error.into_alert_response(),
    };

    match state.store.update(expense_id, expense) {
        Ok(_) => redirect(query),
        Err(error @ Error::UpdateMissingExpense(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for the delete button of an expense row.
pub async fn delete_expense_form_endpoint(
    State(state): State<ExpenseApiState>,
    Path(expense_id): Path<ExpenseId>,
    Query(query): Query<RedirectQuery>,
) -> Response {
    match state.store.delete(expense_id) {
        Ok(()) => {
            tracing::info!("Deleted expense {expense_id}");
            redirect(query)
        }
        Err(error @ Error::DeleteMissingExpense(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod expense_form_tests {
    use std::sync::Arc;

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::{Form, Query};

    use crate::{
        expense::{
            ExpenseApiState, ExpenseData, create_expense_form_endpoint,
            delete_expense_form_endpoint,
            form::{ExpenseForm, RedirectQuery},
            update_expense_form_endpoint,
        },
        test_utils::{assert_hx_redirect, in_memory_store, parse_html_fragment},
    };

    fn get_test_state() -> ExpenseApiState {
        ExpenseApiState {
            store: Arc::new(in_memory_store()),
        }
    }

    fn lunch_form() -> ExpenseForm {
        ExpenseForm {
            amount: "12.50".to_owned(),
            category: "Food".to_owned(),
            date: "2024-01-05".to_owned(),
            note: "lunch".to_owned(),
        }
    }

    fn redirect_to(url: &str) -> Query<RedirectQuery> {
        Query(RedirectQuery {
            redirect_url: Some(url.to_owned()),
        })
    }

    fn no_redirect() -> Query<RedirectQuery> {
        Query(RedirectQuery::default())
    }

    fn alert_text(html: &scraper::Html) -> String {
        html.root_element().text().collect::<String>()
    }

    #[tokio::test]
    async fn create_redirects_back_to_page() {
        let state = get_test_state();

        let response = create_expense_form_endpoint(
            State(state.clone()),
            redirect_to("/?category=Food"),
            Form(lunch_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/?category=Food");
        let expenses = state.store.get_all().unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount, "12.50");
        assert_eq!(expenses[0].note, "lunch");
    }

    #[tokio::test]
    async fn create_with_invalid_amount_shows_alert() {
        let state = get_test_state();
        let form = ExpenseForm {
            amount: "-1".to_owned(),
            ..lunch_form()
        };

        let response =
            create_expense_form_endpoint(State(state.clone()), no_redirect(), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert!(alert_text(&html).contains("Invalid amount"));
        assert_eq!(state.store.get_all().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn ignores_redirects_to_other_sites() {
        let response = create_expense_form_endpoint(
            State(get_test_state()),
            redirect_to("//evil.example.com"),
            Form(lunch_form()),
        )
        .await;

        assert_hx_redirect(&response, "/");
    }

    #[tokio::test]
    async fn update_replaces_expense() {
        let state = get_test_state();
        let created = state
            .store
            .create(ExpenseData::from(lunch_form()).validate().unwrap())
            .unwrap();
        let form = ExpenseForm {
            note: "dinner".to_owned(),
            ..lunch_form()
        };

        let response = update_expense_form_endpoint(
            State(state.clone()),
            Path(created.id),
            no_redirect(),
            Form(form),
        )
        .await;

        assert_hx_redirect(&response, "/");
        let expenses = state.store.get_all().unwrap();
        assert_eq!(expenses[0].id, created.id);
        assert_eq!(expenses[0].note, "dinner");
        assert_eq!(expenses[0].amount, "12.50");
    }

    #[tokio::test]
    async fn update_missing_expense_shows_alert() {
        let response = update_expense_form_endpoint(
            State(get_test_state()),
            Path(1),
            no_redirect(),
            Form(lunch_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        assert!(alert_text(&html).contains("Could not update expense"));
    }

    #[tokio::test]
    async fn delete_removes_expense() {
        let state = get_test_state();
        let created = state
            .store
            .create(ExpenseData::from(lunch_form()).validate().unwrap())
            .unwrap();

        let response = delete_expense_form_endpoint(
            State(state.clone()),
            Path(created.id),
            redirect_to("/?start=2024-01-01"),
        )
        .await;

        assert_hx_redirect(&response, "/?start=2024-01-01");
        assert!(state.store.get_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_expense_shows_alert() {
        let response =
            delete_expense_form_endpoint(State(get_test_state()), Path(1), no_redirect()).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        assert!(alert_text(&html).contains("Could not delete expense"));
    }
}
