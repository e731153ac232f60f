//! Defines the app level error type and its conversions to plain-text API responses and HTML alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, expense::ExpenseId};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A field of a submitted expense failed validation.
    ///
    /// The first value names the field, the second explains what is wrong with it.
    #[error("invalid {0}: {1}")]
    InvalidExpense(&'static str, String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update an expense that does not exist
    #[error("tried to update expense {0} which is not in the store")]
    UpdateMissingExpense(ExpenseId),

    /// Tried to delete an expense that does not exist
    #[error("tried to delete expense {0} which is not in the store")]
    DeleteMissingExpense(ExpenseId),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The expense file could not be read or written.
    #[error("could not access the expense file: {0}")]
    IoError(String),

    /// The expense file does not hold a valid JSON array of expenses, or the
    /// collection could not be serialized.
    #[error("could not (de)serialize expenses as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the lock guarding the expense store.
    #[error("could not acquire the expense store lock")]
    StoreLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::IoError(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JSONSerializationError(value.to_string())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidExpense(..) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound | Error::UpdateMissingExpense(_) | Error::DeleteMissingExpense(_) => {
                StatusCode::NOT_FOUND
            }
            Error::SqlError(_)
            | Error::IoError(_)
            | Error::JSONSerializationError(_)
            | Error::StoreLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert the error into an HTTP response with an HTML alert.
    ///
    /// Used by the endpoints that htmx calls, the alert is swapped into the
    /// page's alert container and the submitted form is left untouched.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidExpense(field, reason) => (
                StatusCode::BAD_REQUEST,
                Alert {
                    message: format!("Invalid {field}"),
                    details: reason,
                },
            ),
            Error::UpdateMissingExpense(_) => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Could not update expense".to_owned(),
                    details: "The expense could not be found. \
                    Try refreshing the page to see if it has been deleted."
                        .to_owned(),
                },
            ),
            Error::DeleteMissingExpense(_) => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Could not delete expense".to_owned(),
                    details: "The expense could not be found. \
                    Try refreshing the page to see if it has already been deleted."
                        .to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::error(
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    ),
                )
            }
        };

        (status_code, alert).into_response()
    }
}

/// Errors from the JSON API are flat status codes with a plain-text body.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Error::InvalidExpense(..) => self.to_string(),
            Error::NotFound | Error::UpdateMissingExpense(_) | Error::DeleteMissingExpense(_) => {
                "Expense not found.".to_owned()
            }
            // Storage details are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                "Error accessing expense storage.".to_owned()
            }
        };

        (status_code, body).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        Error,
        test_utils::{assert_valid_html, parse_html_fragment, response_text},
    };

    #[tokio::test]
    async fn missing_expense_is_plain_text_not_found() {
        let response = Error::DeleteMissingExpense(42).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response_text(response).await, "Expense not found.");
    }

    #[tokio::test]
    async fn invalid_expense_names_the_field() {
        let response =
            Error::InvalidExpense("amount", "\"abc\" is not a number".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response_text(response).await,
            "invalid amount: \"abc\" is not a number"
        );
    }

    #[tokio::test]
    async fn storage_errors_hide_details() {
        let response = Error::IoError("disk on fire".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let text = response_text(response).await;
        assert!(!text.contains("disk on fire"), "got {text:?}");
    }

    #[tokio::test]
    async fn alert_response_for_missing_expense() {
        let response = Error::UpdateMissingExpense(7).into_alert_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Could not update expense"), "got {text:?}");
    }
}
