//! The page shown for routes that do not exist.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// The fallback route handler, responds with the 404 page.
pub async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Page not found.",
            "Check the address or head back to your expenses.",
        ),
    )
        .into_response()
}
