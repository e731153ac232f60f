//! Alerts for showing failures to users.
//!
//! Alerts are HTML fragments that htmx swaps into the page's alert container,
//! which leaves the rest of the page, including any half-filled form, untouched.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// An error message with optional details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub details: String,
}

impl Alert {
    /// Create an error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    pub fn into_html(self) -> Markup {
        html! {
            div role="alert" class=(ERROR_STYLE)
            {
                div class="flex items-start justify-between gap-4"
                {
                    div
                    {
                        p class="font-semibold" { (self.message) }

                        @if !self.details.is_empty() {
                            span class="text-sm" { (self.details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="text-lg leading-none"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

const ERROR_STYLE: &str = "p-4 mb-4 rounded border border-red-300 bg-red-50 \
    text-red-800 dark:bg-gray-800 dark:text-red-400 dark:border-red-800";
