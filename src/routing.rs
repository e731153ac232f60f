//! Application router configuration.

use std::path::Path;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    expense::{
        create_expense_endpoint, create_expense_form_endpoint, delete_expense_endpoint,
        delete_expense_form_endpoint, get_expenses_page, list_expenses_endpoint,
        update_expense_endpoint, update_expense_form_endpoint,
    },
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
///
/// Static files are served from `static_dir` under [endpoints::STATIC].
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let api_routes = Router::new()
        .route(
            endpoints::EXPENSES_API,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE_API,
            put(update_expense_endpoint).delete(delete_expense_endpoint),
        );

    // The form routes respond with HX-Redirect headers and HTML alerts for htmx.
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_expenses_page))
        .route(endpoints::EXPENSES, post(create_expense_form_endpoint))
        .route(
            endpoints::EXPENSE,
            put(update_expense_form_endpoint).delete(delete_expense_form_endpoint),
        );

    api_routes
        .merge(page_routes)
        .nest_service(endpoints::STATIC, ServeDir::new(static_dir))
        .fallback(get_404_not_found)
        .with_state(state)
}
