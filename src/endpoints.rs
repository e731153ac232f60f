//! The endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/expenses/{expense_id}', use [format_endpoint].

/// The expenses page.
pub const ROOT: &str = "/";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The JSON API route for listing and creating expenses.
pub const EXPENSES_API: &str = "/api/expenses";
/// The JSON API route for updating and deleting a single expense.
pub const EXPENSE_API: &str = "/api/expenses/{expense_id}";

/// The route the expense form posts new expenses to.
pub const EXPENSES: &str = "/expenses";
/// The route for updating an expense from the form and deleting it from the table.
pub const EXPENSE: &str = "/expenses/{expense_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is the text between a left brace and the next right brace,
/// e.g. '{expense_id}' in '/expenses/{expense_id}'. Only the first parameter
/// is replaced.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{id}{}",
        &endpoint_path[..param_start],
        &endpoint_path[param_end..]
    )
}
