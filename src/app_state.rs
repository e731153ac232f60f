//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use crate::expense::ExpenseStore;

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The backend that persists the expense collection.
    pub store: Arc<dyn ExpenseStore>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState] around an expense `store`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    pub fn new(store: impl ExpenseStore + 'static, local_timezone: &str) -> Self {
        Self {
            store: Arc::new(store),
            local_timezone: local_timezone.to_owned(),
        }
    }
}
