#![allow(missing_docs)]

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::expense::{SQLiteExpenseStore, initialize_db};

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use form::{assert_hx_endpoint, must_get_form};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_hx_redirect, assert_status_ok, response_text};

/// An empty expense store backed by an in-memory SQLite database.
pub(crate) fn in_memory_store() -> SQLiteExpenseStore {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize_db(&connection).expect("Could not create expense table");

    SQLiteExpenseStore::new(Arc::new(Mutex::new(connection)))
}
