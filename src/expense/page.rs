//! The expenses page: the expense form, the summary, the filters and the expense table.

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    AppState, endpoints,
    expense::{Expense, ExpenseId, ExpenseStore},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    ledger::{CategoryFilter, CategoryOption, ExpenseFilter, ExpenseLedger, Summary, parse_amount},
    timezone::get_local_offset,
};

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub store: Arc<dyn ExpenseStore>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters of the expenses page.
#[derive(Debug, Default, Deserialize)]
pub struct ExpensesPageQuery {
    pub category: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// The expense to load into the form for editing.
    pub edit: Option<ExpenseId>,
}

/// Route handler for the expenses page.
///
/// If the expenses cannot be loaded the page is still rendered, with an empty
/// list, so the user can keep adding expenses.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Query(query): Query<ExpensesPageQuery>,
) -> Response {
    let expenses = state.store.get_all().unwrap_or_else(|error| {
        tracing::error!("Could not load expenses, showing an empty list: {error}");
        Vec::new()
    });

    let filter = ExpenseFilter::new(
        query.category.as_deref(),
        query.start.as_deref(),
        query.end.as_deref(),
    );
    let ledger = ExpenseLedger::new(expenses, filter);

    let editing = query.edit.and_then(|id| {
        let expense = ledger.find(id);
        if expense.is_none() {
            tracing::debug!("Cannot edit expense {id}, it does not exist");
        }
        expense
    });

    let today = local_today(&state.local_timezone);

    expenses_view(&ledger, editing, &today).into_response()
}

/// Today's date in `local_timezone` as `YYYY-MM-DD`, used as the default date of new expenses.
fn local_today(local_timezone: &str) -> String {
    let offset = get_local_offset(local_timezone).unwrap_or_else(|| {
        tracing::warn!("Invalid timezone {local_timezone}, using UTC");
        UtcOffset::UTC
    });

    OffsetDateTime::now_utc().to_offset(offset).date().to_string()
}

#[derive(Serialize)]
struct PageUrlQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edit: Option<ExpenseId>,
}

/// The URL of the expenses page showing `filter`, optionally with `edit` in the form.
fn page_url(filter: &ExpenseFilter, edit: Option<ExpenseId>) -> String {
    let query = PageUrlQuery {
        category: match &filter.category {
            CategoryFilter::All => None,
            CategoryFilter::Only(category) => Some(category.as_str()),
        },
        start: filter.start.as_deref(),
        end: filter.end.as_deref(),
        edit,
    };

    match serde_urlencoded::to_string(&query) {
        Ok(query) if query.is_empty() => endpoints::ROOT.to_owned(),
        Ok(query) => format!("{}?{query}", endpoints::ROOT),
        Err(error) => {
            tracing::error!("Could not encode the page query: {error}");
            endpoints::ROOT.to_owned()
        }
    }
}

/// Append the page to return to after a successful submission to `endpoint`.
fn with_redirect(endpoint: &str, redirect_url: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", redirect_url)]) {
        Ok(query) => format!("{endpoint}?{query}"),
        Err(error) => {
            tracing::error!("Could not encode the redirect URL {redirect_url:?}: {error}");
            endpoint.to_owned()
        }
    }
}

fn expenses_view(ledger: &ExpenseLedger, editing: Option<&Expense>, today: &str) -> Markup {
    let current_url = page_url(ledger.filter(), None);
    let visible = ledger.visible();
    let summary = ledger.summary();

    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                h1 class="text-2xl font-bold" { "Expense Tracker" }

                div class="grid gap-6 lg:grid-cols-2"
                {
                    (expense_form_view(editing, &ledger.categories(), today, &current_url))
                    (summary_view(&summary))
                }

                (filter_view(ledger.filter(), &ledger.category_options()))
                (expense_table_view(&visible, ledger.filter(), &current_url))
            }
        }
    );

    base("Expenses", &content)
}

fn expense_form_view(
    editing: Option<&Expense>,
    categories: &[&str],
    today: &str,
    redirect_url: &str,
) -> Markup {
    let create_url = editing
        .is_none()
        .then(|| with_redirect(endpoints::EXPENSES, redirect_url));
    let update_url = editing.map(|expense| {
        with_redirect(
            &endpoints::format_endpoint(endpoints::EXPENSE, expense.id),
            redirect_url,
        )
    });

    let amount = editing.map(|expense| expense.amount.as_str());
    let category = editing.map(|expense| expense.category.as_str());
    let date = editing.map_or(today, |expense| expense.date.as_str());
    let note = editing.map(|expense| expense.note.as_str());

    html!(
        section class=(CARD_STYLE)
        {
            h2 class="mb-4 text-xl font-bold"
            {
                @if editing.is_some() { "Edit Expense" } @else { "Add Expense" }
            }

            form
                id="expense-form"
                hx-post=[create_url]
                hx-put=[update_url]
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        value=[amount]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    input
                        id="category"
                        type="text"
                        name="category"
                        list="category-suggestions"
                        placeholder="e.g. Food"
                        required
                        value=[category]
                        class=(FORM_TEXT_INPUT_STYLE);

                    datalist id="category-suggestions"
                    {
                        @for category in categories {
                            option value=(category) {}
                        }
                    }
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        id="date"
                        type="date"
                        name="date"
                        required
                        value=(date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="note" class=(FORM_LABEL_STYLE) { "Note" }

                    input
                        id="note"
                        type="text"
                        name="note"
                        placeholder="Optional"
                        value=[note]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                @if editing.is_some() {
                    div class="flex gap-4"
                    {
                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Expense" }
                        a href=(redirect_url) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }
                    }
                } @else {
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Expense" }
                }
            }
        }
    )
}

fn summary_view(summary: &Summary) -> Markup {
    html!(
        section id="summary" class=(CARD_STYLE)
        {
            h2 class="mb-4 text-xl font-bold" { "Summary" }

            p id="total" class="mb-4 text-lg"
            {
                "Total: "
                span class="font-semibold" { (format_currency(summary.total)) }
            }

            div class="grid gap-4 sm:grid-cols-2"
            {
                div
                {
                    h3 class="mb-2 font-semibold" { "By Category" }

                    ul id="category-summary" class="space-y-1 text-sm"
                    {
                        @for group in &summary.by_category {
                            li { (group.key) ": " (format_currency(group.total)) }
                        }
                    }
                }

                div
                {
                    h3 class="mb-2 font-semibold" { "By Month" }

                    ul id="month-summary" class="space-y-1 text-sm"
                    {
                        @for group in &summary.by_month {
                            li { (group.key) ": " (format_currency(group.total)) }
                        }
                    }
                }
            }
        }
    )
}

fn filter_view(filter: &ExpenseFilter, options: &[CategoryOption]) -> Markup {
    html!(
        section class=(CARD_STYLE)
        {
            form
                id="filters"
                method="get"
                action=(endpoints::ROOT)
                class="grid gap-4 sm:grid-cols-2 lg:grid-cols-5 items-end"
            {
                div
                {
                    label for="category-filter" class=(FORM_LABEL_STYLE) { "Category" }

                    select id="category-filter" name="category" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for option in options {
                            option value=(option.value) selected[option.selected]
                            {
                                (option.label)
                            }
                        }
                    }
                }

                div
                {
                    label for="start" class=(FORM_LABEL_STYLE) { "From" }

                    input
                        id="start"
                        type="date"
                        name="start"
                        value=[filter.start.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="end" class=(FORM_LABEL_STYLE) { "To" }

                    input
                        id="end"
                        type="date"
                        name="end"
                        value=[filter.end.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }

                a href=(endpoints::ROOT) class=(BUTTON_SECONDARY_STYLE) { "Reset Filters" }
            }
        }
    )
}

fn expense_table_view(expenses: &[&Expense], filter: &ExpenseFilter, redirect_url: &str) -> Markup {
    let table_row = |expense: &Expense| {
        let delete_url = with_redirect(
            &endpoints::format_endpoint(endpoints::EXPENSE, expense.id),
            redirect_url,
        );

        html!(
            tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
            {
                td class=(TABLE_CELL_STYLE) { (expense.date) }
                td class=(TABLE_CELL_STYLE) { (expense.category) }
                td class=(TABLE_CELL_STYLE) { (format_currency(parse_amount(&expense.amount))) }
                td class=(TABLE_CELL_STYLE) { (expense.note) }
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        a href=(page_url(filter, Some(expense.id))) class=(LINK_STYLE)
                        {
                            "Edit"
                        }

                        button
                            hx-delete=(delete_url)
                            hx-confirm="Are you sure you want to delete this expense?"
                            hx-target-error="#alert-container"
                            class=(BUTTON_DELETE_STYLE)
                        {
                            "Delete"
                        }
                    }
                }
            }
        )
    };

    html!(
        section class="w-full overflow-x-auto rounded-lg shadow"
        {
            table id="expenses" class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        (table_row(expense))
                    }

                    @if expenses.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="5" class="px-6 py-4 text-center" { "No expenses found." }
                        }
                    }
                }
            }
        }
    )
}
