//! Category and date range filters over the expense collection.

use crate::expense::Expense;

/// The value of the category selector that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Which category the user selected in the category filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every category, the sentinel [ALL_CATEGORIES].
    #[default]
    All,
    /// Only expenses whose category is exactly this string.
    Only(String),
}

impl CategoryFilter {
    /// Interpret the raw value of the category selector.
    ///
    /// A missing or empty value, or [ALL_CATEGORIES], selects every category.
    pub fn from_selection(selection: Option<&str>) -> Self {
        match selection {
            None | Some("") | Some(ALL_CATEGORIES) => CategoryFilter::All,
            Some(category) => CategoryFilter::Only(category.to_owned()),
        }
    }

    /// The value to put back into the category selector.
    pub fn as_value(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Only(category) => category,
        }
    }

    fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => selected == category,
        }
    }
}

/// The three filters the user can combine.
///
/// An expense is kept only if it passes every active filter. Dates are
/// compared as strings, which orders ISO `YYYY-MM-DD` dates chronologically,
/// and both ends of the range are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// Keep expenses in this category, or all of them.
    pub category: CategoryFilter,
    /// Keep expenses on or after this date.
    pub start: Option<String>,
    /// Keep expenses on or before this date.
    pub end: Option<String>,
}

impl ExpenseFilter {
    /// Build a filter from raw form values, where empty values disable that filter.
    pub fn new(category: Option<&str>, start: Option<&str>, end: Option<&str>) -> Self {
        let non_empty = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };

        Self {
            category: CategoryFilter::from_selection(category.map(str::trim)),
            start: non_empty(start),
            end: non_empty(end),
        }
    }

    /// Whether `expense` passes every active filter.
    pub fn matches(&self, expense: &Expense) -> bool {
        if !self.category.matches(&expense.category) {
            return false;
        }

        if let Some(start) = &self.start {
            if expense.date.as_str() < start.as_str() {
                return false;
            }
        }

        if let Some(end) = &self.end {
            if expense.date.as_str() > end.as_str() {
                return false;
            }
        }

        true
    }

    /// The expenses that pass every active filter, in their original order.
    pub fn apply<'a>(&self, expenses: &'a [Expense]) -> Vec<&'a Expense> {
        expenses
            .iter()
            .filter(|expense| self.matches(expense))
            .collect()
    }
}

/// Sort expenses with the most recent date first.
///
/// The sort is stable, expenses on the same date keep their relative order.
pub fn sort_by_date_descending(expenses: &mut [&Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
}
