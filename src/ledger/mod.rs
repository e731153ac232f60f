//! The in-memory view of the expense collection that the expenses page renders.
//!
//! [ExpenseLedger] owns the full collection as loaded from the store together
//! with the active filters. Filtering, sorting and summarizing are pure
//! functions over that state, the HTML layer only reads the results.

mod filter;
mod summary;

use std::collections::HashSet;

pub use filter::{ALL_CATEGORIES, CategoryFilter, ExpenseFilter, sort_by_date_descending};
pub use summary::{GroupTotal, Summary, month_key, parse_amount, summarize};

use crate::expense::{Expense, ExpenseId};

/// An option of the category selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    /// The value submitted as the `category` query parameter.
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// The full expense collection plus the filters the user selected.
#[derive(Debug, Clone, Default)]
pub struct ExpenseLedger {
    expenses: Vec<Expense>,
    filter: ExpenseFilter,
}

impl ExpenseLedger {
    /// Create a ledger over `expenses`.
    ///
    /// A selected category that no longer exists in `expenses` (e.g., its last
    /// expense was deleted) falls back to all categories, so the selector and
    /// the list always agree.
    pub fn new(expenses: Vec<Expense>, mut filter: ExpenseFilter) -> Self {
        if let CategoryFilter::Only(category) = &filter.category {
            if !expenses.iter().any(|expense| &expense.category == category) {
                tracing::debug!("Category {category:?} no longer exists, showing all categories");
                filter.category = CategoryFilter::All;
            }
        }

        Self { expenses, filter }
    }

    /// The active filter, after falling back from a category that no longer exists.
    pub fn filter(&self) -> &ExpenseFilter {
        &self.filter
    }

    /// Find an expense in the full collection, e.g. to fill the edit form.
    pub fn find(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    /// The filtered expenses in display order, most recent first.
    pub fn visible(&self) -> Vec<&Expense> {
        let mut visible = self.filter.apply(&self.expenses);
        sort_by_date_descending(&mut visible);
        visible
    }

    /// Totals over the filtered expenses only.
    pub fn summary(&self) -> Summary {
        summarize(self.visible())
    }

    /// Options for the category selector.
    ///
    /// The distinct categories of the unfiltered collection in order of first
    /// appearance, preceded by the option for all categories.
    pub fn category_options(&self) -> Vec<CategoryOption> {
        let selected = self.filter.category.as_value();
        let mut seen = HashSet::new();

        let all = CategoryOption {
            value: ALL_CATEGORIES.to_owned(),
            label: "All Categories".to_owned(),
            selected: selected == ALL_CATEGORIES,
        };

        let categories = self
            .expenses
            .iter()
            .map(|expense| expense.category.as_str())
            .filter(|category| seen.insert(*category))
            .map(|category| CategoryOption {
                value: category.to_owned(),
                label: category.to_owned(),
                selected: matches!(&self.filter.category, CategoryFilter::Only(c) if c == category),
            });

        std::iter::once(all).chain(categories).collect()
    }

    /// The distinct categories, for suggesting values in the expense form.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();

        self.expenses
            .iter()
            .map(|expense| expense.category.as_str())
            .filter(|category| seen.insert(*category))
            .collect()
    }
}

#[cfg(test)]
mod expense_ledger_tests {
    use crate::{
        expense::Expense,
        ledger::{CategoryFilter, ExpenseFilter, ExpenseLedger},
    };

    fn expense(id: i64, amount: &str, category: &str, date: &str) -> Expense {
        Expense {
            id,
            amount: amount.to_owned(),
            category: category.to_owned(),
            date: date.to_owned(),
            note: String::new(),
        }
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense(1, "10.00", "Food", "2024-01-05"),
            expense(2, "20.00", "Travel", "2024-02-10"),
            expense(3, "5.25", "Food", "2024-01-20"),
            expense(4, "7.00", "Rent", "2023-12-01"),
        ]
    }

    #[test]
    fn visible_is_filtered_and_sorted() {
        let ledger = ExpenseLedger::new(sample(), ExpenseFilter::new(Some("Food"), None, None));

        let ids = ledger
            .visible()
            .iter()
            .map(|expense| expense.id)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn summary_ignores_filtered_out_expenses() {
        let ledger = ExpenseLedger::new(
            sample(),
            ExpenseFilter::new(Some("Food"), Some("2024-01-01"), Some("2024-01-31")),
        );

        let summary = ledger.summary();

        assert_eq!(summary.total, 15.25);
        assert_eq!(summary.by_category.len(), 1);
        assert_eq!(summary.by_category[0].key, "Food");
        assert_eq!(summary.by_category[0].total, 15.25);
    }

    #[test]
    fn category_options_come_from_unfiltered_collection() {
        let ledger = ExpenseLedger::new(sample(), ExpenseFilter::new(Some("Travel"), None, None));

        let options = ledger.category_options();

        let values = options
            .iter()
            .map(|option| option.value.as_str())
            .collect::<Vec<_>>();
        assert_eq!(values, vec!["all", "Food", "Travel", "Rent"]);
        assert_eq!(options[0].label, "All Categories");

        let selected = options
            .iter()
            .filter(|option| option.selected)
            .map(|option| option.value.as_str())
            .collect::<Vec<_>>();
        assert_eq!(selected, vec!["Travel"]);
    }

    #[test]
    fn unknown_category_falls_back_to_all() {
        let ledger = ExpenseLedger::new(sample(), ExpenseFilter::new(Some("Gone"), None, None));

        assert_eq!(ledger.filter().category, CategoryFilter::All);
        assert_eq!(ledger.visible().len(), 4);
        assert!(ledger.category_options()[0].selected);
    }

    #[test]
    fn find_searches_full_collection() {
        let ledger = ExpenseLedger::new(sample(), ExpenseFilter::new(Some("Food"), None, None));

        assert_eq!(ledger.find(2).map(|expense| expense.id), Some(2));
        assert_eq!(ledger.find(99), None);
    }

    #[test]
    fn empty_ledger() {
        let ledger = ExpenseLedger::default();

        assert!(ledger.visible().is_empty());
        assert_eq!(ledger.summary().total, 0.0);
        assert_eq!(ledger.category_options().len(), 1);
    }
}
