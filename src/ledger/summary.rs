//! Totals over a set of expenses: overall, per category and per month.

use std::collections::HashMap;

use crate::expense::Expense;

/// Parse an expense amount for aggregation.
///
/// Text that is not a number becomes NaN, which then propagates through any
/// sum it is part of instead of silently counting as zero.
pub fn parse_amount(amount: &str) -> f64 {
    amount.trim().parse().unwrap_or(f64::NAN)
}

/// The month an expense belongs to: the first seven characters of its date.
///
/// For a well-formed date that is the `YYYY-MM` prefix. Malformed dates are
/// not validated and group under whatever prefix they have.
pub fn month_key(date: &str) -> &str {
    match date.char_indices().nth(7) {
        Some((end, _)) => &date[..end],
        None => date,
    }
}

/// The sum of the amounts in one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    /// The category or `YYYY-MM` month.
    pub key: String,
    /// May be NaN if any amount in the group does not parse.
    pub total: f64,
}

/// The summary shown next to the expense list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    /// The sum over every visible expense.
    pub total: f64,
    /// Totals per exact category string, in order of first appearance.
    pub by_category: Vec<GroupTotal>,
    /// Totals per `YYYY-MM` month, in order of first appearance.
    pub by_month: Vec<GroupTotal>,
}

/// Compute the total, per-category and per-month sums over `expenses`.
pub fn summarize<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Summary {
    let mut summary = Summary::default();
    let mut category_index = HashMap::new();
    let mut month_index = HashMap::new();

    for expense in expenses {
        let amount = parse_amount(&expense.amount);

        summary.total += amount;
        add_to_group(
            &mut summary.by_category,
            &mut category_index,
            &expense.category,
            amount,
        );
        add_to_group(
            &mut summary.by_month,
            &mut month_index,
            month_key(&expense.date),
            amount,
        );
    }

    summary
}

fn add_to_group(
    groups: &mut Vec<GroupTotal>,
    index: &mut HashMap<String, usize>,
    key: &str,
    amount: f64,
) {
    match index.get(key) {
        Some(&position) => groups[position].total += amount,
        None => {
            index.insert(key.to_owned(), groups.len());
            groups.push(GroupTotal {
                key: key.to_owned(),
                total: amount,
            });
        }
    }
}
