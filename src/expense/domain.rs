//! Core expense domain types and the validation boundary for submitted expenses.

use serde::{Deserialize, Deserializer, Serialize};
use time::{Date, OffsetDateTime, macros::format_description};

use crate::Error;

/// Identifier for an expense.
///
/// Expense IDs are derived from the Unix time in milliseconds when the expense
/// was created, see [timestamp_id].
pub type ExpenseId = i64;

/// A recorded expense.
///
/// `amount` is kept as the text the user entered and only parsed when
/// aggregating, so records written by older clients round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique within the collection.
    pub id: ExpenseId,
    /// The amount spent, as a decimal string such as "12.50".
    #[serde(deserialize_with = "text_or_number")]
    pub amount: String,
    /// Free-form label used for filtering and grouping.
    pub category: String,
    /// An ISO `YYYY-MM-DD` date string.
    pub date: String,
    /// Optional free text.
    #[serde(default)]
    pub note: String,
}

/// The body of a create or update request.
///
/// Every field defaults to empty so that a missing field is reported by
/// [ExpenseData::validate] rather than as a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseData {
    /// Optional on create, ignored on update in favour of the ID in the URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ExpenseId>,
    /// A JSON number or decimal string.
    #[serde(default, deserialize_with = "text_or_number")]
    pub amount: String,
    /// Must not be blank.
    #[serde(default)]
    pub category: String,
    /// Expected as `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
    /// Free text, stored as given.
    #[serde(default)]
    pub note: String,
}

/// Expense fields that have passed validation and may be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedExpense {
    pub(crate) requested_id: Option<ExpenseId>,
    pub(crate) amount: String,
    pub(crate) category: String,
    pub(crate) date: String,
    pub(crate) note: String,
}

impl ExpenseData {
    /// Check the submitted fields before they reach storage.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidExpense] naming the first invalid field if:
    /// - `amount` is not a finite number greater than zero,
    /// - `category` is empty or only whitespace,
    /// - `date` is not a valid calendar date written as `YYYY-MM-DD`.
    pub fn validate(self) -> Result<ValidatedExpense, Error> {
        let amount = self.amount.trim();
        match amount.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => {}
            Ok(_) => {
                return Err(Error::InvalidExpense(
                    "amount",
                    format!("{amount:?} must be a number greater than zero"),
                ));
            }
            Err(_) => {
                return Err(Error::InvalidExpense(
                    "amount",
                    format!("{amount:?} is not a number"),
                ));
            }
        }

        let category = self.category.trim();
        if category.is_empty() {
            return Err(Error::InvalidExpense(
                "category",
                "category cannot be empty".to_owned(),
            ));
        }

        let date = self.date.trim();
        parse_iso_date(date).ok_or_else(|| {
            Error::InvalidExpense(
                "date",
                format!("{date:?} is not a date in the format YYYY-MM-DD"),
            )
        })?;

        Ok(ValidatedExpense {
            requested_id: self.id,
            amount: amount.to_owned(),
            category: category.to_owned(),
            date: date.to_owned(),
            note: self.note,
        })
    }
}

impl ValidatedExpense {
    /// The ID the client asked for, if any.
    pub fn requested_id(&self) -> Option<ExpenseId> {
        self.requested_id
    }

    /// Attach an ID to create the expense record.
    pub fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            amount: self.amount,
            category: self.category,
            date: self.date,
            note: self.note,
        }
    }
}

fn parse_iso_date(text: &str) -> Option<Date> {
    // `[year]` would also accept five or more digits.
    if text.len() != 10 {
        return None;
    }

    Date::parse(text, format_description!("[year]-[month]-[day]")).ok()
}

/// An expense ID for a record created right now: the Unix time in milliseconds.
pub fn timestamp_id() -> ExpenseId {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as ExpenseId
}

/// Return `requested` if it is free, otherwise the next larger ID that is.
///
/// # Errors
///
/// Returns an [Error::InvalidExpense] for `id` if every ID from `requested`
/// up to [ExpenseId::MAX] is taken.
pub fn next_free_id(
    requested: ExpenseId,
    mut is_taken: impl FnMut(ExpenseId) -> bool,
) -> Result<ExpenseId, Error> {
    let mut id = requested;

    while is_taken(id) {
        id = id.checked_add(1).ok_or_else(|| {
            Error::InvalidExpense(
                "id",
                format!("no free ID at or after {requested}, try another ID"),
            )
        })?;
    }

    Ok(id)
}

/// Accept amounts written either as JSON strings or as JSON numbers.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    })
}


#[cfg(test)]
mod serde_tests {
    use crate::expense::{Expense, ExpenseData};

    #[test]
    fn amount_may_be_a_json_number() {
        let data: ExpenseData =
            serde_json::from_str(r#"{"amount": 12.5, "category": "Food", "date": "2024-01-05"}"#)
                .unwrap();

        assert_eq!(data.amount, "12.5");
        assert_eq!(data.id, None);
        assert_eq!(data.note, "");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let data: ExpenseData = serde_json::from_str("{}").unwrap();

        assert_eq!(data, ExpenseData::default());
    }

    #[test]
    fn expense_serializes_amount_as_text() {
        let expense = Expense {
            id: 1,
            amount: "10.00".to_owned(),
            category: "Food".to_owned(),
            date: "2024-01-05".to_owned(),
            note: String::new(),
        };

        let value = serde_json::to_value(&expense).unwrap();

        assert_eq!(value["amount"], "10.00");
        assert_eq!(value["id"], 1);
    }
}
