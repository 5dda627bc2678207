use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ExpenseError, Result};

pub const UNTITLED_EXPENSE: &str = "Untitled Expense";
pub const DEFAULT_CATEGORY: &str = "Other";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest difference at which two amounts are considered equal.
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// An expense record as exposed to callers. Built only through
/// [`Expense::normalize`], so title/amount/category/date are always populated.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Values substituted for missing or empty backend fields.
#[derive(Debug, Clone)]
pub struct Defaults {
    pub title: String,
    pub category: String,
    pub date: String,
}

impl Defaults {
    /// Fallbacks for records read from the collection.
    pub fn on(today: NaiveDate) -> Self {
        Self {
            title: UNTITLED_EXPENSE.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            date: today.format(DATE_FORMAT).to_string(),
        }
    }

    pub fn today() -> Self {
        Self::on(Local::now().date_naive())
    }

    /// Fallbacks for the record echoed back after a create: whatever the
    /// backend drops is taken from what we sent.
    pub fn from_draft(draft: &ExpenseDraft) -> Self {
        Self {
            title: draft.title.clone(),
            category: draft.category.clone(),
            date: draft.date.clone(),
        }
    }
}

impl Expense {
    /// Parse an untyped backend record.
    ///
    /// - `title` falls back to the legacy `name` field, then to `defaults.title`
    /// - `amount` accepts numbers or numeric text, anything else becomes 0
    /// - `category` and `date` fall back to `defaults`
    ///
    /// Empty strings count as missing. Non-object input yields a record made
    /// entirely of defaults.
    pub fn normalize(value: &Value, defaults: &Defaults) -> Self {
        let empty = Map::new();
        let fields = value.as_object().unwrap_or(&empty);

        Self {
            id: text(fields, "id").unwrap_or_default(),
            title: text(fields, "title")
                .or_else(|| text(fields, "name"))
                .unwrap_or_else(|| defaults.title.clone()),
            amount: amount(fields.get("amount")),
            category: text(fields, "category").unwrap_or_else(|| defaults.category.clone()),
            date: text(fields, "date").unwrap_or_else(|| defaults.date.clone()),
            description: text(fields, "description"),
            user_id: text(fields, "userId"),
            created_at: text(fields, "createdAt"),
        }
    }

    /// Calendar date of the expense, if it is a well-formed `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn amount(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => leading_number(s),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Longest numeric prefix of `s`, so `"12.50 USD"` reads as 12.5.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim();
    (1..=s.len())
        .rev()
        .filter(|&end| s.is_char_boundary(end))
        .find_map(|end| s[..end].parse::<f64>().ok().filter(|n| n.is_finite()))
}

/// Input to a create call.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ExpenseDraft {
    /// Checks the fields the backend requires, in form order.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ExpenseError::Validation(
                "Expense title is required".to_string(),
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ExpenseError::Validation(
                "Valid expense amount is required".to_string(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(ExpenseError::Validation(
                "Expense category is required".to_string(),
            ));
        }
        if self.date.trim().is_empty() {
            return Err(ExpenseError::Validation(
                "Expense date is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `existing` looks like the same purchase. Category is not part
    /// of the key.
    pub fn is_duplicate_of(&self, existing: &Expense) -> bool {
        let same_title =
            existing.title.trim().to_lowercase() == self.title.trim().to_lowercase();
        let same_amount = (existing.amount - self.amount).abs() < AMOUNT_TOLERANCE;
        let same_date = existing.date == self.date;

        same_title && same_amount && same_date
    }

    /// The body sent to the backend.
    pub fn payload(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            amount: self.amount,
            category: self.category.trim().to_string(),
            date: self.date.clone(),
            description: Some(
                self.description
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string(),
            ),
            user_id: self.user_id.clone(),
        }
    }
}
