//! Spending summaries for the dashboard.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::types::Expense;

pub const RECENT_LIMIT: usize = 5;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryStats {
    pub category: String,
    pub amount: f64,
    pub count: usize,
    /// Share of the overall total, 0-100.
    pub percentage: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct Summary {
    pub total: f64,
    pub this_month: f64,
    pub count: usize,
    pub categories: Vec<CategoryStats>,
    pub recent: Vec<Expense>,
}

impl Summary {
    pub fn build(expenses: &[Expense], today: NaiveDate) -> Self {
        Self {
            total: total(expenses),
            this_month: month_total(expenses, today),
            count: expenses.len(),
            categories: by_category(expenses),
            recent: recent(expenses, RECENT_LIMIT),
        }
    }
}

pub fn total(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Total for the calendar month containing `today`. Expenses whose date does
/// not parse are left out.
pub fn month_total(expenses: &[Expense], today: NaiveDate) -> f64 {
    expenses
        .iter()
        .filter(|e| {
            e.parsed_date()
                .is_some_and(|d| d.year() == today.year() && d.month() == today.month())
        })
        .map(|e| e.amount)
        .sum()
}

/// Per-category totals, largest first.
pub fn by_category(expenses: &[Expense]) -> Vec<CategoryStats> {
    let mut buckets: HashMap<&str, (f64, usize)> = HashMap::new();
    for expense in expenses {
        let entry = buckets.entry(expense.category.as_str()).or_default();
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let grand_total = total(expenses);
    let mut stats: Vec<CategoryStats> = buckets
        .into_iter()
        .map(|(category, (amount, count))| CategoryStats {
            category: category.to_string(),
            amount,
            count,
            percentage: if grand_total > 0.0 {
                amount / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();

    stats.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    stats
}

/// The `limit` most recent expenses by date. Undated records sort last.
pub fn recent(expenses: &[Expense], limit: usize) -> Vec<Expense> {
    let mut sorted = expenses.to_vec();
    sorted.sort_by(|a, b| b.parsed_date().cmp(&a.parsed_date()));
    sorted.truncate(limit);
    sorted
}
