use chrono::Local;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::api::ExpenseApi;
use crate::client::Backend;
use crate::error::Result;
use crate::output::{self, format_currency, format_date, truncate};
use crate::session::Session;
use crate::stats::{CategoryStats, Summary};
use crate::types::{category, Expense};

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Share")]
    share: String,
}

impl From<&CategoryStats> for CategoryRow {
    fn from(stats: &CategoryStats) -> Self {
        Self {
            category: category::colored(&stats.category),
            amount: format_currency(stats.amount),
            count: stats.count,
            share: format!("{:.1}%", stats.percentage),
        }
    }
}

#[derive(Tabled)]
struct RecentRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Date")]
    date: String,
}

impl From<&Expense> for RecentRow {
    fn from(expense: &Expense) -> Self {
        Self {
            title: truncate(&expense.title, 30),
            amount: format_currency(expense.amount),
            date: format_date(&expense.date),
        }
    }
}

pub async fn show<B: Backend>(api: &ExpenseApi<B>, session: &Session) -> Result<()> {
    let user = session.require()?;
    let expenses = api.list_expenses().await?;
    let summary = Summary::build(&expenses, Local::now().date_naive());

    output::print_item(&summary, |s| {
        println!("{}", format!("Welcome back, {}!", user.username).bold());
        println!("Here's your expense overview");
        println!();
        println!("Total:      {}", format_currency(s.total).green().bold());
        println!("This month: {}", format_currency(s.this_month).blue().bold());
        println!("Expenses:   {}", s.count);

        if s.categories.is_empty() {
            println!();
            println!("No expenses yet.");
            return;
        }

        println!();
        println!("{}", "Spending by category".bold());
        let rows: Vec<CategoryRow> = s.categories.iter().map(CategoryRow::from).collect();
        println!("{}", Table::new(rows).with(Style::rounded()));

        println!();
        println!("{}", "Recent expenses".bold());
        let rows: Vec<RecentRow> = s.recent.iter().map(RecentRow::from).collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    });

    Ok(())
}
