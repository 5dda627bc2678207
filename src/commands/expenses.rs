use chrono::{Local, NaiveDate};
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::api::ExpenseApi;
use crate::cli::AddArgs;
use crate::client::Backend;
use crate::error::{ExpenseError, Result};
use crate::output::{self, format_currency, format_date, format_timestamp, truncate};
use crate::session::Session;
use crate::types::{category, Expense, ExpenseDraft, DATE_FORMAT};

const MAX_AMOUNT: f64 = 999_999.99;
const MIN_TITLE_LEN: usize = 2;

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Date")]
    date: String,
}

impl From<&Expense> for ExpenseRow {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.clone(),
            title: truncate(&expense.title, 40),
            amount: format_currency(expense.amount),
            category: category::colored(&expense.category),
            date: format_date(&expense.date),
        }
    }
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    name: String,
}

pub async fn list<B: Backend>(api: &ExpenseApi<B>) -> Result<()> {
    let expenses = api.list_expenses().await?;

    if expenses.is_empty() && !output::is_json_output() {
        output::print_message("No expenses yet. Add one with 'expenses add'.");
        return Ok(());
    }

    output::print_table(&expenses, |e| ExpenseRow::from(e));
    Ok(())
}

pub async fn view<B: Backend>(api: &ExpenseApi<B>, id: &str) -> Result<()> {
    let expense = api.get_expense(id).await?;
    output::print_item(&expense, print_details);
    Ok(())
}

fn print_details(expense: &Expense) {
    println!("{}", expense.title.bold());
    println!();
    println!("Amount:   {}", format_currency(expense.amount).green().bold());
    println!("Category: {}", category::colored(&expense.category));
    println!("Date:     {}", format_date(&expense.date));
    for (label, value) in metadata(expense) {
        println!("{:<9} {value}", format!("{label}:"));
    }
    if let Some(desc) = &expense.description {
        println!();
        println!("{desc}");
    }
}

/// Record bookkeeping shown under the main fields; absent values are skipped.
fn metadata(expense: &Expense) -> Vec<(&'static str, String)> {
    let mut fields = vec![("ID", expense.id.clone())];
    if let Some(user_id) = &expense.user_id {
        fields.push(("User", user_id.clone()));
    }
    if let Some(created_at) = &expense.created_at {
        fields.push(("Created", format_timestamp(created_at)));
    }
    fields
}

/// JSON shape of a rejected duplicate, so scripts get the matched record.
#[derive(Serialize)]
struct DuplicateReport<'a> {
    error: &'static str,
    existing: &'a Expense,
}

impl<'a> DuplicateReport<'a> {
    fn new(existing: &'a Expense) -> Self {
        Self {
            error: "duplicate",
            existing,
        }
    }
}

fn print_duplicate(existing: &Expense) {
    eprintln!("{}", "Possible duplicate expense".yellow().bold());
    eprintln!("A similar expense already exists:");
    eprintln!("  • Title:    {}", existing.title);
    eprintln!("  • Amount:   {}", format_currency(existing.amount));
    eprintln!("  • Category: {}", existing.category);
    eprintln!("  • Date:     {}", format_date(&existing.date));
    eprintln!();
    eprintln!("View it with 'expenses view {}', or re-run with --force to add it anyway.", existing.id);
}

pub async fn add<B: Backend>(api: &ExpenseApi<B>, session: &Session, args: AddArgs) -> Result<()> {
    let user = session.require()?;
    let draft = build_draft(&args, Some(user.id.as_str()), Local::now().date_naive())?;

    let result = if args.force {
        api.force_create_expense(&draft).await
    } else {
        api.create_expense(&draft).await
    };

    match result {
        Ok(created) => {
            output::print_item(&created, |e| {
                output::print_message(&format!(
                    "Created expense {} - {} ({})",
                    e.id,
                    e.title,
                    format_currency(e.amount)
                ));
            });
            Ok(())
        }
        Err(ExpenseError::Duplicate(existing)) => {
            output::print_item(&DuplicateReport::new(&existing), |r| print_duplicate(r.existing));
            Err(ExpenseError::Duplicate(existing))
        }
        Err(e) => Err(e),
    }
}

/// Apply the form rules on top of the layer's own validation: a title of at
/// least two characters, a positive amount under the cap, a listed category
/// and a well-formed date that is not in the future.
pub fn build_draft(args: &AddArgs, user_id: Option<&str>, today: NaiveDate) -> Result<ExpenseDraft> {
    let title = args.title.trim();
    if title.is_empty() {
        return Err(ExpenseError::Validation(
            "Please enter an expense title".to_string(),
        ));
    }
    if title.chars().count() < MIN_TITLE_LEN {
        return Err(ExpenseError::Validation(format!(
            "Expense title must be at least {MIN_TITLE_LEN} characters"
        )));
    }

    if !args.amount.is_finite() || args.amount <= 0.0 {
        return Err(ExpenseError::Validation(
            "Please enter a valid amount greater than 0".to_string(),
        ));
    }
    if args.amount > MAX_AMOUNT {
        return Err(ExpenseError::Validation(format!(
            "Amount cannot exceed {}",
            format_currency(MAX_AMOUNT)
        )));
    }

    let category = category::canonical(&args.category).ok_or_else(|| {
        ExpenseError::Validation(format!(
            "Unknown category '{}'. Choose one of: {}",
            args.category.trim(),
            category::CATEGORIES.join(", ")
        ))
    })?;

    let date = match args.date.as_deref().map(str::trim) {
        None | Some("") => today,
        Some(raw) => parse_date(raw)?,
    };
    if date > today {
        return Err(ExpenseError::Validation(
            "Expense date cannot be in the future".to_string(),
        ));
    }

    Ok(ExpenseDraft {
        title: title.to_string(),
        amount: args.amount,
        category: category.to_string(),
        date: date.format(DATE_FORMAT).to_string(),
        description: args
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from),
        user_id: user_id.map(String::from),
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        // Reject unpadded forms such as 2024-1-5.
        .filter(|d| d.format(DATE_FORMAT).to_string() == raw)
        .ok_or_else(|| {
            ExpenseError::Validation("Please enter date in YYYY-MM-DD format".to_string())
        })
}

pub async fn delete<B: Backend>(api: &ExpenseApi<B>, id: &str) -> Result<()> {
    match api.delete_expense(id).await {
        Ok(()) => output::print_message(&format!("Deleted expense {}", id.trim())),
        Err(e) if e.is_not_found() => {
            tracing::debug!(id, "expense already gone");
            output::print_message(&format!(
                "Expense {} not found. It may have already been deleted.",
                id.trim()
            ));
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

pub fn categories() {
    output::print_table(&category::CATEGORIES[..], |name| CategoryRow {
        name: category::colored(name),
    });
}
