use colored::Colorize;

/// Categories offered when recording an expense. The backend stores
/// categories as free text, so records may carry values outside this list.
pub const CATEGORIES: [&str; 10] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Travel",
    "Education",
    "Business",
    "Other",
];

/// Resolve user input to a listed category, ignoring case and surrounding
/// whitespace.
pub fn canonical(input: &str) -> Option<&'static str> {
    let input = input.trim();
    CATEGORIES
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(input))
}

/// Category label with a stable color for terminal output.
pub fn colored(category: &str) -> String {
    match canonical(category) {
        Some("Food & Dining") => category.yellow().to_string(),
        Some("Transportation") => category.blue().to_string(),
        Some("Shopping") => category.magenta().to_string(),
        Some("Entertainment") => category.bright_magenta().to_string(),
        Some("Bills & Utilities") => category.red().to_string(),
        Some("Healthcare") => category.green().to_string(),
        Some("Travel") => category.cyan().to_string(),
        Some("Education") => category.bright_blue().to_string(),
        Some("Business") => category.bright_yellow().to_string(),
        _ => category.bright_black().to_string(),
    }
}
