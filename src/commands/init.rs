use std::io::{self, Write};

use crate::config::{parse_api_url, Config, DEFAULT_API_URL};
use crate::error::{ExpenseError, Result};

pub async fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        let answer = ask(&format!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;

        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("Expenses CLI Configuration");
    println!("==========================\n");

    let api_url = ask(&format!("Expense store URL [{DEFAULT_API_URL}]: "))?;
    let api_url = if api_url.is_empty() {
        DEFAULT_API_URL.to_string()
    } else {
        parse_api_url(&api_url)?.to_string()
    };

    let timeout = ask("Request timeout in seconds [10]: ")?;
    let timeout_secs = if timeout.is_empty() {
        None
    } else {
        Some(timeout.parse::<u64>().map_err(|_| {
            ExpenseError::Validation(format!("Invalid timeout '{timeout}'"))
        })?)
    };

    let config = Config {
        api_url: Some(api_url),
        timeout_secs,
    };
    let contents = toml::to_string(&config).map_err(|e| {
        ExpenseError::Validation(format!("Could not encode config: {e}"))
    })?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ExpenseError::ConfigRead {
            path: config_path.clone(),
            source: e,
        })?;
    }

    std::fs::write(&config_path, contents).map_err(|e| ExpenseError::ConfigRead {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("Sign in with 'expenses login <username>'.");

    Ok(())
}

fn ask(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
