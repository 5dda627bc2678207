use std::io::{self, Write};

use colored::Colorize;

use crate::api::ExpenseApi;
use crate::cli::LoginArgs;
use crate::client::Backend;
use crate::error::{ExpenseError, Result};
use crate::output;
use crate::session::Session;

pub async fn login<B: Backend>(api: &ExpenseApi<B>, session: &mut Session, args: LoginArgs) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt("Password: ")?,
    };

    if !session.login(api, &args.username, &password).await? {
        return Err(ExpenseError::InvalidCredentials);
    }

    let user = session.require()?;
    output::print_message(&format!("Welcome back, {}!", user.display_name()));
    Ok(())
}

pub async fn logout(session: &mut Session) -> Result<()> {
    let was_signed_in = session.current().is_some();
    session.logout().await;

    if was_signed_in {
        output::print_message("Signed out.");
    } else {
        output::print_message("Not signed in.");
    }
    Ok(())
}

pub fn whoami(session: &Session) -> Result<()> {
    let user = session.require()?;
    output::print_item(user, |u| {
        println!("{} ({})", u.display_name().bold(), u.username);
        if let Some(email) = &u.email {
            println!("{email}");
        }
    });
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
