mod api;
mod cli;
mod client;
mod commands;
mod config;
mod error;
mod output;
mod session;
mod stats;
#[cfg(test)]
mod testing;
mod types;

use std::error::Error;
use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use api::ExpenseApi;
use cli::{Cli, Commands};
use client::HttpBackend;
use config::Config;
use error::Result;
use session::Session;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if verbose {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

/// Logs go to stderr so table and JSON output stay clean. `RUST_LOG` wins
/// over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "expenses=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    match cli.command {
        // Commands that don't need the store or a session
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "expenses", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run().await?;
        }
        Commands::Categories => {
            commands::expenses::categories();
        }
        command => {
            let config = Config::load()?;
            let api = ExpenseApi::new(HttpBackend::new(config.api_url()?, config.timeout())?);

            let mut session = Session::at_default_location()?;
            session.initialize().await;

            match command {
                Commands::Login(args) => {
                    commands::auth::login(&api, &mut session, args).await?;
                }
                Commands::Logout => {
                    commands::auth::logout(&mut session).await?;
                }
                Commands::Whoami => {
                    commands::auth::whoami(&session)?;
                }
                Commands::List => {
                    session.require()?;
                    commands::expenses::list(&api).await?;
                }
                Commands::View { id } => {
                    session.require()?;
                    commands::expenses::view(&api, &id).await?;
                }
                Commands::Add(args) => {
                    commands::expenses::add(&api, &session, args).await?;
                }
                Commands::Delete { id } => {
                    session.require()?;
                    commands::expenses::delete(&api, &id).await?;
                }
                Commands::Stats => {
                    commands::stats::show(&api, &session).await?;
                }
                Commands::Completions { .. } | Commands::Init | Commands::Categories => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
