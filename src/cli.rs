use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

#[derive(Parser)]
#[command(name = "expenses")]
#[command(about = "Track expenses against a remote expense store", version)]
#[command(after_help = "EXAMPLES:
    expenses login alice                 Sign in
    expenses list                        List all expenses
    expenses add -t Coffee -a 4.50 -c \"Food & Dining\"
    expenses view 12                     Show one expense
    expenses stats                       Spending overview")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, compact)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress success messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show detailed error information and debug logs
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the user
    #[command(after_help = "EXAMPLES:
    expenses login alice
    EXPENSES_PASSWORD=secret expenses login alice")]
    Login(LoginArgs),
    /// Forget the signed-in user
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List all expenses
    #[command(alias = "ls")]
    List,
    /// Show expense details
    #[command(after_help = "EXAMPLES:
    expenses view 12")]
    View {
        /// Expense ID
        id: String,
    },
    /// Record a new expense
    #[command(after_help = "EXAMPLES:
    expenses add -t Coffee -a 4.50 -c \"Food & Dining\"
    expenses add -t Taxi -a 18 -c transportation --date 2024-01-31 -d \"Airport\"
    expenses add -t Coffee -a 4.50 -c other --force")]
    Add(AddArgs),
    /// Delete an expense
    #[command(alias = "rm", after_help = "EXAMPLES:
    expenses delete 12")]
    Delete {
        /// Expense ID
        id: String,
    },
    /// Spending overview
    #[command(alias = "dashboard")]
    Stats,
    /// List the expense categories
    Categories,
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    expenses completions bash > ~/.bash_completion.d/expenses
    expenses completions zsh > ~/.zfunc/_expenses")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    Init,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Username
    pub username: String,

    /// Password (prompted for when omitted)
    #[arg(long, short, env = "EXPENSES_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    /// What the money was spent on
    #[arg(long, short)]
    pub title: String,

    /// Amount, e.g. 4.50
    #[arg(long, short, allow_negative_numbers = true)]
    pub amount: f64,

    /// Category (see 'expenses categories')
    #[arg(long, short)]
    pub category: String,

    /// Date as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Optional notes
    #[arg(long, short)]
    pub description: Option<String>,

    /// Create even if a similar expense already exists
    #[arg(long)]
    pub force: bool,
}
