use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::Expense;

#[derive(Error, Debug)]
pub enum ExpenseError {
    #[error("{0}")]
    Validation(String),

    #[error("The requested item was not found. It may have been deleted.")]
    NotFound,

    #[error("{0}")]
    DataFormat(String),

    #[error(
        "A similar expense already exists: {} ({:.2}, {}, {})",
        .0.title, .0.amount, .0.category, .0.date
    )]
    Duplicate(Box<Expense>),

    #[error("No internet connection. Please check your network and try again.")]
    Connectivity,

    #[error("Request timed out. Please check your internet connection and try again.")]
    Timeout,

    #[error("{}", .0.as_deref().unwrap_or("Invalid request. Please check your input and try again."))]
    BadRequest(Option<String>),

    #[error("Authentication failed. Please login again.")]
    AuthenticationRequired,

    #[error("Access denied. You don't have permission to perform this action.")]
    AccessDenied,

    #[error("This action conflicts with existing data. Please refresh and try again.")]
    Conflict,

    #[error("{}", .0.as_deref().unwrap_or("Invalid data provided. Please check your input."))]
    Unprocessable(Option<String>),

    #[error("Too many requests. Please wait a moment and try again.")]
    RateLimited,

    #[error("Server error. Please try again later.")]
    Server { status: u16 },

    #[error("Request failed ({status}). Please try again.")]
    Status { status: u16 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Invalid API URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to save session to {path}: {source}")]
    SessionWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Not signed in. Run 'expenses login <username>' first.")]
    NotSignedIn,
}

impl ExpenseError {
    /// Map a non-success HTTP status to its error kind. `message` is the
    /// server's `message` field, surfaced only for 400 and 422.
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        match status.as_u16() {
            400 => ExpenseError::BadRequest(message),
            401 => ExpenseError::AuthenticationRequired,
            403 => ExpenseError::AccessDenied,
            404 => ExpenseError::NotFound,
            409 => ExpenseError::Conflict,
            422 => ExpenseError::Unprocessable(message),
            429 => ExpenseError::RateLimited,
            status @ (500 | 502 | 503) => ExpenseError::Server { status },
            status => ExpenseError::Status { status },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ExpenseError::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, ExpenseError>;
