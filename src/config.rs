use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::DEFAULT_TIMEOUT;
use crate::error::{ExpenseError, Result};

pub const DEFAULT_API_URL: &str = "https://67ac71475853dfff53dab929.mockapi.io/api/v1";
pub const API_URL_ENV: &str = "EXPENSES_API_URL";

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub struct Config {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| ExpenseError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| ExpenseError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "expenses")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ExpenseError::NoConfigDir)
    }

    /// Base URL of the store, env var taking precedence over the config file
    pub fn api_url(&self) -> Result<Url> {
        let raw = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        parse_api_url(&raw)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

pub fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|source| ExpenseError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ExpenseError::InvalidBaseUrl {
            url: raw.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }
    Ok(url)
}
