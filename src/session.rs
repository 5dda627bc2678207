//! The signed-in user, persisted between runs.
//!
//! A [`Session`] starts out [`SessionState::Unknown`]; `initialize` must run
//! once before `current` means anything. `login` overwrites any previous
//! user and `logout` clears both memory and disk.

use std::path::PathBuf;

use crate::api::ExpenseApi;
use crate::client::Backend;
use crate::config::Config;
use crate::error::{ExpenseError, Result};
use crate::types::User;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Persisted state has not been read yet.
    Unknown,
    SignedOut,
    SignedIn(User),
}

pub struct Session {
    path: PathBuf,
    state: SessionState,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: SessionState::Unknown,
        }
    }

    /// Session stored next to the config file.
    pub fn at_default_location() -> Result<Self> {
        let path = Config::config_path()?.with_file_name("session.json");
        Ok(Self::new(path))
    }

    /// Load the persisted user. A missing file means signed out; an
    /// unreadable or corrupt one is logged and treated the same way.
    pub async fn initialize(&mut self) {
        self.state = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => match serde_json::from_str::<User>(&contents) {
                Ok(user) => SessionState::SignedIn(user),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt session file");
                    SessionState::SignedOut
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionState::SignedOut,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read session file");
                SessionState::SignedOut
            }
        };
    }

    pub fn current(&self) -> Option<&User> {
        match &self.state {
            SessionState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    /// The signed-in user, or [`ExpenseError::NotSignedIn`].
    pub fn require(&self) -> Result<&User> {
        match &self.state {
            SessionState::SignedIn(user) => Ok(user),
            SessionState::SignedOut => Err(ExpenseError::NotSignedIn),
            SessionState::Unknown => {
                tracing::warn!("session read before initialize");
                Err(ExpenseError::NotSignedIn)
            }
        }
    }

    /// Authenticate and remember the user. Returns `false` when the
    /// credentials were rejected, leaving the session untouched.
    pub async fn login<B: Backend>(
        &mut self,
        api: &ExpenseApi<B>,
        username: &str,
        password: &str,
    ) -> Result<bool> {
        let Some(user) = api.authenticate(username, password).await? else {
            return Ok(false);
        };

        self.persist(&user).await?;
        tracing::info!(username = %user.username, "signed in");
        self.state = SessionState::SignedIn(user);
        Ok(true)
    }

    pub async fn logout(&mut self) {
        self.state = SessionState::SignedOut;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not remove session file");
            }
        }
    }

    async fn persist(&self, user: &User) -> Result<()> {
        let write_err = |source| ExpenseError::SessionWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let contents = serde_json::to_string_pretty(user)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(write_err)
    }
}
