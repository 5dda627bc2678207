use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExpenseError, Result};

/// A backend user. The password is kept only for the credential check and is
/// never written to the session file or printed.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    /// Parse a record from `GET /users`, trimming the text fields.
    ///
    /// Unlike the other fields, `id` is mandatory: it is persisted with the
    /// session and stamped on new expenses as `userId`, so a record without
    /// one cannot own anything and is treated as malformed.
    pub fn from_record(value: &Value) -> Result<Self> {
        let fields = value
            .as_object()
            .ok_or_else(|| invalid_user("record is not an object"))?;

        let username = fields
            .get("username")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_user("missing username"))?;
        let password = fields
            .get("password")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| invalid_user("missing password"))?;
        let id = match fields.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(invalid_user("missing id")),
        };

        Ok(Self {
            id,
            username: username.trim().to_string(),
            password: password.to_string(),
            name: trimmed(fields.get("name")),
            email: trimmed(fields.get("email")),
        })
    }

    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }
}

fn trimmed(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn invalid_user(detail: &str) -> ExpenseError {
    ExpenseError::DataFormat(format!("Invalid user data received from server: {detail}"))
}
