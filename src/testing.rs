//! In-memory collection store for exercising the data access layer.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::Backend;
use crate::error::{ExpenseError, Result};

#[derive(Default)]
struct State {
    users: Vec<Value>,
    expenses: Vec<Value>,
    next_id: u64,
    calls: Vec<String>,
    failures: HashMap<String, ExpenseError>,
    raw: HashMap<String, Value>,
}

/// Behaves like a mock REST store: server-assigned string ids, `username`
/// filtering, 404 for unknown ids. Every call is recorded as `"METHOD path"`.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: &str, username: &str, password: &str) -> Self {
        self.state.lock().unwrap().users.push(json!({
            "id": id,
            "username": username,
            "password": password,
            "name": format!(" {username} "),
        }));
        self
    }

    /// Store a raw expense record as-is; returns its id.
    pub fn insert_expense(&self, mut record: Value) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| state.next_id.to_string());
        record["id"] = json!(id);
        state.expenses.push(record);
        id
    }

    /// Make the next call to `key` (e.g. `"GET expenses"`) fail with `err`.
    pub fn fail(&self, key: &str, err: ExpenseError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(key.to_string(), err);
    }

    /// Make every call to `key` succeed with `body` verbatim.
    pub fn respond(&self, key: &str, body: Value) {
        self.state.lock().unwrap().raw.insert(key.to_string(), body);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn expense_count(&self) -> usize {
        self.state.lock().unwrap().expenses.len()
    }

    fn record(&self, method: &str, path: &[&str]) -> Result<Option<Value>> {
        let key = format!("{method} {}", path.join("/"));
        let mut state = self.state.lock().unwrap();
        state.calls.push(key.clone());
        if let Some(err) = state.failures.remove(&key) {
            return Err(err);
        }
        Ok(state.raw.get(&key).cloned())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, path: &[&str], query: &[(&str, &str)]) -> Result<Value> {
        if let Some(body) = self.record("GET", path)? {
            return Ok(body);
        }
        let state = self.state.lock().unwrap();
        match path {
            ["users"] => {
                let wanted = query
                    .iter()
                    .find(|(k, _)| *k == "username")
                    .map(|(_, v)| *v)
                    .unwrap_or_default();
                // Substring search, like the hosted mock store.
                let matches: Vec<Value> = state
                    .users
                    .iter()
                    .filter(|u| {
                        u["username"]
                            .as_str()
                            .is_some_and(|name| name.contains(wanted))
                    })
                    .cloned()
                    .collect();
                Ok(Value::Array(matches))
            }
            ["expenses"] => Ok(Value::Array(state.expenses.clone())),
            ["expenses", id] => state
                .expenses
                .iter()
                .find(|e| e["id"].as_str() == Some(*id))
                .cloned()
                .ok_or(ExpenseError::NotFound),
            _ => Err(ExpenseError::NotFound),
        }
    }

    async fn post(&self, path: &[&str], body: &Value) -> Result<Value> {
        if let Some(body) = self.record("POST", path)? {
            return Ok(body);
        }
        match path {
            ["expenses"] => {
                let mut record = body.clone();
                if let Some(fields) = record.as_object_mut() {
                    fields.remove("id");
                    fields.insert("createdAt".to_string(), json!("2024-01-01T00:00:00.000Z"));
                }
                let id = self.insert_expense(record.clone());
                record["id"] = json!(id);
                Ok(record)
            }
            _ => Err(ExpenseError::NotFound),
        }
    }

    async fn delete(&self, path: &[&str]) -> Result<()> {
        self.record("DELETE", path)?;
        let mut state = self.state.lock().unwrap();
        match path {
            ["expenses", id] => {
                let before = state.expenses.len();
                state.expenses.retain(|e| e["id"].as_str() != Some(*id));
                if state.expenses.len() == before {
                    Err(ExpenseError::NotFound)
                } else {
                    Ok(())
                }
            }
            _ => Err(ExpenseError::NotFound),
        }
    }
}
