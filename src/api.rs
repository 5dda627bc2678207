//! Data access layer for the `users` and `expenses` collections.
//!
//! Everything handed back to callers is normalized (see [`Expense::normalize`])
//! and every failure is an [`ExpenseError`] kind. Local validation always runs
//! before any request is issued.

use serde_json::Value;

use crate::client::Backend;
use crate::error::{ExpenseError, Result};
use crate::types::{Defaults, Expense, ExpenseDraft, User};

const USERS: &str = "users";
const EXPENSES: &str = "expenses";

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 4;

pub struct ExpenseApi<B> {
    backend: B,
}

impl<B: Backend> ExpenseApi<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Look up `username` and compare passwords.
    ///
    /// Returns `Ok(None)` both for an unknown user and for a wrong password,
    /// so callers cannot tell the two apart.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let username = username.trim();
        validate_credentials(username, password)?;

        let response = self
            .backend
            .get(&[USERS], &[("username", username)])
            .await?;

        let records = response.as_array().ok_or_else(|| {
            ExpenseError::DataFormat("Invalid response from authentication server".to_string())
        })?;

        // The store's filter is a substring search; only an exact,
        // case-sensitive username counts.
        let Some(record) = records
            .iter()
            .find(|r| r.get("username").and_then(Value::as_str) == Some(username))
        else {
            tracing::debug!(username, "no such user");
            return Ok(None);
        };

        let user = User::from_record(record)?;
        if user.password != password {
            tracing::debug!(username, "password mismatch");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Fetch and normalize the whole collection.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let response = self.backend.get(&[EXPENSES], &[]).await?;

        let records = response.as_array().ok_or_else(|| {
            ExpenseError::DataFormat("Invalid data format received from server".to_string())
        })?;

        let defaults = Defaults::today();
        let expenses: Vec<Expense> = records
            .iter()
            .map(|r| Expense::normalize(r, &defaults))
            .collect();
        tracing::debug!(count = expenses.len(), "listed expenses");

        Ok(expenses)
    }

    pub async fn get_expense(&self, id: &str) -> Result<Expense> {
        let id = validate_id(id)?;
        let record = self.backend.get(&[EXPENSES, id], &[]).await?;

        if !record.is_object() {
            return Err(ExpenseError::DataFormat(
                "Expense data not found".to_string(),
            ));
        }

        Ok(Expense::normalize(&record, &Defaults::today()))
    }

    /// Create an expense unless a near-identical one already exists.
    ///
    /// The scan is advisory: two clients can still race past it.
    pub async fn create_expense(&self, draft: &ExpenseDraft) -> Result<Expense> {
        draft.validate()?;

        let existing = self.list_expenses().await?;
        if let Some(duplicate) = existing.into_iter().find(|e| draft.is_duplicate_of(e)) {
            tracing::info!(id = %duplicate.id, title = %duplicate.title, "duplicate expense");
            return Err(ExpenseError::Duplicate(Box::new(duplicate)));
        }

        self.write(draft).await
    }

    /// Create an expense without the duplicate scan, once the caller has
    /// confirmed a near-duplicate is intended.
    pub async fn force_create_expense(&self, draft: &ExpenseDraft) -> Result<Expense> {
        draft.validate()?;
        self.write(draft).await
    }

    /// Errors, including [`ExpenseError::NotFound`], are passed through for
    /// the caller to interpret.
    pub async fn delete_expense(&self, id: &str) -> Result<()> {
        let id = validate_id(id)?;
        self.backend.delete(&[EXPENSES, id]).await?;
        tracing::debug!(id, "deleted expense");
        Ok(())
    }

    async fn write(&self, draft: &ExpenseDraft) -> Result<Expense> {
        let payload = draft.payload();
        let body = serde_json::to_value(&payload).map_err(|e| {
            ExpenseError::DataFormat(format!("Could not encode expense: {e}"))
        })?;

        let created = self.backend.post(&[EXPENSES], &body).await?;

        let has_id = match created.get("id") {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(_)) => true,
            _ => false,
        };
        if !has_id {
            return Err(ExpenseError::DataFormat(
                "Failed to create expense - invalid response from server".to_string(),
            ));
        }

        let expense = Expense::normalize(&created, &Defaults::from_draft(&payload));
        tracing::info!(id = %expense.id, "created expense");
        Ok(expense)
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.is_empty() {
        return Err(ExpenseError::Validation("Username is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(ExpenseError::Validation("Password is required".to_string()));
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ExpenseError::Validation(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters long"
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ExpenseError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

fn validate_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ExpenseError::Validation(
            "Invalid expense ID provided".to_string(),
        ));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryBackend;
    use serde_json::json;

    fn api() -> ExpenseApi<MemoryBackend> {
        ExpenseApi::new(MemoryBackend::new().with_user("1", "alice", "wonderland"))
    }

    fn coffee_draft() -> ExpenseDraft {
        ExpenseDraft {
            title: "coffee ".to_string(),
            amount: 4.501,
            category: "Business".to_string(),
            date: "2024-01-01".to_string(),
            description: None,
            user_id: Some("1".to_string()),
        }
    }

    fn seed_coffee(api: &ExpenseApi<MemoryBackend>) -> String {
        api.backend().insert_expense(json!({
            "title": "Coffee",
            "amount": 4.50,
            "category": "Food & Dining",
            "date": "2024-01-01"
        }))
    }

    #[tokio::test]
    async fn test_authenticate_success_trims_fields() {
        let api = api();
        let user = api.authenticate(" alice ", "wonderland").await.unwrap().unwrap();
        assert_eq!(user.id, "1");
        assert_eq!(user.username, "alice");
        assert_eq!(user.name.as_deref(), Some("alice"));
        assert_eq!(api.backend().calls(), vec!["GET users"]);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_and_unknown_user_look_alike() {
        let api = api();
        assert!(api.authenticate("alice", "wrongpass").await.unwrap().is_none());
        assert!(api.authenticate("bobby", "wonderland").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authenticate_requires_exact_username() {
        let api = ExpenseApi::new(MemoryBackend::new().with_user("2", "alice2", "wonderland"));
        // The store matches "alice" as a substring of "alice2".
        assert!(api.authenticate("alice", "wonderland").await.unwrap().is_none());
        assert!(api.authenticate("Alice2", "wonderland").await.unwrap().is_none());
        assert!(api.authenticate("alice2", "wonderland").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_authenticate_validation_precedes_network() {
        let api = api();
        for (username, password) in [("", "x"), ("x", ""), ("   ", "secret"), ("alice", "   "), ("ab", "validpass"), ("alice", "abc")] {
            let err = api.authenticate(username, password).await.unwrap_err();
            assert!(
                matches!(err, ExpenseError::Validation(_)),
                "{username:?}/{password:?} gave {err:?}"
            );
        }
        assert!(api.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_non_array_response() {
        let api = api();
        api.backend().respond("GET users", json!({ "error": "nope" }));
        let err = api.authenticate("alice", "wonderland").await.unwrap_err();
        assert!(matches!(err, ExpenseError::DataFormat(_)));
    }

    #[tokio::test]
    async fn test_authenticate_missing_collection_is_not_found() {
        let api = api();
        api.backend().fail("GET users", ExpenseError::NotFound);
        let err = api.authenticate("alice", "wonderland").await.unwrap_err();
        assert!(matches!(err, ExpenseError::NotFound), "got {err:?}");
    }

    #[tokio::test]
    async fn test_list_expenses_normalizes_every_record() {
        let api = api();
        api.backend().insert_expense(json!({ "name": "Legacy", "amount": "19.99" }));
        api.backend().insert_expense(json!({ "title": "Null amount", "amount": null, "category": "Travel", "date": "2024-02-02" }));

        let expenses = api.list_expenses().await.unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].title, "Legacy");
        assert_eq!(expenses[0].amount, 19.99);
        assert_eq!(expenses[0].category, "Other");
        assert_eq!(expenses[0].date, Defaults::today().date);
        assert_eq!(expenses[1].amount, 0.0);
        assert_eq!(expenses[1].category, "Travel");
    }

    #[tokio::test]
    async fn test_list_expenses_rejects_non_array() {
        let api = api();
        api.backend().respond("GET expenses", json!({ "items": [] }));
        let err = api.list_expenses().await.unwrap_err();
        assert!(matches!(err, ExpenseError::DataFormat(_)));
    }

    #[tokio::test]
    async fn test_get_expense() {
        let api = api();
        let id = seed_coffee(&api);
        let expense = api.get_expense(&id).await.unwrap();
        assert_eq!(expense.title, "Coffee");
        assert_eq!(expense.amount, 4.5);
    }

    #[tokio::test]
    async fn test_get_expense_missing_is_not_found() {
        let api = api();
        let err = api.get_expense("missing-id").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_expense_blank_id_is_validation() {
        let api = api();
        let err = api.get_expense("  ").await.unwrap_err();
        assert!(matches!(err, ExpenseError::Validation(_)));
        assert!(api.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_expense_detects_duplicate() {
        let api = api();
        let existing_id = seed_coffee(&api);

        let err = api.create_expense(&coffee_draft()).await.unwrap_err();
        match err {
            ExpenseError::Duplicate(found) => {
                assert_eq!(found.id, existing_id);
                assert_eq!(found.title, "Coffee");
                assert_eq!(found.amount, 4.50);
                assert_eq!(found.category, "Food & Dining");
                assert_eq!(found.date, "2024-01-01");
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
        assert_eq!(api.backend().calls(), vec!["GET expenses"]);
        assert_eq!(api.backend().expense_count(), 1);
    }

    #[tokio::test]
    async fn test_force_create_skips_scan() {
        let api = api();
        let existing_id = seed_coffee(&api);

        let created = api.force_create_expense(&coffee_draft()).await.unwrap();
        assert_ne!(created.id, existing_id);
        assert_eq!(created.title, "coffee");
        assert_eq!(created.category, "Business");
        assert_eq!(created.description.as_deref(), None);
        assert_eq!(created.user_id.as_deref(), Some("1"));
        assert_eq!(api.backend().calls(), vec!["POST expenses"]);
        assert_eq!(api.backend().expense_count(), 2);
    }

    #[tokio::test]
    async fn test_create_expense_writes_after_clean_scan() {
        let api = api();
        seed_coffee(&api);

        let mut draft = coffee_draft();
        draft.date = "2024-01-02".to_string();
        let created = api.create_expense(&draft).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(api.backend().calls(), vec!["GET expenses", "POST expenses"]);
    }

    #[tokio::test]
    async fn test_create_expense_validation_precedes_network() {
        let api = api();
        let mut draft = coffee_draft();
        draft.amount = -1.0;
        let err = api.create_expense(&draft).await.unwrap_err();
        assert!(matches!(err, ExpenseError::Validation(_)));
        assert!(api.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_expense_scan_failure_blocks_write() {
        let api = api();
        api.backend().fail("GET expenses", ExpenseError::Timeout);
        let err = api.create_expense(&coffee_draft()).await.unwrap_err();
        assert!(matches!(err, ExpenseError::Timeout));
        assert_eq!(api.backend().calls(), vec!["GET expenses"]);
    }

    #[tokio::test]
    async fn test_create_expense_requires_returned_id() {
        let api = api();
        api.backend().respond("POST expenses", json!({ "title": "coffee" }));
        let err = api.force_create_expense(&coffee_draft()).await.unwrap_err();
        assert!(matches!(err, ExpenseError::DataFormat(_)));
    }

    #[tokio::test]
    async fn test_created_record_falls_back_to_draft() {
        let api = api();
        api.backend().respond("POST expenses", json!({ "id": "99", "amount": "4.501" }));
        let created = api.force_create_expense(&coffee_draft()).await.unwrap();
        assert_eq!(created.id, "99");
        assert_eq!(created.title, "coffee");
        assert_eq!(created.amount, 4.501);
        assert_eq!(created.category, "Business");
        assert_eq!(created.date, "2024-01-01");
    }

    #[tokio::test]
    async fn test_delete_expense() {
        let api = api();
        let id = seed_coffee(&api);
        api.delete_expense(&id).await.unwrap();
        assert_eq!(api.backend().expense_count(), 0);

        let err = api.delete_expense(&id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_expense_blank_id_issues_no_call() {
        let api = api();
        let err = api.delete_expense("").await.unwrap_err();
        assert!(matches!(err, ExpenseError::Validation(_)));
        assert!(api.backend().calls().is_empty());
    }
}
