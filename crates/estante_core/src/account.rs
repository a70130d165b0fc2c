//! crates/estante_core/src/account.rs
//!
//! The account directory: registration, email lookup, and the auth
//! sessions behind login cookies.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{User, UserCredentials};
use crate::ports::{AccountStore, PortError, PortResult};

#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn AccountStore>,
}

impl Accounts {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Registers a new user. The password must already be hashed by the
    /// caller; plaintext never reaches this service. Fails with
    /// `AlreadyExists` when the email is taken and `InvalidInput` when
    /// the name or email is blank.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(PortError::InvalidInput("full name is required".to_string()));
        }
        let email = normalize_email(email)?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(PortError::AlreadyExists(format!(
                "a user with email {email} already exists"
            )));
        }
        // The store's unique index backstops the lookup above against
        // concurrent registrations.
        self.store
            .insert_user(full_name, &email, password_hash)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let email = normalize_email(email)?;
        self.store.find_user_by_email(&email).await
    }

    // --- Auth sessions ---

    pub async fn open_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.store
            .create_auth_session(session_id, user_id, expires_at)
            .await
    }

    pub async fn validate_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.store.validate_auth_session(session_id).await
    }

    pub async fn close_session(&self, session_id: &str) -> PortResult<()> {
        self.store.delete_auth_session(session_id).await
    }
}

/// Emails are compared case-insensitively: trimmed and lowercased here,
/// once, before any store call.
fn normalize_email(email: &str) -> PortResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(PortError::InvalidInput(
            "a valid email address is required".to_string(),
        ));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn accounts() -> Accounts {
        Accounts::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn distinct_emails_register_independently() {
        let accounts = accounts();
        accounts.register("Ana", "ana@x.com", "h1").await.unwrap();
        accounts.register("Bia", "bia@x.com", "h2").await.unwrap();

        let ana = accounts.find_by_email("ana@x.com").await.unwrap().unwrap();
        assert_eq!(ana.full_name, "Ana");
        assert_eq!(ana.password_hash, "h1");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_without_a_second_row() {
        let accounts = accounts();
        let first = accounts.register("Ana", "ana@x.com", "h1").await.unwrap();

        let err = accounts
            .register("Ana Clone", "ana@x.com", "h2")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::AlreadyExists(_)));

        let found = accounts.find_by_email("ana@x.com").await.unwrap().unwrap();
        assert_eq!(found.user_id, first.id);
        assert_eq!(found.full_name, "Ana");
    }

    #[tokio::test]
    async fn email_comparison_ignores_case_and_whitespace() {
        let accounts = accounts();
        accounts.register("Ana", "Ana@X.com", "h1").await.unwrap();

        let err = accounts
            .register("Ana Again", "  ANA@x.COM ", "h2")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::AlreadyExists(_)));
        assert!(accounts
            .find_by_email("ana@x.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let accounts = accounts();
        assert!(matches!(
            accounts.register("   ", "ana@x.com", "h").await,
            Err(PortError::InvalidInput(_))
        ));
        assert!(matches!(
            accounts.register("Ana", "not-an-email", "h").await,
            Err(PortError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn sessions_expire_and_can_be_closed() {
        let accounts = accounts();
        let user = accounts.register("Ana", "ana@x.com", "h").await.unwrap();

        accounts
            .open_session("tok-live", user.id, Utc::now() + chrono::Duration::days(1))
            .await
            .unwrap();
        accounts
            .open_session("tok-dead", user.id, Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(accounts.validate_session("tok-live").await.unwrap(), user.id);
        assert!(accounts.validate_session("tok-dead").await.is_err());

        accounts.close_session("tok-live").await.unwrap();
        assert!(accounts.validate_session("tok-live").await.is_err());
    }
}
