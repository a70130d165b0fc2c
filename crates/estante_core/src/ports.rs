//! crates/estante_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Book, BookDraft, ReadingStatus, ShelfEntry, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// A create lost a race against a concurrent insert of the same
    /// unique key. Callers are expected to re-run their lookup.
    #[error("Conflict on create: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a new user row. Must fail with `AlreadyExists` when the
    /// email is already taken, as a backstop behind the service-level
    /// lookup.
    async fn insert_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User>;

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>>;

    // --- Auth sessions (login cookies) ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a session id to its user, ignoring expired sessions.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_book_by_isbn(&self, isbn: &str) -> PortResult<Option<Book>>;

    /// Fallback identity lookup: exact match on (title, joined authors).
    async fn find_book_by_title_and_authors(
        &self,
        title: &str,
        authors: &str,
    ) -> PortResult<Option<Book>>;

    async fn get_book(&self, book_id: Uuid) -> PortResult<Option<Book>>;

    /// Inserts a new book row. Must fail with `Conflict` when another
    /// row already holds the same non-empty ISBN.
    async fn insert_book(&self, draft: &BookDraft) -> PortResult<Book>;
}

#[async_trait]
pub trait ShelfStore: Send + Sync {
    async fn insert_entry(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        status: ReadingStatus,
    ) -> PortResult<ShelfEntry>;

    async fn find_entry(&self, entry_id: Uuid) -> PortResult<Option<ShelfEntry>>;

    async fn find_entry_by_user_and_book(
        &self,
        user_id: Uuid,
        book_id: Uuid,
    ) -> PortResult<Option<ShelfEntry>>;

    /// Entries for one user, in insertion order.
    async fn list_entries_for_user(&self, user_id: Uuid) -> PortResult<Vec<ShelfEntry>>;

    /// Overwrites the status only; the stored rating is untouched.
    async fn update_entry_status(
        &self,
        entry_id: Uuid,
        status: ReadingStatus,
    ) -> PortResult<Option<ShelfEntry>>;

    /// Overwrites status and rating together.
    async fn update_entry(
        &self,
        entry_id: Uuid,
        status: ReadingStatus,
        rating: Option<i32>,
    ) -> PortResult<Option<ShelfEntry>>;

    /// Deletes the entry, returning the removed snapshot when it existed.
    async fn delete_entry(&self, entry_id: Uuid) -> PortResult<Option<ShelfEntry>>;
}

//=========================================================================================
// External Collaborator Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait BookSearch: Send + Sync {
    /// Runs a free-text query against the external catalog and returns
    /// up to `max_results` normalized descriptions.
    async fn search(&self, query: &str, max_results: usize) -> PortResult<Vec<BookDraft>>;
}

/// One-way password hashing. Pure functions over input strings; the
/// concrete algorithm lives behind this trait in an adapter.
pub trait PasswordHasher: Send + Sync {
    /// Produces a salted hash. Fails with `InvalidInput` on an empty
    /// password and never fails otherwise.
    fn hash(&self, password: &str) -> PortResult<String>;

    /// Returns false (never errors) on a mismatch or a malformed
    /// stored hash.
    fn verify(&self, password: &str, stored: &str) -> bool;
}
