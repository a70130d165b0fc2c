//! crates/estante_core/src/memory.rs
//!
//! An in-memory implementation of the storage ports. Backs the core
//! service tests and local experiments, so nothing here needs Postgres.
//! Behavior mirrors the SQL adapter: unique email, unique non-empty
//! ISBN, expired auth sessions treated as absent, insertion order kept.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Book, BookDraft, ReadingStatus, ShelfEntry, User, UserCredentials};
use crate::ports::{AccountStore, BookStore, PortError, PortResult, ShelfStore};

#[derive(Default)]
struct Tables {
    users: Vec<UserCredentials>,
    books: Vec<Book>,
    entries: Vec<ShelfEntry>,
    auth_sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of book rows, exposed for reconciliation tests.
    pub fn book_count(&self) -> usize {
        self.tables.lock().unwrap().books.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(PortError::AlreadyExists(format!(
                "email {email} is already registered"
            )));
        }
        let user = UserCredentials {
            user_id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.push(user.clone());
        Ok(User {
            id: user.user_id,
            full_name: user.full_name,
            email: user.email,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        tables
            .auth_sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let tables = self.tables.lock().unwrap();
        match tables.auth_sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::NotFound(format!(
                "no active session {session_id}"
            ))),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.auth_sessions.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn find_book_by_isbn(&self, isbn: &str) -> PortResult<Option<Book>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .books
            .iter()
            .find(|b| b.isbn.as_deref() == Some(isbn))
            .cloned())
    }

    async fn find_book_by_title_and_authors(
        &self,
        title: &str,
        authors: &str,
    ) -> PortResult<Option<Book>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .books
            .iter()
            .find(|b| b.title == title && b.authors == authors)
            .cloned())
    }

    async fn get_book(&self, book_id: Uuid) -> PortResult<Option<Book>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.books.iter().find(|b| b.id == book_id).cloned())
    }

    async fn insert_book(&self, draft: &BookDraft) -> PortResult<Book> {
        let mut tables = self.tables.lock().unwrap();
        let book = draft.materialize(Uuid::new_v4());
        if let Some(isbn) = &book.isbn {
            if tables.books.iter().any(|b| b.isbn.as_ref() == Some(isbn)) {
                return Err(PortError::Conflict(format!(
                    "a book with ISBN {isbn} already exists"
                )));
            }
        }
        tables.books.push(book.clone());
        Ok(book)
    }
}

#[async_trait]
impl ShelfStore for MemoryStore {
    async fn insert_entry(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        status: ReadingStatus,
    ) -> PortResult<ShelfEntry> {
        let mut tables = self.tables.lock().unwrap();
        let entry = ShelfEntry {
            id: Uuid::new_v4(),
            user_id,
            book_id,
            status,
            rating: None,
            created_at: Utc::now(),
        };
        tables.entries.push(entry.clone());
        Ok(entry)
    }

    async fn find_entry(&self, entry_id: Uuid) -> PortResult<Option<ShelfEntry>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.entries.iter().find(|e| e.id == entry_id).cloned())
    }

    async fn find_entry_by_user_and_book(
        &self,
        user_id: Uuid,
        book_id: Uuid,
    ) -> PortResult<Option<ShelfEntry>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .entries
            .iter()
            .find(|e| e.user_id == user_id && e.book_id == book_id)
            .cloned())
    }

    async fn list_entries_for_user(&self, user_id: Uuid) -> PortResult<Vec<ShelfEntry>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_entry_status(
        &self,
        entry_id: Uuid,
        status: ReadingStatus,
    ) -> PortResult<Option<ShelfEntry>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.entries.iter_mut().find(|e| e.id == entry_id).map(
            |entry| {
                entry.status = status;
                entry.clone()
            },
        ))
    }

    async fn update_entry(
        &self,
        entry_id: Uuid,
        status: ReadingStatus,
        rating: Option<i32>,
    ) -> PortResult<Option<ShelfEntry>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.entries.iter_mut().find(|e| e.id == entry_id).map(
            |entry| {
                entry.status = status;
                entry.rating = rating;
                entry.clone()
            },
        ))
    }

    async fn delete_entry(&self, entry_id: Uuid) -> PortResult<Option<ShelfEntry>> {
        let mut tables = self.tables.lock().unwrap();
        let position = tables.entries.iter().position(|e| e.id == entry_id);
        Ok(position.map(|i| tables.entries.remove(i)))
    }
}
