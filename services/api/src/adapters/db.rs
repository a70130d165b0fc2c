//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the storage ports from the `estante_core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use estante_core::domain::{Book, BookDraft, ReadingStatus, ShelfEntry, User, UserCredentials};
use estante_core::ports::{AccountStore, BookStore, PortError, PortResult, ShelfStore};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `AccountStore`, `BookStore`,
/// and `ShelfStore` ports against one shared connection pool.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// True when the error is Postgres signalling a unique-index violation.
fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    full_name: String,
    email: String,
    password_hash: String,
}
impl UserRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            full_name: self.full_name,
            email: self.email,
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct BookRecord {
    id: Uuid,
    title: String,
    authors: String,
    description: String,
    thumbnail: String,
    isbn: Option<String>,
    publisher: String,
    page_count: Option<i32>,
    published_date: String,
}
impl BookRecord {
    fn to_domain(self) -> Book {
        Book {
            id: self.id,
            title: self.title,
            authors: self.authors,
            description: self.description,
            thumbnail: self.thumbnail,
            isbn: self.isbn,
            publisher: self.publisher,
            page_count: self.page_count,
            published_date: self.published_date,
        }
    }
}

#[derive(FromRow)]
struct ShelfEntryRecord {
    id: Uuid,
    user_id: Uuid,
    book_id: Uuid,
    status: String,
    rating: Option<i32>,
    created_at: DateTime<Utc>,
}
impl ShelfEntryRecord {
    fn to_domain(self) -> PortResult<ShelfEntry> {
        let status = self.status.parse::<ReadingStatus>().map_err(|e| {
            // A row with an unknown status means the boundary validation
            // was bypassed; surface it loudly instead of guessing.
            PortError::Unexpected(e.to_string())
        })?;
        Ok(ShelfEntry {
            id: self.id,
            user_id: self.user_id,
            book_id: self.book_id,
            status,
            rating: self.rating,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `AccountStore` Implementation
//=========================================================================================

#[async_trait]
impl AccountStore for DbAdapter {
    async fn insert_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, full_name, email, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, full_name, email, password_hash",
        )
        .bind(Uuid::new_v4())
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::AlreadyExists(format!("email {email} is already registered"))
            } else {
                unexpected(e)
            }
        })?;
        let creds = record.to_domain();
        Ok(User {
            id: creds.user_id,
            full_name: creds.full_name,
            email: creds.email,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, full_name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        row.map(|(user_id,)| user_id)
            .ok_or_else(|| PortError::NotFound(format!("no active session {session_id}")))
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `BookStore` Implementation
//=========================================================================================

const BOOK_COLUMNS: &str =
    "id, title, authors, description, thumbnail, isbn, publisher, page_count, published_date";

#[async_trait]
impl BookStore for DbAdapter {
    async fn find_book_by_isbn(&self, isbn: &str) -> PortResult<Option<Book>> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE isbn = $1"
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(BookRecord::to_domain))
    }

    async fn find_book_by_title_and_authors(
        &self,
        title: &str,
        authors: &str,
    ) -> PortResult<Option<Book>> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE title = $1 AND authors = $2"
        ))
        .bind(title)
        .bind(authors)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(BookRecord::to_domain))
    }

    async fn get_book(&self, book_id: Uuid) -> PortResult<Option<Book>> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(BookRecord::to_domain))
    }

    async fn insert_book(&self, draft: &BookDraft) -> PortResult<Book> {
        let book = draft.materialize(Uuid::new_v4());
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "INSERT INTO books ({BOOK_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.authors)
        .bind(&book.description)
        .bind(&book.thumbnail)
        .bind(&book.isbn)
        .bind(&book.publisher)
        .bind(book.page_count)
        .bind(&book.published_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                // The partial unique index on isbn caught a concurrent
                // insert; the reconciliation engine retries as a lookup.
                PortError::Conflict(format!("book with ISBN {:?} already exists", book.isbn))
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }
}

//=========================================================================================
// `ShelfStore` Implementation
//=========================================================================================

const ENTRY_COLUMNS: &str = "id, user_id, book_id, status, rating, created_at";

#[async_trait]
impl ShelfStore for DbAdapter {
    async fn insert_entry(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        status: ReadingStatus,
    ) -> PortResult<ShelfEntry> {
        let record = sqlx::query_as::<_, ShelfEntryRecord>(&format!(
            "INSERT INTO shelf_entries (id, user_id, book_id, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(book_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn find_entry(&self, entry_id: Uuid) -> PortResult<Option<ShelfEntry>> {
        let record = sqlx::query_as::<_, ShelfEntryRecord>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM shelf_entries WHERE id = $1"
        ))
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(ShelfEntryRecord::to_domain).transpose()
    }

    async fn find_entry_by_user_and_book(
        &self,
        user_id: Uuid,
        book_id: Uuid,
    ) -> PortResult<Option<ShelfEntry>> {
        let record = sqlx::query_as::<_, ShelfEntryRecord>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM shelf_entries WHERE user_id = $1 AND book_id = $2"
        ))
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(ShelfEntryRecord::to_domain).transpose()
    }

    async fn list_entries_for_user(&self, user_id: Uuid) -> PortResult<Vec<ShelfEntry>> {
        let records = sqlx::query_as::<_, ShelfEntryRecord>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM shelf_entries WHERE user_id = $1 \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records
            .into_iter()
            .map(ShelfEntryRecord::to_domain)
            .collect()
    }

    async fn update_entry_status(
        &self,
        entry_id: Uuid,
        status: ReadingStatus,
    ) -> PortResult<Option<ShelfEntry>> {
        let record = sqlx::query_as::<_, ShelfEntryRecord>(&format!(
            "UPDATE shelf_entries SET status = $1 WHERE id = $2 RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(ShelfEntryRecord::to_domain).transpose()
    }

    async fn update_entry(
        &self,
        entry_id: Uuid,
        status: ReadingStatus,
        rating: Option<i32>,
    ) -> PortResult<Option<ShelfEntry>> {
        let record = sqlx::query_as::<_, ShelfEntryRecord>(&format!(
            "UPDATE shelf_entries SET status = $1, rating = $2 WHERE id = $3 \
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(rating)
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(ShelfEntryRecord::to_domain).transpose()
    }

    async fn delete_entry(&self, entry_id: Uuid) -> PortResult<Option<ShelfEntry>> {
        let record = sqlx::query_as::<_, ShelfEntryRecord>(&format!(
            "DELETE FROM shelf_entries WHERE id = $1 RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(ShelfEntryRecord::to_domain).transpose()
    }
}
