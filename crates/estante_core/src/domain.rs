//! crates/estante_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Separator used when an authors list is flattened into a single
/// stored string. The joined string doubles as the fallback identity
/// key during reconciliation, so the join must preserve input order.
pub const AUTHORS_SEPARATOR: &str = ", ";

/// Placeholder stored when the external catalog gives no authors.
pub const UNKNOWN_AUTHOR: &str = "Desconhecido";

/// Placeholder stored when the external catalog gives no description.
pub const MISSING_DESCRIPTION: &str = "Descrição não disponível";

/// Placeholder for absent publisher / published date fields.
pub const MISSING_FIELD: &str = "—";

/// Represents a user - used throughout the app.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

// Only used internally for login - contains sensitive data.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
}

/// A canonical catalog entry. Created once by the reconciliation engine
/// and never mutated or deleted afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    /// Authors flattened with [`AUTHORS_SEPARATOR`], in input order.
    pub authors: String,
    pub description: String,
    pub thumbnail: String,
    /// Unique across all books when present.
    pub isbn: Option<String>,
    pub publisher: String,
    pub page_count: Option<i32>,
    pub published_date: String,
}

/// A normalized book description coming out of an external catalog
/// search, before it has been matched to (or stored as) a [`Book`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub page_count: Option<i32>,
    #[serde(default)]
    pub published_date: Option<String>,
}

impl BookDraft {
    /// The ISBN, treating an empty string the same as an absent field.
    /// An empty ISBN must never participate in matching.
    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref().filter(|s| !s.is_empty())
    }

    /// Authors joined in input order. Two drafts with the same authors
    /// in a different order produce different keys on purpose.
    pub fn joined_authors(&self) -> String {
        if self.authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            self.authors.join(AUTHORS_SEPARATOR)
        }
    }

    /// Builds the canonical row stored for this draft, filling absent
    /// optional fields with the documented placeholders. Every store
    /// implementation goes through here so the defaults live in one
    /// place.
    pub fn materialize(&self, id: Uuid) -> Book {
        Book {
            id,
            title: self.title.clone(),
            authors: self.joined_authors(),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
            thumbnail: self.thumbnail.clone().unwrap_or_default(),
            isbn: self.isbn().map(|s| s.to_string()),
            publisher: self
                .publisher
                .clone()
                .unwrap_or_else(|| MISSING_FIELD.to_string()),
            page_count: self.page_count,
            published_date: self
                .published_date
                .clone()
                .unwrap_or_else(|| MISSING_FIELD.to_string()),
        }
    }
}

/// One user's relationship to one book. At most one entry exists per
/// (user, book) pair, enforced by the shelf service's upsert.
#[derive(Debug, Clone, Serialize)]
pub struct ShelfEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub status: ReadingStatus,
    /// 1..=5 when present.
    pub rating: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Reading status of a shelf entry. Closed set; unknown strings are
/// rejected at the boundary rather than persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingStatus {
    #[serde(rename = "quero_ler")]
    WantToRead,
    #[serde(rename = "lendo")]
    Reading,
    #[serde(rename = "lido")]
    Read,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "quero_ler",
            ReadingStatus::Reading => "lendo",
            ReadingStatus::Read => "lido",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown reading status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ReadingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quero_ler" => Ok(ReadingStatus::WantToRead),
            "lendo" => Ok(ReadingStatus::Reading),
            "lido" => Ok(ReadingStatus::Read),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
