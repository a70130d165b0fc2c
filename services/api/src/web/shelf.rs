//! services/api/src/web/shelf.rs
//!
//! Shelf endpoints: list the current user's shelf, add a search hit to
//! it (reconciling the book first), update status/rating, and remove.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use estante_core::domain::{Book, ReadingStatus, ShelfEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::search::BookDraftView;
use crate::web::{port_error_response, state::AppState};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct AddToShelfRequest {
    /// The normalized search hit, echoed back from GET /search.
    pub book: BookDraftView,
    /// "quero_ler", "lendo", or "lido".
    pub status: String,
}

fn default_rating() -> i32 {
    0
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateShelfRequest {
    pub status: String,
    /// 1..=5 stores a rating; 0 (the default) clears it.
    #[serde(default = "default_rating")]
    pub rating: i32,
}

#[derive(Serialize, ToSchema)]
pub struct BookView {
    pub id: Uuid,
    pub title: String,
    pub authors: String,
    pub description: String,
    pub thumbnail: String,
    pub isbn: Option<String>,
    pub publisher: String,
    pub page_count: Option<i32>,
    pub published_date: String,
}

impl From<Book> for BookView {
    fn from(b: Book) -> Self {
        Self {
            id: b.id,
            title: b.title,
            authors: b.authors,
            description: b.description,
            thumbnail: b.thumbnail,
            isbn: b.isbn,
            publisher: b.publisher,
            page_count: b.page_count,
            published_date: b.published_date,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ShelfEntryView {
    pub id: Uuid,
    pub status: String,
    pub rating: Option<i32>,
    pub added_at: DateTime<Utc>,
    pub book: BookView,
}

impl ShelfEntryView {
    fn new(entry: ShelfEntry, book: Book) -> Self {
        Self {
            id: entry.id,
            status: entry.status.as_str().to_string(),
            rating: entry.rating,
            added_at: entry.created_at,
            book: book.into(),
        }
    }
}

fn parse_status(raw: &str) -> Result<ReadingStatus, (StatusCode, String)> {
    raw.parse::<ReadingStatus>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

/// Joins an entry with its book row for display. A shelf entry always
/// references an existing book, so a miss here is a server-side bug.
async fn join_book(
    state: &AppState,
    entry: ShelfEntry,
) -> Result<ShelfEntryView, (StatusCode, String)> {
    let book = state
        .books
        .get_book(entry.book_id)
        .await
        .map_err(|e| {
            error!("Failed to load book for shelf entry: {:?}", e);
            port_error_response(e)
        })?
        .ok_or_else(|| {
            error!("Shelf entry {} references missing book {}", entry.id, entry.book_id);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        })?;
    Ok(ShelfEntryView::new(entry, book))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /shelf - The current user's shelf, in the order books were added.
#[utoipa::path(
    get,
    path = "/shelf",
    responses(
        (status = 200, description = "The user's shelf entries", body = [ShelfEntryView]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_shelf_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entries = state.shelf.list_for_user(user_id).await.map_err(|e| {
        error!("Failed to list shelf: {:?}", e);
        port_error_response(e)
    })?;

    let mut views = Vec::with_capacity(entries.len());
    for entry in entries {
        views.push(join_book(&state, entry).await?);
    }
    Ok(Json(views))
}

/// POST /shelf - Add a book to the shelf (or update its status).
///
/// The book payload is reconciled against the canonical catalog first,
/// so adding the same work twice never duplicates rows.
#[utoipa::path(
    post,
    path = "/shelf",
    request_body = AddToShelfRequest,
    responses(
        (status = 201, description = "Entry created or updated", body = ShelfEntryView),
        (status = 400, description = "Unknown status value"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn add_to_shelf_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<AddToShelfRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let status = parse_status(&req.status)?;

    let book = state
        .catalog
        .get_or_create(&req.book.into())
        .await
        .map_err(|e| {
            error!("Failed to reconcile book: {:?}", e);
            port_error_response(e)
        })?;

    let entry = state
        .shelf
        .add_or_update(user_id, book.id, status)
        .await
        .map_err(|e| {
            error!("Failed to upsert shelf entry: {:?}", e);
            port_error_response(e)
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ShelfEntryView::new(entry, book)),
    ))
}

/// PUT /shelf/{id} - Update status and rating of one entry.
#[utoipa::path(
    put,
    path = "/shelf/{id}",
    request_body = UpdateShelfRequest,
    params(("id" = Uuid, Path, description = "Shelf entry id")),
    responses(
        (status = 200, description = "Entry updated", body = ShelfEntryView),
        (status = 400, description = "Unknown status or rating above 5"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "No such entry for this user")
    )
)]
pub async fn update_shelf_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(entry_id): Path<Uuid>,
    Json(req): Json<UpdateShelfRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let status = parse_status(&req.status)?;
    require_ownership(&state, user_id, entry_id).await?;

    let updated = state
        .shelf
        .update(entry_id, status, req.rating)
        .await
        .map_err(|e| {
            error!("Failed to update shelf entry: {:?}", e);
            port_error_response(e)
        })?
        .ok_or_else(not_found)?;

    Ok(Json(join_book(&state, updated).await?))
}

/// DELETE /shelf/{id} - Remove one entry from the shelf.
#[utoipa::path(
    delete,
    path = "/shelf/{id}",
    params(("id" = Uuid, Path, description = "Shelf entry id")),
    responses(
        (status = 200, description = "Entry removed", body = ShelfEntryView),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "No such entry for this user")
    )
)]
pub async fn remove_from_shelf_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    require_ownership(&state, user_id, entry_id).await?;

    let removed = state
        .shelf
        .remove(entry_id)
        .await
        .map_err(|e| {
            error!("Failed to remove shelf entry: {:?}", e);
            port_error_response(e)
        })?
        .ok_or_else(not_found)?;

    Ok(Json(join_book(&state, removed).await?))
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Shelf entry not found".to_string())
}

/// Entries are partitioned by user: acting on another user's entry
/// answers 404, indistinguishable from a missing id.
async fn require_ownership(
    state: &AppState,
    user_id: Uuid,
    entry_id: Uuid,
) -> Result<(), (StatusCode, String)> {
    let entry = state.shelf.get(entry_id).await.map_err(|e| {
        error!("Failed to check entry ownership: {:?}", e);
        port_error_response(e)
    })?;
    match entry {
        Some(entry) if entry.user_id == user_id => Ok(()),
        _ => Err(not_found()),
    }
}
