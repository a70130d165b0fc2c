//! services/api/src/web/search.rs
//!
//! The catalog search endpoint: queries the external books API and
//! returns a page of normalized drafts, ready to be added to a shelf.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use estante_core::domain::BookDraft;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::{port_error_response, state::AppState};

/// Results shown per page.
const PER_PAGE: usize = 20;

/// Upper bound on how many results one search pulls from the API.
const MAX_RESULTS: usize = 120;

//=========================================================================================
// Request/Response Types
//=========================================================================================

fn default_search_by() -> String {
    "title".to_string()
}

fn default_page() -> usize {
    1
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub keyword: String,
    /// "title" or "author".
    #[serde(default = "default_search_by")]
    pub search_by: String,
    #[serde(default = "default_page")]
    pub page: usize,
}

/// A normalized search hit, as sent to the client. Mirrors the core's
/// `BookDraft` so the POST /shelf payload can echo it back unchanged.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct BookDraftView {
    pub title: String,
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<i32>,
    pub published_date: Option<String>,
}

impl From<BookDraft> for BookDraftView {
    fn from(d: BookDraft) -> Self {
        Self {
            title: d.title,
            authors: d.authors,
            description: d.description,
            thumbnail: d.thumbnail,
            isbn: d.isbn,
            publisher: d.publisher,
            page_count: d.page_count,
            published_date: d.published_date,
        }
    }
}

impl From<BookDraftView> for BookDraft {
    fn from(v: BookDraftView) -> Self {
        Self {
            title: v.title,
            authors: v.authors,
            description: v.description,
            thumbnail: v.thumbnail,
            isbn: v.isbn,
            publisher: v.publisher,
            page_count: v.page_count,
            published_date: v.published_date,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    pub keyword: String,
    pub books: Vec<BookDraftView>,
    pub total_books: usize,
    pub displayed_start: usize,
    pub displayed_end: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub per_page: usize,
}

//=========================================================================================
// Pagination
//=========================================================================================

/// Start/end indices and page count for one result page.
fn page_bounds(total: usize, page: usize) -> (usize, usize, usize) {
    let start = (page.max(1) - 1) * PER_PAGE;
    let end = (start + PER_PAGE).min(total);
    let total_pages = std::cmp::max(1, total.div_ceil(PER_PAGE));
    (start.min(total), end, total_pages)
}

//=========================================================================================
// Handler
//=========================================================================================

/// GET /search - Search the external catalog by title or author.
#[utoipa::path(
    get,
    path = "/search",
    params(
        ("keyword" = String, Query, description = "Search term"),
        ("search_by" = Option<String>, Query, description = "\"title\" (default) or \"author\""),
        ("page" = Option<usize>, Query, description = "1-based result page")
    ),
    responses(
        (status = 200, description = "One page of search results", body = SearchResponse),
        (status = 400, description = "Missing or empty keyword"),
        (status = 500, description = "External catalog failure")
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let keyword = params.keyword.trim();
    if keyword.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "keyword is required".to_string()));
    }

    let query = if params.search_by == "author" {
        format!("inauthor:\"{keyword}\"")
    } else {
        format!("intitle:\"{keyword}\"")
    };

    let results = state
        .search
        .search(&query, MAX_RESULTS)
        .await
        .map_err(|e| {
            error!("Catalog search failed: {:?}", e);
            port_error_response(e)
        })?;

    let total_books = results.len();
    let (start, end, total_pages) = page_bounds(total_books, params.page);
    let books: Vec<BookDraftView> = results
        .into_iter()
        .skip(start)
        .take(end - start)
        .map(BookDraftView::from)
        .collect();

    Ok(Json(SearchResponse {
        keyword: keyword.to_string(),
        books,
        total_books,
        displayed_start: if total_books == 0 { 0 } else { start + 1 },
        displayed_end: end,
        total_pages,
        current_page: params.page,
        per_page: PER_PAGE,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_cover_a_full_middle_page() {
        let (start, end, pages) = page_bounds(55, 2);
        assert_eq!((start, end), (20, 40));
        assert_eq!(pages, 3);
    }

    #[test]
    fn last_page_is_truncated() {
        let (start, end, pages) = page_bounds(55, 3);
        assert_eq!((start, end), (40, 55));
        assert_eq!(pages, 3);
    }

    #[test]
    fn empty_results_still_report_one_page() {
        let (start, end, pages) = page_bounds(0, 1);
        assert_eq!((start, end), (0, 0));
        assert_eq!(pages, 1);
    }

    #[test]
    fn page_past_the_end_yields_an_empty_slice() {
        let (start, end, _) = page_bounds(10, 5);
        assert_eq!(start, end);
    }
}
