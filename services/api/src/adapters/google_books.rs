//! services/api/src/adapters/google_books.rs
//!
//! Implementation of the `BookSearch` port against the Google Books
//! volumes API. Responses are normalized into `BookDraft` records at
//! this boundary; nothing downstream ever sees the raw payload.

use async_trait::async_trait;
use estante_core::domain::BookDraft;
use estante_core::ports::{BookSearch, PortError, PortResult};
use serde::Deserialize;

/// Default title when the external record carries none.
const MISSING_TITLE: &str = "Título não encontrado";

/// The volumes endpoint returns at most 40 results per request.
const PAGE_CAP: usize = 40;

pub struct GoogleBooksAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksAdapter {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Deserialize, Default)]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    publisher: Option<String>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "pageCount")]
    page_count: Option<i32>,
    #[serde(rename = "imageLinks")]
    image_links: Option<ImageLinks>,
    #[serde(rename = "industryIdentifiers", default)]
    industry_identifiers: Vec<IndustryIdentifier>,
}

#[derive(Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
    #[serde(rename = "smallThumbnail")]
    small_thumbnail: Option<String>,
}

#[derive(Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

//=========================================================================================
// Normalization
//=========================================================================================

/// Picks the ISBN-13 when both identifiers are present, falling back to
/// the ISBN-10.
fn extract_isbn(identifiers: &[IndustryIdentifier]) -> Option<String> {
    let mut isbn_10 = None;
    let mut isbn_13 = None;
    for ident in identifiers {
        match ident.kind.as_str() {
            "ISBN_10" => isbn_10 = Some(ident.identifier.clone()),
            "ISBN_13" => isbn_13 = Some(ident.identifier.clone()),
            _ => {}
        }
    }
    isbn_13.or(isbn_10)
}

fn normalize(volume: Volume) -> BookDraft {
    let info = volume.volume_info;
    let thumbnail = info
        .image_links
        .and_then(|links| links.thumbnail.or(links.small_thumbnail));
    BookDraft {
        title: info.title.unwrap_or_else(|| MISSING_TITLE.to_string()),
        authors: info.authors,
        description: info.description,
        thumbnail,
        isbn: extract_isbn(&info.industry_identifiers),
        publisher: info.publisher,
        page_count: info.page_count,
        published_date: info.published_date,
    }
}

//=========================================================================================
// `BookSearch` Implementation
//=========================================================================================

#[async_trait]
impl BookSearch for GoogleBooksAdapter {
    async fn search(&self, query: &str, max_results: usize) -> PortResult<Vec<BookDraft>> {
        let mut params = vec![
            ("q", query.to_string()),
            ("maxResults", PAGE_CAP.min(max_results.max(1)).to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("books API request failed: {e}")))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(format!("books API returned an error: {e}")))?;

        let body: VolumesResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("books API payload was malformed: {e}")))?;

        Ok(body
            .items
            .into_iter()
            .map(normalize)
            .take(max_results)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(json: serde_json::Value) -> Volume {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn normalize_prefers_isbn_13() {
        let draft = normalize(volume(serde_json::json!({
            "volumeInfo": {
                "title": "Dune",
                "authors": ["Frank Herbert"],
                "industryIdentifiers": [
                    {"type": "ISBN_10", "identifier": "0441013597"},
                    {"type": "ISBN_13", "identifier": "9780441013593"}
                ]
            }
        })));
        assert_eq!(draft.isbn.as_deref(), Some("9780441013593"));
    }

    #[test]
    fn normalize_falls_back_to_isbn_10() {
        let draft = normalize(volume(serde_json::json!({
            "volumeInfo": {
                "title": "Dune",
                "industryIdentifiers": [
                    {"type": "ISBN_10", "identifier": "0441013597"},
                    {"type": "OTHER", "identifier": "OCLC:12345"}
                ]
            }
        })));
        assert_eq!(draft.isbn.as_deref(), Some("0441013597"));
    }

    #[test]
    fn normalize_takes_small_thumbnail_when_the_large_one_is_absent() {
        let draft = normalize(volume(serde_json::json!({
            "volumeInfo": {
                "title": "Dune",
                "imageLinks": {"smallThumbnail": "http://img/small.jpg"}
            }
        })));
        assert_eq!(draft.thumbnail.as_deref(), Some("http://img/small.jpg"));
    }

    #[test]
    fn normalize_handles_a_bare_volume() {
        let draft = normalize(volume(serde_json::json!({"volumeInfo": {}})));
        assert_eq!(draft.title, MISSING_TITLE);
        assert!(draft.authors.is_empty());
        assert_eq!(draft.isbn, None);
        assert_eq!(draft.thumbnail, None);
    }

    #[test]
    fn response_without_items_parses_to_empty() {
        let body: VolumesResponse = serde_json::from_value(serde_json::json!({
            "kind": "books#volumes",
            "totalItems": 0
        }))
        .unwrap();
        assert!(body.items.is_empty());
    }
}
