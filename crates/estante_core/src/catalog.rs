//! crates/estante_core/src/catalog.rs
//!
//! The catalog reconciliation engine: maps a normalized external book
//! description to exactly one canonical [`Book`] row, creating one when
//! no existing row matches.

use std::sync::Arc;

use crate::domain::{Book, BookDraft};
use crate::ports::{BookStore, PortError, PortResult};

/// Find-or-create over the [`BookStore`] port.
///
/// Matching policy, in strict order:
/// 1. exact ISBN match, when the draft carries a non-empty ISBN;
/// 2. exact (title, authors-joined-in-order) match;
/// 3. insert a new row from the draft.
///
/// ISBN wins even when a title+authors match also exists, so two rows
/// for the same work can coexist when their ISBNs differ. That tension
/// is accepted, not auto-merged.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn BookStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Resolves a draft to its canonical book, inserting one on a
    /// complete miss. Total except for storage failures.
    pub async fn get_or_create(&self, draft: &BookDraft) -> PortResult<Book> {
        if let Some(book) = self.lookup(draft).await? {
            return Ok(book);
        }

        match self.store.insert_book(draft).await {
            Ok(book) => Ok(book),
            // Lost a create race on the ISBN uniqueness constraint:
            // someone else just inserted, so the lookup now hits.
            Err(PortError::Conflict(_)) => match self.lookup(draft).await? {
                Some(book) => Ok(book),
                None => Err(PortError::Unexpected(
                    "book insert conflicted but no matching row was found".to_string(),
                )),
            },
            Err(e) => Err(e),
        }
    }

    async fn lookup(&self, draft: &BookDraft) -> PortResult<Option<Book>> {
        if let Some(isbn) = draft.isbn() {
            if let Some(book) = self.store.find_book_by_isbn(isbn).await? {
                return Ok(Some(book));
            }
        }
        self.store
            .find_book_by_title_and_authors(&draft.title, &draft.joined_authors())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn draft(title: &str, authors: &[&str], isbn: Option<&str>) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            description: None,
            thumbnail: None,
            isbn: isbn.map(|s| s.to_string()),
            publisher: None,
            page_count: None,
            published_date: None,
        }
    }

    fn catalog() -> (Catalog, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Catalog::new(store.clone()), store)
    }

    #[tokio::test]
    async fn same_isbn_reconciles_to_one_row() {
        let (catalog, store) = catalog();
        let d = draft("Dune", &["Frank Herbert"], Some("9780441013593"));

        let first = catalog.get_or_create(&d).await.unwrap();
        let second = catalog.get_or_create(&d).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.book_count(), 1);
    }

    #[tokio::test]
    async fn isbn_match_ignores_a_changed_title() {
        let (catalog, _store) = catalog();
        let original = draft("Dune", &["Frank Herbert"], Some("9780441013593"));
        let retitled = draft("Dune (Deluxe)", &["Frank Herbert"], Some("9780441013593"));

        let first = catalog.get_or_create(&original).await.unwrap();
        let second = catalog.get_or_create(&retitled).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.title, "Dune");
    }

    #[tokio::test]
    async fn title_and_authors_are_the_fallback_identity() {
        let (catalog, store) = catalog();
        let a = draft("Good Omens", &["Terry Pratchett", "Neil Gaiman"], None);
        let b = draft("Good Omens", &["Terry Pratchett", "Neil Gaiman"], None);

        let first = catalog.get_or_create(&a).await.unwrap();
        let second = catalog.get_or_create(&b).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.book_count(), 1);
    }

    #[tokio::test]
    async fn author_order_distinguishes_books() {
        let (catalog, store) = catalog();
        let a = draft("Good Omens", &["Terry Pratchett", "Neil Gaiman"], None);
        let b = draft("Good Omens", &["Neil Gaiman", "Terry Pratchett"], None);

        let first = catalog.get_or_create(&a).await.unwrap();
        let second = catalog.get_or_create(&b).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.book_count(), 2);
    }

    #[tokio::test]
    async fn empty_isbn_never_matches_by_isbn() {
        let (catalog, store) = catalog();
        let mut a = draft("Untitled", &["Anon"], None);
        a.isbn = Some(String::new());
        let b = draft("Other", &["Anon"], Some("1111111111"));

        catalog.get_or_create(&b).await.unwrap();
        let created = catalog.get_or_create(&a).await.unwrap();

        assert_eq!(created.isbn, None);
        assert_eq!(store.book_count(), 2);
    }

    #[tokio::test]
    async fn missing_optionals_default_to_placeholders() {
        use crate::domain::{MISSING_DESCRIPTION, MISSING_FIELD, UNKNOWN_AUTHOR};

        let (catalog, _store) = catalog();
        let book = catalog
            .get_or_create(&draft("Bare", &[], None))
            .await
            .unwrap();

        assert_eq!(book.authors, UNKNOWN_AUTHOR);
        assert_eq!(book.description, MISSING_DESCRIPTION);
        assert_eq!(book.publisher, MISSING_FIELD);
        assert_eq!(book.published_date, MISSING_FIELD);
        assert_eq!(book.thumbnail, "");
        assert_eq!(book.page_count, None);
    }

    /// A store whose first ISBN lookup misses and then seeds the row,
    /// simulating a concurrent writer landing between the engine's
    /// lookup and its insert.
    struct RacingStore {
        inner: MemoryStore,
        raced: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl BookStore for RacingStore {
        async fn find_book_by_isbn(&self, isbn: &str) -> PortResult<Option<Book>> {
            use std::sync::atomic::Ordering;
            if !self.raced.swap(true, Ordering::SeqCst) {
                // The racer's row carries the same ISBN under another
                // title, so only the ISBN index can catch the overlap.
                let d = draft("Dune: Deluxe Edition", &["Herbert, Frank"], Some(isbn));
                self.inner.insert_book(&d).await?;
                return Ok(None);
            }
            self.inner.find_book_by_isbn(isbn).await
        }

        async fn find_book_by_title_and_authors(
            &self,
            title: &str,
            authors: &str,
        ) -> PortResult<Option<Book>> {
            self.inner.find_book_by_title_and_authors(title, authors).await
        }

        async fn get_book(&self, book_id: uuid::Uuid) -> PortResult<Option<Book>> {
            self.inner.get_book(book_id).await
        }

        async fn insert_book(&self, draft: &BookDraft) -> PortResult<Book> {
            self.inner.insert_book(draft).await
        }
    }

    #[tokio::test]
    async fn conflict_on_create_is_retried_as_a_lookup() {
        let store = Arc::new(RacingStore {
            inner: MemoryStore::new(),
            raced: std::sync::atomic::AtomicBool::new(false),
        });
        let catalog = Catalog::new(store.clone());
        let d = draft("Dune", &["Frank Herbert"], Some("9780441013593"));

        // First lookup misses, the insert conflicts with the racer's
        // row, and the retry lookup returns the winner.
        let resolved = catalog.get_or_create(&d).await.unwrap();

        assert_eq!(resolved.isbn.as_deref(), Some("9780441013593"));
        assert_eq!(store.inner.book_count(), 1);
    }
}
