//! End-to-end walk through the three core services against the
//! in-memory store: register, reconcile a search hit, shelve it,
//! re-reconcile by ISBN, rate it, and remove it.

use std::sync::Arc;

use estante_core::domain::{BookDraft, ReadingStatus};
use estante_core::memory::MemoryStore;
use estante_core::{Accounts, Catalog, Shelf};

fn dune(title: &str) -> BookDraft {
    BookDraft {
        title: title.to_string(),
        authors: vec!["Frank Herbert".to_string()],
        description: Some("Paul Atreides on Arrakis.".to_string()),
        thumbnail: None,
        isbn: Some("9780441013593".to_string()),
        publisher: None,
        page_count: Some(412),
        published_date: Some("1965".to_string()),
    }
}

#[tokio::test]
async fn register_shelve_rate_and_remove() {
    let store = Arc::new(MemoryStore::new());
    let accounts = Accounts::new(store.clone());
    let catalog = Catalog::new(store.clone());
    let shelf = Shelf::new(store.clone());

    // Register Ana and look her back up.
    let ana = accounts
        .register("Ana", "ana@x.com", "argon2-hash-of-secret")
        .await
        .unwrap();
    let creds = accounts.find_by_email("ana@x.com").await.unwrap().unwrap();
    assert_eq!(creds.user_id, ana.id);

    // First sighting of Dune creates the canonical row.
    let book = catalog.get_or_create(&dune("Dune")).await.unwrap();
    assert_eq!(book.isbn.as_deref(), Some("9780441013593"));
    assert_eq!(store.book_count(), 1);

    // Shelve it as want-to-read.
    let entry = shelf
        .add_or_update(ana.id, book.id, ReadingStatus::WantToRead)
        .await
        .unwrap();
    assert_eq!(shelf.list_for_user(ana.id).await.unwrap().len(), 1);

    // A second sighting with a different title still resolves to the
    // same row: ISBN wins.
    let again = catalog
        .get_or_create(&dune("Dune: 40th Anniversary Edition"))
        .await
        .unwrap();
    assert_eq!(again.id, book.id);
    assert_eq!(again.title, "Dune");
    assert_eq!(store.book_count(), 1);

    // Finish the book and rate it.
    let rated = shelf
        .update(entry.id, ReadingStatus::Read, 5)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rated.status, ReadingStatus::Read);
    assert_eq!(rated.rating, Some(5));

    // Remove it; the shelf is empty and a second remove is a no-op.
    let removed = shelf.remove(entry.id).await.unwrap().unwrap();
    assert_eq!(removed.id, entry.id);
    assert!(shelf.list_for_user(ana.id).await.unwrap().is_empty());
    assert!(shelf.remove(entry.id).await.unwrap().is_none());
}
