//! crates/estante_core/src/shelf.rs
//!
//! The shelf management service: one user's (book, status, rating)
//! associations, with at most one entry per (user, book) pair.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{ReadingStatus, ShelfEntry};
use crate::ports::{PortError, PortResult, ShelfStore};

#[derive(Clone)]
pub struct Shelf {
    store: Arc<dyn ShelfStore>,
}

impl Shelf {
    pub fn new(store: Arc<dyn ShelfStore>) -> Self {
        Self { store }
    }

    /// Upsert: overwrites the status of the existing (user, book) entry
    /// when there is one, leaving its rating alone; otherwise creates a
    /// fresh entry with no rating.
    pub async fn add_or_update(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        status: ReadingStatus,
    ) -> PortResult<ShelfEntry> {
        match self
            .store
            .find_entry_by_user_and_book(user_id, book_id)
            .await?
        {
            Some(existing) => self
                .store
                .update_entry_status(existing.id, status)
                .await?
                .ok_or_else(|| {
                    PortError::Unexpected(format!(
                        "shelf entry {} vanished during upsert",
                        existing.id
                    ))
                }),
            None => self.store.insert_entry(user_id, book_id, status).await,
        }
    }

    /// All of a user's entries, in insertion order.
    pub async fn list_for_user(&self, user_id: Uuid) -> PortResult<Vec<ShelfEntry>> {
        self.store.list_entries_for_user(user_id).await
    }

    /// One entry by id, regardless of owner. Callers enforce ownership.
    pub async fn get(&self, entry_id: Uuid) -> PortResult<Option<ShelfEntry>> {
        self.store.find_entry(entry_id).await
    }

    /// Sets status and rating on an existing entry. A rating of zero or
    /// below clears the stored rating; 1..=5 is stored; anything above 5
    /// is rejected. A missing entry is reported as `Ok(None)`, never as
    /// an error.
    pub async fn update(
        &self,
        entry_id: Uuid,
        status: ReadingStatus,
        rating: i32,
    ) -> PortResult<Option<ShelfEntry>> {
        if rating > 5 {
            return Err(PortError::InvalidInput(format!(
                "rating must be between 1 and 5, got {rating}"
            )));
        }
        let rating = if rating > 0 { Some(rating) } else { None };
        self.store.update_entry(entry_id, status, rating).await
    }

    /// Deletes the entry, returning the removed snapshot. Removing an
    /// already-removed entry reports `Ok(None)`.
    pub async fn remove(&self, entry_id: Uuid) -> PortResult<Option<ShelfEntry>> {
        self.store.delete_entry(entry_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn shelf() -> Shelf {
        Shelf::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn add_twice_yields_one_entry_with_the_latest_status() {
        let shelf = shelf();
        let (user, book) = (Uuid::new_v4(), Uuid::new_v4());

        let first = shelf
            .add_or_update(user, book, ReadingStatus::Reading)
            .await
            .unwrap();
        let second = shelf
            .add_or_update(user, book, ReadingStatus::Read)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, ReadingStatus::Read);
        assert_eq!(shelf.list_for_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upsert_leaves_an_existing_rating_alone() {
        let shelf = shelf();
        let (user, book) = (Uuid::new_v4(), Uuid::new_v4());

        let entry = shelf
            .add_or_update(user, book, ReadingStatus::Reading)
            .await
            .unwrap();
        shelf
            .update(entry.id, ReadingStatus::Reading, 4)
            .await
            .unwrap();

        let updated = shelf
            .add_or_update(user, book, ReadingStatus::Read)
            .await
            .unwrap();
        assert_eq!(updated.rating, Some(4));
    }

    #[tokio::test]
    async fn zero_rating_clears_a_stored_rating() {
        let shelf = shelf();
        let (user, book) = (Uuid::new_v4(), Uuid::new_v4());

        let entry = shelf
            .add_or_update(user, book, ReadingStatus::Read)
            .await
            .unwrap();
        shelf.update(entry.id, ReadingStatus::Read, 5).await.unwrap();
        let cleared = shelf
            .update(entry.id, ReadingStatus::Read, 0)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(cleared.rating, None);
    }

    #[tokio::test]
    async fn rating_above_five_is_rejected() {
        let shelf = shelf();
        let (user, book) = (Uuid::new_v4(), Uuid::new_v4());
        let entry = shelf
            .add_or_update(user, book, ReadingStatus::Read)
            .await
            .unwrap();

        let err = shelf
            .update(entry.id, ReadingStatus::Read, 6)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn update_on_a_missing_entry_is_a_no_op() {
        let shelf = shelf();
        let result = shelf
            .update(Uuid::new_v4(), ReadingStatus::Read, 3)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let shelf = shelf();
        let (user, book) = (Uuid::new_v4(), Uuid::new_v4());
        let entry = shelf
            .add_or_update(user, book, ReadingStatus::WantToRead)
            .await
            .unwrap();

        let removed = shelf.remove(entry.id).await.unwrap();
        assert_eq!(removed.map(|e| e.id), Some(entry.id));
        assert!(shelf.remove(entry.id).await.unwrap().is_none());
        assert!(shelf.list_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_keeps_insertion_order() {
        let shelf = shelf();
        let user = Uuid::new_v4();
        let books: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();

        for book in &books {
            shelf
                .add_or_update(user, *book, ReadingStatus::WantToRead)
                .await
                .unwrap();
        }

        let listed: Vec<Uuid> = shelf
            .list_for_user(user)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.book_id)
            .collect();
        assert_eq!(listed, books);
    }
}
