//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use estante_core::ports::{BookSearch, BookStore, PasswordHasher};
use estante_core::{Accounts, Catalog, Shelf};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Accounts,
    pub catalog: Catalog,
    pub shelf: Shelf,
    /// Direct book lookups, used when joining shelf entries for display.
    pub books: Arc<dyn BookStore>,
    pub search: Arc<dyn BookSearch>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub config: Arc<Config>,
}
