pub mod account;
pub mod catalog;
pub mod domain;
pub mod memory;
pub mod ports;
pub mod shelf;

pub use account::Accounts;
pub use catalog::Catalog;
pub use domain::{Book, BookDraft, ReadingStatus, ShelfEntry, User, UserCredentials};
pub use ports::{
    AccountStore, BookSearch, BookStore, PasswordHasher, PortError, PortResult, ShelfStore,
};
pub use shelf::Shelf;
