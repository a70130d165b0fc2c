pub mod db;
pub mod google_books;
pub mod password;

pub use db::DbAdapter;
pub use google_books::GoogleBooksAdapter;
pub use password::Argon2Hasher;
