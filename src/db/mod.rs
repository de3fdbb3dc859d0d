//! Persistence module split across logical submodules. Each function wraps
//! one query (or one transaction) and returns typed rows; wording for the
//! dialogs lives in `report`.

mod authors;
mod books;
mod connection;
mod customers;
mod loans;
mod seed;

pub use authors::{delete_author, fetch_author_profile, fetch_authors};
pub use books::{delete_book, fetch_book, fetch_book_authors, fetch_book_entry, fetch_catalogue};
pub use connection::{ensure_schema, open_database, open_in_memory};
pub use customers::{delete_customer, fetch_customer, fetch_customer_profile, fetch_customers};
pub use loans::{borrow_book, fetch_loaned_books, return_book, LockGate, Proceed, LOCK_NOTICE};
pub use seed::seed_sample_data;
