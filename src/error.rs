//! Structured errors for the persistence layer.
//!
//! Query helpers return [`LibraryError`] so the facade can decide how each
//! failure is worded. The binary and the TUI keep using `anyhow` on top.

use std::io;

use thiserror::Error;

/// Everything that can go wrong while talking to the library database.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Driver-level failure (syntax, constraint, locking, I/O inside SQLite).
    #[error("{0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Customer does not exist.")]
    CustomerNotFound(i64),

    #[error("Book does not exist.")]
    BookNotFound(i64),

    /// The book exists but every copy is out.
    #[error("Book is not available.")]
    BookUnavailable(i64),

    #[error("Customer already has this book on loan.")]
    AlreadyOnLoan { isbn: i64, customer_id: i64 },

    #[error("No entry found in Cust_Book for the given customer and book.")]
    LoanNotFound { isbn: i64, customer_id: i64 },

    #[error("Invalid due date: {year}-{month}-{day}")]
    InvalidDueDate { day: u32, month: u32, year: i32 },

    /// The lock checkpoint declined to continue.
    #[error("Cancelled before update.")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used throughout the `db` module.
pub type Result<T> = std::result::Result<T, LibraryError>;
