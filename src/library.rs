//! The library desk: one method per operation, each returning the text the
//! dialog shows. Failures never escape as errors; they are folded into the
//! operation's fallback message so a caller can always display something.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::db::{self, LockGate};
use crate::error::Result;
use crate::models::DueDate;
use crate::report;

pub struct Library {
    conn: Connection,
}

impl Library {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open the database file (creating it and its schema if needed).
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        Ok(Self::new(db::open_database(path, busy_timeout)?))
    }

    /// Empty library backed by an in-memory database.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(db::open_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Load the demonstration data set into an empty database.
    pub fn seed(&self) -> Result<bool> {
        db::seed_sample_data(&self.conn)
    }

    pub fn book_lookup(&self, isbn: i64) -> String {
        debug!(isbn, "book lookup");
        describe(
            db::fetch_book_entry(&self.conn, isbn),
            "Error executing query",
            |entry| report::book_lookup(isbn, entry.as_ref()),
        )
    }

    pub fn show_catalogue(&self) -> String {
        debug!("show catalogue");
        describe(
            db::fetch_catalogue(&self.conn),
            "Error executing query",
            |entries| report::catalogue(&entries),
        )
    }

    pub fn show_loaned_books(&self) -> String {
        debug!("show loaned books");
        describe(
            db::fetch_loaned_books(&self.conn),
            "Error loading loaned books",
            |loaned| report::loaned_books(&loaned),
        )
    }

    pub fn show_author(&self, author_id: i64) -> String {
        debug!(author_id, "show author");
        describe(
            db::fetch_author_profile(&self.conn, author_id),
            "Error showing author",
            |profile| report::author(author_id, profile.as_ref()),
        )
    }

    pub fn show_all_authors(&self) -> String {
        debug!("show all authors");
        describe(
            db::fetch_authors(&self.conn),
            "Error showing all authors",
            |authors| report::all_authors(&authors),
        )
    }

    pub fn show_customer(&self, customer_id: i64) -> String {
        debug!(customer_id, "show customer");
        describe(
            db::fetch_customer_profile(&self.conn, customer_id),
            "Error showing customer",
            |profile| report::customer(customer_id, profile.as_ref()),
        )
    }

    pub fn show_all_customers(&self) -> String {
        debug!("show all customers");
        describe(
            db::fetch_customers(&self.conn),
            "Error showing all customers",
            |customers| report::all_customers(&customers),
        )
    }

    /// Lend a copy. `month` is 1-based. The gate runs while the rows are
    /// locked and may cancel the loan.
    pub fn borrow_book(
        &mut self,
        isbn: i64,
        customer_id: i64,
        day: u32,
        month: u32,
        year: i32,
        gate: &mut dyn LockGate,
    ) -> String {
        debug!(isbn, customer_id, "borrow book");
        let outcome = DueDate::from_dmy(day, month, year)
            .and_then(|due| db::borrow_book(&mut self.conn, isbn, customer_id, due, gate));
        describe(outcome, "Error borrowing book", |receipt| {
            report::borrow_receipt(&receipt)
        })
    }

    /// Take back a copy. The gate runs while the rows are locked.
    pub fn return_book(&mut self, isbn: i64, customer_id: i64, gate: &mut dyn LockGate) -> String {
        debug!(isbn, customer_id, "return book");
        describe(
            db::return_book(&mut self.conn, isbn, customer_id, gate),
            "Error returning book",
            |receipt| report::return_receipt(&receipt),
        )
    }

    pub fn delete_customer(&self, customer_id: i64) -> String {
        let outcome = db::delete_customer(&self.conn, customer_id);
        if let Ok(true) = outcome {
            info!(customer_id, "customer removed");
        }
        describe(outcome, "Error deleting customer", |removed| {
            report::customer_deleted(customer_id, removed)
        })
    }

    pub fn delete_author(&self, author_id: i64) -> String {
        let outcome = db::delete_author(&self.conn, author_id);
        if let Ok(true) = outcome {
            info!(author_id, "author removed");
        }
        describe(outcome, "Error deleting Author", |removed| {
            report::author_deleted(author_id, removed)
        })
    }

    pub fn delete_book(&self, isbn: i64) -> String {
        let outcome = db::delete_book(&self.conn, isbn);
        if let Ok(true) = outcome {
            info!(isbn, "book removed");
        }
        describe(outcome, "Error deleting Book", |removed| {
            report::book_deleted(isbn, removed)
        })
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| err.into())
    }
}

/// Render a successful outcome, or `<prefix>: <error>` on failure.
fn describe<T>(outcome: Result<T>, prefix: &str, render: impl FnOnce(T) -> String) -> String {
    match outcome {
        Ok(value) => render(value),
        Err(err) => {
            warn!(error = %err, "{prefix}");
            format!("{prefix}: {err}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Proceed;

    fn seeded() -> Library {
        let library = Library::in_memory().unwrap();
        library.seed().unwrap();
        library
    }

    #[test]
    fn failures_become_fallback_messages() {
        let library = seeded();
        library
            .connection()
            .execute_batch("DROP TABLE cust_book")
            .unwrap();

        let text = library.show_loaned_books();
        assert!(text.starts_with("Error loading loaned books: "), "{text}");
        assert!(text.contains("cust_book"));
    }

    #[test]
    fn invalid_due_date_never_reaches_the_database() {
        let mut library = seeded();
        let text = library.borrow_book(1002, 3, 31, 4, 2031, &mut Proceed);
        assert_eq!(text, "Error borrowing book: Invalid due date: 2031-4-31");
        assert!(library.show_loaned_books().contains("1003: "));
        assert!(!library.show_customer(3).contains("1002"));
    }

    #[test]
    fn deleting_a_borrower_reports_the_constraint() {
        let library = seeded();
        let text = library.delete_customer(1);
        assert!(text.starts_with("Error deleting customer: "), "{text}");
        assert_eq!(library.delete_customer(3), "Customer: 3 removed");
        assert_eq!(library.delete_customer(3), "No customer found with ID: 3");
    }
}
