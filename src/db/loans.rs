//! Borrow and return, the only multi-statement writes in the application.
//!
//! Both run inside an `IMMEDIATE` transaction. SQLite has no row-level
//! `SELECT ... FOR UPDATE`; taking the write lock before the availability
//! check gives the same outcome, so two desks can never both see and take
//! the last copy. Between the checks and the writes a [`LockGate`] is
//! consulted, which lets the UI hold the lock open while the operator
//! confirms.

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use tracing::{debug, info, warn};

use crate::db::books::{book_from_row, fetch_book, fetch_book_authors};
use crate::db::customers::{customer_from_row, fetch_customer};
use crate::error::{LibraryError, Result};
use crate::models::{BorrowReceipt, DueDate, LoanedBook, ReturnReceipt};

/// Shown to the operator while the rows are locked.
pub const LOCK_NOTICE: &str = "Locked the tuple(s), ready to update.\n Click OK to continue";

/// Decides whether a locked loan transaction goes on to write.
pub trait LockGate {
    /// Return `false` to roll the transaction back.
    fn proceed(&mut self, notice: &str) -> bool;
}

impl<F> LockGate for F
where
    F: FnMut(&str) -> bool,
{
    fn proceed(&mut self, notice: &str) -> bool {
        self(notice)
    }
}

/// Gate that never pauses.
#[derive(Debug, Default, Clone, Copy)]
pub struct Proceed;

impl LockGate for Proceed {
    fn proceed(&mut self, _notice: &str) -> bool {
        true
    }
}

/// Lend one copy of `isbn` to `customer_id`, due on `due`.
pub fn borrow_book(
    conn: &mut Connection,
    isbn: i64,
    customer_id: i64,
    due: DueDate,
    gate: &mut dyn LockGate,
) -> Result<BorrowReceipt> {
    run_locked(conn, "borrow", |tx| {
        let customer = tx
            .query_row(
                "SELECT customerid FROM customer WHERE customerid = ?1",
                params![customer_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        if customer.is_none() {
            return Err(LibraryError::CustomerNotFound(customer_id));
        }

        let num_left = tx
            .query_row(
                "SELECT numleft FROM book WHERE isbn = ?1",
                params![isbn],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        match num_left {
            None => return Err(LibraryError::BookNotFound(isbn)),
            Some(left) if left <= 0 => return Err(LibraryError::BookUnavailable(isbn)),
            Some(_) => {}
        }

        let on_loan = tx
            .query_row(
                "SELECT 1 FROM cust_book WHERE customerid = ?1 AND isbn = ?2",
                params![customer_id, isbn],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        if on_loan.is_some() {
            return Err(LibraryError::AlreadyOnLoan { isbn, customer_id });
        }

        if !gate.proceed(LOCK_NOTICE) {
            return Err(LibraryError::Cancelled);
        }

        tx.execute(
            "INSERT INTO cust_book (customerid, isbn, duedate) VALUES (?1, ?2, ?3)",
            params![customer_id, isbn, due.to_sql()],
        )?;
        tx.execute(
            "UPDATE book SET numleft = numleft - 1 WHERE isbn = ?1",
            params![isbn],
        )?;
        Ok(())
    })?;

    info!(isbn, customer_id, due = %due.to_sql(), "loan committed");

    let (title, customer_name) = receipt_names(conn, isbn, customer_id)?;
    Ok(BorrowReceipt {
        isbn,
        title,
        customer_id,
        customer_name,
        due,
    })
}

/// Take back the copy of `isbn` held by `customer_id`.
pub fn return_book(
    conn: &mut Connection,
    isbn: i64,
    customer_id: i64,
    gate: &mut dyn LockGate,
) -> Result<ReturnReceipt> {
    run_locked(conn, "return", |tx| {
        let deleted = tx.execute(
            "DELETE FROM cust_book WHERE customerid = ?1 AND isbn = ?2",
            params![customer_id, isbn],
        )?;
        if deleted == 0 {
            return Err(LibraryError::LoanNotFound { isbn, customer_id });
        }

        if !gate.proceed(LOCK_NOTICE) {
            return Err(LibraryError::Cancelled);
        }

        tx.execute(
            "UPDATE book SET numleft = numleft + 1 WHERE isbn = ?1",
            params![isbn],
        )?;
        Ok(())
    })?;

    info!(isbn, customer_id, "return committed");

    let (title, customer_name) = receipt_names(conn, isbn, customer_id)?;
    Ok(ReturnReceipt {
        isbn,
        title,
        customer_id,
        customer_name,
    })
}

/// Every book with at least one outstanding loan, ordered by ISBN, with its
/// authors and borrowers (ordered by customer id).
pub fn fetch_loaned_books(conn: &Connection) -> Result<Vec<LoanedBook>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT b.isbn, b.title, b.edition_no, b.numofcop, b.numleft
         FROM cust_book cb
         JOIN book b ON cb.isbn = b.isbn
         ORDER BY b.isbn",
    )?;
    let books = stmt
        .query_map([], |row| book_from_row(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut borrower_stmt = conn.prepare(
        "SELECT c.customerid, c.l_name, c.f_name, c.city
         FROM cust_book cb
         JOIN customer c ON cb.customerid = c.customerid
         WHERE cb.isbn = ?1
         ORDER BY c.customerid",
    )?;

    let mut loaned = Vec::with_capacity(books.len());
    for book in books {
        let authors = fetch_book_authors(conn, book.isbn)?;
        let borrowers = borrower_stmt
            .query_map(params![book.isbn], |row| customer_from_row(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        loaned.push(LoanedBook {
            book,
            authors,
            borrowers,
        });
    }

    Ok(loaned)
}

/// Open an immediate transaction, run `body`, and commit only if it
/// succeeds. Any error rolls back, leaving the connection in auto-commit.
fn run_locked<F>(conn: &mut Connection, operation: &str, body: F) -> Result<()>
where
    F: FnOnce(&Transaction<'_>) -> Result<()>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    debug!(operation, "acquired write lock");

    match body(&tx) {
        Ok(()) => {
            tx.commit()?;
            Ok(())
        }
        Err(err) => {
            warn!(operation, error = %err, "rolling back");
            if let Err(rollback_err) = tx.rollback() {
                warn!(operation, error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

/// Title and `L_Name F_Name` for a receipt, read after commit. Missing rows
/// yield empty strings rather than failing an already committed loan.
fn receipt_names(conn: &Connection, isbn: i64, customer_id: i64) -> Result<(String, String)> {
    let title = fetch_book(conn, isbn)?
        .map(|book| book.title)
        .unwrap_or_default();
    let customer_name = fetch_customer(conn, customer_id)?
        .map(|customer| customer.receipt_name())
        .unwrap_or_default();
    Ok((title, customer_name))
}
