//! Plain data holders that mirror the library schema. Query helpers in `db`
//! hydrate them and the `report` module turns them into dialog text, so the
//! types stay free of persistence and presentation concerns.

use std::fmt;

use chrono::NaiveDate;

use crate::error::{LibraryError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of the `book` table.
pub struct Book {
    pub isbn: i64,
    pub title: String,
    pub edition_no: i64,
    /// Total copies owned by the library.
    pub num_of_cop: i64,
    /// Copies currently on the shelf. Never negative and never above
    /// `num_of_cop`; the schema enforces both bounds.
    pub num_left: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub author_id: i64,
    pub name: String,
    pub surname: String,
}

impl Author {
    /// `Name Surname`, dropping the space when the first name is blank.
    pub fn full_name(&self) -> String {
        join_names(&self.name, &self.surname)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An author as credited on a particular book.
pub struct BookAuthor {
    pub name: String,
    pub surname: String,
    /// Position of the author in the book's credits.
    pub seq_no: i64,
}

impl BookAuthor {
    pub fn full_name(&self) -> String {
        join_names(&self.name, &self.surname)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub customer_id: i64,
    pub l_name: String,
    pub f_name: String,
    pub city: Option<String>,
}

impl Customer {
    /// The `L_Name F_Name` ordering used on loan receipts.
    pub fn receipt_name(&self) -> String {
        join_names(&self.l_name, &self.f_name)
    }

    pub fn city_or_placeholder(&self) -> &str {
        match self.city.as_deref() {
            Some(city) if !city.trim().is_empty() => city,
            _ => "(no city)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A book together with its credited authors in sequence order.
pub struct CatalogueEntry {
    pub book: Book,
    pub authors: Vec<BookAuthor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A book that has at least one outstanding loan.
pub struct LoanedBook {
    pub book: Book,
    pub authors: Vec<BookAuthor>,
    pub borrowers: Vec<Customer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorProfile {
    pub author: Author,
    /// `(isbn, title)` pairs ordered by ISBN.
    pub books: Vec<(i64, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerProfile {
    pub customer: Customer,
    /// `(isbn, title)` pairs ordered by ISBN, highest first.
    pub borrowed: Vec<(i64, String)>,
}

/// A validated calendar date for a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DueDate(NaiveDate);

impl DueDate {
    /// Build a due date from a 1-based month. Impossible dates (31 February,
    /// month 13) are rejected before anything touches the database.
    pub fn from_dmy(day: u32, month: u32, year: i32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(LibraryError::InvalidDueDate { day, month, year })
    }

    /// ISO `YYYY-MM-DD`, the form stored in `cust_book.duedate`.
    pub fn to_sql(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DueDate {
    /// `dd Mon yyyy`, e.g. `05 Mar 2025`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d %b %Y"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What a committed borrow reports back.
pub struct BorrowReceipt {
    pub isbn: i64,
    pub title: String,
    pub customer_id: i64,
    pub customer_name: String,
    pub due: DueDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub isbn: i64,
    pub title: String,
    pub customer_id: i64,
    pub customer_name: String,
}

fn join_names(first: &str, second: &str) -> String {
    match (first.trim().is_empty(), second.trim().is_empty()) {
        (true, _) => second.to_string(),
        (false, true) => first.to_string(),
        (false, false) => format!("{first} {second}"),
    }
}
