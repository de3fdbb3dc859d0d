use rusqlite::{params, Connection};
use tracing::info;

use crate::error::Result;

const BOOKS: &[(i64, &str, i64, i64, i64)] = &[
    (1001, "Database Systems", 2, 3, 2),
    (1002, "The Rust Programming Language", 1, 2, 2),
    (1003, "Operating System Concepts", 9, 1, 0),
    (1004, "Unattributed Notes", 1, 1, 1),
];

const AUTHORS: &[(i64, &str, &str)] = &[
    (1, "Ramez", "Elmasri"),
    (2, "Shamkant", "Navathe"),
    (3, "Steve", "Klabnik"),
    (4, "Carol", "Nichols"),
    (5, "Abraham", "Silberschatz"),
    (6, "Jane", "Doe"),
];

/// `(isbn, authorid, authorseqno)`
const CREDITS: &[(i64, i64, i64)] = &[
    (1001, 1, 1),
    (1001, 2, 2),
    (1002, 3, 1),
    (1002, 4, 2),
    (1003, 5, 1),
];

const CUSTOMERS: &[(i64, &str, &str, Option<&str>)] = &[
    (1, "Jackson", "Kirk", Some("Wellington")),
    (2, "Smith", "Anna", Some("Auckland")),
    (3, "Ng", "Lee", None),
];

/// `(isbn, customerid, duedate)`; matches the copies already taken above.
const LOANS: &[(i64, i64, &str)] = &[(1001, 1, "2030-01-15"), (1003, 2, "2030-02-01")];

/// Load a small demonstration library. Does nothing and returns `false` when
/// any library table already holds a row.
pub fn seed_sample_data(conn: &Connection) -> Result<bool> {
    let tx = conn.unchecked_transaction()?;
    let occupied: bool = tx.query_row(
        "SELECT EXISTS (SELECT 1 FROM book)
             OR EXISTS (SELECT 1 FROM author)
             OR EXISTS (SELECT 1 FROM book_author)
             OR EXISTS (SELECT 1 FROM customer)
             OR EXISTS (SELECT 1 FROM cust_book)",
        [],
        |row| row.get(0),
    )?;
    if occupied {
        return Ok(false);
    }

    // Dropping `tx` on an insert error rolls everything back.
    insert_all(&tx)?;
    tx.commit()?;

    info!(
        books = BOOKS.len(),
        customers = CUSTOMERS.len(),
        "seeded sample library"
    );
    Ok(true)
}

fn insert_all(conn: &Connection) -> Result<()> {
    for (isbn, title, edition, copies, left) in BOOKS {
        conn.execute(
            "INSERT INTO book (isbn, title, edition_no, numofcop, numleft) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![isbn, title, edition, copies, left],
        )?;
    }
    for (id, name, surname) in AUTHORS {
        conn.execute(
            "INSERT INTO author (authorid, name, surname) VALUES (?1, ?2, ?3)",
            params![id, name, surname],
        )?;
    }
    for (isbn, author, seq) in CREDITS {
        conn.execute(
            "INSERT INTO book_author (isbn, authorid, authorseqno) VALUES (?1, ?2, ?3)",
            params![isbn, author, seq],
        )?;
    }
    for (id, l_name, f_name, city) in CUSTOMERS {
        conn.execute(
            "INSERT INTO customer (customerid, l_name, f_name, city) VALUES (?1, ?2, ?3, ?4)",
            params![id, l_name, f_name, city],
        )?;
    }
    for (isbn, customer, due) in LOANS {
        conn.execute(
            "INSERT INTO cust_book (isbn, customerid, duedate) VALUES (?1, ?2, ?3)",
            params![isbn, customer, due],
        )?;
    }
    Ok(())
}
