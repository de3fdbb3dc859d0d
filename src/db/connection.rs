use std::fs;
use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Open (or create) the SQLite file at `path`, run the lazy migrations, and
/// return a live connection. Foreign keys are switched on so deletes behave
/// the same in tests and production, and the busy timeout lets a second
/// process queue behind an in-flight loan instead of failing straight away.
pub fn open_database(path: &Path, busy_timeout: Duration) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    conn.busy_timeout(busy_timeout)?;
    debug!(path = %path.display(), "opened library database");
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Fresh in-memory database with the full schema. Used by tests and by the
/// CLI smoke paths that should not touch the user's data.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create every table if it is missing. Safe to call on each start-up.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS book (
            isbn INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            edition_no INTEGER NOT NULL DEFAULT 1,
            numofcop INTEGER NOT NULL DEFAULT 1,
            numleft INTEGER NOT NULL DEFAULT 1,
            CHECK (numleft >= 0 AND numleft <= numofcop)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS author (
            authorid INTEGER PRIMARY KEY,
            name TEXT,
            surname TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS book_author (
            isbn INTEGER NOT NULL,
            authorid INTEGER NOT NULL,
            authorseqno INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (isbn, authorid),
            FOREIGN KEY(isbn) REFERENCES book(isbn) ON DELETE CASCADE,
            FOREIGN KEY(authorid) REFERENCES author(authorid) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS customer (
            customerid INTEGER PRIMARY KEY,
            l_name TEXT NOT NULL,
            f_name TEXT,
            city TEXT
        )",
        [],
    )?;

    // No cascade here: a customer or book with copies out must not vanish.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS cust_book (
            isbn INTEGER NOT NULL,
            duedate TEXT,
            customerid INTEGER NOT NULL,
            PRIMARY KEY (customerid, isbn),
            FOREIGN KEY(isbn) REFERENCES book(isbn),
            FOREIGN KEY(customerid) REFERENCES customer(customerid)
        )",
        [],
    )?;

    Ok(())
}
