use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{Author, AuthorProfile};

/// All authors ordered by id.
pub fn fetch_authors(conn: &Connection) -> Result<Vec<Author>> {
    let mut stmt =
        conn.prepare("SELECT authorid, name, surname FROM author ORDER BY authorid")?;

    let authors = stmt
        .query_map([], |row| {
            Ok(Author {
                author_id: row.get(0)?,
                name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                surname: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(authors)
}

/// An author and the books they wrote, or `None` for an unknown id.
pub fn fetch_author_profile(conn: &Connection, author_id: i64) -> Result<Option<AuthorProfile>> {
    let author = conn
        .query_row(
            "SELECT authorid, name, surname FROM author WHERE authorid = ?1",
            params![author_id],
            |row| {
                Ok(Author {
                    author_id: row.get(0)?,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    surname: row.get(2)?,
                })
            },
        )
        .optional()?;

    let Some(author) = author else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT b.isbn, b.title
         FROM book_author ba
         JOIN book b ON ba.isbn = b.isbn
         WHERE ba.authorid = ?1
         ORDER BY b.isbn",
    )?;
    let books = stmt
        .query_map(params![author_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<(i64, String)>>>()?;

    Ok(Some(AuthorProfile { author, books }))
}

/// Delete an author; their `book_author` credits cascade away.
pub fn delete_author(conn: &Connection, author_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM author WHERE authorid = ?1",
        params![author_id],
    )?;
    Ok(deleted > 0)
}
