use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::models::{Book, BookAuthor, CatalogueEntry};

/// Map the five `book` columns starting at `offset` into a [`Book`].
pub(crate) fn book_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Book> {
    Ok(Book {
        isbn: row.get(offset)?,
        title: row.get(offset + 1)?,
        edition_no: row.get(offset + 2)?,
        num_of_cop: row.get(offset + 3)?,
        num_left: row.get(offset + 4)?,
    })
}

/// One book row, or `None` when the ISBN is unknown.
pub fn fetch_book(conn: &Connection, isbn: i64) -> Result<Option<Book>> {
    let book = conn
        .query_row(
            "SELECT isbn, title, edition_no, numofcop, numleft FROM book WHERE isbn = ?1",
            params![isbn],
            |row| book_from_row(row, 0),
        )
        .optional()?;
    Ok(book)
}

/// Credited authors of one book in sequence order.
pub fn fetch_book_authors(conn: &Connection, isbn: i64) -> Result<Vec<BookAuthor>> {
    let mut stmt = conn.prepare(
        "SELECT a.name, a.surname, ba.authorseqno
         FROM book_author ba
         JOIN author a ON a.authorid = ba.authorid
         WHERE ba.isbn = ?1
         ORDER BY ba.authorseqno, a.authorid",
    )?;

    let authors = stmt
        .query_map(params![isbn], |row| {
            Ok(BookAuthor {
                name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                surname: row.get(1)?,
                seq_no: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(authors)
}

/// A single book with its authors, or `None` when the ISBN is unknown.
pub fn fetch_book_entry(conn: &Connection, isbn: i64) -> Result<Option<CatalogueEntry>> {
    let Some(book) = fetch_book(conn, isbn)? else {
        return Ok(None);
    };
    let authors = fetch_book_authors(conn, isbn)?;
    Ok(Some(CatalogueEntry { book, authors }))
}

/// Every book ordered by ISBN. The left join keeps author-less books; rows
/// for the same ISBN arrive consecutively and are folded into one entry.
pub fn fetch_catalogue(conn: &Connection) -> Result<Vec<CatalogueEntry>> {
    let mut stmt = conn.prepare(
        "SELECT b.isbn, b.title, b.edition_no, b.numofcop, b.numleft,
                a.name, a.surname, ba.authorseqno
         FROM book b
         LEFT JOIN book_author ba ON b.isbn = ba.isbn
         LEFT JOIN author a ON a.authorid = ba.authorid
         ORDER BY b.isbn, ba.authorseqno, a.authorid",
    )?;

    let mut rows = stmt.query([])?;
    let mut entries: Vec<CatalogueEntry> = Vec::new();

    while let Some(row) = rows.next()? {
        let book = book_from_row(row, 0)?;
        let surname: Option<String> = row.get(6)?;
        let author = match surname {
            Some(surname) => Some(BookAuthor {
                name: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                surname,
                seq_no: row.get(7)?,
            }),
            None => None,
        };

        let same_book = entries
            .last()
            .is_some_and(|entry| entry.book.isbn == book.isbn);
        if same_book {
            if let Some(entry) = entries.last_mut() {
                entry.authors.extend(author);
            }
        } else {
            entries.push(CatalogueEntry {
                book,
                authors: author.into_iter().collect(),
            });
        }
    }

    Ok(entries)
}

/// Delete a book row. Returns `false` when no book had that ISBN.
pub fn delete_book(conn: &Connection, isbn: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM book WHERE isbn = ?1", params![isbn])?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_in_memory, seed_sample_data};

    #[test]
    fn catalogue_groups_authors_under_each_book() {
        let conn = open_in_memory().unwrap();
        seed_sample_data(&conn).unwrap();

        let catalogue = fetch_catalogue(&conn).unwrap();
        let isbns: Vec<i64> = catalogue.iter().map(|entry| entry.book.isbn).collect();
        let mut sorted = isbns.clone();
        sorted.sort_unstable();
        assert_eq!(isbns, sorted);

        let database_systems = catalogue
            .iter()
            .find(|entry| entry.book.isbn == 1001)
            .unwrap();
        let seqs: Vec<i64> = database_systems.authors.iter().map(|a| a.seq_no).collect();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[test]
    fn books_without_authors_still_appear() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO book (isbn, title, edition_no, numofcop, numleft) VALUES (5, 'Anon', 1, 2, 2)",
            [],
        )
        .unwrap();

        let catalogue = fetch_catalogue(&conn).unwrap();
        assert_eq!(catalogue.len(), 1);
        assert!(catalogue[0].authors.is_empty());

        let entry = fetch_book_entry(&conn, 5).unwrap().unwrap();
        assert!(entry.authors.is_empty());
        assert!(fetch_book_entry(&conn, 6).unwrap().is_none());
    }

    #[test]
    fn shared_sequence_numbers_list_the_same_way_everywhere() {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO book (isbn, title, edition_no, numofcop, numleft) VALUES (7, 'Duet', 1, 1, 1);
             INSERT INTO author (authorid, name, surname) VALUES (9, 'Zed', 'Later');
             INSERT INTO author (authorid, name, surname) VALUES (8, 'Amy', 'Earlier');
             INSERT INTO book_author (isbn, authorid, authorseqno) VALUES (7, 9, 1);
             INSERT INTO book_author (isbn, authorid, authorseqno) VALUES (7, 8, 1);",
        )
        .unwrap();

        let surnames = |authors: &[BookAuthor]| -> Vec<String> {
            authors.iter().map(|a| a.surname.clone()).collect()
        };
        let catalogue = fetch_catalogue(&conn).unwrap();
        let lookup = fetch_book_authors(&conn, 7).unwrap();
        assert_eq!(surnames(&catalogue[0].authors), vec!["Earlier", "Later"]);
        assert_eq!(surnames(&lookup), surnames(&catalogue[0].authors));
    }

    #[test]
    fn delete_reports_whether_a_row_went_away() {
        let conn = open_in_memory().unwrap();
        seed_sample_data(&conn).unwrap();

        assert!(delete_book(&conn, 1004).unwrap());
        assert!(!delete_book(&conn, 1004).unwrap());
        assert!(fetch_book(&conn, 1004).unwrap().is_none());
    }
}
