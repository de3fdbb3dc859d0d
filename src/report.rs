//! Dialog text for every library operation. The functions are pure so the
//! exact layout (tabs, indents, placeholder lines) can be pinned by tests
//! without a database.

use crate::models::{
    Author, AuthorProfile, BookAuthor, BorrowReceipt, CatalogueEntry, Customer, CustomerProfile,
    LoanedBook, ReturnReceipt,
};

const INDENT: &str = "    ";
const INDENT2: &str = "        ";

/// Book detail with authors in sequence order, or the not-found line.
pub fn book_lookup(isbn: i64, entry: Option<&CatalogueEntry>) -> String {
    let Some(entry) = entry else {
        return format!("No book found with ISBN: {isbn}");
    };

    let book = &entry.book;
    let mut out = format!("ISBN: {isbn}\nBook Lookup:\n");
    out.push_str(&format!("\t{}: {}\n", book.isbn, book.title));
    out.push_str(&format!("\t{}\n", copies_line(entry)));
    out.push_str("\tAuthors:\n");
    if entry.authors.is_empty() {
        out.push_str("\t  (no authors)\n");
    }
    for author in &entry.authors {
        out.push_str(&format!(
            "\t  - {} (AuthorSeqNo: {})\n",
            author.full_name(),
            author.seq_no
        ));
    }
    out
}

/// Every book, separated by blank lines.
pub fn catalogue(entries: &[CatalogueEntry]) -> String {
    if entries.is_empty() {
        return "(No books in catalogue)".to_string();
    }

    let mut out = String::new();
    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&format!("{}: {}\n", entry.book.isbn, entry.book.title));
        out.push_str(&format!("\t{}\n", copies_line(entry)));
        if entry.authors.is_empty() {
            out.push_str("\t(no authors)\n");
        }
        for author in &entry.authors {
            out.push_str(&format!("\tAuthor: {}\n", author.full_name()));
        }
    }
    out
}

/// Books with outstanding loans and who holds each copy.
pub fn loaned_books(loaned: &[LoanedBook]) -> String {
    let mut out = String::from("Show Loaned Books:\n");
    if loaned.is_empty() {
        out.push_str("(No Loaned Books)");
        return out;
    }

    for item in loaned {
        let book = &item.book;
        out.push_str(&format!("{}: {}\n", book.isbn, book.title));
        out.push_str(&format!(
            "{INDENT}Edition: {} - Number of copies: {} - Copies left: {}\n",
            book.edition_no, book.num_of_cop, book.num_left
        ));
        out.push_str(&format!("{INDENT}Authors: {}\n", author_list(&item.authors)));
        out.push_str(&format!("{INDENT}Borrowers:\n"));
        for borrower in &item.borrowers {
            out.push_str(&format!("{INDENT2}{}\n", borrower_line(borrower)));
        }
    }
    out
}

/// One author and the books they wrote.
pub fn author(author_id: i64, profile: Option<&AuthorProfile>) -> String {
    let Some(profile) = profile else {
        return format!("Show Author:\n{INDENT}No such author ID: {author_id}");
    };

    let mut out = String::from("Show Author:\n");
    out.push_str(&format!(
        "{INDENT}{} - {}\n{INDENT}Book written:\n",
        profile.author.author_id,
        profile.author.full_name()
    ));
    if profile.books.is_empty() {
        out.push_str(&format!("{INDENT2}(no books written)\n"));
    }
    for (isbn, title) in &profile.books {
        out.push_str(&format!("{INDENT2}{isbn} - {title}\n"));
    }
    out
}

/// `id: surname, name` per author; a missing first name prints the surname alone.
pub fn all_authors(authors: &[Author]) -> String {
    let mut out = String::from("Show All Authors:\n");
    for author in authors {
        let name = if author.name.trim().is_empty() {
            author.surname.clone()
        } else {
            format!("{}, {}", author.surname, author.name)
        };
        out.push_str(&format!("{INDENT}{}: {name}\n", author.author_id));
    }
    out
}

/// One customer and their borrowed books.
pub fn customer(customer_id: i64, profile: Option<&CustomerProfile>) -> String {
    let Some(profile) = profile else {
        return format!("Show Customer:\n{INDENT}No such customer ID: {customer_id}");
    };

    let customer = &profile.customer;
    let mut out = String::from("Show Customer:\n");
    out.push_str(&format!(
        "{INDENT}{}: {} {} - {}\n{INDENT}Book Borrowed:\n",
        customer.customer_id,
        customer.f_name,
        customer.l_name,
        customer.city_or_placeholder()
    ));
    if profile.borrowed.is_empty() {
        out.push_str(&format!("{INDENT2}(No books borrowed)\n"));
    }
    for (isbn, title) in &profile.borrowed {
        out.push_str(&format!("{INDENT2}{isbn} - {title}\n"));
    }
    out
}

/// `id: l_name, f_name - city` per customer.
pub fn all_customers(customers: &[Customer]) -> String {
    let mut out = String::from("Show all Customers:\n");
    for customer in customers {
        out.push_str(&format!("{INDENT}{}\n", borrower_line(customer)));
    }
    out
}

/// Confirmation shown after a borrow commits.
pub fn borrow_receipt(receipt: &BorrowReceipt) -> String {
    format!(
        "Borrow Book:\n{INDENT}Book: {} ({})\n{INDENT}Loaned to: {} ({})\n{INDENT}Due Date: {}",
        receipt.isbn, receipt.title, receipt.customer_id, receipt.customer_name, receipt.due
    )
}

/// Confirmation shown after a return commits.
pub fn return_receipt(receipt: &ReturnReceipt) -> String {
    format!(
        "Return Book:\n{INDENT}Book: {} ({})\n{INDENT}Returned by: {} ({})",
        receipt.isbn, receipt.title, receipt.customer_id, receipt.customer_name
    )
}

/// Result line for a customer delete; `removed` is whether a row went away.
pub fn customer_deleted(customer_id: i64, removed: bool) -> String {
    if removed {
        format!("Customer: {customer_id} removed")
    } else {
        format!("No customer found with ID: {customer_id}")
    }
}

pub fn author_deleted(author_id: i64, removed: bool) -> String {
    if removed {
        format!("Author: {author_id} removed")
    } else {
        format!("No Author found with ID: {author_id}")
    }
}

pub fn book_deleted(isbn: i64, removed: bool) -> String {
    if removed {
        format!("Book: {isbn} removed")
    } else {
        format!("No Book found with isbn: {isbn}")
    }
}

fn copies_line(entry: &CatalogueEntry) -> String {
    format!(
        "Edition: {} - Number of copies: {} - Copies left: {}",
        entry.book.edition_no, entry.book.num_of_cop, entry.book.num_left
    )
}

fn author_list(authors: &[BookAuthor]) -> String {
    if authors.is_empty() {
        return "(no authors)".to_string();
    }
    authors
        .iter()
        .map(BookAuthor::full_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `<id>: <l_name>, <f_name> - <city>`
fn borrower_line(customer: &Customer) -> String {
    format!(
        "{}: {}, {} - {}",
        customer.customer_id,
        customer.l_name,
        customer.f_name,
        customer.city_or_placeholder()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, DueDate};

    fn book(isbn: i64, title: &str) -> Book {
        Book {
            isbn,
            title: title.to_string(),
            edition_no: 2,
            num_of_cop: 3,
            num_left: 1,
        }
    }

    fn credit(name: &str, surname: &str, seq_no: i64) -> BookAuthor {
        BookAuthor {
            name: name.to_string(),
            surname: surname.to_string(),
            seq_no,
        }
    }

    fn kirk() -> Customer {
        Customer {
            customer_id: 1,
            l_name: "Jackson".into(),
            f_name: "Kirk".into(),
            city: Some("Wellington".into()),
        }
    }

    #[test]
    fn book_lookup_layout() {
        let entry = CatalogueEntry {
            book: book(1001, "Database Systems"),
            authors: vec![credit("Ramez", "Elmasri", 1), credit("Shamkant", "Navathe", 2)],
        };
        assert_eq!(
            book_lookup(1001, Some(&entry)),
            "ISBN: 1001\nBook Lookup:\n\t1001: Database Systems\n\
             \tEdition: 2 - Number of copies: 3 - Copies left: 1\n\tAuthors:\n\
             \t  - Ramez Elmasri (AuthorSeqNo: 1)\n\
             \t  - Shamkant Navathe (AuthorSeqNo: 2)\n"
        );
        assert_eq!(book_lookup(7, None), "No book found with ISBN: 7");
    }

    #[test]
    fn catalogue_separates_books_with_blank_lines() {
        let entries = vec![
            CatalogueEntry {
                book: book(1, "One"),
                authors: vec![credit("A", "B", 1)],
            },
            CatalogueEntry {
                book: book(2, "Two"),
                authors: Vec::new(),
            },
        ];
        let text = catalogue(&entries);
        assert_eq!(
            text,
            "1: One\n\tEdition: 2 - Number of copies: 3 - Copies left: 1\n\tAuthor: A B\n\
             \n2: Two\n\tEdition: 2 - Number of copies: 3 - Copies left: 1\n\t(no authors)\n"
        );
        assert_eq!(catalogue(&[]), "(No books in catalogue)");
    }

    #[test]
    fn loaned_books_layout() {
        let mut no_city = kirk();
        no_city.customer_id = 3;
        no_city.city = None;
        let loaned = vec![LoanedBook {
            book: book(1001, "Database Systems"),
            authors: vec![credit("Ramez", "Elmasri", 1), credit("Shamkant", "Navathe", 2)],
            borrowers: vec![kirk(), no_city],
        }];
        assert_eq!(
            loaned_books(&loaned),
            "Show Loaned Books:\n1001: Database Systems\n\
             \x20   Edition: 2 - Number of copies: 3 - Copies left: 1\n\
             \x20   Authors: Ramez Elmasri, Shamkant Navathe\n\
             \x20   Borrowers:\n\
             \x20       1: Jackson, Kirk - Wellington\n\
             \x20       3: Jackson, Kirk - (no city)\n"
        );
        assert_eq!(loaned_books(&[]), "Show Loaned Books:\n(No Loaned Books)");
    }

    #[test]
    fn author_and_customer_placeholders() {
        let profile = AuthorProfile {
            author: Author {
                author_id: 6,
                name: "Jane".into(),
                surname: "Doe".into(),
            },
            books: Vec::new(),
        };
        assert_eq!(
            author(6, Some(&profile)),
            "Show Author:\n    6 - Jane Doe\n    Book written:\n        (no books written)\n"
        );
        assert_eq!(author(9, None), "Show Author:\n    No such author ID: 9");

        let profile = CustomerProfile {
            customer: kirk(),
            borrowed: vec![(1003, "OS".into()), (1001, "DB".into())],
        };
        assert_eq!(
            customer(1, Some(&profile)),
            "Show Customer:\n    1: Kirk Jackson - Wellington\n    Book Borrowed:\n\
             \x20       1003 - OS\n        1001 - DB\n"
        );
        let idle = CustomerProfile {
            customer: kirk(),
            borrowed: Vec::new(),
        };
        assert!(customer(1, Some(&idle)).ends_with("        (No books borrowed)\n"));
        assert_eq!(customer(4, None), "Show Customer:\n    No such customer ID: 4");
    }

    #[test]
    fn directory_listings() {
        let authors = vec![
            Author {
                author_id: 1,
                name: "Ramez".into(),
                surname: "Elmasri".into(),
            },
            Author {
                author_id: 2,
                name: String::new(),
                surname: "Plato".into(),
            },
        ];
        assert_eq!(
            all_authors(&authors),
            "Show All Authors:\n    1: Elmasri, Ramez\n    2: Plato\n"
        );
        assert_eq!(
            all_customers(&[kirk()]),
            "Show all Customers:\n    1: Jackson, Kirk - Wellington\n"
        );
    }

    #[test]
    fn receipts() {
        let receipt = BorrowReceipt {
            isbn: 1002,
            title: "Rust".into(),
            customer_id: 3,
            customer_name: "Ng Lee".into(),
            due: DueDate::from_dmy(1, 12, 2030).unwrap(),
        };
        assert_eq!(
            borrow_receipt(&receipt),
            "Borrow Book:\n    Book: 1002 (Rust)\n    Loaned to: 3 (Ng Lee)\n    Due Date: 01 Dec 2030"
        );

        let receipt = ReturnReceipt {
            isbn: 1002,
            title: "Rust".into(),
            customer_id: 3,
            customer_name: "Ng Lee".into(),
        };
        assert_eq!(
            return_receipt(&receipt),
            "Return Book:\n    Book: 1002 (Rust)\n    Returned by: 3 (Ng Lee)"
        );
    }

    #[test]
    fn delete_outcomes() {
        assert_eq!(customer_deleted(3, true), "Customer: 3 removed");
        assert_eq!(customer_deleted(3, false), "No customer found with ID: 3");
        assert_eq!(author_deleted(2, false), "No Author found with ID: 2");
        assert_eq!(book_deleted(9, false), "No Book found with isbn: 9");
    }
}
