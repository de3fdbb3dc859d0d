use anyhow::{anyhow, Context, Result};

/// Every entry in the main menu, in display order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    BookLookup,
    Catalogue,
    LoanedBooks,
    ShowAuthor,
    AllAuthors,
    ShowCustomer,
    AllCustomers,
    BorrowBook,
    ReturnBook,
    DeleteCustomer,
    DeleteAuthor,
    DeleteBook,
    Exit,
}

impl Action {
    pub(crate) const ALL: [Action; 13] = [
        Action::BookLookup,
        Action::Catalogue,
        Action::LoanedBooks,
        Action::ShowAuthor,
        Action::AllAuthors,
        Action::ShowCustomer,
        Action::AllCustomers,
        Action::BorrowBook,
        Action::ReturnBook,
        Action::DeleteCustomer,
        Action::DeleteAuthor,
        Action::DeleteBook,
        Action::Exit,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Action::BookLookup => "Book Lookup",
            Action::Catalogue => "Show Catalogue",
            Action::LoanedBooks => "Show Loaned Books",
            Action::ShowAuthor => "Show Author",
            Action::AllAuthors => "Show All Authors",
            Action::ShowCustomer => "Show Customer",
            Action::AllCustomers => "Show All Customers",
            Action::BorrowBook => "Borrow Book",
            Action::ReturnBook => "Return Book",
            Action::DeleteCustomer => "Delete Customer",
            Action::DeleteAuthor => "Delete Author",
            Action::DeleteBook => "Delete Book",
            Action::Exit => "Exit",
        }
    }

    /// Numeric inputs the action asks for, in form order.
    pub(crate) fn fields(self) -> &'static [&'static str] {
        match self {
            Action::BookLookup | Action::DeleteBook => &["ISBN"],
            Action::ShowAuthor | Action::DeleteAuthor => &["Author ID"],
            Action::ShowCustomer | Action::DeleteCustomer => &["Customer ID"],
            Action::BorrowBook => &["ISBN", "Customer ID", "Day", "Month", "Year"],
            Action::ReturnBook => &["ISBN", "Customer ID"],
            Action::Catalogue
            | Action::LoanedBooks
            | Action::AllAuthors
            | Action::AllCustomers
            | Action::Exit => &[],
        }
    }

    /// Turn raw form values into a typed request. `values` lines up with
    /// [`Action::fields`].
    pub(crate) fn request(self, values: &[String]) -> Result<Request> {
        let fields = self.fields();
        if values.len() != fields.len() {
            return Err(anyhow!("{} expects {} value(s).", self.label(), fields.len()));
        }
        let id = |index: usize| parse_number::<i64>(fields[index], &values[index]);

        let request = match self {
            Action::BookLookup => Request::BookLookup { isbn: id(0)? },
            Action::Catalogue => Request::Catalogue,
            Action::LoanedBooks => Request::LoanedBooks,
            Action::ShowAuthor => Request::ShowAuthor { author_id: id(0)? },
            Action::AllAuthors => Request::AllAuthors,
            Action::ShowCustomer => Request::ShowCustomer {
                customer_id: id(0)?,
            },
            Action::AllCustomers => Request::AllCustomers,
            Action::BorrowBook => Request::Loan(LoanRequest::Borrow {
                isbn: id(0)?,
                customer_id: id(1)?,
                day: parse_number(fields[2], &values[2])?,
                month: parse_number(fields[3], &values[3])?,
                year: parse_number(fields[4], &values[4])?,
            }),
            Action::ReturnBook => Request::Loan(LoanRequest::Return {
                isbn: id(0)?,
                customer_id: id(1)?,
            }),
            Action::DeleteCustomer => Request::DeleteCustomer {
                customer_id: id(0)?,
            },
            Action::DeleteAuthor => Request::DeleteAuthor { author_id: id(0)? },
            Action::DeleteBook => Request::DeleteBook { isbn: id(0)? },
            Action::Exit => Request::Exit,
        };
        Ok(request)
    }
}

/// A fully parsed menu request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    BookLookup { isbn: i64 },
    Catalogue,
    LoanedBooks,
    ShowAuthor { author_id: i64 },
    AllAuthors,
    ShowCustomer { customer_id: i64 },
    AllCustomers,
    /// Borrow or return; runs in a locked transaction outside the key handler.
    Loan(LoanRequest),
    DeleteCustomer { customer_id: i64 },
    DeleteAuthor { author_id: i64 },
    DeleteBook { isbn: i64 },
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoanRequest {
    Borrow {
        isbn: i64,
        customer_id: i64,
        day: u32,
        month: u32,
        year: i32,
    },
    Return {
        isbn: i64,
        customer_id: i64,
    },
}

impl LoanRequest {
    pub(crate) fn title(&self) -> &'static str {
        match self {
            LoanRequest::Borrow { .. } => Action::BorrowBook.label(),
            LoanRequest::Return { .. } => Action::ReturnBook.label(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("{field} is required."));
    }
    raw.parse::<T>()
        .with_context(|| format!("{field} must be a whole number."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn borrow_parses_all_five_fields() {
        let request = Action::BorrowBook
            .request(&values(&["1002", "3", "14", "6", "2031"]))
            .unwrap();
        assert_eq!(
            request,
            Request::Loan(LoanRequest::Borrow {
                isbn: 1002,
                customer_id: 3,
                day: 14,
                month: 6,
                year: 2031,
            })
        );
    }

    #[test]
    fn blank_fields_name_the_missing_input() {
        let err = Action::ReturnBook
            .request(&values(&["1002", " "]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Customer ID is required.");
    }

    #[test]
    fn overflowing_numbers_are_rejected() {
        let err = Action::BorrowBook
            .request(&values(&["1", "1", "1", "99999999999", "2030"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Month must be a whole number.");
    }

    #[test]
    fn listings_need_no_input() {
        for action in Action::ALL {
            if action.fields().is_empty() {
                assert!(action.request(&[]).is_ok(), "{}", action.label());
            }
        }
    }
}
