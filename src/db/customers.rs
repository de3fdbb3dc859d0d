use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::models::{Customer, CustomerProfile};

/// Map the four `customer` columns starting at `offset`.
pub(crate) fn customer_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Customer> {
    Ok(Customer {
        customer_id: row.get(offset)?,
        l_name: row.get(offset + 1)?,
        f_name: row.get::<_, Option<String>>(offset + 2)?.unwrap_or_default(),
        city: row.get(offset + 3)?,
    })
}

/// One customer row, or `None` when the id is unknown.
pub fn fetch_customer(conn: &Connection, customer_id: i64) -> Result<Option<Customer>> {
    let customer = conn
        .query_row(
            "SELECT customerid, l_name, f_name, city FROM customer WHERE customerid = ?1",
            params![customer_id],
            |row| customer_from_row(row, 0),
        )
        .optional()?;
    Ok(customer)
}

/// All customers ordered by id.
pub fn fetch_customers(conn: &Connection) -> Result<Vec<Customer>> {
    let mut stmt = conn.prepare(
        "SELECT customerid, l_name, f_name, city FROM customer ORDER BY customerid",
    )?;

    let customers = stmt
        .query_map([], |row| customer_from_row(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(customers)
}

/// A customer plus everything they currently hold. Customers with no loans
/// still get a profile with an empty `borrowed` list.
pub fn fetch_customer_profile(
    conn: &Connection,
    customer_id: i64,
) -> Result<Option<CustomerProfile>> {
    let Some(customer) = fetch_customer(conn, customer_id)? else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT b.isbn, b.title
         FROM cust_book cb
         JOIN book b ON cb.isbn = b.isbn
         WHERE cb.customerid = ?1
         ORDER BY b.isbn DESC",
    )?;
    let borrowed = stmt
        .query_map(params![customer_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<(i64, String)>>>()?;

    Ok(Some(CustomerProfile { customer, borrowed }))
}

/// Delete a customer. Fails with a foreign key error while they hold books.
pub fn delete_customer(conn: &Connection, customer_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM customer WHERE customerid = ?1",
        params![customer_id],
    )?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_in_memory, seed_sample_data};
    use crate::error::LibraryError;

    #[test]
    fn non_borrowers_get_an_empty_profile() {
        let conn = open_in_memory().unwrap();
        seed_sample_data(&conn).unwrap();

        let profile = fetch_customer_profile(&conn, 3).unwrap().unwrap();
        assert!(profile.borrowed.is_empty());
        assert_eq!(profile.customer.city, None);

        assert!(fetch_customer_profile(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn customers_with_loans_cannot_be_deleted() {
        let conn = open_in_memory().unwrap();
        seed_sample_data(&conn).unwrap();

        let err = delete_customer(&conn, 1).unwrap_err();
        assert!(matches!(err, LibraryError::Sql(_)));
        assert!(delete_customer(&conn, 3).unwrap());
        assert_eq!(fetch_customers(&conn).unwrap().len(), 2);
    }
}
