// Library Manager - Circulation tracking for small libraries
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Database query functions
//!
//! One function per SQL statement. Every function takes a borrowed
//! `SqliteConnection` so callers decide the boundary: a pooled connection for
//! reads, or `&mut *tx` inside a `sqlx::Transaction` for multi-step writes.
//!
//! # Query Patterns
//! - Repository functions per table
//! - Copy counters are only ever changed by guarded single-statement UPDATEs
//!   (`... WHERE available_copies > 0`), never by read-then-write

use crate::error::{LibraryError, Result};
use crate::storage::models::*;
use chrono::NaiveDate;
use sqlx::SqliteConnection;

// ============================================================================
// BOOK QUERIES
// ============================================================================

/// Insert a new book with `available_copies = total_copies`
///
/// Returns the book_id of the inserted book.
pub async fn insert_book(conn: &mut SqliteConnection, book: &NewBook, total_copies: i64) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO books (
            isbn, title, author, publisher, publication_year,
            category, description, cover_url, total_copies, available_copies
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&book.isbn)
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.publisher)
    .bind(book.publication_year)
    .bind(&book.category)
    .bind(&book.description)
    .bind(&book.cover_url)
    .bind(total_copies)
    .bind(total_copies)
    .execute(&mut *conn)
    .await
    .map_err(|e| LibraryError::from_insert(e, "isbn", book.isbn.as_deref()))?;

    Ok(result.last_insert_rowid())
}

/// Find book by ID
pub async fn find_book_by_id(conn: &mut SqliteConnection, book_id: i64) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = ?")
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(book)
}

/// Find book by ISBN
pub async fn find_book_by_isbn(conn: &mut SqliteConnection, isbn: &str) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = ?")
        .bind(isbn)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(book)
}

/// List all books, most recently added first
pub async fn list_books(conn: &mut SqliteConnection) -> Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY book_id DESC")
        .fetch_all(&mut *conn)
        .await?;

    Ok(books)
}

/// Delete a book row, returning it (`None` when there was nothing to delete)
pub async fn delete_book(conn: &mut SqliteConnection, book_id: i64) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("DELETE FROM books WHERE book_id = ? RETURNING *")
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(book)
}

/// Take one copy off the shelf if any is left
///
/// Returns `true` when a copy was taken. `false` means the book is missing or
/// has no available copies; the row is untouched in both cases.
pub async fn take_available_copy(conn: &mut SqliteConnection, book_id: i64) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE books SET available_copies = available_copies - 1 WHERE book_id = ? AND available_copies > 0",
    )
    .bind(book_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Outcome of putting a copy back on the shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyRestore {
    /// `available_copies` went up by one
    Restored,
    /// Book was already at `total_copies`; nothing changed
    Clamped,
    /// Book row no longer exists
    BookMissing,
}

/// Put one copy back, never exceeding `total_copies`
pub async fn restore_available_copy(conn: &mut SqliteConnection, book_id: i64) -> Result<CopyRestore> {
    let result = sqlx::query(
        "UPDATE books SET available_copies = available_copies + 1 WHERE book_id = ? AND available_copies < total_copies",
    )
    .bind(book_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(CopyRestore::Restored);
    }

    let exists: Option<i64> = sqlx::query_scalar("SELECT book_id FROM books WHERE book_id = ?")
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(if exists.is_some() {
        CopyRestore::Clamped
    } else {
        CopyRestore::BookMissing
    })
}

/// Change a book's total copies, shifting availability by the same delta
///
/// Availability is clamped into `[0, total_copies]`. Returns the number of rows
/// updated (0 when the book doesn't exist).
pub async fn set_total_copies(conn: &mut SqliteConnection, book_id: i64, total_copies: i64) -> Result<u64> {
    // SQLite evaluates every SET expression against the pre-update row
    let result = sqlx::query(
        r#"
        UPDATE books SET
            available_copies = MAX(0, MIN(?, available_copies + ? - total_copies)),
            total_copies = ?
        WHERE book_id = ?
        "#,
    )
    .bind(total_copies)
    .bind(total_copies)
    .bind(total_copies)
    .bind(book_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

// ============================================================================
// MEMBER QUERIES
// ============================================================================

/// Insert a new member
///
/// Returns the member_id of the inserted member.
pub async fn insert_member(
    conn: &mut SqliteConnection,
    member: &NewMember,
    join_date: NaiveDate,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO members (
            membership_number, first_name, last_name, email, phone, address, join_date, status
        ) VALUES (?, ?, ?, ?, ?, ?, ?, 'active')
        "#,
    )
    .bind(&member.membership_number)
    .bind(&member.first_name)
    .bind(&member.last_name)
    .bind(&member.email)
    .bind(&member.phone)
    .bind(&member.address)
    .bind(join_date)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        LibraryError::from_insert(e, "membership_number", member.membership_number.as_deref())
    })?;

    Ok(result.last_insert_rowid())
}

/// Find member by ID
pub async fn find_member_by_id(conn: &mut SqliteConnection, member_id: i64) -> Result<Option<Member>> {
    let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE member_id = ?")
        .bind(member_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(member)
}

/// List all members, most recently joined first
pub async fn list_members(conn: &mut SqliteConnection) -> Result<Vec<Member>> {
    let members = sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY member_id DESC")
        .fetch_all(&mut *conn)
        .await?;

    Ok(members)
}

/// Delete a member row, returning it
pub async fn delete_member(conn: &mut SqliteConnection, member_id: i64) -> Result<Option<Member>> {
    let member = sqlx::query_as::<_, Member>("DELETE FROM members WHERE member_id = ? RETURNING *")
        .bind(member_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(member)
}

// ============================================================================
// TRANSACTION QUERIES
// ============================================================================

/// Insert an issued transaction
///
/// Returns the transaction_id of the inserted row.
pub async fn insert_issued_transaction(
    conn: &mut SqliteConnection,
    member_id: i64,
    book_id: i64,
    issue_date: NaiveDate,
    due_date: NaiveDate,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO transactions (member_id, book_id, issue_date, due_date, status)
        VALUES (?, ?, ?, ?, 'issued')
        "#,
    )
    .bind(member_id)
    .bind(book_id)
    .bind(issue_date)
    .bind(due_date)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Find transaction by ID
pub async fn find_transaction_by_id(
    conn: &mut SqliteConnection,
    transaction_id: i64,
) -> Result<Option<Transaction>> {
    let transaction =
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE transaction_id = ?")
            .bind(transaction_id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(transaction)
}

/// Close an issued transaction
///
/// Only rows still in `issued` state are touched, so calling this twice is harmless.
/// Returns the number of rows updated.
pub async fn mark_transaction_returned(
    conn: &mut SqliteConnection,
    transaction_id: i64,
    return_date: NaiveDate,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE transactions SET status = 'returned', return_date = ? WHERE transaction_id = ? AND status = 'issued'",
    )
    .bind(return_date)
    .bind(transaction_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Delete a transaction row, returning it
pub async fn delete_transaction(
    conn: &mut SqliteConnection,
    transaction_id: i64,
) -> Result<Option<Transaction>> {
    let transaction =
        sqlx::query_as::<_, Transaction>("DELETE FROM transactions WHERE transaction_id = ? RETURNING *")
            .bind(transaction_id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(transaction)
}

/// Count issued transactions for a book
pub async fn count_issued_for_book(conn: &mut SqliteConnection, book_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM transactions WHERE book_id = ? AND status = 'issued'",
    )
    .bind(book_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

/// Count issued transactions for a member
pub async fn count_issued_for_member(conn: &mut SqliteConnection, member_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM transactions WHERE member_id = ? AND status = 'issued'",
    )
    .bind(member_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

/// Remove the returned loan history of a book
pub async fn delete_returned_for_book(conn: &mut SqliteConnection, book_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM transactions WHERE book_id = ? AND status = 'returned'")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Remove the returned loan history of a member
pub async fn delete_returned_for_member(conn: &mut SqliteConnection, member_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM transactions WHERE member_id = ? AND status = 'returned'")
        .bind(member_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// List all transactions with member name and book title, newest first
pub async fn list_transactions(conn: &mut SqliteConnection) -> Result<Vec<TransactionListing>> {
    let rows = sqlx::query_as::<_, TransactionListing>(
        r#"
        SELECT
            t.transaction_id,
            m.first_name || ' ' || m.last_name AS member_name,
            b.title AS book_title,
            t.issue_date,
            t.due_date,
            COALESCE(t.return_date, '') AS return_date,
            t.status
        FROM transactions t
        JOIN members m ON t.member_id = m.member_id
        JOIN books b ON t.book_id = b.book_id
        ORDER BY t.transaction_id DESC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_book() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");

        let new_book = NewBook::new("Test Book").with_isbn("9780000000001");
        let book_id = insert_book(&mut conn, &new_book, 3).await.expect("Failed to insert book");
        assert!(book_id > 0);

        let book = find_book_by_isbn(&mut conn, "9780000000001")
            .await
            .expect("Failed to find book")
            .expect("Book should exist");

        assert_eq!(book.title, "Test Book");
        assert_eq!(book.total_copies, 3);
        assert_eq!(book.available_copies, 3);
    }

    #[tokio::test]
    async fn test_duplicate_isbn_maps_to_duplicate_key() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");

        let book = NewBook::new("First").with_isbn("123");
        insert_book(&mut conn, &book, 1).await.expect("First insert should succeed");

        let err = insert_book(&mut conn, &NewBook::new("Second").with_isbn("123"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::DuplicateKey { ref field, .. } if field == "isbn"));
    }

    #[tokio::test]
    async fn test_null_isbns_are_not_duplicates() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");

        insert_book(&mut conn, &NewBook::new("A"), 1).await.expect("insert A");
        insert_book(&mut conn, &NewBook::new("B"), 1).await.expect("insert B");

        assert_eq!(list_books(&mut conn).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_take_copy_stops_at_zero() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");

        let book_id = insert_book(&mut conn, &NewBook::new("Single"), 1).await.unwrap();

        assert!(take_available_copy(&mut conn, book_id).await.unwrap());
        assert!(!take_available_copy(&mut conn, book_id).await.unwrap());
        assert!(!take_available_copy(&mut conn, book_id + 100).await.unwrap());

        let book = find_book_by_id(&mut conn, book_id).await.unwrap().unwrap();
        assert_eq!(book.available_copies, 0);
    }

    #[tokio::test]
    async fn test_restore_copy_is_clamped() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");

        let book_id = insert_book(&mut conn, &NewBook::new("Full shelf"), 2).await.unwrap();

        assert_eq!(restore_available_copy(&mut conn, book_id).await.unwrap(), CopyRestore::Clamped);
        assert_eq!(
            restore_available_copy(&mut conn, book_id + 1).await.unwrap(),
            CopyRestore::BookMissing
        );

        take_available_copy(&mut conn, book_id).await.unwrap();
        assert_eq!(restore_available_copy(&mut conn, book_id).await.unwrap(), CopyRestore::Restored);
    }

    #[tokio::test]
    async fn test_set_total_copies_shifts_availability() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");

        let book_id = insert_book(&mut conn, &NewBook::new("Shifting"), 3).await.unwrap();
        take_available_copy(&mut conn, book_id).await.unwrap();
        take_available_copy(&mut conn, book_id).await.unwrap();

        // 1 of 3 available, 2 on loan; growing to 5 leaves 3 available
        set_total_copies(&mut conn, book_id, 5).await.unwrap();
        let book = find_book_by_id(&mut conn, book_id).await.unwrap().unwrap();
        assert_eq!((book.available_copies, book.total_copies), (3, 5));

        // Shrinking below the loaned count bottoms out at zero
        set_total_copies(&mut conn, book_id, 1).await.unwrap();
        let book = find_book_by_id(&mut conn, book_id).await.unwrap().unwrap();
        assert_eq!((book.available_copies, book.total_copies), (0, 1));

        assert_eq!(set_total_copies(&mut conn, book_id + 1, 4).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_member_queries() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");

        let member = NewMember::new("Chani", "Kynes").with_membership_number("M-001");
        let member_id = insert_member(&mut conn, &member, date(2024, 3, 1)).await.unwrap();

        let found = find_member_by_id(&mut conn, member_id).await.unwrap().unwrap();
        assert_eq!(found.full_name(), "Chani Kynes");
        assert_eq!(found.status, "active");
        assert_eq!(found.join_date, date(2024, 3, 1));

        let err = insert_member(&mut conn, &member, date(2024, 3, 2)).await.unwrap_err();
        assert!(matches!(err, LibraryError::DuplicateKey { ref field, .. } if field == "membership_number"));

        let deleted = delete_member(&mut conn, member_id).await.unwrap().expect("Member should be deleted");
        assert_eq!(deleted.member_id, member_id);
        assert!(delete_member(&mut conn, member_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transaction_queries() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");

        let book_id = insert_book(&mut conn, &NewBook::new("Dune"), 1).await.unwrap();
        let member_id = insert_member(&mut conn, &NewMember::new("Paul", "Atreides"), date(2024, 1, 1))
            .await
            .unwrap();

        let tx_id = insert_issued_transaction(&mut conn, member_id, book_id, date(2024, 1, 2), date(2024, 1, 16))
            .await
            .unwrap();
        assert_eq!(count_issued_for_book(&mut conn, book_id).await.unwrap(), 1);
        assert_eq!(count_issued_for_member(&mut conn, member_id).await.unwrap(), 1);

        let listing = list_transactions(&mut conn).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].member_name, "Paul Atreides");
        assert_eq!(listing[0].book_title, "Dune");
        assert_eq!(listing[0].return_date, "");

        assert_eq!(mark_transaction_returned(&mut conn, tx_id, date(2024, 1, 10)).await.unwrap(), 1);
        assert_eq!(mark_transaction_returned(&mut conn, tx_id, date(2024, 1, 11)).await.unwrap(), 0);

        let tx = find_transaction_by_id(&mut conn, tx_id).await.unwrap().unwrap();
        assert_eq!(tx.get_status(), TransactionStatus::Returned);
        assert_eq!(tx.return_date, Some(date(2024, 1, 10)));
        assert!(tx.fine_amount.is_none());

        let listing = list_transactions(&mut conn).await.unwrap();
        assert_eq!(listing[0].return_date, "2024-01-10");

        assert_eq!(delete_returned_for_book(&mut conn, book_id).await.unwrap(), 1);
        assert!(find_transaction_by_id(&mut conn, tx_id).await.unwrap().is_none());
        assert!(delete_transaction(&mut conn, tx_id).await.unwrap().is_none());

        let deleted = delete_book(&mut conn, book_id).await.unwrap().expect("Book should be deleted");
        assert_eq!(deleted.title, "Dune");
        assert!(delete_book(&mut conn, book_id).await.unwrap().is_none());
    }
}
