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


//! Book catalog operations

use crate::error::{LibraryError, Result};
use crate::library::{non_blank, Library};
use crate::lookup::client::normalize_isbn;
use crate::lookup::IsbnLookupClient;
use crate::storage::models::{Book, NewBook};
use crate::storage::queries;

/// Result of a successful DeleteBook
#[derive(Debug, Clone)]
pub struct DeletedBook {
    pub book: Book,
    /// Returned transactions that referenced the book and were removed with it
    pub history_removed: u64,
}

impl Library {
    /// Add a book to the catalog
    ///
    /// The ISBN is stored without spaces or hyphens, so "978-0441013593" and
    /// "9780441013593" are the same book. Blank ISBN and cover URL are stored as
    /// NULL. A missing or negative `total_copies` becomes one copy. All copies
    /// start available.
    ///
    /// # Errors
    /// - `Validation` if the title is blank
    /// - `DuplicateKey` if the ISBN is already in the catalog
    pub async fn add_book(&self, book: NewBook) -> Result<Book> {
        let title = book.title.trim().to_string();
        if title.is_empty() {
            return Err(LibraryError::validation("title", "must not be empty"));
        }

        let book = NewBook {
            title,
            isbn: book.isbn.map(|isbn| normalize_isbn(&isbn)).filter(|isbn| !isbn.is_empty()),
            cover_url: non_blank(book.cover_url),
            ..book
        };
        let total_copies = book.total_copies.filter(|n| *n >= 0).unwrap_or(1);

        let mut tx = self.database().pool().begin().await?;
        let book_id = queries::insert_book(&mut *tx, &book, total_copies).await?;
        let created = queries::find_book_by_id(&mut *tx, book_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("book", book_id))?;
        tx.commit().await?;

        tracing::info!(
            book_id,
            isbn = created.isbn.as_deref().unwrap_or(""),
            total_copies,
            "Book added"
        );
        Ok(created)
    }

    /// Look up an ISBN remotely and add the result to the catalog
    ///
    /// Returns `Ok(None)` when the lookup finds nothing; lookup failures never
    /// surface as errors here. An ISBN already in the catalog is refused with
    /// `DuplicateKey` before any request goes out.
    pub async fn add_book_from_lookup(
        &self,
        client: &IsbnLookupClient,
        isbn: &str,
        total_copies: Option<i64>,
    ) -> Result<Option<Book>> {
        let isbn = normalize_isbn(isbn);

        {
            let mut conn = self.database().pool().acquire().await?;
            if queries::find_book_by_isbn(&mut *conn, &isbn).await?.is_some() {
                return Err(LibraryError::DuplicateKey {
                    field: "isbn".to_string(),
                    value: isbn,
                });
            }
        }

        match client.lookup(&isbn).await {
            Some(metadata) => {
                let book = self.add_book(metadata.into_new_book(&isbn, total_copies)).await?;
                Ok(Some(book))
            }
            None => Ok(None),
        }
    }

    /// Fetch one book
    pub async fn get_book(&self, book_id: i64) -> Result<Book> {
        let mut conn = self.database().pool().acquire().await?;
        queries::find_book_by_id(&mut *conn, book_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("book", book_id))
    }

    /// All books, most recently added first
    pub async fn list_books(&self) -> Result<Vec<Book>> {
        let mut conn = self.database().pool().acquire().await?;
        let books = queries::list_books(&mut *conn).await?;
        tracing::debug!(count = books.len(), "Listed books");
        Ok(books)
    }

    /// Remove a book from the catalog
    ///
    /// Returned transactions for the book are deleted in the same transaction,
    /// so history never points at a missing book.
    ///
    /// # Errors
    /// - `NotFound` if the book doesn't exist
    /// - `Conflict` if any copy is currently issued
    pub async fn delete_book(&self, book_id: i64) -> Result<DeletedBook> {
        let mut tx = self.database().pool().begin().await?;

        // Delete first so the transaction holds the write lock from its first
        // statement; the refusals below roll the delete back
        let book = queries::delete_book(&mut *tx, book_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("book", book_id))?;

        if queries::count_issued_for_book(&mut *tx, book_id).await? > 0 {
            return Err(LibraryError::conflict("book currently issued"));
        }

        let history_removed = queries::delete_returned_for_book(&mut *tx, book_id).await?;
        tx.commit().await?;

        tracing::info!(book_id, history_removed, "Book deleted");
        Ok(DeletedBook {
            book,
            history_removed,
        })
    }

    /// Change how many copies the library owns
    ///
    /// Availability moves by the same amount as the total and is kept within
    /// `[0, total_copies]`. Shrinking below the number of copies on loan leaves
    /// availability at zero; the surplus returns are absorbed by the clamp in
    /// `return_book`.
    pub async fn set_total_copies(&self, book_id: i64, total_copies: i64) -> Result<Book> {
        if total_copies < 0 {
            return Err(LibraryError::validation("total_copies", "must not be negative"));
        }

        let mut tx = self.database().pool().begin().await?;
        if queries::set_total_copies(&mut *tx, book_id, total_copies).await? == 0 {
            return Err(LibraryError::not_found("book", book_id));
        }
        let book = queries::find_book_by_id(&mut *tx, book_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("book", book_id))?;
        tx.commit().await?;

        tracing::info!(
            book_id,
            total_copies,
            available_copies = book.available_copies,
            "Book copy count changed"
        );
        Ok(book)
    }
}
