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


//! Issuing and returning books
//!
//! Every operation here touches both the `transactions` row and the book's
//! `available_copies`, so each one runs inside a single SQL transaction.
//! The copy counter is only ever changed by guarded UPDATEs
//! (`take_available_copy`, `restore_available_copy`); there is no
//! read-then-write window for two concurrent issues to race through.

use crate::error::{LibraryError, Result};
use crate::library::Library;
use crate::storage::models::{Transaction, TransactionListing};
use crate::storage::queries::{self, CopyRestore};

/// Result of ReturnBook
#[derive(Debug, Clone)]
pub enum ReturnOutcome {
    /// Loan closed today
    Returned {
        transaction: Transaction,
        /// How the book's availability was adjusted
        copy: CopyRestore,
    },
    /// Loan was already closed, or no longer exists; nothing changed
    AlreadyReturned(Option<Transaction>),
}

impl ReturnOutcome {
    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            ReturnOutcome::Returned { transaction, .. } => Some(transaction),
            ReturnOutcome::AlreadyReturned(transaction) => transaction.as_ref(),
        }
    }

    pub fn was_returned(&self) -> bool {
        matches!(self, ReturnOutcome::Returned { .. })
    }
}

/// Result of DeleteTransaction
#[derive(Debug, Clone)]
pub struct DeletedTransaction {
    pub transaction: Transaction,
    /// Set when the deleted loan was still issued and its copy went back on the shelf
    pub copy: Option<CopyRestore>,
}

impl Library {
    /// Lend one copy of a book to a member
    ///
    /// Issue date is today, due date is today plus the loan period.
    ///
    /// # Errors
    /// - `NotFound` if the member or the book doesn't exist
    /// - `Unavailable` if every copy is already issued
    pub async fn issue_book(&self, member_id: i64, book_id: i64) -> Result<Transaction> {
        let mut tx = self.database().pool().begin().await?;

        // Write first: a deferred transaction that reads before writing can be
        // refused with SQLITE_BUSY when another writer commits in between
        let took_copy = queries::take_available_copy(&mut *tx, book_id).await?;

        if queries::find_member_by_id(&mut *tx, member_id).await?.is_none() {
            return Err(LibraryError::not_found("member", member_id));
        }

        if !took_copy {
            // Nothing was decremented; tell a missing book apart from an exhausted one
            return match queries::find_book_by_id(&mut *tx, book_id).await? {
                Some(_) => {
                    tracing::info!(member_id, book_id, "Issue refused, no copies left");
                    Err(LibraryError::Unavailable { book_id })
                }
                None => Err(LibraryError::not_found("book", book_id)),
            };
        }

        let issue_date = Self::today();
        let due_date = self.due_date_for(issue_date);
        let transaction_id =
            queries::insert_issued_transaction(&mut *tx, member_id, book_id, issue_date, due_date).await?;
        let transaction = queries::find_transaction_by_id(&mut *tx, transaction_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("transaction", transaction_id))?;
        tx.commit().await?;

        tracing::info!(transaction_id, member_id, book_id, %due_date, "Book issued");
        Ok(transaction)
    }

    /// Close a loan and put the copy back
    ///
    /// Returning an already-returned or unknown loan is a no-op reported as
    /// [`ReturnOutcome::AlreadyReturned`]. If the book is somehow already at
    /// full availability the counter is left alone and the clamp is logged.
    pub async fn return_book(&self, transaction_id: i64) -> Result<ReturnOutcome> {
        let mut tx = self.database().pool().begin().await?;

        // Close the loan first so the transaction holds the write lock from the start
        if queries::mark_transaction_returned(&mut *tx, transaction_id, Self::today()).await? == 0 {
            let existing = queries::find_transaction_by_id(&mut *tx, transaction_id).await?;
            tracing::debug!(transaction_id, found = existing.is_some(), "Nothing to return");
            return Ok(ReturnOutcome::AlreadyReturned(existing));
        }

        let transaction = queries::find_transaction_by_id(&mut *tx, transaction_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("transaction", transaction_id))?;

        let copy = queries::restore_available_copy(&mut *tx, transaction.book_id).await?;
        match copy {
            CopyRestore::Restored => {}
            CopyRestore::Clamped => tracing::warn!(
                transaction_id,
                book_id = transaction.book_id,
                "Return would exceed total copies, availability left unchanged"
            ),
            CopyRestore::BookMissing => tracing::warn!(
                transaction_id,
                book_id = transaction.book_id,
                "Returned loan references a missing book"
            ),
        }
        tx.commit().await?;

        tracing::info!(transaction_id, book_id = transaction.book_id, "Book returned");
        Ok(ReturnOutcome::Returned { transaction, copy })
    }

    /// Remove a transaction record
    ///
    /// Deleting a loan that is still issued puts its copy back first, with the
    /// same clamp as `return_book`.
    pub async fn delete_transaction(&self, transaction_id: i64) -> Result<DeletedTransaction> {
        let mut tx = self.database().pool().begin().await?;

        let transaction = queries::delete_transaction(&mut *tx, transaction_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("transaction", transaction_id))?;

        let copy = if transaction.is_issued() {
            let copy = queries::restore_available_copy(&mut *tx, transaction.book_id).await?;
            if copy != CopyRestore::Restored {
                tracing::warn!(transaction_id, book_id = transaction.book_id, ?copy, "Copy not restored");
            }
            Some(copy)
        } else {
            None
        };
        tx.commit().await?;

        tracing::info!(transaction_id, restored = copy.is_some(), "Transaction deleted");
        Ok(DeletedTransaction { transaction, copy })
    }

    pub async fn get_transaction(&self, transaction_id: i64) -> Result<Transaction> {
        let mut conn = self.database().pool().acquire().await?;
        queries::find_transaction_by_id(&mut *conn, transaction_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("transaction", transaction_id))
    }

    /// Every transaction joined with member name and book title, newest first
    pub async fn list_transactions(&self) -> Result<Vec<TransactionListing>> {
        let mut conn = self.database().pool().acquire().await?;
        let rows = queries::list_transactions(&mut *conn).await?;
        tracing::debug!(count = rows.len(), "Listed transactions");
        Ok(rows)
    }
}
