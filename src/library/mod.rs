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


//! Catalog, membership and circulation operations
//!
//! [`Library`] is the handle every operation goes through. It owns a
//! [`Database`] and nothing else; there is no process-wide store.
//!
//! # Consistency Rules
//! - `0 <= available_copies <= total_copies` for every book, after every operation
//! - Issue takes a copy with a single guarded UPDATE; it fails rather than going negative
//! - Return and delete-of-an-issued-loan put a copy back, clamped at `total_copies`
//! - Books and members with an issued loan cannot be deleted
//!
//! # Resource Discipline
//! Reads acquire one pooled connection; writes open one `sqlx::Transaction`.
//! Either is released on every exit path, and a transaction that is dropped
//! before `commit()` rolls back, so a failed operation leaves no partial state.
//!
//! The operations are split by entity:
//! - `books.rs` - AddBook, GetBook, ListBooks, DeleteBook, SetTotalCopies
//! - `members.rs` - AddMember, GetMember, ListMembers, DeleteMember
//! - `circulation.rs` - IssueBook, ReturnBook, DeleteTransaction, ListTransactions

pub mod books;
pub mod circulation;
pub mod members;

pub use books::DeletedBook;
pub use circulation::{DeletedTransaction, ReturnOutcome};
pub use members::DeletedMember;

use crate::config::{LibraryConfig, DEFAULT_LOAN_PERIOD_DAYS};
use crate::error::Result;
use crate::storage::Database;
use chrono::{Duration, Local, NaiveDate};

/// Handle to one library's store
#[derive(Debug, Clone)]
pub struct Library {
    db: Database,
    loan_period_days: i64,
}

impl Library {
    /// Wrap an open database with the default 14-day loan period
    pub fn new(db: Database) -> Self {
        Self {
            db,
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
        }
    }

    /// Open the database named by the configuration
    pub async fn open(config: &LibraryConfig) -> Result<Self> {
        let db = Database::new(&config.database_path).await?;
        Ok(Self::new(db).with_loan_period_days(config.loan_period_days))
    }

    pub fn with_loan_period_days(mut self, days: i64) -> Self {
        self.loan_period_days = days.max(1);
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn loan_period_days(&self) -> i64 {
        self.loan_period_days
    }

    /// Due date for a loan issued on `issue_date`
    pub fn due_date_for(&self, issue_date: NaiveDate) -> NaiveDate {
        issue_date + Duration::days(self.loan_period_days)
    }

    /// Current local calendar date
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Trim a free-text field, turning blank input into `None`
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  978 ".into())), Some("978".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }

    #[tokio::test]
    async fn test_due_date_uses_loan_period() {
        let db = Database::new_in_memory().await.unwrap();
        let library = Library::new(db);
        let issued = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();

        assert_eq!(library.due_date_for(issued), NaiveDate::from_ymd_opt(2025, 1, 8).unwrap());

        let library = library.with_loan_period_days(7);
        assert_eq!(library.due_date_for(issued), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }
}
