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


//! Database models
//!
//! Row types for the `books`, `members` and `transactions` tables, plus the
//! insert payloads used by the library operations.
//!
//! # SQLite Adaptations
//! - Dates stored as TEXT in `YYYY-MM-DD` form
//! - Transaction status stored as TEXT (`issued` / `returned`)
//! - Optional unique keys (ISBN, membership number) stored as NULL when blank

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// ENUMS
// ============================================================================

/// Lifecycle state of a loan
///
/// `Issued` is the only state that holds a copy; `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Issued,
    Returned,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Issued => "issued",
            TransactionStatus::Returned => "returned",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "issued" => Some(TransactionStatus::Issued),
            "returned" => Some(TransactionStatus::Returned),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// MAIN ENTITIES
// ============================================================================

/// Book entity - a catalog entry and its copy counts
///
/// Invariant: `0 <= available_copies <= total_copies`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Book {
    pub book_id: i64,
    #[sqlx(default)]
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub publisher: String,
    #[sqlx(default)]
    pub publication_year: Option<i32>,
    pub category: String,
    pub description: String,
    #[sqlx(default)]
    pub cover_url: Option<String>,
    pub total_copies: i64,
    pub available_copies: i64,
}

impl Book {
    /// Display field for list views, e.g. `"1/2"`
    pub fn availability(&self) -> String {
        format!("{}/{}", self.available_copies, self.total_copies)
    }

    /// Number of copies currently lent out
    pub fn copies_on_loan(&self) -> i64 {
        self.total_copies - self.available_copies
    }
}

/// Member entity - a library patron
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub member_id: i64,
    #[sqlx(default)]
    pub membership_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub join_date: NaiveDate,
    pub status: String,
}

impl Member {
    /// First and last name joined by a single space
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Transaction entity - one loan of one copy
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: i64,
    pub member_id: i64,
    pub book_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    #[sqlx(default)]
    pub return_date: Option<NaiveDate>,
    #[sqlx(default)]
    pub fine_amount: Option<f64>,
    pub status: String,
}

impl Transaction {
    /// Get status as enum
    ///
    /// The column is CHECK-constrained, so unknown values only appear if the
    /// file was edited by hand; those are treated as returned.
    pub fn get_status(&self) -> TransactionStatus {
        TransactionStatus::from_str(&self.status).unwrap_or(TransactionStatus::Returned)
    }

    pub fn is_issued(&self) -> bool {
        self.get_status() == TransactionStatus::Issued
    }
}

/// Transaction row denormalized for list views
///
/// `return_date` is an empty string while the loan is open.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TransactionListing {
    pub transaction_id: i64,
    pub member_name: String,
    pub book_title: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: String,
    pub status: String,
}

// ============================================================================
// NEW RECORD STRUCTS (for inserts)
// ============================================================================

/// New book record for insertion
///
/// `total_copies` of `None` (or a negative count) falls back to one copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub publication_year: Option<i32>,
    pub category: String,
    pub description: String,
    pub cover_url: Option<String>,
    pub total_copies: Option<i64>,
}

impl NewBook {
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_isbn<S: Into<String>>(mut self, isbn: S) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn with_copies(mut self, total_copies: i64) -> Self {
        self.total_copies = Some(total_copies);
        self
    }
}

/// New member record for insertion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMember {
    pub membership_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl NewMember {
    pub fn new<F: Into<String>, L: Into<String>>(first_name: F, last_name: L) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }

    pub fn with_membership_number<S: Into<String>>(mut self, number: S) -> Self {
        self.membership_number = Some(number.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_status_round_trip() {
        assert_eq!(TransactionStatus::from_str("issued"), Some(TransactionStatus::Issued));
        assert_eq!(TransactionStatus::from_str("returned"), Some(TransactionStatus::Returned));
        assert_eq!(TransactionStatus::from_str("lost"), None);
        assert_eq!(TransactionStatus::Issued.to_string(), "issued");
    }

    #[test]
    fn test_book_availability_display() {
        let book = Book {
            book_id: 1,
            isbn: None,
            title: "Dune".into(),
            author: String::new(),
            publisher: String::new(),
            publication_year: None,
            category: String::new(),
            description: String::new(),
            cover_url: None,
            total_copies: 2,
            available_copies: 1,
        };

        assert_eq!(book.availability(), "1/2");
        assert_eq!(book.copies_on_loan(), 1);
    }

    #[test]
    fn test_member_full_name() {
        let member = Member {
            member_id: 1,
            membership_number: None,
            first_name: "Paul".into(),
            last_name: "Atreides".into(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status: "active".into(),
        };

        assert_eq!(member.full_name(), "Paul Atreides");
    }
}
