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


//! Error types for the library core
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are grouped by the rule they enforce (validation, uniqueness, circulation)
//! and by the infrastructure that raised them (store, lookup transport).
//!
//! ## Error Kinds
//!
//! ### Domain Errors (returned by catalog, membership and circulation operations)
//! - Missing required field → `Validation`
//! - Unique constraint on ISBN or membership number → `DuplicateKey`
//! - Delete blocked by an outstanding loan → `Conflict`
//! - Issue attempted with no copies left → `Unavailable`
//! - Operation on a nonexistent id → `NotFound`
//!
//! ### Lookup Errors
//! - Remote catalog unreachable, bad status, malformed body → `Transport`, `InvalidApiResponse`
//!
//! These never leave `IsbnLookupClient::lookup`; they are logged and collapsed into
//! "not found" there.
//!
//! ### Store Errors
//! - sqlx failures → `SqlxError` (via `#[from]`), unique violations are remapped to `DuplicateKey`
//! - Schema setup failures → `MigrationFailed`

use thiserror::Error;

/// Result type alias using our LibraryError type
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Main error type for the library core
#[derive(Error, Debug)]
pub enum LibraryError {
    // ===== Domain Errors =====

    /// A required field was empty or out of range
    #[error("Validation failed: {field} {reason}")]
    Validation {
        field: String,
        reason: String,
    },

    /// A unique column already holds this value
    #[error("Duplicate {field}: {value}")]
    DuplicateKey {
        /// Column that rejected the value ("isbn", "membership_number")
        field: String,
        value: String,
    },

    /// Delete refused because an issued transaction still references the record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No copies of the book are available to issue
    #[error("Book {book_id} has no available copies")]
    Unavailable {
        book_id: i64,
    },

    /// Record with the given id does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        entity: &'static str,
        id: i64,
    },

    // ===== Lookup Errors =====

    /// Remote metadata lookup failed at the transport level
    #[error("Lookup transport error: {message}")]
    Transport {
        message: String,
        /// HTTP status code if a response was received
        status_code: Option<u16>,
    },

    /// Remote catalog answered with a body we could not interpret
    #[error("Invalid lookup response: {0}")]
    InvalidApiResponse(String),

    // ===== Configuration/Store Errors =====

    /// Configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Generic file I/O error with context
    #[error("File I/O error: {0}")]
    FileIoError(String),

    // ===== External Library Errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<std::num::ParseIntError> for LibraryError {
    fn from(err: std::num::ParseIntError) -> Self {
        LibraryError::InvalidConfiguration(format!("Failed to parse integer: {}", err))
    }
}

// Helper methods for creating common errors
impl LibraryError {
    /// Create a Validation error for a field
    pub fn validation<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        LibraryError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotFound error for an entity id
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        LibraryError::NotFound { entity, id }
    }

    /// Create a Conflict error with a message
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        LibraryError::Conflict(message.into())
    }

    /// Create a Transport error
    pub fn transport<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        LibraryError::Transport {
            message: message.into(),
            status_code,
        }
    }

    /// Map a sqlx error raised by an INSERT into `DuplicateKey` when SQLite
    /// reports a unique violation, leaving every other error untouched.
    pub fn from_insert(err: sqlx::Error, field: &str, value: Option<&str>) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                LibraryError::DuplicateKey {
                    field: field.to_string(),
                    value: value.unwrap_or_default().to_string(),
                }
            }
            _ => LibraryError::SqlxError(err),
        }
    }

    /// Check if error was caused by the caller's input or the current state of the
    /// catalog, as opposed to the store or network failing.
    ///
    /// Returns `true` for errors a user can fix by changing what they asked for.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            LibraryError::Validation { .. }
                | LibraryError::DuplicateKey { .. }
                | LibraryError::Conflict(_)
                | LibraryError::Unavailable { .. }
                | LibraryError::NotFound { .. }
        )
    }

    /// Check if error came from the remote lookup
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            LibraryError::Transport { .. }
                | LibraryError::InvalidApiResponse(_)
                | LibraryError::ReqwestError(_)
        )
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            LibraryError::Validation { field, reason } => {
                if reason == "must not be empty" {
                    format!("{} required", capitalize(field))
                } else {
                    format!("{} {}", capitalize(field), reason)
                }
            }
            LibraryError::DuplicateKey { field, value } => match field.as_str() {
                "isbn" => format!("Duplicate ISBN: a book with ISBN '{}' already exists.", value),
                "membership_number" => format!(
                    "Duplicate membership number: '{}' is already assigned to another member.",
                    value
                ),
                _ => self.to_string(),
            },
            LibraryError::Conflict(message) => format!("Blocked: {}.", message),
            LibraryError::Unavailable { .. } => "No copies left".to_string(),
            LibraryError::NotFound { entity, id } => {
                format!("No {} with id {} exists.", entity, id)
            }
            LibraryError::Transport { .. }
            | LibraryError::InvalidApiResponse(_)
            | LibraryError::ReqwestError(_) => "No data for that ISBN".to_string(),
            LibraryError::SqlxError(e) => format!("An error occurred: {}", e),
            _ => self.to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let s = s.replace('_', " ");
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_categorized() {
        assert!(LibraryError::validation("title", "must not be empty").is_user_error());
        assert!(LibraryError::not_found("book", 3).is_user_error());
        assert!(LibraryError::Unavailable { book_id: 1 }.is_user_error());
        assert!(!LibraryError::MigrationFailed("boom".into()).is_user_error());
        assert!(LibraryError::transport("timed out", None).is_lookup_error());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            LibraryError::validation("title", "must not be empty").user_message(),
            "Title required"
        );
        assert_eq!(LibraryError::Unavailable { book_id: 7 }.user_message(), "No copies left");
        assert_eq!(
            LibraryError::not_found("member", 4).user_message(),
            "No member with id 4 exists."
        );
        let dup = LibraryError::DuplicateKey {
            field: "isbn".into(),
            value: "9780441013593".into(),
        };
        assert!(dup.user_message().starts_with("Duplicate ISBN"));
    }

    #[test]
    fn test_non_unique_sqlx_error_is_preserved() {
        let err = LibraryError::from_insert(sqlx::Error::RowNotFound, "isbn", Some("1"));
        assert!(matches!(err, LibraryError::SqlxError(sqlx::Error::RowNotFound)));
    }
}
