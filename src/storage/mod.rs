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


//! Database storage and models
//!
//! This module handles all database operations using SQLite through sqlx.
//!
//! # Database Schema
//! - books: catalog entries with copy counts
//! - members: library patrons
//! - transactions: loans linking a member to a book
//!
//! Referential integrity between the three tables is enforced by the
//! operations in [`crate::library`], not by foreign keys.
//!
//! # Usage Example
//! ```no_run
//! use library_core::storage::{Database, queries, models::NewBook};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./library.db").await?;
//!
//! let mut conn = db.pool().acquire().await?;
//! let book_id = queries::insert_book(&mut conn, &NewBook::new("Dune"), 2).await?;
//! let book = queries::find_book_by_id(&mut conn, book_id).await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

// Re-export commonly used types
pub use database::Database;
pub use models::{
    Book, Member, NewBook, NewMember, Transaction, TransactionListing, TransactionStatus,
};
