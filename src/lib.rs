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


//! Book catalog, member registry and loan tracking on top of SQLite,
//! with optional ISBN metadata lookup over HTTP.
//!
//! ```rust,no_run
//! use library_core::{Library, LibraryConfig};
//! use library_core::storage::models::{NewBook, NewMember};
//!
//! # async fn run() -> library_core::Result<()> {
//! let library = Library::open(&LibraryConfig::from_env()?).await?;
//! let book = library.add_book(NewBook::new("Dune").with_copies(2)).await?;
//! let member = library.add_member(NewMember::new("Paul", "Atreides")).await?;
//! let loan = library.issue_book(member.member_id, book.book_id).await?;
//! library.return_book(loan.transaction_id).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod library;
pub mod lookup;
pub mod storage;

pub use config::LibraryConfig;
pub use error::{LibraryError, Result};
pub use library::{DeletedBook, DeletedMember, DeletedTransaction, Library, ReturnOutcome};
pub use lookup::{BookMetadata, IsbnLookupClient, LookupConfig};
pub use storage::Database;
