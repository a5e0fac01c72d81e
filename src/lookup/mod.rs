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


//! Remote ISBN metadata lookup
//!
//! Best-effort enrichment of new catalog entries from a Google Books style
//! volumes endpoint.
//!
//! # API Endpoint
//! `GET https://www.googleapis.com/books/v1/volumes?q=isbn:{isbn}`
//!
//! Lookups never fail from the caller's point of view: anything that goes wrong
//! is logged and reported as "not found". Catalog state is never touched here.

pub mod client;
pub mod volumes;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use client::{IsbnLookupClient, LookupConfig, DEFAULT_LOOKUP_URL};
pub use volumes::{BookMetadata, VolumesResponse};
