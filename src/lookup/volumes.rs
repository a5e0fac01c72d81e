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


//! Volumes response model
//!
//! Only the fields the catalog uses are modeled; everything else in the
//! response is ignored. Every field is optional because the remote catalog
//! omits whatever it doesn't know.

use crate::storage::models::NewBook;
use serde::{Deserialize, Serialize};

/// Top-level response of the volumes endpoint
///
/// `totalItems` is not modeled; an empty or missing `items` array is what
/// marks a miss.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumesResponse {
    #[serde(default)]
    pub items: Option<Vec<VolumeItem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeItem {
    #[serde(rename = "volumeInfo", default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub publisher: Option<String>,

    #[serde(default)]
    pub published_date: Option<String>,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageLinks {
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Metadata extracted from the first matching volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    /// Authors joined with ", "
    pub author: String,
    pub publisher: String,
    /// First four characters of the published date, may be empty
    pub publication_year: String,
    /// Categories joined with ", "
    pub category: String,
    pub description: String,
    pub cover_url: Option<String>,
}

impl VolumesResponse {
    /// Metadata of the first item, or `None` when the response has no items
    pub fn into_metadata(self) -> Option<BookMetadata> {
        let item = self.items?.into_iter().next()?;
        Some(BookMetadata::from(item.volume_info))
    }
}

impl From<VolumeInfo> for BookMetadata {
    fn from(info: VolumeInfo) -> Self {
        let publication_year = info
            .published_date
            .as_deref()
            .map(|date| date.chars().take(4).collect())
            .unwrap_or_default();

        Self {
            title: info.title.unwrap_or_default(),
            author: info.authors.join(", "),
            publisher: info.publisher.unwrap_or_default(),
            publication_year,
            category: info.categories.join(", "),
            description: info.description.unwrap_or_default(),
            cover_url: info.image_links.and_then(|links| links.thumbnail),
        }
    }
}

impl BookMetadata {
    /// Year as a number, when the published date started with one
    pub fn year(&self) -> Option<i32> {
        self.publication_year.parse().ok()
    }

    /// Turn a lookup result into a catalog entry ready for `Library::add_book`
    pub fn into_new_book(self, isbn: &str, total_copies: Option<i64>) -> NewBook {
        let publication_year = self.year();
        NewBook {
            isbn: Some(isbn.to_string()),
            title: self.title,
            author: self.author,
            publisher: self.publisher,
            publication_year,
            category: self.category,
            description: self.description,
            cover_url: self.cover_url,
            total_copies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::test_support::DUNE_VOLUMES as DUNE_RESPONSE;

    #[test]
    fn test_parse_first_volume() {
        let response: VolumesResponse = serde_json::from_str(DUNE_RESPONSE).unwrap();
        let metadata = response.into_metadata().expect("Should have metadata");

        assert_eq!(metadata.title, "Dune");
        assert_eq!(metadata.author, "Frank Herbert");
        assert_eq!(metadata.publisher, "Penguin");
        assert_eq!(metadata.publication_year, "1965");
        assert_eq!(metadata.category, "Fiction, Science Fiction");
        assert_eq!(metadata.cover_url.as_deref(), Some("http://books.google.com/thumb"));
    }

    #[test]
    fn test_no_items_is_not_found() {
        let response: VolumesResponse =
            serde_json::from_str(r#"{"kind": "books#volumes", "totalItems": 0}"#).unwrap();
        assert!(response.into_metadata().is_none());

        let response: VolumesResponse = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(response.into_metadata().is_none());
    }

    #[test]
    fn test_sparse_volume_info() {
        let response: VolumesResponse = serde_json::from_str(
            r#"{"items": [{"volumeInfo": {"title": "Untitled Pamphlet", "publishedDate": "19"}}]}"#,
        )
        .unwrap();
        let metadata = response.into_metadata().unwrap();

        assert_eq!(metadata.author, "");
        assert_eq!(metadata.publication_year, "19");
        assert_eq!(metadata.year(), Some(19));
        assert!(metadata.cover_url.is_none());
    }

    #[test]
    fn test_into_new_book() {
        let response: VolumesResponse = serde_json::from_str(DUNE_RESPONSE).unwrap();
        let book = response.into_metadata().unwrap().into_new_book("9780441013593", Some(2));

        assert_eq!(book.isbn.as_deref(), Some("9780441013593"));
        assert_eq!(book.publication_year, Some(1965));
        assert_eq!(book.total_copies, Some(2));
    }
}
