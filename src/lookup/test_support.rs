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


//! Loopback HTTP fixture for lookup tests

use crate::lookup::{IsbnLookupClient, LookupConfig};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Volumes response for Dune, trimmed to the fields the catalog reads
pub(crate) const DUNE_VOLUMES: &str = r#"{
    "kind": "books#volumes",
    "totalItems": 1,
    "items": [{
        "id": "B1hSG45JCX4C",
        "volumeInfo": {
            "title": "Dune",
            "authors": ["Frank Herbert"],
            "publisher": "Penguin",
            "publishedDate": "1965-08-01",
            "description": "Set on the desert planet Arrakis...",
            "categories": ["Fiction", "Science Fiction"],
            "imageLinks": {
                "smallThumbnail": "http://books.google.com/small",
                "thumbnail": "http://books.google.com/thumb"
            }
        }
    }]
}"#;

/// Answer every connection on a fresh loopback port with the same response
///
/// Returns the volumes URL to point a client at.
pub(crate) async fn serve_fixed_response(status: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind loopback listener");
    let addr = listener.local_addr().expect("Listener has no address");

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}/books/v1/volumes", addr)
}

/// Client pointed at a fixture URL with a short timeout
pub(crate) fn client_for(base_url: &str) -> IsbnLookupClient {
    let config = LookupConfig::builder()
        .base_url(base_url)
        .timeout(Duration::from_secs(2))
        .build();
    IsbnLookupClient::with_config(config).expect("Failed to build lookup client")
}
