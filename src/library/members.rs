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


//! Member registry operations

use crate::error::{LibraryError, Result};
use crate::library::{non_blank, Library};
use crate::storage::models::{Member, NewMember};
use crate::storage::queries;

/// Result of a successful DeleteMember
#[derive(Debug, Clone)]
pub struct DeletedMember {
    pub member: Member,
    pub history_removed: u64,
}

impl Library {
    /// Register a member, joined today with status "active"
    ///
    /// # Errors
    /// - `Validation` if the first name is blank
    /// - `DuplicateKey` if the membership number is taken
    pub async fn add_member(&self, member: NewMember) -> Result<Member> {
        let first_name = member.first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(LibraryError::validation("first_name", "must not be empty"));
        }

        let member = NewMember {
            first_name,
            last_name: member.last_name.trim().to_string(),
            membership_number: non_blank(member.membership_number),
            ..member
        };

        let mut tx = self.database().pool().begin().await?;
        let member_id = queries::insert_member(&mut *tx, &member, Self::today()).await?;
        let created = queries::find_member_by_id(&mut *tx, member_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("member", member_id))?;
        tx.commit().await?;

        tracing::info!(member_id, "Member added");
        Ok(created)
    }

    pub async fn get_member(&self, member_id: i64) -> Result<Member> {
        let mut conn = self.database().pool().acquire().await?;
        queries::find_member_by_id(&mut *conn, member_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("member", member_id))
    }

    /// All members, most recently registered first
    pub async fn list_members(&self) -> Result<Vec<Member>> {
        let mut conn = self.database().pool().acquire().await?;
        let members = queries::list_members(&mut *conn).await?;
        tracing::debug!(count = members.len(), "Listed members");
        Ok(members)
    }

    /// Remove a member and their returned history
    ///
    /// # Errors
    /// - `NotFound` if the member doesn't exist
    /// - `Conflict` while the member still has an issued book
    pub async fn delete_member(&self, member_id: i64) -> Result<DeletedMember> {
        let mut tx = self.database().pool().begin().await?;

        // Same write-first order as delete_book
        let member = queries::delete_member(&mut *tx, member_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("member", member_id))?;

        let issued = queries::count_issued_for_member(&mut *tx, member_id).await?;
        if issued > 0 {
            tracing::debug!(member_id, issued, "Member delete blocked");
            return Err(LibraryError::conflict("member has issued books"));
        }

        let history_removed = queries::delete_returned_for_member(&mut *tx, member_id).await?;
        tx.commit().await?;

        tracing::info!(member_id, history_removed, "Member deleted");
        Ok(DeletedMember {
            member,
            history_removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::NewBook;
    use crate::storage::Database;

    async fn library() -> Library {
        Library::new(Database::new_in_memory().await.expect("Failed to create database"))
    }

    #[tokio::test]
    async fn test_add_member_defaults() {
        let library = library().await;

        let member = library
            .add_member(NewMember::new(" Paul ", "Atreides"))
            .await
            .expect("Failed to add member");

        assert_eq!(member.first_name, "Paul");
        assert_eq!(member.full_name(), "Paul Atreides");
        assert_eq!(member.status, "active");
        assert_eq!(member.join_date, Library::today());
        assert!(member.membership_number.is_none());
    }

    #[tokio::test]
    async fn test_add_member_requires_first_name() {
        let library = library().await;

        let err = library.add_member(NewMember::new("", "Atreides")).await.unwrap_err();
        assert!(matches!(err, LibraryError::Validation { ref field, .. } if field == "first_name"));
        assert_eq!(err.user_message(), "First name required");
    }

    #[tokio::test]
    async fn test_duplicate_membership_number() {
        let library = library().await;

        library
            .add_member(NewMember::new("Paul", "Atreides").with_membership_number("M-001"))
            .await
            .unwrap();
        let err = library
            .add_member(NewMember::new("Leto", "Atreides").with_membership_number("M-001"))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::DuplicateKey { .. }));

        // Blank numbers are stored as NULL and never collide
        library
            .add_member(NewMember::new("Jessica", "").with_membership_number(" "))
            .await
            .unwrap();
        library.add_member(NewMember::new("Alia", "")).await.unwrap();

        assert_eq!(library.list_members().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_member_blocked_while_borrowing() {
        let library = library().await;
        let member = library.add_member(NewMember::new("Paul", "Atreides")).await.unwrap();
        let book = library.add_book(NewBook::new("Dune")).await.unwrap();
        let loan = library.issue_book(member.member_id, book.book_id).await.unwrap();

        let err = library.delete_member(member.member_id).await.unwrap_err();
        assert!(matches!(err, LibraryError::Conflict(_)));

        library.return_book(loan.transaction_id).await.unwrap();
        let deleted = library.delete_member(member.member_id).await.unwrap();
        assert_eq!(deleted.history_removed, 1);
        assert_eq!(deleted.member.member_id, member.member_id);

        assert!(library.list_members().await.unwrap().is_empty());
        assert!(library.list_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_member() {
        let library = library().await;
        let err = library.delete_member(7).await.unwrap_err();
        assert!(matches!(err, LibraryError::NotFound { entity: "member", id: 7 }));
    }
}
