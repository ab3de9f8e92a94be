//! Collaborator seams: the raw fetch layer, the write layer and the
//! authentication source.
//!
//! The core never talks to a database directly. Implementations live in
//! other crates (`campus-db` for Postgres, in-memory fakes in tests).

use async_trait::async_trait;

use crate::error::StoreError;
use crate::rows::{
    CategoryRow, CommentEdit, CommentRow, EventQuery, EventRow, GroupRow, LocationRow,
    MembershipRow, NewComment, NewEvent, NewGroup, OrganizationRow, UserRow,
};
use crate::types::{DbId, UserId};
use crate::viewer::ViewerIdentity;

/// Batched, unjoined reads.
///
/// Id-list methods may be handed any number of ids up to the caller's batch
/// size; ids with no matching row are simply absent from the result.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<EventRow>, StoreError>;

    async fn fetch_comments(&self, event_ids: &[DbId]) -> Result<Vec<CommentRow>, StoreError>;

    async fn fetch_locations(&self, ids: &[DbId]) -> Result<Vec<LocationRow>, StoreError>;

    async fn fetch_categories(&self, ids: &[DbId]) -> Result<Vec<CategoryRow>, StoreError>;

    /// Every category, for building a category filter.
    async fn fetch_all_categories(&self) -> Result<Vec<CategoryRow>, StoreError>;

    async fn fetch_groups(&self, ids: &[DbId]) -> Result<Vec<GroupRow>, StoreError>;

    async fn fetch_memberships(&self, user_id: UserId) -> Result<Vec<MembershipRow>, StoreError>;

    async fn fetch_users(&self, ids: &[UserId]) -> Result<Vec<UserRow>, StoreError>;

    async fn fetch_organizations(&self, ids: &[DbId]) -> Result<Vec<OrganizationRow>, StoreError>;
}

/// Single-purpose writes, each atomic.
///
/// Methods returning `bool` report whether a row was affected.
#[async_trait]
pub trait RowWriter: Send + Sync {
    async fn insert_event(&self, event: &NewEvent) -> Result<DbId, StoreError>;

    async fn insert_group(&self, group: &NewGroup) -> Result<DbId, StoreError>;

    async fn insert_comment(&self, comment: &NewComment) -> Result<DbId, StoreError>;

    /// Update the body of a comment owned by `edit.author_id`.
    async fn update_comment(&self, edit: &CommentEdit) -> Result<bool, StoreError>;

    /// Delete a comment owned by `author_id`.
    async fn delete_comment(
        &self,
        comment_id: DbId,
        author_id: UserId,
    ) -> Result<bool, StoreError>;

    /// Idempotent; returns `false` if the membership already existed.
    async fn insert_membership(&self, user_id: UserId, group_id: DbId) -> Result<bool, StoreError>;

    /// Idempotent; returns `false` if there was no membership to remove.
    async fn delete_membership(&self, user_id: UserId, group_id: DbId) -> Result<bool, StoreError>;
}

/// The authentication collaborator.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    /// `None` means nobody is signed in.
    async fn current_viewer(&self) -> Option<ViewerIdentity>;
}

/// An identity fixed at construction, e.g. resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct FixedIdentity(pub Option<ViewerIdentity>);

#[async_trait]
impl IdentitySource for FixedIdentity {
    async fn current_viewer(&self) -> Option<ViewerIdentity> {
        self.0.clone()
    }
}
