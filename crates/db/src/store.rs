//! [`PgStore`]: the Postgres implementation of the core's collaborator
//! traits.

use async_trait::async_trait;
use campus_core::error::StoreError;
use campus_core::rows::{
    CategoryRow, CommentEdit, CommentRow, EventQuery, EventRow, GroupRow, LocationRow,
    MembershipRow, NewComment, NewEvent, NewGroup, OrganizationRow, UserRow,
};
use campus_core::store::{RowSource, RowWriter};
use campus_core::types::{DbId, UserId};

use crate::error::classify_as;
use crate::repositories::{
    CategoryRepo, CommentRepo, EventRepo, LocationRepo, MembershipRepo, RsoRepo, UniversityRepo,
    UserRepo,
};
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn convert<M, R: From<M>>(models: Vec<M>) -> Vec<R> {
    models.into_iter().map(R::from).collect()
}

#[async_trait]
impl RowSource for PgStore {
    async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<EventRow>, StoreError> {
        EventRepo::list(&self.pool, query)
            .await
            .map(convert)
            .map_err(classify_as("event"))
    }

    async fn fetch_comments(&self, event_ids: &[DbId]) -> Result<Vec<CommentRow>, StoreError> {
        CommentRepo::list_for_events(&self.pool, event_ids)
            .await
            .map(convert)
            .map_err(classify_as("comment"))
    }

    async fn fetch_locations(&self, ids: &[DbId]) -> Result<Vec<LocationRow>, StoreError> {
        LocationRepo::find_by_ids(&self.pool, ids)
            .await
            .map(convert)
            .map_err(classify_as("location"))
    }

    async fn fetch_categories(&self, ids: &[DbId]) -> Result<Vec<CategoryRow>, StoreError> {
        CategoryRepo::find_by_ids(&self.pool, ids)
            .await
            .map(convert)
            .map_err(classify_as("category"))
    }

    async fn fetch_all_categories(&self) -> Result<Vec<CategoryRow>, StoreError> {
        CategoryRepo::list(&self.pool)
            .await
            .map(convert)
            .map_err(classify_as("category"))
    }

    async fn fetch_groups(&self, ids: &[DbId]) -> Result<Vec<GroupRow>, StoreError> {
        RsoRepo::find_by_ids(&self.pool, ids)
            .await
            .map(convert)
            .map_err(classify_as("rso"))
    }

    async fn fetch_memberships(&self, user_id: UserId) -> Result<Vec<MembershipRow>, StoreError> {
        MembershipRepo::list_for_user(&self.pool, user_id)
            .await
            .map(convert)
            .map_err(classify_as("rso_member"))
    }

    async fn fetch_users(&self, ids: &[UserId]) -> Result<Vec<UserRow>, StoreError> {
        UserRepo::find_by_ids(&self.pool, ids)
            .await
            .map_err(classify_as("user"))?
            .into_iter()
            .map(UserRow::try_from)
            .collect()
    }

    async fn fetch_organizations(&self, ids: &[DbId]) -> Result<Vec<OrganizationRow>, StoreError> {
        UniversityRepo::find_by_ids(&self.pool, ids)
            .await
            .map(convert)
            .map_err(classify_as("university"))
    }
}

#[async_trait]
impl RowWriter for PgStore {
    async fn insert_event(&self, event: &NewEvent) -> Result<DbId, StoreError> {
        let row = EventRepo::create(&self.pool, event)
            .await
            .map_err(classify_as("event"))?;
        tracing::debug!(event_id = row.event_id, rso_id = ?row.rso_id, "Event inserted");
        Ok(row.event_id)
    }

    async fn insert_group(&self, group: &NewGroup) -> Result<DbId, StoreError> {
        let row = RsoRepo::create(&self.pool, group)
            .await
            .map_err(classify_as("rso"))?;
        tracing::debug!(rso_id = row.rso_id, university_id = row.university_id, "RSO inserted");
        Ok(row.rso_id)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<DbId, StoreError> {
        let row = CommentRepo::create(&self.pool, comment)
            .await
            .map_err(classify_as("comment"))?;
        tracing::debug!(comment_id = row.comment_id, event_id = row.event_id, "Comment inserted");
        Ok(row.comment_id)
    }

    async fn update_comment(&self, edit: &CommentEdit) -> Result<bool, StoreError> {
        CommentRepo::update_text(&self.pool, edit)
            .await
            .map_err(classify_as("comment"))
    }

    async fn delete_comment(
        &self,
        comment_id: DbId,
        author_id: UserId,
    ) -> Result<bool, StoreError> {
        CommentRepo::delete(&self.pool, comment_id, author_id)
            .await
            .map_err(classify_as("comment"))
    }

    async fn insert_membership(&self, user_id: UserId, group_id: DbId) -> Result<bool, StoreError> {
        MembershipRepo::insert(&self.pool, user_id, group_id)
            .await
            .map_err(classify_as("rso_member"))
    }

    async fn delete_membership(&self, user_id: UserId, group_id: DbId) -> Result<bool, StoreError> {
        MembershipRepo::delete(&self.pool, user_id, group_id)
            .await
            .map_err(classify_as("rso_member"))
    }
}
