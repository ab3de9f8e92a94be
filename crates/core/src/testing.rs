//! In-memory collaborator for tests.
//!
//! [`MemoryStore`] implements [`RowSource`] and [`RowWriter`] over plain
//! vectors, counts calls per operation, and can be told to fail any
//! operation to exercise error paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::rows::{
    CategoryRow, CommentEdit, CommentRow, EventQuery, EventRow, GroupRow, LocationRow,
    MembershipRow, NewComment, NewEvent, NewGroup, OrganizationRow, UserRow,
};
use crate::store::{RowSource, RowWriter};
use crate::types::{DbId, UserId};

pub const OP_EVENTS: &str = "fetch_events";
pub const OP_COMMENTS: &str = "fetch_comments";
pub const OP_LOCATIONS: &str = "fetch_locations";
pub const OP_CATEGORIES: &str = "fetch_categories";
pub const OP_ALL_CATEGORIES: &str = "fetch_all_categories";
pub const OP_GROUPS: &str = "fetch_groups";
pub const OP_MEMBERSHIPS: &str = "fetch_memberships";
pub const OP_USERS: &str = "fetch_users";
pub const OP_ORGANIZATIONS: &str = "fetch_organizations";
pub const OP_INSERT_EVENT: &str = "insert_event";
pub const OP_INSERT_GROUP: &str = "insert_group";
pub const OP_INSERT_COMMENT: &str = "insert_comment";
pub const OP_UPDATE_COMMENT: &str = "update_comment";
pub const OP_DELETE_COMMENT: &str = "delete_comment";
pub const OP_INSERT_MEMBERSHIP: &str = "insert_membership";
pub const OP_DELETE_MEMBERSHIP: &str = "delete_membership";

#[derive(Debug, Default)]
pub struct MemoryData {
    pub organizations: Vec<OrganizationRow>,
    pub users: Vec<UserRow>,
    pub groups: Vec<GroupRow>,
    pub memberships: Vec<MembershipRow>,
    pub locations: Vec<LocationRow>,
    pub categories: Vec<CategoryRow>,
    pub events: Vec<EventRow>,
    pub comments: Vec<CommentRow>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new(data: MemoryData) -> Self {
        Self {
            data: Mutex::new(data),
            ..Default::default()
        }
    }

    /// Mutate the backing rows directly, bypassing the writer.
    pub fn with_data<R>(&self, f: impl FnOnce(&mut MemoryData) -> R) -> R {
        f(&mut lock(&self.data))
    }

    /// Make every subsequent call of `op` fail with `StoreError::Unavailable`.
    pub fn fail(&self, op: &'static str) {
        lock(&self.failing).insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        lock(&self.failing).remove(op);
    }

    /// Number of times `op` has been called.
    pub fn calls(&self, op: &'static str) -> usize {
        lock(&self.calls).get(op).copied().unwrap_or(0)
    }

    fn enter(&self, op: &'static str) -> Result<(), StoreError> {
        *lock(&self.calls).entry(op).or_default() += 1;
        if lock(&self.failing).contains(op) {
            return Err(StoreError::Unavailable(format!("{op} failed")));
        }
        Ok(())
    }

    fn select<T, K>(
        &self,
        op: &'static str,
        ids: &[K],
        rows: impl Fn(&MemoryData) -> Vec<T>,
        key: impl Fn(&T) -> K,
    ) -> Result<Vec<T>, StoreError>
    where
        K: PartialEq,
    {
        self.enter(op)?;
        let data = lock(&self.data);
        Ok(rows(&data).into_iter().filter(|r| ids.contains(&key(r))).collect())
    }
}

#[async_trait]
impl RowSource for MemoryStore {
    async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<EventRow>, StoreError> {
        self.enter(OP_EVENTS)?;
        let data = lock(&self.data);
        Ok(data
            .events
            .iter()
            .filter(|e| !query.approved_only || e.is_approved)
            .cloned()
            .collect())
    }

    async fn fetch_comments(&self, event_ids: &[DbId]) -> Result<Vec<CommentRow>, StoreError> {
        self.select(OP_COMMENTS, event_ids, |d| d.comments.clone(), |c| c.event_id)
    }

    async fn fetch_locations(&self, ids: &[DbId]) -> Result<Vec<LocationRow>, StoreError> {
        self.select(OP_LOCATIONS, ids, |d| d.locations.clone(), |r| r.id)
    }

    async fn fetch_categories(&self, ids: &[DbId]) -> Result<Vec<CategoryRow>, StoreError> {
        self.select(OP_CATEGORIES, ids, |d| d.categories.clone(), |r| r.id)
    }

    async fn fetch_all_categories(&self) -> Result<Vec<CategoryRow>, StoreError> {
        self.enter(OP_ALL_CATEGORIES)?;
        Ok(lock(&self.data).categories.clone())
    }

    async fn fetch_groups(&self, ids: &[DbId]) -> Result<Vec<GroupRow>, StoreError> {
        self.select(OP_GROUPS, ids, |d| d.groups.clone(), |r| r.id)
    }

    async fn fetch_memberships(&self, user_id: UserId) -> Result<Vec<MembershipRow>, StoreError> {
        self.select(OP_MEMBERSHIPS, &[user_id], |d| d.memberships.clone(), |m| m.user_id)
    }

    async fn fetch_users(&self, ids: &[UserId]) -> Result<Vec<UserRow>, StoreError> {
        self.select(OP_USERS, ids, |d| d.users.clone(), |r| r.id)
    }

    async fn fetch_organizations(&self, ids: &[DbId]) -> Result<Vec<OrganizationRow>, StoreError> {
        self.select(OP_ORGANIZATIONS, ids, |d| d.organizations.clone(), |r| r.id)
    }
}

#[async_trait]
impl RowWriter for MemoryStore {
    async fn insert_event(&self, event: &NewEvent) -> Result<DbId, StoreError> {
        self.enter(OP_INSERT_EVENT)?;
        let mut data = lock(&self.data);
        if !data.groups.iter().any(|g| g.id == event.group_id) {
            return Err(StoreError::Rejected(format!(
                "group {} does not exist",
                event.group_id
            )));
        }
        let id = data.events.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        data.events.push(EventRow {
            id,
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
            visibility: event.visibility.clone(),
            created_by: event.created_by,
            group_id: Some(event.group_id),
            category_id: Some(event.category_id),
            location_id: Some(event.location_id),
            contact_phone: Some(event.contact_phone.clone()),
            contact_email: Some(event.contact_email.clone()),
            is_approved: event.is_approved,
        });
        Ok(id)
    }

    async fn insert_group(&self, group: &NewGroup) -> Result<DbId, StoreError> {
        self.enter(OP_INSERT_GROUP)?;
        let mut data = lock(&self.data);
        let id = data.groups.iter().map(|g| g.id).max().unwrap_or(0) + 1;
        data.groups.push(GroupRow {
            id,
            name: group.name.clone(),
            organization_id: group.organization_id,
            admin_id: Some(group.admin_id),
            is_active: group.is_active,
        });
        Ok(id)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<DbId, StoreError> {
        self.enter(OP_INSERT_COMMENT)?;
        let mut data = lock(&self.data);
        if !data.events.iter().any(|e| e.id == comment.event_id) {
            return Err(StoreError::Rejected(format!(
                "event {} does not exist",
                comment.event_id
            )));
        }
        let id = data.comments.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        data.comments.push(CommentRow {
            id,
            event_id: comment.event_id,
            author_id: comment.author_id,
            text: comment.text.clone(),
            rating: comment.rating,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn update_comment(&self, edit: &CommentEdit) -> Result<bool, StoreError> {
        self.enter(OP_UPDATE_COMMENT)?;
        let mut data = lock(&self.data);
        match data
            .comments
            .iter_mut()
            .find(|c| c.id == edit.comment_id && c.author_id == edit.author_id)
        {
            Some(c) => {
                c.text = edit.text.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_comment(
        &self,
        comment_id: DbId,
        author_id: UserId,
    ) -> Result<bool, StoreError> {
        self.enter(OP_DELETE_COMMENT)?;
        let mut data = lock(&self.data);
        let before = data.comments.len();
        data.comments
            .retain(|c| !(c.id == comment_id && c.author_id == author_id));
        Ok(data.comments.len() < before)
    }

    async fn insert_membership(&self, user_id: UserId, group_id: DbId) -> Result<bool, StoreError> {
        self.enter(OP_INSERT_MEMBERSHIP)?;
        let mut data = lock(&self.data);
        if data
            .memberships
            .iter()
            .any(|m| m.user_id == user_id && m.group_id == group_id)
        {
            return Ok(false);
        }
        data.memberships.push(MembershipRow { user_id, group_id });
        Ok(true)
    }

    async fn delete_membership(&self, user_id: UserId, group_id: DbId) -> Result<bool, StoreError> {
        self.enter(OP_DELETE_MEMBERSHIP)?;
        let mut data = lock(&self.data);
        let before = data.memberships.len();
        data.memberships
            .retain(|m| !(m.user_id == user_id && m.group_id == group_id));
        Ok(data.memberships.len() < before)
    }
}

// ---------------------------------------------------------------------------
// Row builders
// ---------------------------------------------------------------------------

/// Deterministic user id for fixtures.
pub fn user_id(n: u128) -> UserId {
    UserId::from_u128(n)
}

pub fn user(n: u128, organization_id: DbId, email: &str) -> UserRow {
    UserRow {
        id: user_id(n),
        name: email.split('@').next().unwrap_or_default().to_string(),
        email: email.to_string(),
        organization_id: Some(organization_id),
        role: crate::rows::Role::Student,
    }
}

pub fn group(id: DbId, name: &str, organization_id: DbId) -> GroupRow {
    GroupRow {
        id,
        name: name.to_string(),
        organization_id,
        admin_id: None,
        is_active: true,
    }
}

/// An approved event one day from now.
pub fn event(
    id: DbId,
    tier: crate::rows::VisibilityTier,
    created_by: UserId,
    group_id: Option<DbId>,
) -> EventRow {
    EventRow {
        id,
        title: format!("Event {id}"),
        description: String::new(),
        date: Utc::now() + chrono::Duration::days(1),
        visibility: tier,
        created_by,
        group_id,
        category_id: None,
        location_id: None,
        contact_phone: None,
        contact_email: None,
        is_approved: true,
    }
}
