//! Shared fixtures for feed session tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use campus_core::error::StoreError;
use campus_core::pipeline::BuildOptions;
use campus_core::rows::{
    CategoryRow, CommentEdit, CommentRow, EventQuery, EventRow, GroupRow, LocationRow,
    MembershipRow, NewComment, NewEvent, NewGroup, OrganizationRow, Role, UserRow,
    VisibilityTier,
};
use campus_core::store::{FixedIdentity, RowSource, RowWriter};
use campus_core::testing::{self, MemoryData, MemoryStore};
use campus_core::types::{DbId, UserId};
use campus_core::viewer::ViewerIdentity;
use campus_feed::FeedSession;
use tokio::sync::Notify;

pub const STATE_U: DbId = 1;
pub const TECH_I: DbId = 2;
pub const CHESS: DbId = 10;
pub const ROBOTICS: DbId = 11;
pub const DEBATE: DbId = 12;
pub const HACKERS: DbId = 13;

pub const ADMIN: u128 = 2;
pub const SUPER_ADMIN: u128 = 4;

pub fn viewer_id() -> UserId {
    testing::user_id(1)
}

pub fn identity() -> ViewerIdentity {
    ViewerIdentity {
        user_id: viewer_id(),
        organization_name: "State University".into(),
        role: Role::Student,
    }
}

/// Viewer 1 at State University, member of Chess Club. User 2 is the
/// State admin, user 4 the State super admin.
///
/// Events: 1 public (Tech), 2 private (State), 3 private (Tech),
/// 4 Robotics, 5 Chess.
pub fn campus_data() -> MemoryData {
    let admin_state = testing::user_id(2);
    let admin_tech = testing::user_id(3);

    let mut admin = testing::user(2, STATE_U, "admin@state.edu");
    admin.role = Role::Admin;
    let mut super_admin = testing::user(4, STATE_U, "dean@state.edu");
    super_admin.role = Role::SuperAdmin;

    let mut inactive = testing::group(DEBATE, "Debate Society", STATE_U);
    inactive.is_active = false;

    MemoryData {
        organizations: vec![
            OrganizationRow {
                id: STATE_U,
                name: "State University".into(),
            },
            OrganizationRow {
                id: TECH_I,
                name: "Tech Institute".into(),
            },
        ],
        users: vec![
            testing::user(1, STATE_U, "alex_j@state.edu"),
            admin,
            testing::user(3, TECH_I, "admin@tech.edu"),
            super_admin,
        ],
        groups: vec![
            testing::group(CHESS, "Chess Club", STATE_U),
            testing::group(ROBOTICS, "Robotics Club", STATE_U),
            inactive,
            testing::group(HACKERS, "Hack Club", TECH_I),
        ],
        memberships: vec![MembershipRow {
            user_id: viewer_id(),
            group_id: CHESS,
        }],
        locations: vec![LocationRow {
            id: 100,
            name: "Student Union".into(),
        }],
        categories: vec![
            CategoryRow {
                id: 201,
                name: "tech".into(),
            },
            CategoryRow {
                id: 200,
                name: "social".into(),
            },
        ],
        events: vec![
            testing::event(1, VisibilityTier::Public, admin_tech, None),
            testing::event(2, VisibilityTier::Private, admin_state, None),
            testing::event(3, VisibilityTier::Private, admin_tech, None),
            testing::event(4, VisibilityTier::Group, admin_state, Some(ROBOTICS)),
            testing::event(5, VisibilityTier::Group, admin_state, Some(CHESS)),
        ],
        comments: Vec::new(),
    }
}

pub fn session_over<S>(store: Arc<S>, identity: Option<ViewerIdentity>) -> FeedSession<S>
where
    S: RowSource + RowWriter,
{
    FeedSession::new(store, Arc::new(FixedIdentity(identity)), BuildOptions::default())
}

pub fn campus_session() -> (Arc<MemoryStore>, FeedSession<MemoryStore>) {
    let store = Arc::new(MemoryStore::new(campus_data()));
    let session = session_over(Arc::clone(&store), Some(identity()));
    (store, session)
}

/// A State University session for fixture user `n`, sharing `store`.
pub fn session_for(store: Arc<MemoryStore>, n: u128, role: Role) -> FeedSession<MemoryStore> {
    let identity = ViewerIdentity {
        user_id: testing::user_id(n),
        organization_name: "State University".into(),
        role,
    };
    session_over(store, Some(identity))
}

pub fn ids(events: &[campus_core::join::EventViewModel]) -> Vec<DbId> {
    events.iter().map(|e| e.id).collect()
}

// ---------------------------------------------------------------------------
// Gated store
// ---------------------------------------------------------------------------

/// Wraps a [`MemoryStore`] and holds the first `fetch_events` call after it
/// has read its rows, until [`release`](Self::release) is called.
pub struct GatedStore {
    pub inner: MemoryStore,
    armed: AtomicBool,
    reached: Notify,
    gate: Notify,
}

impl GatedStore {
    pub fn new(data: MemoryData) -> Self {
        Self {
            inner: MemoryStore::new(data),
            armed: AtomicBool::new(true),
            reached: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// Resolves once the held call has read its rows.
    pub async fn held(&self) {
        self.reached.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl RowSource for GatedStore {
    async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<EventRow>, StoreError> {
        let rows = self.inner.fetch_events(query).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.reached.notify_one();
            self.gate.notified().await;
        }
        Ok(rows)
    }

    async fn fetch_comments(&self, event_ids: &[DbId]) -> Result<Vec<CommentRow>, StoreError> {
        self.inner.fetch_comments(event_ids).await
    }

    async fn fetch_locations(&self, ids: &[DbId]) -> Result<Vec<LocationRow>, StoreError> {
        self.inner.fetch_locations(ids).await
    }

    async fn fetch_categories(&self, ids: &[DbId]) -> Result<Vec<CategoryRow>, StoreError> {
        self.inner.fetch_categories(ids).await
    }

    async fn fetch_all_categories(&self) -> Result<Vec<CategoryRow>, StoreError> {
        self.inner.fetch_all_categories().await
    }

    async fn fetch_groups(&self, ids: &[DbId]) -> Result<Vec<GroupRow>, StoreError> {
        self.inner.fetch_groups(ids).await
    }

    async fn fetch_memberships(&self, user_id: UserId) -> Result<Vec<MembershipRow>, StoreError> {
        self.inner.fetch_memberships(user_id).await
    }

    async fn fetch_users(&self, ids: &[UserId]) -> Result<Vec<UserRow>, StoreError> {
        self.inner.fetch_users(ids).await
    }

    async fn fetch_organizations(&self, ids: &[DbId]) -> Result<Vec<OrganizationRow>, StoreError> {
        self.inner.fetch_organizations(ids).await
    }
}

#[async_trait]
impl RowWriter for GatedStore {
    async fn insert_event(&self, event: &NewEvent) -> Result<DbId, StoreError> {
        self.inner.insert_event(event).await
    }

    async fn insert_group(&self, group: &NewGroup) -> Result<DbId, StoreError> {
        self.inner.insert_group(group).await
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<DbId, StoreError> {
        self.inner.insert_comment(comment).await
    }

    async fn update_comment(&self, edit: &CommentEdit) -> Result<bool, StoreError> {
        self.inner.update_comment(edit).await
    }

    async fn delete_comment(
        &self,
        comment_id: DbId,
        author_id: UserId,
    ) -> Result<bool, StoreError> {
        self.inner.delete_comment(comment_id, author_id).await
    }

    async fn insert_membership(&self, user_id: UserId, group_id: DbId) -> Result<bool, StoreError> {
        self.inner.insert_membership(user_id, group_id).await
    }

    async fn delete_membership(&self, user_id: UserId, group_id: DbId) -> Result<bool, StoreError> {
        self.inner.delete_membership(user_id, group_id).await
    }
}
