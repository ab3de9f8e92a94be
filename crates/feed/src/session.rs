//! The consistency loop.
//!
//! A [`FeedSession`] holds one viewer's last-known-good snapshot. Every
//! successful mutation is followed by a full rebuild; nothing is patched
//! incrementally. Overlapping cycles are ordered by generation and only the
//! newest one may replace the snapshot.

use std::sync::{Arc, Mutex, MutexGuard};

use campus_core::error::FeedError;
use campus_core::filter::{apply_filters, FilterOptions};
use campus_core::join::EventViewModel;
use campus_core::pipeline::{build_feed, BuildOptions, FeedBuild};
use campus_core::rows::{
    CategoryRow, CommentEdit, NewComment, NewEvent, NewGroup, Role, UserRow, VisibilityTier,
};
use campus_core::store::{IdentitySource, RowSource, RowWriter};
use campus_core::types::{DbId, Timestamp};
use campus_core::viewer::ViewerIdentity;
use campus_events::{kinds, FeedBus, FeedEvent};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::OnceCell;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    /// At least one build cycle is in flight.
    Fetching,
}

/// Input of [`FeedSession::create_event`]. The creator is the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    /// Date and time of the event, combined.
    pub date: Timestamp,
    pub visibility: VisibilityTier,
    pub group_id: DbId,
    pub category_id: DbId,
    pub location_id: DbId,
    pub contact_phone: String,
    pub contact_email: String,
}

#[derive(Debug)]
struct Inner {
    generation: u64,
    in_flight: usize,
    snapshot: Arc<FeedBuild>,
    last_error: Option<FeedError>,
}

pub struct FeedSession<S> {
    store: Arc<S>,
    identity_source: Arc<dyn IdentitySource>,
    /// Resolved on first use and kept for the life of the session.
    identity: OnceCell<Option<ViewerIdentity>>,
    options: BuildOptions,
    bus: Option<Arc<FeedBus>>,
    inner: Mutex<Inner>,
}

impl<S> FeedSession<S>
where
    S: RowSource + RowWriter,
{
    pub fn new(
        store: Arc<S>,
        identity_source: Arc<dyn IdentitySource>,
        options: BuildOptions,
    ) -> Self {
        Self {
            store,
            identity_source,
            identity: OnceCell::new(),
            options,
            bus: None,
            inner: Mutex::new(Inner {
                generation: 0,
                in_flight: 0,
                snapshot: Arc::new(FeedBuild::default()),
                last_error: None,
            }),
        }
    }

    /// Publish mutation and refresh notifications on `bus`.
    pub fn with_bus(mut self, bus: Arc<FeedBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    // ---- Reads ----

    /// The last committed build.
    pub fn snapshot(&self) -> Arc<FeedBuild> {
        Arc::clone(&self.lock().snapshot)
    }

    pub fn state(&self) -> SessionState {
        if self.lock().in_flight > 0 {
            SessionState::Fetching
        } else {
            SessionState::Idle
        }
    }

    /// Error of the most recent completed cycle, cleared by the next success.
    pub fn last_error(&self) -> Option<FeedError> {
        self.lock().last_error.clone()
    }

    /// Snapshot events passing `filter`, evaluated against the current time.
    pub fn view_models(&self, filter: &FilterOptions) -> Vec<EventViewModel> {
        self.view_models_at(filter, Utc::now())
    }

    pub fn view_models_at(&self, filter: &FilterOptions, now: Timestamp) -> Vec<EventViewModel> {
        apply_filters(&self.snapshot().events, filter, now)
    }

    /// Every event category, for a category picker.
    pub async fn categories(&self) -> Result<Vec<CategoryRow>, FeedError> {
        let mut categories = self
            .store
            .fetch_all_categories()
            .await
            .map_err(FeedError::fetch("category"))?;
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    // ---- Refresh ----

    /// Run a full build cycle and commit it unless a newer cycle started
    /// meanwhile.
    ///
    /// On failure the previous snapshot stays current and the error is kept
    /// as [`last_error`](Self::last_error).
    ///
    /// Dropping the returned future abandons the cycle without touching the
    /// snapshot.
    pub async fn refresh(&self) -> Result<Vec<EventViewModel>, FeedError> {
        let (generation, in_flight) = InFlight::enter(&self.inner);
        tracing::debug!(generation, "Feed refresh started");

        let identity = self.identity().await;
        let result = build_feed(self.store.as_ref(), identity.as_ref(), &self.options).await;

        let outcome = {
            let mut inner = self.lock();
            if generation != inner.generation {
                Err(FeedError::Superseded)
            } else {
                match result {
                    Ok(build) => {
                        let events = build.events.clone();
                        inner.snapshot = Arc::new(build);
                        inner.last_error = None;
                        Ok(events)
                    }
                    Err(e) => {
                        inner.last_error = Some(e.clone());
                        Err(e)
                    }
                }
            }
        };
        drop(in_flight);

        match &outcome {
            Ok(events) => {
                tracing::info!(generation, visible = events.len(), "Feed refreshed");
                self.publish(
                    FeedEvent::new(kinds::FEED_REFRESHED)
                        .with_payload(serde_json::json!({ "visible": events.len() })),
                );
            }
            Err(FeedError::Superseded) => {
                tracing::debug!(generation, "Feed refresh superseded, discarding result");
            }
            Err(e) => {
                tracing::warn!(
                    generation,
                    error = %e,
                    "Feed refresh failed, keeping previous snapshot"
                );
                self.publish(
                    FeedEvent::new(kinds::FEED_REFRESH_FAILED)
                        .with_payload(serde_json::json!({ "error": e.to_string() })),
                );
            }
        }
        outcome
    }

    // ---- Mutations ----

    /// Post an unrated comment. Returns the new comment id.
    pub async fn post_comment(&self, event_id: DbId, text: &str) -> Result<DbId, FeedError> {
        self.post_rated_comment(event_id, text, None).await
    }

    pub async fn post_rated_comment(
        &self,
        event_id: DbId,
        text: &str,
        rating: Option<i16>,
    ) -> Result<DbId, FeedError> {
        let viewer = self.require_identity().await?;
        let comment = NewComment {
            event_id,
            author_id: viewer.user_id,
            text: text.trim().to_string(),
            rating,
        };
        comment.validate()?;

        let comment_id = self
            .store
            .insert_comment(&comment)
            .await
            .map_err(FeedError::write("insert_comment"))?;
        tracing::info!(comment_id, event_id, user_id = %viewer.user_id, "Comment posted");
        self.publish(
            FeedEvent::new(kinds::COMMENT_POSTED)
                .with_source(kinds::ENTITY_COMMENT, comment_id)
                .with_actor(viewer.user_id)
                .with_payload(serde_json::json!({ "event_id": event_id, "rating": rating })),
        );

        self.refresh_after_write().await?;
        Ok(comment_id)
    }

    /// Replace the text of one of the viewer's own comments.
    pub async fn edit_comment(&self, comment_id: DbId, text: &str) -> Result<(), FeedError> {
        let viewer = self.require_identity().await?;
        let edit = CommentEdit {
            comment_id,
            author_id: viewer.user_id,
            text: text.trim().to_string(),
        };
        edit.validate()?;

        let updated = self
            .store
            .update_comment(&edit)
            .await
            .map_err(FeedError::write("update_comment"))?;
        if !updated {
            return Err(not_owned("update_comment", comment_id));
        }
        tracing::info!(comment_id, user_id = %viewer.user_id, "Comment edited");
        self.publish(
            FeedEvent::new(kinds::COMMENT_EDITED)
                .with_source(kinds::ENTITY_COMMENT, comment_id)
                .with_actor(viewer.user_id),
        );

        self.refresh_after_write().await
    }

    /// Delete one of the viewer's own comments.
    pub async fn delete_comment(&self, comment_id: DbId) -> Result<(), FeedError> {
        let viewer = self.require_identity().await?;

        let deleted = self
            .store
            .delete_comment(comment_id, viewer.user_id)
            .await
            .map_err(FeedError::write("delete_comment"))?;
        if !deleted {
            return Err(not_owned("delete_comment", comment_id));
        }
        tracing::info!(comment_id, user_id = %viewer.user_id, "Comment deleted");
        self.publish(
            FeedEvent::new(kinds::COMMENT_DELETED)
                .with_source(kinds::ENTITY_COMMENT, comment_id)
                .with_actor(viewer.user_id),
        );

        self.refresh_after_write().await
    }

    /// Join an active group of the viewer's own organization.
    ///
    /// Joining a group twice is not an error.
    pub async fn join_group(&self, group_id: DbId) -> Result<(), FeedError> {
        let viewer = self.require_identity().await?;
        let user = self.stored_user(&viewer).await?;
        self.eligible_group(group_id, &user).await?;

        let inserted = self
            .store
            .insert_membership(viewer.user_id, group_id)
            .await
            .map_err(FeedError::write("insert_membership"))?;
        tracing::info!(group_id, user_id = %viewer.user_id, inserted, "Group joined");
        self.publish(
            FeedEvent::new(kinds::GROUP_JOINED)
                .with_source(kinds::ENTITY_GROUP, group_id)
                .with_actor(viewer.user_id),
        );

        self.refresh_after_write().await
    }

    /// Leave a group. Leaving a group the viewer is not in still refreshes.
    pub async fn leave_group(&self, group_id: DbId) -> Result<(), FeedError> {
        let viewer = self.require_identity().await?;

        let removed = self
            .store
            .delete_membership(viewer.user_id, group_id)
            .await
            .map_err(FeedError::write("delete_membership"))?;
        tracing::info!(group_id, user_id = %viewer.user_id, removed, "Group left");
        self.publish(
            FeedEvent::new(kinds::GROUP_LEFT)
                .with_source(kinds::ENTITY_GROUP, group_id)
                .with_actor(viewer.user_id),
        );

        self.refresh_after_write().await
    }

    /// Create an approved event hosted by one of the viewer's groups.
    ///
    /// Requires the admin role. Returns the new event id.
    pub async fn create_event(&self, draft: EventDraft) -> Result<DbId, FeedError> {
        let viewer = self.require_identity().await?;
        let user = self.stored_user(&viewer).await?;
        if user.role != Role::Admin {
            return Err(FeedError::Forbidden(
                "creating events requires the admin role".into(),
            ));
        }

        let event = NewEvent {
            created_by: viewer.user_id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            date: draft.date,
            visibility: draft.visibility,
            group_id: draft.group_id,
            category_id: draft.category_id,
            location_id: draft.location_id,
            contact_phone: draft.contact_phone.trim().to_string(),
            contact_email: draft.contact_email.trim().to_string(),
            is_approved: true,
        };
        event.validate()?;
        self.eligible_group(event.group_id, &user).await?;

        let event_id = self
            .store
            .insert_event(&event)
            .await
            .map_err(FeedError::write("insert_event"))?;
        tracing::info!(
            event_id,
            group_id = event.group_id,
            user_id = %viewer.user_id,
            "Event created"
        );
        self.publish(
            FeedEvent::new(kinds::EVENT_CREATED)
                .with_source(kinds::ENTITY_EVENT, event_id)
                .with_actor(viewer.user_id)
                .with_payload(serde_json::json!({
                    "group_id": event.group_id,
                    "visibility": event.visibility.as_str(),
                })),
        );

        self.refresh_after_write().await?;
        Ok(event_id)
    }

    /// Create an active group at the viewer's organization, administered by
    /// the viewer.
    ///
    /// Requires the super admin role. Returns the new group id.
    pub async fn create_group(&self, name: &str) -> Result<DbId, FeedError> {
        let viewer = self.require_identity().await?;
        let user = self.stored_user(&viewer).await?;
        if user.role != Role::SuperAdmin {
            return Err(FeedError::Forbidden(
                "creating groups requires the super admin role".into(),
            ));
        }
        let organization_id = user.organization_id.ok_or_else(|| {
            FeedError::Validation("viewer does not belong to an organization".into())
        })?;

        let group = NewGroup {
            name: name.trim().to_string(),
            organization_id,
            admin_id: viewer.user_id,
            is_active: true,
        };
        group.validate()?;

        let group_id = self
            .store
            .insert_group(&group)
            .await
            .map_err(FeedError::write("insert_group"))?;
        tracing::info!(group_id, organization_id, user_id = %viewer.user_id, "Group created");
        self.publish(
            FeedEvent::new(kinds::GROUP_CREATED)
                .with_source(kinds::ENTITY_GROUP, group_id)
                .with_actor(viewer.user_id),
        );

        self.refresh_after_write().await?;
        Ok(group_id)
    }

    // ---- Internals ----

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    async fn identity(&self) -> Option<ViewerIdentity> {
        self.identity
            .get_or_init(|| self.identity_source.current_viewer())
            .await
            .clone()
    }

    async fn require_identity(&self) -> Result<ViewerIdentity, FeedError> {
        self.identity().await.ok_or(FeedError::Unauthenticated)
    }

    /// The viewer's stored row; role and organization are read from here,
    /// not from the cached identity.
    async fn stored_user(&self, viewer: &ViewerIdentity) -> Result<UserRow, FeedError> {
        self.store
            .fetch_users(&[viewer.user_id])
            .await
            .map_err(FeedError::fetch("user"))?
            .into_iter()
            .find(|u| u.id == viewer.user_id)
            .ok_or(FeedError::Unauthenticated)
    }

    /// The group must exist, be active and belong to `user`'s organization.
    async fn eligible_group(&self, group_id: DbId, user: &UserRow) -> Result<(), FeedError> {
        let group = self
            .store
            .fetch_groups(&[group_id])
            .await
            .map_err(FeedError::fetch("group"))?
            .into_iter()
            .find(|g| g.id == group_id)
            .ok_or(FeedError::NotFound {
                entity: "group",
                id: group_id,
            })?;
        if !group.is_active {
            return Err(FeedError::Validation(format!(
                "group '{}' is not active",
                group.name
            )));
        }
        if user.organization_id != Some(group.organization_id) {
            return Err(FeedError::Forbidden(format!(
                "group '{}' belongs to another organization",
                group.name
            )));
        }
        Ok(())
    }

    /// A superseding cycle started after the write, so it observes it.
    async fn refresh_after_write(&self) -> Result<(), FeedError> {
        match self.refresh().await {
            Ok(_) | Err(FeedError::Superseded) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn publish(&self, event: FeedEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(event);
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Marks one cycle as in flight until dropped, including when the refresh
/// future is cancelled mid-await.
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
}

impl<'a> InFlight<'a> {
    /// Start a cycle, returning its generation.
    fn enter(inner: &'a Mutex<Inner>) -> (u64, Self) {
        let mut guard = lock(inner);
        guard.generation += 1;
        guard.in_flight += 1;
        (guard.generation, Self { inner })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.inner).in_flight -= 1;
    }
}

fn not_owned(operation: &'static str, comment_id: DbId) -> FeedError {
    FeedError::Write {
        operation,
        source: campus_core::error::StoreError::NotFound {
            entity: "comment",
            id: comment_id.to_string(),
        },
    }
}
