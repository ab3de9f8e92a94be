//! Dot-separated event type names published on the [`FeedBus`](crate::FeedBus).

pub const COMMENT_POSTED: &str = "comment.posted";
pub const COMMENT_EDITED: &str = "comment.edited";
pub const COMMENT_DELETED: &str = "comment.deleted";

pub const EVENT_CREATED: &str = "event.created";
pub const GROUP_CREATED: &str = "group.created";

pub const GROUP_JOINED: &str = "group.joined";
pub const GROUP_LEFT: &str = "group.left";

/// A refresh cycle committed a new snapshot.
pub const FEED_REFRESHED: &str = "feed.refreshed";
/// A refresh cycle failed; the previous snapshot is still current.
pub const FEED_REFRESH_FAILED: &str = "feed.refresh_failed";

/// Source entity kinds.
pub const ENTITY_COMMENT: &str = "comment";
pub const ENTITY_EVENT: &str = "event";
pub const ENTITY_GROUP: &str = "group";
