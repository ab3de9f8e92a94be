//! Event comment model.

use campus_core::rows::CommentRow;
use campus_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub comment_id: DbId,
    pub event_id: DbId,
    pub user_id: UserId,
    pub comment_text: String,
    pub rating: Option<i16>,
    pub created_at: Timestamp,
}

impl From<Comment> for CommentRow {
    fn from(c: Comment) -> Self {
        Self {
            id: c.comment_id,
            event_id: c.event_id,
            author_id: c.user_id,
            text: c.comment_text,
            rating: c.rating,
            created_at: c.created_at,
        }
    }
}
