//! Repository for the `comments` table.
//!
//! Updates and deletes are scoped to the author: a row owned by someone
//! else is indistinguishable from a missing one.

use campus_core::rows::{CommentEdit, NewComment};
use campus_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::comment::Comment;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "comment_id, event_id, user_id, comment_text, rating, created_at";

pub struct CommentRepo;

impl CommentRepo {
    /// Comments on any of `event_ids`, oldest first.
    pub async fn list_for_events(
        pool: &PgPool,
        event_ids: &[DbId],
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments \
             WHERE event_id = ANY($1) \
             ORDER BY created_at ASC, comment_id ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(event_ids)
            .fetch_all(pool)
            .await
    }

    /// Insert a comment, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (event_id, user_id, comment_text, rating) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.event_id)
            .bind(input.author_id)
            .bind(&input.text)
            .bind(input.rating)
            .fetch_one(pool)
            .await
    }

    /// Replace the text of a comment owned by `edit.author_id`.
    ///
    /// Returns `true` if a row was updated.
    pub async fn update_text(pool: &PgPool, edit: &CommentEdit) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE comments SET comment_text = $3 \
             WHERE comment_id = $1 AND user_id = $2",
        )
        .bind(edit.comment_id)
        .bind(edit.author_id)
        .bind(&edit.text)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a comment owned by `author_id`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        comment_id: DbId,
        author_id: UserId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE comment_id = $1 AND user_id = $2")
            .bind(comment_id)
            .bind(author_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
