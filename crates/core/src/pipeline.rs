//! One full, stateless build cycle.
//!
//! viewer → events → comments → reference maps → visibility → join.
//! Every step reads from the [`RowSource`]; nothing is reused from a
//! previous cycle.

use serde::Serialize;

use crate::error::FeedError;
use crate::join::{build_view_model, group_comments_by_event, EventViewModel};
use crate::references::{chunked_ids, resolve_references};
use crate::rows::{EventQuery, EventRow};
use crate::store::RowSource;
use crate::viewer::{resolve_viewer, Viewer, ViewerIdentity};
use crate::visibility::decide;

/// Default number of ids per batched lookup.
pub const DEFAULT_LOOKUP_BATCH_SIZE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum ids per `IN`-style lookup.
    pub lookup_batch_size: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            lookup_batch_size: DEFAULT_LOOKUP_BATCH_SIZE,
        }
    }
}

/// Output of one build cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedBuild {
    /// `None` when nobody is signed in.
    pub viewer: Option<Viewer>,
    /// Visible events, ordered by date then id.
    pub events: Vec<EventViewModel>,
}

/// Run the full pipeline for `identity`.
///
/// A missing identity, or one that does not match a known user, yields an
/// empty build rather than an error.
pub async fn build_feed<S>(
    source: &S,
    identity: Option<&ViewerIdentity>,
    options: &BuildOptions,
) -> Result<FeedBuild, FeedError>
where
    S: RowSource + ?Sized,
{
    let Some(identity) = identity else {
        tracing::debug!("No viewer identity, building empty feed");
        return Ok(FeedBuild::default());
    };

    let batch_size = options.lookup_batch_size;

    let viewer = match resolve_viewer(source, identity, batch_size).await {
        Ok(viewer) => viewer,
        Err(FeedError::Unauthenticated) => {
            tracing::warn!(
                user_id = %identity.user_id,
                "Identity has no user row, building empty feed"
            );
            return Ok(FeedBuild::default());
        }
        Err(e) => return Err(e),
    };

    let events: Vec<EventRow> = source
        .fetch_events(&EventQuery::default())
        .await
        .map_err(FeedError::fetch("event"))?
        .into_iter()
        .filter(|e| e.is_approved)
        .collect();

    let mut comments = Vec::new();
    for batch in chunked_ids(events.iter().map(|e| e.id), batch_size) {
        let rows = source
            .fetch_comments(&batch)
            .await
            .map_err(FeedError::fetch("comment"))?;
        comments.extend(rows);
    }

    let refs = resolve_references(source, &events, &comments, batch_size).await?;

    let comments_by_event = group_comments_by_event(&comments);

    let mut view_models = Vec::new();
    for event in &events {
        let decision = decide(event, &viewer, &refs);
        if decision.is_visible() {
            let own = comments_by_event
                .get(&event.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            view_models.push(build_view_model(event, &refs, own, viewer.id));
        } else {
            tracing::trace!(event_id = event.id, reason = decision.as_str(), "Event hidden");
        }
    }
    view_models.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    tracing::info!(
        viewer_id = %viewer.id,
        fetched = events.len(),
        visible = view_models.len(),
        comments = comments.len(),
        "Feed built",
    );

    Ok(FeedBuild {
        viewer: Some(viewer),
        events: view_models,
    })
}
