//! Join & denormalization: one immutable view model per visible event.
//!
//! Visibility has already been decided by the time an event reaches
//! [`build_view_model`]; this module only merges rows.

use std::collections::HashMap;

use serde::Serialize;

use crate::references::ReferenceMaps;
use crate::rows::{CommentRow, EventRow, VisibilityTier};
use crate::types::{DbId, Timestamp, UserId};

/// Average of the rated comments of one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingAggregate {
    pub event_id: DbId,
    /// Rounded to one decimal; `0.0` when nothing is rated.
    pub mean: f64,
    /// Number of comments carrying a rating.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: DbId,
    pub author_id: UserId,
    pub author_name: String,
    pub text: String,
    pub rating: Option<i16>,
    pub created_at: Timestamp,
    pub is_own_comment: bool,
}

/// The fully joined, read-only representation of an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventViewModel {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub date: Timestamp,
    pub visibility: VisibilityTier,
    pub created_by: UserId,
    pub organization_name: String,
    pub location_name: String,
    pub category_name: String,
    pub group_id: Option<DbId>,
    /// `None` unless the event is group-tier.
    pub group_name: Option<String>,
    pub contact_phone: String,
    pub contact_email: String,
    pub rating: RatingAggregate,
    pub comments: Vec<CommentView>,
}

/// Round to one decimal place.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute the rating aggregate over the comments of `event_id`.
///
/// Unrated comments do not count toward the mean.
pub fn compute_rating(event_id: DbId, comments: &[&CommentRow]) -> RatingAggregate {
    let ratings: Vec<f64> = comments
        .iter()
        .filter_map(|c| c.rating)
        .map(f64::from)
        .collect();

    let mean = if ratings.is_empty() {
        0.0
    } else {
        round_one_decimal(ratings.iter().sum::<f64>() / ratings.len() as f64)
    };

    RatingAggregate {
        event_id,
        mean,
        count: ratings.len(),
    }
}

/// Partition comments by event in one pass.
pub fn group_comments_by_event(comments: &[CommentRow]) -> HashMap<DbId, Vec<&CommentRow>> {
    let mut by_event: HashMap<DbId, Vec<&CommentRow>> = HashMap::new();
    for comment in comments {
        by_event.entry(comment.event_id).or_default().push(comment);
    }
    by_event
}

/// Display name for a comment author: the local part of their email.
///
/// Empty when the author could not be resolved.
pub fn display_name_from_email(email: Option<&str>) -> String {
    email
        .and_then(|e| e.split('@').next())
        .unwrap_or_default()
        .to_string()
}

/// Merge `event` with its references, comments and rating.
///
/// `comments` are the rows of this event, as produced by
/// [`group_comments_by_event`]. They are ordered by creation time, ties
/// broken by id.
pub fn build_view_model(
    event: &EventRow,
    refs: &ReferenceMaps,
    comments: &[&CommentRow],
    viewer_id: UserId,
) -> EventViewModel {
    let mut own = comments.to_vec();
    own.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let rating = compute_rating(event.id, &own);

    let comments = own
        .into_iter()
        .map(|c| CommentView {
            id: c.id,
            author_id: c.author_id,
            author_name: display_name_from_email(refs.email_of(&c.author_id)),
            text: c.text.clone(),
            rating: c.rating,
            created_at: c.created_at,
            is_own_comment: c.author_id == viewer_id,
        })
        .collect();

    let group_name = match event.visibility {
        VisibilityTier::Group => {
            let name = refs.group_name(event.group_id).unwrap_or_default();
            Some(name.to_string())
        }
        _ => None,
    };

    EventViewModel {
        id: event.id,
        title: event.title.clone(),
        description: event.description.clone(),
        date: event.date,
        visibility: event.visibility.clone(),
        created_by: event.created_by,
        organization_name: refs
            .organization_name(refs.organization_of(&event.created_by))
            .unwrap_or_default()
            .to_string(),
        location_name: refs.location_name(event.location_id).unwrap_or_default().to_string(),
        category_name: refs.category_name(event.category_id).unwrap_or_default().to_string(),
        group_id: event.group_id,
        group_name,
        contact_phone: event.contact_phone.clone().unwrap_or_default(),
        contact_email: event.contact_email.clone().unwrap_or_default(),
        rating,
        comments,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::references::UserRef;

    fn viewer_id() -> UserId {
        UserId::from_u128(1)
    }

    fn other_id() -> UserId {
        UserId::from_u128(2)
    }

    fn event(id: DbId, tier: VisibilityTier) -> EventRow {
        EventRow {
            id,
            title: "Spring Campus Festival".into(),
            description: "Annual spring celebration".into(),
            date: Utc.with_ymd_and_hms(2025, 4, 15, 14, 0, 0).unwrap(),
            visibility: tier,
            created_by: other_id(),
            group_id: Some(10),
            category_id: Some(3),
            location_id: Some(4),
            contact_phone: None,
            contact_email: Some("events@state.edu".into()),
            is_approved: true,
        }
    }

    fn comment(
        id: DbId,
        event_id: DbId,
        author: UserId,
        rating: Option<i16>,
        minute: i64,
    ) -> CommentRow {
        CommentRow {
            id,
            event_id,
            author_id: author,
            text: format!("comment {id}"),
            rating,
            created_at: Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap()
                + Duration::minutes(minute),
        }
    }

    fn refs() -> ReferenceMaps {
        let mut refs = ReferenceMaps::default();
        refs.locations.insert(4, "Main Campus Quad".into());
        refs.categories.insert(3, "social".into());
        refs.groups.insert(10, "Chess Club".into());
        refs.organizations.insert(1, "State University".into());
        refs.users.insert(
            viewer_id(),
            UserRef {
                email: "alex_j@state.edu".into(),
                organization_id: Some(1),
            },
        );
        refs.users.insert(
            other_id(),
            UserRef {
                email: "maya22@state.edu".into(),
                organization_id: Some(1),
            },
        );
        refs
    }

    #[test]
    fn rating_ignores_unrated_comments() {
        let rows = [
            comment(1, 1, viewer_id(), Some(4), 0),
            comment(2, 1, viewer_id(), None, 1),
            comment(3, 1, other_id(), Some(5), 2),
        ];
        let refs: Vec<&CommentRow> = rows.iter().collect();
        let agg = compute_rating(1, &refs);
        assert_eq!(agg.mean, 4.5);
        assert_eq!(agg.count, 2);
    }

    #[test]
    fn rating_rounds_to_one_decimal() {
        let rows = [
            comment(1, 1, viewer_id(), Some(4), 0),
            comment(2, 1, viewer_id(), Some(4), 1),
            comment(3, 1, other_id(), Some(5), 2),
        ];
        let refs: Vec<&CommentRow> = rows.iter().collect();
        assert_eq!(compute_rating(1, &refs).mean, 4.3);
    }

    #[test]
    fn event_without_comments_has_zero_rating() {
        let vm = build_view_model(&event(1, VisibilityTier::Public), &refs(), &[], viewer_id());
        assert!(vm.comments.is_empty());
        assert_eq!(vm.rating.mean, 0.0);
        assert_eq!(vm.rating.count, 0);
    }

    #[test]
    fn references_resolve_or_fall_back_to_empty() {
        let mut e = event(1, VisibilityTier::Public);
        let vm = build_view_model(&e, &refs(), &[], viewer_id());
        assert_eq!(vm.location_name, "Main Campus Quad");
        assert_eq!(vm.category_name, "social");
        assert_eq!(vm.organization_name, "State University");
        assert_eq!(vm.contact_phone, "");
        assert_eq!(vm.contact_email, "events@state.edu");

        e.location_id = Some(404);
        e.category_id = None;
        let vm = build_view_model(&e, &ReferenceMaps::default(), &[], viewer_id());
        assert_eq!(vm.location_name, "");
        assert_eq!(vm.category_name, "");
        assert_eq!(vm.organization_name, "");
    }

    #[test]
    fn group_name_only_for_group_events() {
        let public = build_view_model(&event(1, VisibilityTier::Public), &refs(), &[], viewer_id());
        assert_eq!(public.group_name, None);
        assert_eq!(public.group_id, Some(10));

        let group = build_view_model(&event(1, VisibilityTier::Group), &refs(), &[], viewer_id());
        assert_eq!(group.group_name.as_deref(), Some("Chess Club"));
    }

    #[test]
    fn comments_are_partitioned_ordered_and_flagged() {
        let rows = vec![
            comment(30, 1, other_id(), None, 5),
            comment(10, 2, viewer_id(), Some(1), 0),
            comment(21, 1, viewer_id(), Some(3), 1),
            comment(20, 1, other_id(), None, 1),
        ];
        let by_event = group_comments_by_event(&rows);
        assert_eq!(by_event.len(), 2);
        assert_eq!(by_event[&2].len(), 1);

        let e = event(1, VisibilityTier::Public);
        let vm = build_view_model(&e, &refs(), &by_event[&1], viewer_id());

        let ids: Vec<DbId> = vm.comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![20, 21, 30]);
        assert_eq!(vm.comments[0].author_name, "maya22");
        assert!(!vm.comments[0].is_own_comment);
        assert_eq!(vm.comments[1].author_name, "alex_j");
        assert!(vm.comments[1].is_own_comment);
        assert_eq!(vm.rating.count, 1);
        assert_eq!(vm.rating.mean, 3.0);
    }

    #[test]
    fn building_twice_is_identical() {
        let rows = vec![
            comment(2, 1, other_id(), Some(5), 0),
            comment(1, 1, viewer_id(), Some(4), 0),
        ];
        let e = event(1, VisibilityTier::Public);
        let forward: Vec<&CommentRow> = rows.iter().collect();
        let reversed: Vec<&CommentRow> = rows.iter().rev().collect();
        let first = build_view_model(&e, &refs(), &forward, viewer_id());
        let second = build_view_model(&e, &refs(), &reversed, viewer_id());
        assert_eq!(first, second);
    }

    #[test]
    fn display_name_is_email_local_part() {
        assert_eq!(display_name_from_email(Some("alex_j@state.edu")), "alex_j");
        assert_eq!(display_name_from_email(Some("no-at-sign")), "no-at-sign");
        assert_eq!(display_name_from_email(None), "");
    }
}
