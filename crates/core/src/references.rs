//! Reference resolution: id → display value lookup maps for one build cycle.
//!
//! Maps are built fresh from the rows of the current cycle and are never
//! patched afterwards. Ids whose lookup returned nothing are absent from the
//! map; consumers treat absence as "unknown".

use std::collections::{BTreeSet, HashMap};
use std::future::Future;

use serde::Serialize;

use crate::error::{FeedError, StoreError};
use crate::rows::{CommentRow, EventRow};
use crate::store::RowSource;
use crate::types::{DbId, UserId};

/// The parts of a user row the join needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRef {
    pub email: String,
    pub organization_id: Option<DbId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceMaps {
    pub locations: HashMap<DbId, String>,
    pub categories: HashMap<DbId, String>,
    pub groups: HashMap<DbId, String>,
    pub users: HashMap<UserId, UserRef>,
    pub organizations: HashMap<DbId, String>,
}

impl ReferenceMaps {
    pub fn location_name(&self, id: Option<DbId>) -> Option<&str> {
        id.and_then(|id| self.locations.get(&id)).map(String::as_str)
    }

    pub fn category_name(&self, id: Option<DbId>) -> Option<&str> {
        id.and_then(|id| self.categories.get(&id)).map(String::as_str)
    }

    pub fn group_name(&self, id: Option<DbId>) -> Option<&str> {
        id.and_then(|id| self.groups.get(&id)).map(String::as_str)
    }

    pub fn organization_name(&self, id: Option<DbId>) -> Option<&str> {
        id.and_then(|id| self.organizations.get(&id)).map(String::as_str)
    }

    /// Home organization of a user, if both the user and the organization
    /// link are known.
    pub fn organization_of(&self, user_id: &UserId) -> Option<DbId> {
        self.users.get(user_id).and_then(|u| u.organization_id)
    }

    pub fn email_of(&self, user_id: &UserId) -> Option<&str> {
        self.users.get(user_id).map(|u| u.email.as_str())
    }
}

/// Deduplicate `ids` and split them into `IN`-sized batches.
///
/// An empty input yields no batches, so callers never issue an empty
/// lookup. A `batch_size` of zero is treated as one.
pub fn chunked_ids<T>(ids: impl IntoIterator<Item = T>, batch_size: usize) -> Vec<Vec<T>>
where
    T: Ord + Copy,
{
    let distinct: Vec<T> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    distinct
        .chunks(batch_size.max(1))
        .map(<[T]>::to_vec)
        .collect()
}

/// Run `fetch` once per batch and concatenate the results.
///
/// The first failing batch fails the whole lookup.
async fn lookup_batched<I, T, F, Fut>(
    ids: impl IntoIterator<Item = I>,
    batch_size: usize,
    fetch: F,
) -> Result<Vec<T>, StoreError>
where
    I: Ord + Copy,
    F: Fn(Vec<I>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, StoreError>>,
{
    let mut rows = Vec::new();
    for batch in chunked_ids(ids, batch_size) {
        rows.extend(fetch(batch).await?);
    }
    Ok(rows)
}

/// Build the reference maps for a set of event rows and their comments.
///
/// Location, category, group and user lookups run concurrently; the
/// organization lookup follows once the users (event creators and comment
/// authors) are known. Any failed lookup fails the whole resolution.
pub async fn resolve_references<S>(
    source: &S,
    events: &[EventRow],
    comments: &[CommentRow],
    batch_size: usize,
) -> Result<ReferenceMaps, FeedError>
where
    S: RowSource + ?Sized,
{
    let location_ids = events.iter().filter_map(|e| e.location_id);
    let category_ids = events.iter().filter_map(|e| e.category_id);
    let group_ids = events.iter().filter_map(|e| e.group_id);
    let user_ids = events
        .iter()
        .map(|e| e.created_by)
        .chain(comments.iter().map(|c| c.author_id));

    let locations = async {
        lookup_batched(location_ids, batch_size, |ids| async move {
            source.fetch_locations(&ids).await
        })
        .await
        .map_err(FeedError::reference("location"))
    };
    let categories = async {
        lookup_batched(category_ids, batch_size, |ids| async move {
            source.fetch_categories(&ids).await
        })
        .await
        .map_err(FeedError::reference("category"))
    };
    let groups = async {
        lookup_batched(group_ids, batch_size, |ids| async move {
            source.fetch_groups(&ids).await
        })
        .await
        .map_err(FeedError::reference("group"))
    };
    let users = async {
        lookup_batched(user_ids, batch_size, |ids| async move {
            source.fetch_users(&ids).await
        })
        .await
        .map_err(FeedError::reference("user"))
    };

    let (locations, categories, groups, users) =
        futures::try_join!(locations, categories, groups, users)?;

    let organization_ids: Vec<DbId> = users.iter().filter_map(|u| u.organization_id).collect();
    let organizations = lookup_batched(organization_ids, batch_size, |ids| async move {
        source.fetch_organizations(&ids).await
    })
    .await
    .map_err(FeedError::reference("organization"))?;

    let maps = ReferenceMaps {
        locations: locations.into_iter().map(|r| (r.id, r.name)).collect(),
        categories: categories.into_iter().map(|r| (r.id, r.name)).collect(),
        groups: groups.into_iter().map(|r| (r.id, r.name)).collect(),
        users: users
            .into_iter()
            .map(|u| {
                let user_ref = UserRef {
                    email: u.email,
                    organization_id: u.organization_id,
                };
                (u.id, user_ref)
            })
            .collect(),
        organizations: organizations.into_iter().map(|r| (r.id, r.name)).collect(),
    };

    tracing::debug!(
        locations = maps.locations.len(),
        categories = maps.categories.len(),
        groups = maps.groups.len(),
        users = maps.users.len(),
        organizations = maps.organizations.len(),
        "Resolved reference maps",
    );

    Ok(maps)
}
